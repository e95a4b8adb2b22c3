//! Transactional settlement engine.
//!
//! The engine owns the house ledger, the seed registry and every live game
//! behind a single lock. Each public operation acquires the write lock,
//! validates fully, then commits, so callers only ever observe
//! fully-applied transactions no matter how creates, resolutions and
//! refunds interleave across games.
//!
//! Read traffic (game lookups, house status) is served from a lock-free
//! snapshot index that is refreshed on every commit, so queries never
//! contend with settlement.

use crate::clock::Clock;
use crate::config::NodeConfig;
use crate::errors::{ConfigError, GameError, GameResult};
use crate::events::{Event, EventFeed, EventRecord};
use crate::game::{Game, GameStatus, Outcome, Refund, Selection};
use crate::house::HouseLedger;
use crate::metrics;
use crate::seed_registry::SeedRegistry;
use crate::vrf::PUBLIC_KEY_LENGTH;
use dashmap::DashMap;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

/// Bearer capability for administrative operations.
///
/// Only [`SettlementEngine::bootstrap`] can mint one; holding a reference is
/// the entire authorization check. It is never revoked.
pub struct AdminCap {
    _priv: (),
}

/// Parameters for a new wager.
#[derive(Debug, Clone)]
pub struct CreateGame {
    pub player: String,
    /// Two one-time seeds, in resolution order.
    pub seeds: [Vec<u8>; 2],
    /// 0 = even, 1 = odd.
    pub selection: u8,
    /// Player wager in smallest units; the house matches it 1:1.
    pub stake: u64,
}

/// Receipt for a created wager.
#[derive(Debug, Clone, Serialize)]
pub struct CreatedGame {
    pub id: Uuid,
    /// Combined escrow (2x the wager).
    pub stake: u64,
    pub start_ts: u64,
}

/// Read-side snapshot of a game.
#[derive(Debug, Clone, Serialize)]
pub struct GameRecord {
    pub id: Uuid,
    pub player: String,
    pub status: GameStatus,
    /// Remaining escrow; zero once settled.
    pub stake: u64,
    pub user_selection: Selection,
    /// Hex-encoded seeds, in resolution order.
    pub seeds: [String; 2],
    pub start_ts: u64,
    pub result_submitted: bool,
    pub random_1: u8,
    pub random_2: u8,
}

impl GameRecord {
    fn snapshot(id: Uuid, game: &Game) -> Self {
        Self {
            id,
            player: game.player.clone(),
            status: game.status(),
            stake: game.stake,
            user_selection: game.user_selection,
            seeds: [hex::encode(&game.seeds[0]), hex::encode(&game.seeds[1])],
            start_ts: game.start_ts,
            result_submitted: game.result_submitted,
            random_1: game.random_1,
            random_2: game.random_2,
        }
    }
}

/// Read-side snapshot of the house ledger.
#[derive(Debug, Clone, Serialize)]
pub struct HouseStatus {
    pub balance: u64,
    pub fees: u64,
    pub treasury: String,
    pub fee_bp: u64,
    pub min_stake: u64,
    pub max_stake: u64,
    pub active_games: usize,
    pub used_seeds: usize,
}

struct EngineState {
    house: HouseLedger,
    seeds: SeedRegistry,
    games: HashMap<Uuid, Game>,
}

/// Shared settlement engine; one per currency.
pub struct SettlementEngine {
    state: RwLock<EngineState>,
    records: DashMap<Uuid, GameRecord>,
    events: EventFeed,
    clock: Arc<dyn Clock>,
}

impl SettlementEngine {
    /// One-time provisioning of house ledger, seed registry and admin
    /// capability from the node configuration.
    pub fn bootstrap(
        config: &NodeConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<(Self, AdminCap), ConfigError> {
        let vrf_pubkey = config.vrf.decode_public_key()?;
        let house = HouseLedger::new(
            config.house.treasury.clone(),
            config.house.initial_balance,
            config.house.fee_bp,
            config.house.min_stake,
            config.house.max_stake,
        );

        metrics::global().set_house(house.balance(), house.fees());
        tracing::info!(
            treasury = %house.treasury(),
            balance = house.balance(),
            fee_bp = house.fee_bp(),
            min_stake = house.min_stake(),
            max_stake = house.max_stake(),
            vrf_public_key = %config.vrf.public_key,
            "settlement engine bootstrapped"
        );

        let engine = Self {
            state: RwLock::new(EngineState {
                house,
                seeds: SeedRegistry::new(vrf_pubkey),
                games: HashMap::new(),
            }),
            records: DashMap::new(),
            events: EventFeed::new(),
            clock,
        };
        Ok((engine, AdminCap { _priv: () }))
    }

    /// Escrow a new wager.
    ///
    /// Checks run in order (seed reuse, selection, stake bounds, house
    /// match) before the first mutation; the commit itself cannot fail, so
    /// no partial seed registration or partial escrow is ever observable.
    pub fn create_game(&self, req: CreateGame) -> GameResult<CreatedGame> {
        let mut state = self.state.write().unwrap();

        state.seeds.check_available(&req.seeds)?;
        let selection = Selection::try_from(req.selection)?;
        state.house.validate_stake(req.stake)?;
        if state.house.balance() < req.stake {
            return Err(GameError::InsufficientReserve {
                required: req.stake,
                available: state.house.balance(),
            });
        }
        let escrow = req
            .stake
            .checked_mul(2)
            .ok_or(GameError::ArithmeticOverflow)?;

        state.seeds.register(&req.seeds)?;
        state.house.reserve(req.stake)?;

        let id = Uuid::new_v4();
        let start_ts = self.clock.now_ms();
        let game = Game::new(req.player.clone(), escrow, req.seeds.clone(), selection, start_ts);
        let record = GameRecord::snapshot(id, &game);
        state.games.insert(id, game);

        metrics::global().games_created.inc();
        metrics::global().set_house(state.house.balance(), state.house.fees());
        self.records.insert(id, record);
        self.events.record(Event::GameCreated {
            game_id: id,
            player: req.player,
            stake: escrow,
            seeds: [hex::encode(&req.seeds[0]), hex::encode(&req.seeds[1])],
            user_selection: selection,
            timestamp: start_ts,
        });

        Ok(CreatedGame {
            id,
            stake: escrow,
            start_ts,
        })
    }

    /// Settle a game against the oracle's VRF outputs and proofs.
    pub fn resolve_game(
        &self,
        id: Uuid,
        random_outputs: [Vec<u8>; 2],
        proofs: [Vec<u8>; 2],
    ) -> GameResult<Outcome> {
        let mut state = self.state.write().unwrap();
        let EngineState {
            house,
            seeds,
            games,
        } = &mut *state;

        let game = games.get_mut(&id).ok_or(GameError::GameNotFound(id))?;
        let vrf_pubkey = seeds.vrf_pubkey();
        let outcome = game.resolve(house, &vrf_pubkey, &random_outputs, &proofs)?;

        metrics::global().games_resolved.inc();
        if outcome.player_wins {
            metrics::global().player_wins.inc();
        }
        metrics::global().set_house(house.balance(), house.fees());
        self.records.insert(id, GameRecord::snapshot(id, game));
        tracing::info!(
            game_id = %id,
            player = %game.player,
            random_1 = outcome.random_1,
            random_2 = outcome.random_2,
            player_wins = outcome.player_wins,
            player_payout = outcome.player_payout,
            fee = outcome.fee,
            "game resolved"
        );

        Ok(outcome)
    }

    /// Refund a game the oracle abandoned.
    pub fn refund_game(&self, id: Uuid) -> GameResult<Refund> {
        let now_ms = self.clock.now_ms();
        let mut state = self.state.write().unwrap();
        let EngineState {
            house,
            seeds: _,
            games,
        } = &mut *state;

        let game = games.get_mut(&id).ok_or(GameError::GameNotFound(id))?;
        let refund = game.refund(house, now_ms)?;

        metrics::global().games_refunded.inc();
        metrics::global().set_house(house.balance(), house.fees());
        self.records.insert(id, GameRecord::snapshot(id, game));
        tracing::info!(
            game_id = %id,
            player = %game.player,
            player_share = refund.player_share,
            house_share = refund.house_share,
            "game refunded after oracle timeout"
        );

        Ok(refund)
    }

    /// Add liquidity to the house reserve. Open to anyone.
    pub fn fund_house(&self, amount: u64) -> GameResult<u64> {
        let mut state = self.state.write().unwrap();
        let balance = state.house.fund(amount)?;
        metrics::global().set_house(balance, state.house.fees());
        tracing::info!(amount, balance, "house funded");
        Ok(balance)
    }

    /// Drain reserve funds toward the treasury. Returns the new balance.
    pub fn withdraw_house(&self, _cap: &AdminCap, amount: u64) -> GameResult<u64> {
        let mut state = self.state.write().unwrap();
        let balance = state.house.withdraw(amount)?;
        metrics::global().set_house(balance, state.house.fees());
        tracing::info!(
            amount,
            balance,
            treasury = %state.house.treasury(),
            "house funds withdrawn"
        );
        Ok(balance)
    }

    /// Drain the whole fee pool toward the treasury. Returns the amount moved.
    pub fn withdraw_fees(&self, _cap: &AdminCap) -> u64 {
        let mut state = self.state.write().unwrap();
        let amount = state.house.withdraw_all_fees();
        metrics::global().set_house(state.house.balance(), state.house.fees());
        tracing::info!(amount, treasury = %state.house.treasury(), "house fees withdrawn");
        amount
    }

    /// Replace treasury and wager policy.
    pub fn update_house_config(
        &self,
        _cap: &AdminCap,
        treasury: String,
        fee_bp: u64,
        min_stake: u64,
        max_stake: u64,
    ) {
        let mut state = self.state.write().unwrap();
        state
            .house
            .update_config(treasury.clone(), fee_bp, min_stake, max_stake);
        self.events.record(Event::HouseConfigUpdated {
            treasury,
            fee_bp,
            min_stake,
            max_stake,
        });
    }

    /// Rotate the VRF public key expected on future proofs.
    pub fn rotate_vrf_key(&self, _cap: &AdminCap, public_key: [u8; PUBLIC_KEY_LENGTH]) {
        let mut state = self.state.write().unwrap();
        state.seeds.rotate_key(public_key);
        self.events.record(Event::VrfKeyRotated {
            public_key: hex::encode(public_key),
        });
    }

    /// Lock-free game lookup from the snapshot index.
    pub fn game(&self, id: Uuid) -> Option<GameRecord> {
        self.records.get(&id).map(|r| r.clone())
    }

    pub fn house_status(&self) -> HouseStatus {
        let state = self.state.read().unwrap();
        HouseStatus {
            balance: state.house.balance(),
            fees: state.house.fees(),
            treasury: state.house.treasury().to_string(),
            fee_bp: state.house.fee_bp(),
            min_stake: state.house.min_stake(),
            max_stake: state.house.max_stake(),
            active_games: state
                .games
                .values()
                .filter(|g| g.status() == GameStatus::Active)
                .count(),
            used_seeds: state.seeds.len(),
        }
    }

    pub fn recent_events(&self, limit: usize) -> Vec<EventRecord> {
        self.events.recent(limit)
    }
}
