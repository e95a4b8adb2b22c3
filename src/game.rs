//! Wager state machine.
//!
//! A game escrows the player wager plus an equal house match, then settles
//! exactly once: resolution (VRF-proven win or loss) or timeout refund.
//! The methods here are pure state-machine logic over a game and the house
//! ledger; the engine serializes calls and provides atomicity.

use crate::errors::{GameError, GameResult};
use crate::house::HouseLedger;
use crate::vrf::{self, PUBLIC_KEY_LENGTH};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Refund window: a game untouched by the oracle for this long can be
/// refunded by anyone on the player's behalf.
pub const REFUND_AFTER_MS: u64 = 120_000;

/// Basis-point denominator (10_000 = 100%).
pub const BP_DENOMINATOR: u64 = 10_000;

/// Player's parity choice for the two-dice sum.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Selection {
    Even,
    Odd,
}

impl Selection {
    /// Parity bit: 0 for even, 1 for odd.
    pub fn bit(self) -> u8 {
        match self {
            Selection::Even => 0,
            Selection::Odd => 1,
        }
    }
}

impl TryFrom<u8> for Selection {
    type Error = GameError;

    fn try_from(value: u8) -> GameResult<Self> {
        match value {
            0 => Ok(Selection::Even),
            1 => Ok(Selection::Odd),
            other => Err(GameError::InvalidSelection(other)),
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::Even => write!(f, "even"),
            Selection::Odd => write!(f, "odd"),
        }
    }
}

/// Lifecycle state, derived from the settlement fields.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Active,
    Resolved,
    Refunded,
}

/// Settlement outcome of a resolved game.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Outcome {
    pub random_1: u8,
    pub random_2: u8,
    /// Parity of the dice sum: 0 even, 1 odd.
    pub result: u8,
    pub player_wins: bool,
    /// Paid to the player (stake minus fee on a win, zero on a loss).
    pub player_payout: u64,
    /// Fee moved into the house fee pool (win path only).
    pub fee: u64,
    /// Escrow returned to the house reserve (loss path only).
    pub house_credit: u64,
}

/// Disbursement of a timed-out game.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Refund {
    pub player_share: u64,
    pub house_share: u64,
}

/// One wager instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    pub player: String,
    /// Escrowed funds: player wager + equal house match. Reaches zero
    /// exactly once, via resolution or refund.
    pub stake: u64,
    pub seeds: [Vec<u8>; 2],
    pub user_selection: Selection,
    /// Creation time in milliseconds.
    pub start_ts: u64,
    /// Flips false -> true exactly once, on successful resolution.
    pub result_submitted: bool,
    /// Derived faces in [1, 6]; zero until resolved.
    pub random_1: u8,
    pub random_2: u8,
}

impl Game {
    /// Called by the engine after all creation checks passed; `stake` is the
    /// combined escrow (2x the player wager).
    pub fn new(
        player: impl Into<String>,
        stake: u64,
        seeds: [Vec<u8>; 2],
        user_selection: Selection,
        start_ts: u64,
    ) -> Self {
        Self {
            player: player.into(),
            stake,
            seeds,
            user_selection,
            start_ts,
            result_submitted: false,
            random_1: 0,
            random_2: 0,
        }
    }

    pub fn status(&self) -> GameStatus {
        if self.result_submitted {
            GameStatus::Resolved
        } else if self.stake == 0 {
            GameStatus::Refunded
        } else {
            GameStatus::Active
        }
    }

    /// Settle the game against two VRF outputs.
    ///
    /// Proof order must match seed order: the first output/proof pair is
    /// checked against `seeds[0]`, the second against `seeds[1]`. All checks
    /// and arithmetic run before the first mutation, so any failure leaves
    /// the game and ledger untouched and the resolution retryable.
    pub fn resolve(
        &mut self,
        house: &mut HouseLedger,
        vrf_pubkey: &[u8; PUBLIC_KEY_LENGTH],
        random_outputs: &[Vec<u8>; 2],
        proofs: &[Vec<u8>; 2],
    ) -> GameResult<Outcome> {
        if self.result_submitted {
            return Err(GameError::AlreadyResolved);
        }
        // A zero stake with no submitted result means the refund path
        // already terminated this game; the terminal states are mutually
        // exclusive.
        if self.stake == 0 {
            return Err(GameError::AlreadyRefunded);
        }

        let random_1 = vrf::verified_face(vrf_pubkey, &self.seeds[0], &random_outputs[0], &proofs[0])?;
        let random_2 = vrf::verified_face(vrf_pubkey, &self.seeds[1], &random_outputs[1], &proofs[1])?;

        let result = (random_1 + random_2) % 2;
        let player_wins = self.user_selection.bit() == result;

        let stake = self.stake;
        let outcome = if player_wins {
            // Fee is taken on the full pre-fee escrow (wager + house match).
            let fee = win_fee(stake, house.fee_bp());
            let player_payout = stake
                .checked_sub(fee)
                .ok_or(GameError::ArithmeticOverflow)?;
            house.credit_fees(fee)?;
            Outcome {
                random_1,
                random_2,
                result,
                player_wins,
                player_payout,
                fee,
                house_credit: 0,
            }
        } else {
            house.credit_balance(stake)?;
            Outcome {
                random_1,
                random_2,
                result,
                player_wins,
                player_payout: 0,
                fee: 0,
                house_credit: stake,
            }
        };

        self.result_submitted = true;
        self.random_1 = random_1;
        self.random_2 = random_2;
        self.stake = 0;

        Ok(outcome)
    }

    /// Timeout refund: half the escrow to the player, half back to the
    /// house reserve. Only an active game inside no part of the refund
    /// window can be refunded; the window opens at exactly
    /// [`REFUND_AFTER_MS`] after creation (boundary inclusive).
    pub fn refund(&mut self, house: &mut HouseLedger, now_ms: u64) -> GameResult<Refund> {
        if self.result_submitted {
            return Err(GameError::AlreadyResolved);
        }
        if self.stake == 0 {
            return Err(GameError::AlreadyRefunded);
        }

        let elapsed_ms = now_ms.saturating_sub(self.start_ts);
        if elapsed_ms < REFUND_AFTER_MS {
            return Err(GameError::TooEarly {
                elapsed_ms,
                required_ms: REFUND_AFTER_MS,
            });
        }

        let player_share = self.stake / 2;
        let house_share = self.stake - player_share;
        house.credit_balance(house_share)?;
        self.stake = 0;

        Ok(Refund {
            player_share,
            house_share,
        })
    }
}

/// Win fee in smallest units: `floor(stake * fee_bp / 10_000)`.
///
/// Computed in u128 so an unclamped `fee_bp` cannot overflow; a fee above
/// the stake (fee_bp > 10_000) makes the caller's payout subtraction fail.
pub fn win_fee(stake: u64, fee_bp: u64) -> u64 {
    ((stake as u128 * fee_bp as u128) / BP_DENOMINATOR as u128) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vrf::VrfEngine;

    fn house() -> HouseLedger {
        HouseLedger::new("treasury", 100_000, 200, 100, 10_000)
    }

    fn proven_game(
        engine: &VrfEngine,
        selection: Selection,
        stake: u64,
        tag: u8,
    ) -> (Game, [Vec<u8>; 2], [Vec<u8>; 2]) {
        let seeds = [vec![tag, 1], vec![tag, 2]];
        let (out1, proof1) = engine.prove(&seeds[0]);
        let (out2, proof2) = engine.prove(&seeds[1]);
        let game = Game::new("player-1", stake, seeds, selection, 0);
        (game, [out1, out2], [proof1, proof2])
    }

    #[test]
    fn test_win_fee_examples() {
        // 2% of a 1000-unit escrow.
        assert_eq!(win_fee(1_000, 200), 20);
        // Floor division.
        assert_eq!(win_fee(999, 200), 19);
        assert_eq!(win_fee(1_000, 0), 0);
        // Unclamped basis points can exceed the stake.
        assert_eq!(win_fee(1_000, 12_000), 1_200);
    }

    #[test]
    fn test_resolve_settles_exactly_once() {
        let engine = VrfEngine::from_seed([3u8; 32]);
        let mut house = house();
        let (mut game, outputs, proofs) = proven_game(&engine, Selection::Even, 1_000, 1);

        let outcome = game
            .resolve(&mut house, &engine.public_key(), &outputs, &proofs)
            .unwrap();

        // Faces are the deterministic derivation of the verified outputs.
        assert_eq!(outcome.random_1, vrf::derive_face(&outputs[0]));
        assert_eq!(outcome.random_2, vrf::derive_face(&outputs[1]));
        assert_eq!(game.status(), GameStatus::Resolved);
        assert_eq!(game.stake, 0);

        let err = game
            .resolve(&mut house, &engine.public_key(), &outputs, &proofs)
            .unwrap_err();
        assert_eq!(err, GameError::AlreadyResolved);
    }

    #[test]
    fn test_resolution_conserves_stake() {
        let engine = VrfEngine::from_seed([4u8; 32]);

        for tag in 0..16 {
            for selection in [Selection::Even, Selection::Odd] {
                let mut house = house();
                let before = house.balance() + house.fees();
                let (mut game, outputs, proofs) = proven_game(&engine, selection, 1_000, tag);

                let outcome = game
                    .resolve(&mut house, &engine.public_key(), &outputs, &proofs)
                    .unwrap();

                let after = house.balance() + house.fees();
                assert_eq!(
                    outcome.player_payout + outcome.fee + outcome.house_credit,
                    1_000
                );
                assert_eq!(after - before, outcome.fee + outcome.house_credit);

                if outcome.player_wins {
                    assert_eq!(outcome.fee, win_fee(1_000, 200));
                    assert_eq!(outcome.player_payout, 1_000 - outcome.fee);
                    assert_eq!(house.fees(), outcome.fee);
                } else {
                    assert_eq!(outcome.player_payout, 0);
                    assert_eq!(outcome.house_credit, 1_000);
                }
            }
        }
    }

    #[test]
    fn test_win_is_parity_match() {
        let engine = VrfEngine::from_seed([5u8; 32]);
        let (_, outputs, proofs) = proven_game(&engine, Selection::Even, 1_000, 7);
        let parity = (vrf::derive_face(&outputs[0]) + vrf::derive_face(&outputs[1])) % 2;

        for selection in [Selection::Even, Selection::Odd] {
            let mut house = house();
            let mut game = Game::new(
                "player-1",
                1_000,
                [vec![7, 1], vec![7, 2]],
                selection,
                0,
            );
            let outcome = game
                .resolve(&mut house, &engine.public_key(), &outputs, &proofs)
                .unwrap();
            assert_eq!(outcome.result, parity);
            assert_eq!(outcome.player_wins, selection.bit() == parity);
        }
    }

    #[test]
    fn test_invalid_proof_leaves_game_retryable() {
        let engine = VrfEngine::from_seed([6u8; 32]);
        let mut house = house();
        let (mut game, outputs, proofs) = proven_game(&engine, Selection::Odd, 1_000, 9);

        let mut bad_proofs = proofs.clone();
        bad_proofs[1][0] ^= 0xff;
        let err = game
            .resolve(&mut house, &engine.public_key(), &outputs, &bad_proofs)
            .unwrap_err();
        assert!(matches!(err, GameError::InvalidProof(_)));

        // Nothing committed: no flags, no faces, no fund movement.
        assert!(!game.result_submitted);
        assert_eq!(game.stake, 1_000);
        assert_eq!((game.random_1, game.random_2), (0, 0));
        assert_eq!(house.balance(), 100_000);
        assert_eq!(house.fees(), 0);

        // A corrected call still succeeds.
        game.resolve(&mut house, &engine.public_key(), &outputs, &proofs)
            .unwrap();
    }

    #[test]
    fn test_proofs_must_match_seed_order() {
        let engine = VrfEngine::from_seed([8u8; 32]);
        let mut house = house();
        let (mut game, outputs, proofs) = proven_game(&engine, Selection::Even, 1_000, 11);

        let swapped_outputs = [outputs[1].clone(), outputs[0].clone()];
        let swapped_proofs = [proofs[1].clone(), proofs[0].clone()];
        let err = game
            .resolve(&mut house, &engine.public_key(), &swapped_outputs, &swapped_proofs)
            .unwrap_err();
        assert!(matches!(err, GameError::InvalidProof(_)));
    }

    #[test]
    fn test_refund_window_boundary() {
        let mut house = house();
        let mut game = Game::new("p", 1_000, [vec![1], vec![2]], Selection::Even, 1_000);

        // One millisecond short of the window.
        let err = game
            .refund(&mut house, 1_000 + REFUND_AFTER_MS - 1)
            .unwrap_err();
        assert_eq!(
            err,
            GameError::TooEarly {
                elapsed_ms: REFUND_AFTER_MS - 1,
                required_ms: REFUND_AFTER_MS,
            }
        );

        // Exactly at the window: allowed.
        let refund = game.refund(&mut house, 1_000 + REFUND_AFTER_MS).unwrap();
        assert_eq!(refund.player_share, 500);
        assert_eq!(refund.house_share, 500);
        assert_eq!(house.balance(), 100_500);
        assert_eq!(game.status(), GameStatus::Refunded);
    }

    #[test]
    fn test_refund_rejected_after_settlement() {
        let engine = VrfEngine::from_seed([9u8; 32]);
        let mut house = house();
        let (mut game, outputs, proofs) = proven_game(&engine, Selection::Even, 1_000, 13);

        game.resolve(&mut house, &engine.public_key(), &outputs, &proofs)
            .unwrap();
        let err = game.refund(&mut house, u64::MAX).unwrap_err();
        assert_eq!(err, GameError::AlreadyResolved);
    }

    #[test]
    fn test_resolve_rejected_after_refund() {
        let engine = VrfEngine::from_seed([11u8; 32]);
        let mut house = house();
        let (mut game, outputs, proofs) = proven_game(&engine, Selection::Even, 1_000, 15);

        game.refund(&mut house, REFUND_AFTER_MS).unwrap();
        let err = game
            .resolve(&mut house, &engine.public_key(), &outputs, &proofs)
            .unwrap_err();
        assert_eq!(err, GameError::AlreadyRefunded);
        assert_eq!(game.status(), GameStatus::Refunded);
    }

    #[test]
    fn test_second_refund_rejected() {
        let mut house = house();
        let mut game = Game::new("p", 1_000, [vec![1], vec![2]], Selection::Odd, 0);
        game.refund(&mut house, REFUND_AFTER_MS).unwrap();

        let err = game.refund(&mut house, REFUND_AFTER_MS * 2).unwrap_err();
        assert_eq!(err, GameError::AlreadyRefunded);
        assert_eq!(house.balance(), 100_500);
    }

    #[test]
    fn test_odd_stake_refund_rounds_toward_house() {
        let mut house = house();
        let mut game = Game::new("p", 1_001, [vec![1], vec![2]], Selection::Odd, 0);
        let refund = game.refund(&mut house, REFUND_AFTER_MS).unwrap();
        assert_eq!(refund.player_share, 500);
        assert_eq!(refund.house_share, 501);
        assert_eq!(refund.player_share + refund.house_share, 1_001);
    }

    #[test]
    fn test_oversized_fee_bp_aborts_win_payout() {
        let engine = VrfEngine::from_seed([10u8; 32]);

        // Find a winning configuration for some tag, then re-run it against
        // a ledger whose fee exceeds the stake.
        for tag in 0..32 {
            let (mut probe, outputs, proofs) = proven_game(&engine, Selection::Even, 1_000, tag);
            let mut normal_house = house();
            let outcome = probe
                .resolve(&mut normal_house, &engine.public_key(), &outputs, &proofs)
                .unwrap();
            if !outcome.player_wins {
                continue;
            }

            let mut greedy_house = HouseLedger::new("t", 100_000, 12_000, 100, 10_000);
            let mut game = Game::new(
                "p",
                1_000,
                [vec![tag, 1], vec![tag, 2]],
                Selection::Even,
                0,
            );
            let err = game
                .resolve(&mut greedy_house, &engine.public_key(), &outputs, &proofs)
                .unwrap_err();
            assert_eq!(err, GameError::ArithmeticOverflow);
            // Aborted before any mutation.
            assert!(!game.result_submitted);
            assert_eq!(game.stake, 1_000);
            assert_eq!(greedy_house.fees(), 0);
            return;
        }
        panic!("no winning tag found in 32 attempts");
    }
}
