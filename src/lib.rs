//! Dicehouse - VRF-settled even/odd dice wagers against a pooled house.
//!
//! A player escrows a wager plus an equal house match against two one-time
//! seeds; an off-chain oracle later supplies VRF outputs and proofs for
//! those seeds, and the engine derives two dice faces and settles exactly
//! once. Games the oracle abandons become refundable after a fixed window.
//!
//! The settlement core is [`engine::SettlementEngine`]; everything else is
//! plumbing around it (configuration, HTTP surface, metrics, events).

pub mod api;
pub mod clock;
pub mod config;
pub mod engine;
pub mod errors;
pub mod events;
pub mod game;
pub mod house;
pub mod metrics;
pub mod seed_registry;
pub mod vrf;

pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::{
    AdminCap, CreateGame, CreatedGame, GameRecord, HouseStatus, SettlementEngine,
};
pub use errors::{ConfigError, GameError, GameResult};
pub use game::{Game, GameStatus, Outcome, Refund, Selection, REFUND_AFTER_MS};
pub use house::HouseLedger;
pub use seed_registry::SeedRegistry;
