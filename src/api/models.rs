//! Request/response models for the HTTP API.
//!
//! Settlement results (`Outcome`, `Refund`, `GameRecord`, `HouseStatus`,
//! `EventRecord`) serialize directly; the types here are the wire-side
//! requests plus thin response wrappers.

use crate::game::{Outcome, Refund};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// POST /games
#[derive(Debug, Clone, Deserialize)]
pub struct CreateGameRequest {
    pub player: String,
    /// Two hex-encoded one-time seeds, in resolution order.
    pub seeds: [String; 2],
    /// 0 = even, 1 = odd.
    pub selection: u8,
    /// Player wager in smallest units.
    pub stake: u64,
}

/// POST /games/:id/resolve
#[derive(Debug, Clone, Deserialize)]
pub struct ResolveGameRequest {
    /// Hex-encoded VRF outputs, first seed first.
    pub random_outputs: [String; 2],
    /// Hex-encoded VRF proofs, first seed first.
    pub proofs: [String; 2],
}

#[derive(Debug, Clone, Serialize)]
pub struct ResolveGameResponse {
    pub game_id: Uuid,
    pub outcome: Outcome,
}

#[derive(Debug, Clone, Serialize)]
pub struct RefundGameResponse {
    pub game_id: Uuid,
    pub refund: Refund,
}

/// POST /house/fund
#[derive(Debug, Clone, Deserialize)]
pub struct FundRequest {
    pub amount: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BalanceResponse {
    pub balance: u64,
}

/// POST /admin/withdraw
#[derive(Debug, Clone, Deserialize)]
pub struct WithdrawRequest {
    pub amount: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct WithdrawFeesResponse {
    /// Fee amount moved to the treasury.
    pub amount: u64,
}

/// POST /admin/house-config
#[derive(Debug, Clone, Deserialize)]
pub struct HouseConfigRequest {
    pub treasury: String,
    pub fee_bp: u64,
    pub min_stake: u64,
    pub max_stake: u64,
}

/// POST /admin/vrf-key
#[derive(Debug, Clone, Deserialize)]
pub struct VrfKeyRequest {
    /// Hex-encoded sr25519 public key.
    pub public_key: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct AckResponse {
    pub status: &'static str,
}

impl AckResponse {
    pub fn ok() -> Self {
        Self { status: "ok" }
    }
}

/// GET /events query parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct EventsQuery {
    #[serde(default = "default_events_limit")]
    pub limit: usize,
}

fn default_events_limit() -> usize {
    50
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
}
