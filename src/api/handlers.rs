//! Request handlers.
//!
//! Thin translation layer: decode hex/uuid inputs, call the settlement
//! engine, map failures onto HTTP classes. All settlement decisions live in
//! the engine.

use super::{errors::ApiError, middleware::RequestId, models::*};
use crate::config::decode_public_key;
use crate::engine::{
    AdminCap, CreateGame, CreatedGame, GameRecord, HouseStatus, SettlementEngine,
};
use crate::events::EventRecord;
use crate::metrics;
use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
    Extension, Json,
};
use std::sync::Arc;
use uuid::Uuid;

const MAX_EVENTS_LIMIT: usize = 500;

/// Shared application state.
pub struct AppState {
    pub engine: Arc<SettlementEngine>,
    /// The server holds the capability minted at bootstrap; a valid bearer
    /// token on /admin routes maps onto it.
    pub admin: AdminCap,
    pub admin_token: String,
    pub version: String,
}

fn decode_hex(request_id: &str, field: &str, value: &str) -> Result<Vec<u8>, ApiError> {
    hex::decode(value).map_err(|e| {
        ApiError::bad_request(
            request_id.to_string(),
            format!("invalid hex in {}: {}", field, e),
        )
    })
}

fn decode_hex_pair(
    request_id: &str,
    field: &str,
    values: &[String; 2],
) -> Result<[Vec<u8>; 2], ApiError> {
    Ok([
        decode_hex(request_id, field, &values[0])?,
        decode_hex(request_id, field, &values[1])?,
    ])
}

fn parse_game_id(request_id: &str, raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| {
        ApiError::bad_request(
            request_id.to_string(),
            format!("invalid game id: '{}'", raw),
        )
    })
}

/// GET /health
pub async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: format!("dicehouse {} running", state.version),
    })
}

/// GET /house
pub async fn house_handler(State(state): State<Arc<AppState>>) -> Json<HouseStatus> {
    Json(state.engine.house_status())
}

/// GET /games/:id
pub async fn game_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<GameRecord>, ApiError> {
    let id = parse_game_id(&request_id.0, &id)?;
    state
        .engine
        .game(id)
        .map(Json)
        .ok_or_else(|| ApiError::not_found(request_id.0, format!("game {} not found", id)))
}

/// GET /events?limit={n}
pub async fn events_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<EventsQuery>,
) -> Json<Vec<EventRecord>> {
    let limit = params.limit.min(MAX_EVENTS_LIMIT);
    Json(state.engine.recent_events(limit))
}

/// GET /metrics (Prometheus text exposition)
pub async fn metrics_handler() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        metrics::global().encode_text(),
    )
}

/// POST /games
pub async fn create_game_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateGameRequest>,
) -> Result<Json<CreatedGame>, ApiError> {
    let seeds = decode_hex_pair(&request_id.0, "seeds", &req.seeds)?;

    let created = state
        .engine
        .create_game(CreateGame {
            player: req.player,
            seeds,
            selection: req.selection,
            stake: req.stake,
        })
        .map_err(|e| ApiError::from_game(request_id.0, e))?;

    Ok(Json(created))
}

/// POST /games/:id/resolve
pub async fn resolve_game_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<ResolveGameRequest>,
) -> Result<Json<ResolveGameResponse>, ApiError> {
    let id = parse_game_id(&request_id.0, &id)?;
    let random_outputs = decode_hex_pair(&request_id.0, "random_outputs", &req.random_outputs)?;
    let proofs = decode_hex_pair(&request_id.0, "proofs", &req.proofs)?;

    let outcome = state
        .engine
        .resolve_game(id, random_outputs, proofs)
        .map_err(|e| ApiError::from_game(request_id.0, e))?;

    Ok(Json(ResolveGameResponse {
        game_id: id,
        outcome,
    }))
}

/// POST /games/:id/refund
pub async fn refund_game_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<RefundGameResponse>, ApiError> {
    let id = parse_game_id(&request_id.0, &id)?;

    let refund = state
        .engine
        .refund_game(id)
        .map_err(|e| ApiError::from_game(request_id.0, e))?;

    Ok(Json(RefundGameResponse {
        game_id: id,
        refund,
    }))
}

/// POST /house/fund
pub async fn fund_house_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    Json(req): Json<FundRequest>,
) -> Result<Json<BalanceResponse>, ApiError> {
    let balance = state
        .engine
        .fund_house(req.amount)
        .map_err(|e| ApiError::from_game(request_id.0, e))?;
    Ok(Json(BalanceResponse { balance }))
}

/// POST /admin/withdraw
pub async fn withdraw_house_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    Json(req): Json<WithdrawRequest>,
) -> Result<Json<BalanceResponse>, ApiError> {
    let balance = state
        .engine
        .withdraw_house(&state.admin, req.amount)
        .map_err(|e| ApiError::from_game(request_id.0, e))?;
    Ok(Json(BalanceResponse { balance }))
}

/// POST /admin/withdraw-fees
pub async fn withdraw_fees_handler(
    State(state): State<Arc<AppState>>,
) -> Json<WithdrawFeesResponse> {
    let amount = state.engine.withdraw_fees(&state.admin);
    Json(WithdrawFeesResponse { amount })
}

/// POST /admin/house-config
pub async fn update_house_config_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<HouseConfigRequest>,
) -> Json<AckResponse> {
    state.engine.update_house_config(
        &state.admin,
        req.treasury,
        req.fee_bp,
        req.min_stake,
        req.max_stake,
    );
    Json(AckResponse::ok())
}

/// POST /admin/vrf-key
pub async fn rotate_vrf_key_handler(
    Extension(request_id): Extension<RequestId>,
    State(state): State<Arc<AppState>>,
    Json(req): Json<VrfKeyRequest>,
) -> Result<Json<AckResponse>, ApiError> {
    let public_key = decode_public_key(&req.public_key)
        .map_err(|e| ApiError::bad_request(request_id.0, e.to_string()))?;
    state.engine.rotate_vrf_key(&state.admin, public_key);
    Ok(Json(AckResponse::ok()))
}
