//! Route definitions.
//!
//! Maps URLs to handlers; /admin routes sit behind the bearer-token gate.

use super::{handlers::*, middleware::admin_auth};
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

/// Build the API router with all endpoints.
pub fn create_router(state: Arc<AppState>) -> Router {
    let admin_routes = Router::new()
        .route("/withdraw", post(withdraw_house_handler))
        .route("/withdraw-fees", post(withdraw_fees_handler))
        .route("/house-config", post(update_house_config_handler))
        .route("/vrf-key", post(rotate_vrf_key_handler))
        .route_layer(middleware::from_fn_with_state(state.clone(), admin_auth));

    Router::new()
        // Health check (high priority)
        .route("/health", get(health_handler))
        // House reserve status and public funding
        .route("/house", get(house_handler))
        .route("/house/fund", post(fund_house_handler))
        // Wager lifecycle
        .route("/games", post(create_game_handler))
        .route("/games/:id", get(game_handler))
        .route("/games/:id/resolve", post(resolve_game_handler))
        .route("/games/:id/refund", post(refund_game_handler))
        // Observability
        .route("/events", get(events_handler))
        .route("/metrics", get(metrics_handler))
        // Administrative operations (bearer token required)
        .nest("/admin", admin_routes)
        // Attach shared state
        .with_state(state)
}
