//! HTTP API for the dicehouse settlement engine.
//!
//! Exposes the wager lifecycle (create/resolve/refund), house funding and
//! status, observability feeds, and bearer-token-gated admin operations.

pub mod errors;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod server;

pub use handlers::AppState;
pub use server::ApiServer;
