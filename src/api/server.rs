//! API server.
//!
//! Binds the router, layers cross-cutting middleware and serves until a
//! shutdown signal arrives.

use super::{
    handlers::AppState,
    middleware::{create_cors_layer, request_id_middleware},
    routes::create_router,
};
use crate::config::ApiSettings;
use std::{net::SocketAddr, sync::Arc, time::Duration};
use tokio::signal;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use tracing::info;

pub struct ApiServer {
    settings: ApiSettings,
    state: Arc<AppState>,
}

impl ApiServer {
    pub fn new(settings: ApiSettings, state: Arc<AppState>) -> Self {
        Self { settings, state }
    }

    /// Start the API server and run until SIGINT/SIGTERM.
    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        let app = self.create_app();
        let addr = self.socket_addr()?;

        info!("🌐 Starting dicehouse API server");
        info!("   Listen: http://{}", addr);
        info!("   CORS: {:?}", self.settings.cors_origins);
        info!("   Request timeout: {}s", self.settings.request_timeout_secs);
        self.log_endpoints();

        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!("✅ API server running");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("🛑 API server stopped gracefully");
        Ok(())
    }

    /// Assemble the application with the middleware stack.
    fn create_app(&self) -> axum::Router {
        create_router(self.state.clone())
            // Request ID middleware (first, so every layer can see it)
            .layer(axum::middleware::from_fn(request_id_middleware))
            // CORS layer (before timeout to handle preflight)
            .layer(create_cors_layer(&self.settings.cors_origins))
            .layer(TimeoutLayer::new(Duration::from_secs(
                self.settings.request_timeout_secs,
            )))
            // Tracing layer (last for complete request tracing)
            .layer(TraceLayer::new_for_http())
    }

    fn socket_addr(&self) -> Result<SocketAddr, Box<dyn std::error::Error>> {
        Ok(SocketAddr::from((
            self.settings.listen_address.parse::<std::net::IpAddr>()?,
            self.settings.port,
        )))
    }

    fn log_endpoints(&self) {
        info!("📊 Available endpoints:");
        info!("   GET  /health               - Health check");
        info!("   GET  /house                - House reserve status");
        info!("   POST /house/fund           - Add house liquidity");
        info!("   POST /games                - Create a wager");
        info!("   GET  /games/:id            - Game lookup");
        info!("   POST /games/:id/resolve    - Settle with VRF proofs");
        info!("   POST /games/:id/refund     - Timeout refund");
        info!("   GET  /events               - Recent events");
        info!("   GET  /metrics              - Prometheus metrics");
        info!("   POST /admin/*              - Admin operations (bearer token)");
    }
}

/// Wait for shutdown signal.
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received terminate signal");
        },
    }
}
