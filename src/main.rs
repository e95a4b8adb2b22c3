//! Dicehouse node binary.
//!
//! Loads configuration, bootstraps the settlement engine and serves the
//! HTTP API.

use clap::Parser;
use dicehouse::api::{ApiServer, AppState};
use dicehouse::clock::SystemClock;
use dicehouse::config::{generate_sample_config, ConfigLoader};
use dicehouse::engine::SettlementEngine;
use std::sync::Arc;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "dicehouse")]
#[command(about = "VRF-settled dice wager settlement engine", long_about = None)]
struct Args {
    /// Path to a TOML configuration file
    #[arg(long)]
    config: Option<String>,

    /// Override the API listen address
    #[arg(long)]
    listen_address: Option<String>,

    /// Override the API port
    #[arg(long)]
    port: Option<u16>,

    /// Write a sample configuration file to the given path and exit
    #[arg(long)]
    generate_config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dicehouse=info,tower_http=info".into()),
        )
        .init();

    let args = Args::parse();

    if let Some(path) = args.generate_config {
        generate_sample_config(&path)?;
        info!(path = %path, "sample configuration written");
        return Ok(());
    }

    let mut loader = ConfigLoader::new();
    if let Some(ref path) = args.config {
        loader = loader.with_path(path);
    }
    let mut config = loader.load()?;

    if let Some(addr) = args.listen_address {
        config.api.listen_address = addr;
    }
    if let Some(port) = args.port {
        config.api.port = port;
    }

    info!("🚀 Starting dicehouse node v{}", env!("CARGO_PKG_VERSION"));

    let (engine, admin) = SettlementEngine::bootstrap(&config, Arc::new(SystemClock))?;
    let state = Arc::new(AppState {
        engine: Arc::new(engine),
        admin,
        admin_token: config.api.admin_token.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    });

    ApiServer::new(config.api.clone(), state).run().await
}
