//! pwa-manifest: serves Web App Manifests for hosted sites.
//!
//! This is the application entry point. It initializes tracing, loads configuration
//! from a TOML file, connects the MongoDB site store, sets up the Axum router,
//! and starts the HTTP server.

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pwa_manifest::config::{AppConfig, DEFAULT_CONFIG_PATH, DEFAULT_LOG_FILTER};
use pwa_manifest::http::start_server;
use pwa_manifest::store::MongoSiteStore;
use pwa_manifest::{create_router, AppState};

/// pwa-manifest: Web App Manifest service
#[derive(Parser, Debug)]
#[command(name = "pwa-manifest", version, about)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: String,

    /// Log level filter (e.g., "pwa_manifest=debug,mongodb=info")
    #[arg(short, long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Configuration is loaded before tracing so the log format can be honored
    let config = AppConfig::load(&args.config)?;

    // Initialize tracing with priority: CLI > env > default
    let log_filter = args
        .log_level
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

    let registry =
        tracing_subscriber::registry().with(tracing_subscriber::EnvFilter::new(&log_filter));
    if config.logging.is_json() {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!(config = %args.config, "Loaded configuration");

    let store = MongoSiteStore::connect(&config.database).await?;

    let state = AppState::new(Arc::new(store));
    let app = create_router(state);

    start_server(app, &config.http).await?;

    Ok(())
}
