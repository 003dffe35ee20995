mod apis;
mod bot;
mod commands;
mod config;
mod format;
mod health;
mod platform;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::apis::ApiClients;
use crate::bot::AppState;
use crate::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Secrets usually come from a .env file next to the binary
    let dotenv = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,ecobot=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Ok(path) = dotenv {
        info!("Loaded environment from: {}", path.display());
    }

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("config.toml"));

    info!("Loading configuration from: {}", config_path.display());
    let config = Config::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    info!("Configuration loaded successfully");
    info!("  HTTP timeout: {}s", config.http.timeout_secs);
    let missing = config.missing_keys();
    if !missing.is_empty() {
        warn!("  No API key for: {} (those commands will fail)", missing.join(", "));
    }

    if config.health.enabled {
        let port = config.health.port;
        tokio::spawn(async move {
            if let Err(e) = health::serve(port).await {
                error!("Health endpoint stopped: {:#}", e);
            }
        });
    }

    let clients = ApiClients::new(&config).context("Failed to build HTTP client")?;
    let state = Arc::new(AppState::new(config, Box::new(clients)));

    info!("EcoBot polling started");
    platform::telegram::run(state).await?;

    Ok(())
}
