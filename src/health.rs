//! Liveness endpoint for hosting platforms that expect an HTTP port.
//! Independent of the bot: it answers 200 as long as the process runs.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::{http::StatusCode, routing::get, Router};
use tokio::net::TcpListener;
use tracing::info;

async fn home() -> (StatusCode, &'static str) {
    (StatusCode::OK, "EcoBot rodando!")
}

async fn health() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}

pub fn router() -> Router {
    Router::new()
        .route("/", get(home))
        .route("/health", get(health))
}

pub async fn serve(port: u16) -> Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind health endpoint to {addr}"))?;

    info!("Health endpoint listening on http://{}", addr);

    axum::serve(listener, router())
        .await
        .context("Health server error")?;
    Ok(())
}
