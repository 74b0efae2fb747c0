//! Keep-alive HTTP Listener
//!
//! Minimal `axum` app answering `200 OK` on `/` so free-tier hosting keeps
//! the process warm. No other API surface belongs here.

use axum::{routing::get, Router};
use std::net::SocketAddr;
use tokio::net::TcpListener;

pub fn app() -> Router {
    Router::new().route("/", get(|| async { "OK" }))
}

/// Bind and serve until the process exits.
pub async fn run(port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Keep-alive listener on port {}", port);
    axum::serve(listener, app()).await?;
    Ok(())
}
