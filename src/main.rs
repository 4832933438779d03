//! Mission: Possible · Agent Training Backend
//!
//! - Axum WebSocket session API (login, missions, drills, dossier feedback)
//! - Read-only HTTP API (missions, leaderboard, health)
//! - Optional OpenAI-compatible feedback (via environment variables)
//! - Static SPA fallback (./static/index.html)
//!
//! Important env variables:
//!   PORT                : u16 (default 3000)
//!   OPENAI_API_KEY      : enables dossier feedback if present
//!   OPENAI_BASE_URL     : default "https://api.openai.com/v1"
//!   OPENAI_MODEL        : default "gpt-4o-mini"
//!   MISSION_CONFIG_PATH : path to TOML config (teacher passphrase + mission catalog)
//!   TEACHER_PASSPHRASE  : overrides the teacher passphrase
//!   LOG_LEVEL           : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT          : "pretty" (default) or "json"

mod telemetry;
mod domain;
mod config;
mod seeds;
mod catalog;
mod identity;
mod leaderboard;
mod progress;
mod authoring;
mod session;
mod state;
mod protocol;
mod logic;
mod feedback;
mod routes;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Shared stores (catalog, leaderboard), identity gate and feedback client.
  let state = Arc::new(AppState::new());

  let app = build_router(state);

  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "mission_possible", %addr, "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;
  info!(target: "mission_possible", "Server stopped; missions and leaderboard discarded");
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    warn!(target: "mission_possible", error = %e, "Failed to listen for Ctrl+C; running until killed");
    std::future::pending::<()>().await;
  }
}
