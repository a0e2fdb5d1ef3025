//! DevSkill Tracker · practice backend with behavioral AI detection
//!
//! - Axum HTTP + WebSocket API for the IDE extension and dashboard
//! - Eight-signal behavioral scorer over session telemetry (`detection`)
//! - Quest catalog: built-in bank, TOML config quests, optional remote bank
//!
//! Important env variables:
//!   PORT            : u16 (default 8000)
//!   APP_CONFIG_PATH : path to TOML config (burst parameters, quests, users)
//!   QUEST_BANK_URL  : enables the remote quest source if present
//!   LOG_LEVEL       : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT      : "pretty" (default) or "json"

mod telemetry;
mod util;
mod error;
mod domain;
mod config;
mod seeds;
mod detection;
mod bursts;
mod catalog;
mod validator;
mod skill;
mod tips;
mod remote;
mod state;
mod protocol;
mod logic;
mod routes;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, warn, instrument};

use crate::routes::build_router;
use crate::state::AppState;

#[instrument(level = "info", skip_all)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Build shared application state (in-memory stores, quest catalog, remote source).
  let state = Arc::new(AppState::new());

  // Prime the remote layer once; a failure leaves the built-in bank serving.
  if state.quest_source.is_some() {
    if let Err(e) = logic::reload_remote_quests(&state).await {
      warn!(target: "devskill_backend", error = %e, "Initial remote quest fetch failed.");
    }
  }

  let app = build_router(state.clone());

  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 8000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "devskill_backend", %addr, "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await?;
  info!(target: "devskill_backend", "Server stopped");
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    warn!(target: "devskill_backend", error = %e, "Failed to listen for ctrl-c");
    std::future::pending::<()>().await;
  }
  info!(target: "devskill_backend", "Shutdown signal received");
}
