//! Equation Adventure · word-problem trainer for linear equations
//!
//! - Axum HTTP + WebSocket API (one game session per WebSocket connection)
//! - Procedural problem generator with per-session deduplication
//! - Optional AI tutor (via environment variables)
//! - Static SPA fallback (./static/index.html)
//!
//! Important env variables:
//!   PORT             : u16 (default 3000)
//!   GAME_CONFIG_PATH : path to TOML config (game tuning + tutor prompt)
//!   TUTOR_API_KEY    : enables the AI tutor if present
//!   TUTOR_BASE_URL   : default "https://api.deepseek.com/v1"
//!   TUTOR_MODEL      : default "deepseek-chat"
//!   LOG_LEVEL        : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT       : "pretty" (default) or "json"

mod telemetry;
mod util;
mod domain;
mod error;
mod config;
mod expr;
mod check;
mod locale;
mod seeds;
mod templates;
mod generator;
mod session;
mod tutor;
mod state;
mod protocol;
mod logic;
mod routes;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, instrument};

use crate::routes::build_router;
use crate::state::AppState;

#[instrument(level = "info", skip_all)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Shared state: config, tutor client, problem store.
  let state = Arc::new(AppState::new());

  let app = build_router(state.clone());

  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "equation_adventure", %addr, "HTTP server listening");
  axum::serve(listener, app).await?;
  Ok(())
}
