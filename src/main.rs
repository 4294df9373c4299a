//! Assessment Service Backend
//!
//! - Axum HTTP API: problem catalog CRUD + assessment generation
//! - Plan builder (topics, difficulty mix, question count) and problem selector
//!   (tier counts, shuffled picking, back-fill, time-budget trimming)
//!
//! Important env variables:
//!   PORT                   : u16 (default 8000)
//!   ASSESSMENT_CONFIG_PATH : path to TOML config (planner, catalog, selection, server)
//!   PROBLEM_CATALOG_PATH   : JSON problem file; in-memory seeded catalog if unset
//!   SELECTION_SEED         : u64, makes selection reproducible
//!   LOG_LEVEL              : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT             : "pretty" (default) or "json"

mod telemetry;
mod domain;
mod error;
mod config;
mod seeds;
mod catalog;
mod planner;
mod selector;
mod state;
mod protocol;
mod logic;
mod routes;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, instrument};

use crate::config::resolve_config;
use crate::routes::build_router;
use crate::state::AppState;

#[instrument(level = "info", skip_all)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  let cfg = resolve_config();

  // Shared application state (catalog, planner tuning, RNG policy).
  let state = Arc::new(AppState::new(&cfg)?);

  let app = build_router(state, &cfg.server.allow_origins);

  let addr = SocketAddr::from(([0, 0, 0, 0], cfg.server.port));
  let listener = TcpListener::bind(addr).await?;
  info!(target: "assessment_backend", %addr, "HTTP server listening");
  axum::serve(listener, app).await?;
  Ok(())
}
