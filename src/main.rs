//! MCQ Extract · HTTP extraction service
//!
//! - Axum HTTP API over the extraction pipeline
//! - Extractor markers/terminators from an optional TOML file
//!
//! Important env variables:
//!   PORT                : u16 (default 3000)
//!   EXTRACT_CONFIG_PATH : path to TOML config (`[extractor]` section is used here)
//!   LOG_LEVEL           : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT          : "pretty" (default) or "json"

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, warn};

use mcq_extract::routes::build_router;
use mcq_extract::state::AppState;
use mcq_extract::telemetry;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Compile the extractor once; a bad marker config stops startup here.
  let state = Arc::new(AppState::from_env()?);

  // Build the HTTP router with routes, CORS and tracing layers.
  let app = build_router(state.clone());

  // Read port from env or default to 3000.
  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "mcq_extract", %addr, "HTTP server listening");
  axum::serve(listener, app)
    .with_graceful_shutdown(async {
      if tokio::signal::ctrl_c().await.is_ok() {
        warn!(target: "mcq_extract", "Shutdown signal received");
      }
    })
    .await?;
  Ok(())
}
