//! `ciphra` — service binary entry point.
//!
//! Startup sequence:
//! 1. Load and validate [`Config`] from environment variables.
//! 2. Initialise the telemetry pipeline.
//! 3. Start the idle-session sweeper, build the Axum router, and serve HTTP.

use anyhow::{Context, Result};
use tracing::info;

use ciphra::config::Config;
use ciphra::server::{
    self,
    state::{self, AppState},
};
use ciphra::telemetry;

#[tokio::main]
async fn main() -> Result<()> {
    // -----------------------------------------------------------------------
    // 1. Configuration
    // -----------------------------------------------------------------------
    let cfg = Config::from_env().map_err(|e| {
        // Telemetry is not yet up; write to stderr directly.
        eprintln!("ERROR: configuration invalid: {e:#}");
        e
    })?;

    // -----------------------------------------------------------------------
    // 2. Telemetry
    // -----------------------------------------------------------------------
    telemetry::init_telemetry(cfg.otlp_endpoint(), &cfg.log_level)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        listen_port = cfg.listen_port,
        max_sessions = cfg.max_sessions,
        session_idle_ttl_secs = cfg.session_idle_ttl_secs,
        "ciphra starting"
    );

    // -----------------------------------------------------------------------
    // 3. HTTP server
    // -----------------------------------------------------------------------
    let state = AppState::with_idle_ttl(
        cfg.max_sessions,
        cfg.preselect_recommended,
        cfg.session_idle_ttl(),
    );
    let _sweeper = state::eviction_task(state.sessions.clone(), cfg.session_sweep_interval());
    let router = server::router::build(state);

    let addr: std::net::SocketAddr = ([0, 0, 0, 0], cfg.listen_port).into();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(addr = %addr, "listening");

    axum::serve(listener, router).await?;

    Ok(())
}
