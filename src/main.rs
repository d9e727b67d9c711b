//! Request gate server.
//!
//! Runs the gate as a reverse proxy in front of one upstream application.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────────────┐
//!                    │                    REQUEST GATE                       │
//!   Client Request   │  ┌─────────┐   ┌──────────────┐   ┌───────────────┐  │
//!   ─────────────────┼─▶│  http   │──▶│  gate        │──▶│  authority    │──┼──▶ Authority
//!                    │  │ extract │   │  inspect()   │   │  decision     │  │    /api/check
//!                    │  └─────────┘   └──────┬───────┘   └───────────────┘  │
//!                    │                       │ not blocked                   │
//!                    │                       ▼                               │
//!                    │                ┌──────────────┐   ┌───────────────┐  │
//!                    │                │  inspection  │──▶│  authority    │──┼──▶ Authority
//!                    │                │  classify()  │   │  events (bg)  │  │    /api/log_event
//!                    │                └──────┬───────┘   └───────────────┘  │
//!                    │          allow        │        block                  │
//!   Upstream  ◀──────┼───────────────────────┴──────────────▶ 403 JSON ─────┼──▶ Client
//!                    └──────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use request_gate::config::loader::{parse_config, API_KEY_ENV};
use request_gate::config::load_config;
use request_gate::lifecycle::{signals, Shutdown};
use request_gate::observability::{logging, metrics};
use request_gate::GateServer;

#[derive(Parser)]
#[command(name = "request-gate")]
#[command(about = "Per-request security gate in front of a web application", long_about = None)]
struct Args {
    /// Path to the TOML configuration file. Defaults are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => parse_config("", std::env::var(API_KEY_ENV).ok())?,
    };

    logging::init_logging(&config.observability);
    tracing::info!("request-gate v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.address,
        authority = %config.authority.base_url,
        decision_timeout_ms = config.authority.decision_timeout_ms,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let server = GateServer::new(config.clone())?;

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(shutdown.clone());
    server.run(listener, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
