//! Portfolio site server.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http::server (request id, trace, timeout, body limit, headers)
//!                          │
//!                          ├─▶ /api/content ─▶ security (rate limit)
//!                          │                   ─▶ auth (session, live allowlist)
//!                          │                   ─▶ content (validate, sanitize, store)
//!                          ├─▶ /auth/*      ─▶ auth (OAuth sign-in, session cookie)
//!                          ├─▶ /admin/*     ─▶ admin gate ─▶ admin handlers
//!                          └─▶ /sitemap.xml, /api/status
//!
//!     Cross-cutting: config (TOML + env + hot reload), observability
//!     (tracing, Prometheus), lifecycle (signals, graceful shutdown)
//! ```

use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use portfolio_server::config::{load_or_default, watcher::ConfigWatcher};
use portfolio_server::observability::{init_logging, init_metrics};
use portfolio_server::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "portfolio-server")]
#[command(about = "Portfolio site API server", long_about = None)]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(short, long, env = "PORTFOLIO_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_or_default(args.config.as_deref())?;

    init_logging(&config.observability.log_level);
    tracing::info!("portfolio-server v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        storage = ?config.storage.backend,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let server = HttpServer::new(config);

    // Held for the lifetime of the server; dropping it stops reloads.
    let (_watcher, config_updates) = match &args.config {
        Some(path) => match ConfigWatcher::spawn(path) {
            Ok((watcher, updates)) => (Some(watcher), updates),
            Err(e) => {
                tracing::warn!(error = %e, "Config hot reload disabled");
                (None, mpsc::unbounded_channel().1)
            }
        },
        None => (None, mpsc::unbounded_channel().1),
    };

    let shutdown = Shutdown::new();
    shutdown.trigger_on_signal();
    server.run(listener, config_updates, shutdown.subscribe()).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
