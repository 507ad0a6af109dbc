//! gqlgw server binary
//!
//! Request-batching gateway for a query-execution endpoint.
//!
//! # Usage
//!
//! ```bash
//! # With config file
//! gqlgw --config config.yaml
//!
//! # With environment variables only
//! GQLGW_GATEWAY__SCHEMA=catalog gqlgw
//! ```

use std::net::SocketAddr;

use clap::Parser;
use tokio::signal;
use tracing::{info, Level};

use gqlgw_api::http::{create_router_with_body_limit, MemoryAppState};
use gqlgw_api::observability::{init_logging, LoggingConfig};
use gqlgw_server::GatewayConfig;

/// gqlgw - Request-Batching Query Gateway
#[derive(Parser, Debug)]
#[command(name = "gqlgw")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file (YAML)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = if let Some(config_path) = args.config {
        GatewayConfig::load(&config_path)?
    } else {
        GatewayConfig::from_env()?
    };

    let log_config = LoggingConfig {
        json_format: config.logging.json,
        default_level: parse_log_level(&config.logging.level),
    };
    init_logging(log_config);

    info!(version = env!("CARGO_PKG_VERSION"), "Starting gqlgw gateway");

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;

    match config.gateway.engine.as_str() {
        "memory" => {
            info!(schema = %config.gateway.schema, "Using in-memory fixture engine");
            let state = MemoryAppState::memory(config.gateway.options());
            state.engine.add_schema(&config.gateway.schema);
            let router = create_router_with_body_limit(state, config.server.body_limit_bytes);
            run_http_server(router, addr).await
        }
        other => {
            anyhow::bail!("Unknown engine backend: {other}");
        }
    }
}

/// Run the HTTP server with graceful shutdown.
async fn run_http_server(router: axum::Router, addr: SocketAddr) -> anyhow::Result<()> {
    info!(%addr, "HTTP server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("HTTP server shutdown complete");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}

/// Parse log level from string.
fn parse_log_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}
