use std::net::SocketAddr;
use std::time::Duration;

use clap::Parser;
use tokio::signal;
use tracing::{info, Level};
use tracing_subscriber;

use turnpike::config::TurnpikeConfig;
use turnpike::http::{HttpServer, RateGate};
use turnpike::ratelimit::{build_policy, start_sweeper};

#[derive(Parser, Debug)]
#[command(name = "turnpike")]
#[command(about = "Per-client HTTP rate limiting service")]
struct Args {
    /// Path to a YAML configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Override the configured listen address
    #[arg(short, long)]
    listen_addr: Option<SocketAddr>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(Level::INFO)
        .with_target(false)
        .with_thread_ids(true)
        .init();

    info!("Starting Turnpike Rate Limiting Service");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();

    // Load configuration, falling back to documented defaults
    let mut config = match args.config {
        Some(path) => TurnpikeConfig::from_file(&path)?,
        None => TurnpikeConfig::default(),
    };
    if let Some(addr) = args.listen_addr {
        config.server.listen_addr = addr;
    }
    config.validate()?;
    info!(
        listen_addr = %config.server.listen_addr,
        policy = ?config.limiter.policy,
        window_ms = config.limiter.window_ms,
        max = config.limiter.max,
        "Configuration loaded"
    );

    // Initialize the admission policy
    let policy = build_policy(&config.limiter);
    info!("Rate limiter initialized");

    // Background eviction keeps the key map bounded
    let sweeper = start_sweeper(
        policy.clone(),
        Duration::from_secs(config.limiter.sweep_interval_secs),
    );

    // Create and start the HTTP server
    let server = HttpServer::new(config.server.listen_addr, RateGate::new(policy));

    // Run the server with graceful shutdown on Ctrl+C
    server.serve_with_shutdown(shutdown_signal()).await?;

    sweeper.abort();
    info!("Turnpike Rate Limiting Service stopped");
    Ok(())
}

/// Wait for a shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
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
