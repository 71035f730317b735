//! Paydesk API server.
//!
//! ```bash
//! # Start with default settings
//! paydesk
//!
//! # Start with a config file and an environment override
//! PAYDESK__SERVER__PORT=8080 paydesk --config paydesk.toml
//! ```

use std::sync::Arc;

use clap::Parser;
use tokio::signal;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use paydesk::api::{create_router, AppState};
use paydesk::config::{AppConfig, LoggingConfig};
use paydesk::seed::seed_demo_data;
use paydesk::Engine;

/// Paydesk API server
#[derive(Parser, Debug)]
#[command(name = "paydesk")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (TOML, JSON, or YAML)
    #[arg(short, long, env = "PAYDESK_CONFIG")]
    config: Option<String>,

    /// Host to bind to
    #[arg(long, env = "PAYDESK_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "PAYDESK_PORT")]
    port: Option<u16>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "PAYDESK_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format (json, pretty)
    #[arg(long, env = "PAYDESK_LOG_FORMAT")]
    log_format: Option<String>,

    /// Load demo transfers and employees
    #[arg(long, env = "PAYDESK_SEED")]
    seed: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = AppConfig::load(args.config.as_deref())?;
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(level) = args.log_level {
        config.logging.level = level;
    }
    if let Some(format) = args.log_format {
        config.logging.format = format;
    }
    config.seed_demo_data |= args.seed;

    init_logging(&config.logging);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting Paydesk");

    let mut engine = Engine::new(config.engine_config());
    if config.seed_demo_data {
        seed_demo_data(&mut engine)?;
    }

    let state = Arc::new(AppState::new(engine, config.identity.clone()));
    let app = create_router(state, &config.server.api_prefix);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, prefix = %config.server.api_prefix, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

fn init_logging(config: &LoggingConfig) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let subscriber = tracing_subscriber::registry().with(env_filter);

    match config.format.as_str() {
        "json" => subscriber
            .with(fmt::layer().json().with_target(true))
            .init(),
        _ => subscriber
            .with(fmt::layer().pretty().with_target(true))
            .init(),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        _ = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
