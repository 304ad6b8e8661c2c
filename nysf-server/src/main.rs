//! nysf-server - festival data collection and reporting service
//!
//! Serves the submission API, the sports participation matrix reports, the
//! dashboard and the advisory division analysis.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use nysf_common::config::{ConfigOverrides, ServiceConfig};
use nysf_common::db::init_database;
use nysf_server::analysis::AnalysisClient;
use nysf_server::{build_router, AppState};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for nysf-server
#[derive(Parser, Debug)]
#[command(name = "nysf-server")]
#[command(about = "National Youth Sports Festival data collection service")]
#[command(version)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "NYSF_CONFIG")]
    config: Option<PathBuf>,

    /// Address to bind
    #[arg(long, env = "NYSF_BIND_ADDRESS")]
    bind_address: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "NYSF_PORT")]
    port: Option<u16>,

    /// SQLite database file
    #[arg(long, env = "NYSF_DATABASE_PATH")]
    database_path: Option<PathBuf>,

    /// Default log level when RUST_LOG is unset
    #[arg(long, env = "NYSF_LOG_LEVEL")]
    log_level: Option<String>,

    /// Base URL of the analysis service
    #[arg(long, env = "NYSF_ANALYSIS_URL")]
    analysis_url: Option<String>,

    /// Model name sent to the analysis service
    #[arg(long, env = "NYSF_ANALYSIS_MODEL")]
    analysis_model: Option<String>,
}

impl From<Args> for ConfigOverrides {
    fn from(args: Args) -> Self {
        ConfigOverrides {
            config_path: args.config,
            bind_address: args.bind_address,
            port: args.port,
            database_path: args.database_path,
            log_level: args.log_level,
            analysis_url: args.analysis_url,
            analysis_model: args.analysis_model,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Resolved before tracing starts so the configured level can seed the filter
    let config = ServiceConfig::resolve(args.into()).context("Failed to resolve configuration")?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting nysf-server v{} on {}:{}",
        env!("CARGO_PKG_VERSION"),
        config.bind_address,
        config.port
    );
    info!("Database path: {}", config.database_path.display());

    let pool = init_database(&config.database_path)
        .await
        .context("Failed to initialize database")?;

    let analysis =
        AnalysisClient::new(&config.analysis).context("Failed to build analysis client")?;
    if analysis.is_available().await {
        info!("Analysis service reachable at {}", analysis.base_url());
    } else {
        warn!(
            "Analysis service not reachable at {}; division analysis will report unavailable",
            analysis.base_url()
        );
    }

    let addr: SocketAddr = format!("{}:{}", config.bind_address, config.port)
        .parse()
        .context("Invalid bind address")?;

    let app = build_router(AppState::new(pool, analysis, config));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("nysf-server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
