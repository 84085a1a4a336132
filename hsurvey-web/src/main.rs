//! hsurvey-web - Household survey intake and analysis service
//!
//! Serves the intake form, stores responses in the primary database (or the
//! fallback CSV file) and renders the analysis page.

use anyhow::{Context, Result};
use clap::Parser;
use hsurvey_common::config::{ConfigOverrides, ServiceConfig, TomlConfig};
use hsurvey_web::store::TieredStore;
use hsurvey_web::{build_router, AppState};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tracing::info;

/// Command-line arguments for hsurvey-web
#[derive(Parser, Debug)]
#[command(name = "hsurvey-web")]
#[command(about = "Household income/expense survey service")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "HSURVEY_PORT")]
    port: Option<u16>,

    /// Address to bind
    #[arg(short, long, env = "HSURVEY_BIND")]
    bind: Option<String>,

    /// Directory for the fallback CSV file (overrides HSURVEY_DATA_DIR)
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Primary database connection string (overrides HSURVEY_DATABASE_URL)
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let toml_config = TomlConfig::load();

    let default_level = toml_config.log_level.clone().unwrap_or_else(|| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    info!("Starting hsurvey-web v{}", env!("CARGO_PKG_VERSION"));

    let config = ServiceConfig::resolve(
        ConfigOverrides {
            data_dir: args.data_dir,
            database_url: args.database_url,
            bind: args.bind,
            port: args.port,
        },
        &toml_config,
    );

    config
        .ensure_data_dir()
        .context("Failed to create data directory")?;
    info!("Data directory: {}", config.data_dir.display());

    let store = Arc::new(TieredStore::open(config.database_url.as_deref(), config.fallback_file()).await);
    info!("Store mode: {:?}", store.mode());

    let app = build_router(AppState::new(store.clone()));

    let addr = format!("{}:{}", config.bind, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("hsurvey-web listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    store.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
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
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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
