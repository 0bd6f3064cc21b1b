use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use subway_admin::config::ServerConfig;
use subway_admin::store::{SnapshotFile, SubwayStore};
use subway_admin::web::{AppState, create_router};

/// Log filter used when `RUST_LOG` is unset.
const DEFAULT_LOG_FILTER: &str = "subway_admin=info,tower_http=info";

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::from_env()?;

    let store = match &config.snapshot_path {
        Some(path) => SubwayStore::open(SnapshotFile::new(path))?,
        None => {
            info!("no snapshot path configured, records are kept in memory only");
            SubwayStore::in_memory()
        }
    };

    let app = create_router(AppState::new(store));

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!(addr = %config.bind_addr, "subway admin listening");
    info!("API Endpoints:");
    info!("  GET/POST        /stations");
    info!("  DELETE          /stations/:id");
    info!("  GET/POST        /lines");
    info!("  GET/PUT/DELETE  /lines/:id");
    info!("  GET/POST        /lines/:id/stations");
    info!("  DELETE          /lines/:id/stations/:station_id");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("shut down");
    Ok(())
}

/// Resolves on Ctrl-C.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
}
