use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};

use file_gateway::config::{Config, StorageBackend};
use file_gateway::routes::build_router;
use file_gateway::storage::{MemoryStore, ObjectStore, S3Store};
use file_gateway::AppState;
use shared::observability::{init_default_logging, init_logging, LogConfig};

const SERVICE_NAME: &str = "file-gateway";

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    match LogConfig::from_env(SERVICE_NAME) {
        Ok(log_config) => init_logging(log_config)?,
        Err(e) => {
            init_default_logging(SERVICE_NAME)?;
            warn!("Ignoring logging configuration: {}", e);
        }
    }

    info!("Starting File Gateway...");

    let config = Config::from_env().context("Failed to load configuration")?;
    info!(
        public_base_url = %config.server.public_base_url,
        root = %config.routes.list_path(),
        backend = ?config.storage.backend,
        "Configuration loaded successfully"
    );

    let store: Arc<dyn ObjectStore> = match config.storage.backend {
        StorageBackend::S3 => Arc::new(S3Store::new(&config.storage.s3).await),
        StorageBackend::Memory => {
            warn!("Using in-memory storage, files are lost on restart");
            Arc::new(MemoryStore::new())
        }
    };
    info!("Storage client initialized successfully");

    let state = AppState::new(store, &config)?;
    if !state.files.storage_healthy().await {
        warn!("Storage backend is not reachable yet, requests will fail until it is");
    }

    let app = build_router(state, &config.routes);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("File Gateway listening on {}", addr);

    // Run the server
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("File Gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
