//! DataMirror Server - Main entry point

use anyhow::Result;
use axum::Router;
use mirror_common::logging::{init_logging, LogConfig};
use mirror_core::{FileCheckpointStore, JobStore, SyncConfig, SyncEngine};
use mirror_server::{features, AppState, ServerConfig};
use std::sync::Arc;
use tokio::signal;
use tower_http::trace::TraceLayer;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Environment variables from .env take effect before config loading
    dotenvy::dotenv().ok();

    // Initialize logging; environment variables take precedence
    let log_config = LogConfig::from_env().unwrap_or_else(|_| {
        LogConfig::default()
            .with_file_prefix("mirror-server")
            .with_filter_directives("mirror_server=debug,tower_http=debug")
    });
    init_logging(&log_config)?;

    info!("Starting DataMirror server");

    let server_config = ServerConfig::from_env()?;
    let sync_config = SyncConfig::from_env()?;

    let checkpoints = Arc::new(FileCheckpointStore::new(&sync_config.checkpoint_dir)?);
    info!(
        dir = %sync_config.checkpoint_dir.display(),
        "Checkpoint store initialized"
    );

    let engine = Arc::new(SyncEngine::new(
        Arc::new(JobStore::new()),
        checkpoints,
        sync_config,
    ));
    let state = AppState::new(engine);

    let app = Router::new()
        .nest("/api", features::sync::sync_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = server_config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Resolve when a shutdown signal arrives
async fn shutdown_signal() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => tracing::error!(error = %e, "Failed to listen for shutdown signal"),
    }
}
