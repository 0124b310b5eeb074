//! Application builder. Wires infrastructure, state and router together
//! and runs the HTTP server.

use std::time::Duration;

use axum::Router;

use drivehub_core::config::AppConfig;
use drivehub_core::error::AppError;
use drivehub_core::result::AppResult;
use drivehub_database::DatabasePool;
use drivehub_storage::{ReleaseQueue, StorageManager};

use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    build_router(state)
}

/// Runs the DriveHub server until Ctrl+C, then drains pending blob
/// releases within the configured grace period.
pub async fn run_server(config: AppConfig) -> AppResult<()> {
    tracing::info!("Starting DriveHub server...");

    // ── Step 1: Database ─────────────────────────────────────────
    let db = DatabasePool::connect(&config.database).await?;

    // ── Step 2: Blob store ───────────────────────────────────────
    let storage = StorageManager::from_config(&config.storage).await?;
    tracing::info!(provider = storage.provider_type(), "Blob store ready");

    // ── Step 3: Release worker ───────────────────────────────────
    let (releases, worker) = ReleaseQueue::spawn(storage.clone(), &config.storage.release);

    // ── Step 4: Services and router ──────────────────────────────
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    let state = AppState::new(config, db.clone(), storage, releases.clone());
    let app = build_app(state);

    // ── Step 5: Serve ────────────────────────────────────────────
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!("DriveHub server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    // ── Step 6: Drain ────────────────────────────────────────────
    tracing::info!("Shutting down, draining blob releases...");
    if tokio::time::timeout(grace, releases.flush()).await.is_err() {
        tracing::warn!(
            grace_seconds = grace.as_secs(),
            "Blob releases still pending at shutdown"
        );
    }
    drop(releases);
    worker.abort();
    db.close().await;

    tracing::info!("DriveHub server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for Ctrl+C; shutting down");
    }
}
