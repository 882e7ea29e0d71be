//! Observer server startup helper for embedding in the engine binary.
//!
//! Provides [`spawn_server`] which launches the observer HTTP +
//! `WebSocket` server on a background Tokio task, so it runs
//! concurrently with the tick loop and winds down with the same
//! shutdown token.

use std::sync::Arc;

use physim_core::ShutdownToken;
use tokio::task::JoinHandle;

use crate::server::{ServerConfig, ServerError, start_server};
use crate::state::AppState;

/// Errors that can occur when spawning the observer server.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// The server failed to bind or start.
    #[error("server start error: {0}")]
    Server(#[from] ServerError),
}

/// Spawn the observer HTTP server on a background Tokio task.
///
/// The server runs until the shutdown token is cancelled (or the task
/// is aborted); the caller should hold the returned handle and await it
/// during clean shutdown, bounding the wait since open `WebSocket`
/// connections can outlast the grace period.
///
/// # Errors
///
/// Returns [`StartupError::Server`] for an address that cannot even be
/// parsed. A bind failure surfaces from the background task's log,
/// since the actual bind happens there.
pub fn spawn_server(
    config: ServerConfig,
    state: AppState,
    shutdown: Arc<ShutdownToken>,
) -> Result<JoinHandle<()>, StartupError> {
    // Catch obvious misconfigurations before spawning; the actual bind
    // happens inside start_server.
    let addr_str = format!("{}:{}", config.host, config.port);
    let _: std::net::SocketAddr = addr_str.parse().map_err(|e| {
        StartupError::Server(ServerError::Bind(format!("invalid address {addr_str}: {e}")))
    })?;

    let handle = tokio::spawn(async move {
        if let Err(e) = start_server(&config, state, shutdown).await {
            tracing::error!(error = %e, "observer server exited with error");
        }
    });

    tracing::info!("observer server spawned on background task");

    Ok(handle)
}
