//! Engine binary for the physim streaming service.
//!
//! Wires together the simulation clock, the background tick loop, the
//! history-writer worker, and the observer API server, then runs until
//! Ctrl-C.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `physim-config.yaml` (defaults if absent)
//! 2. Initialize structured logging (tracing)
//! 3. Open the `SQLite` history store and run migrations
//! 4. Create the simulation clock, subscriber registry, shutdown token
//! 5. Spawn the history-writer worker on its bounded work queue
//! 6. Spawn the observer HTTP + `WebSocket` server
//! 7. Run the tick loop until Ctrl-C cancels the shutdown token
//! 8. Drain the writer, close the pool, exit

mod error;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use physim_core::config::AppConfig;
use physim_core::{ShutdownToken, SimulationClock, SubscriberRegistry, run_stream_loop};
use physim_db::{HistoryPool, SqliteConfig, persist_channel, spawn_history_writer};
use physim_observer::{AppState, ServerConfig, spawn_server};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;

/// How long shutdown waits for the history writer to drain its queue.
const WRITER_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// How long shutdown waits for the observer server to wind down.
const SERVER_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Application entry point for the engine.
///
/// # Errors
///
/// Returns an error if any initialization step fails; the run itself
/// only ends through Ctrl-C.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let config_path = std::env::var("PHYSIM_CONFIG")
        .unwrap_or_else(|_| String::from("physim-config.yaml"));
    let config =
        AppConfig::from_file_or_default(Path::new(&config_path)).map_err(EngineError::Config)?;

    // 2. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.logging.filter.clone())),
        )
        .with_target(true)
        .init();

    info!(
        config_path = config_path.as_str(),
        tick_interval_ms = config.simulation.update_interval_ms,
        "physim-engine starting"
    );

    // 3. Open the history store.
    let db_config = SqliteConfig::new(&config.database.url)
        .with_max_connections(config.database.max_connections);
    let pool = HistoryPool::connect(&db_config)
        .await
        .map_err(EngineError::Database)?;
    pool.run_migrations().await.map_err(EngineError::Database)?;

    // 4. Create the shared core state.
    let clock = Arc::new(SimulationClock::new(config.simulation.clone()));
    let registry = Arc::new(SubscriberRegistry::new());
    let shutdown = Arc::new(ShutdownToken::new());

    // 5. Spawn the history writer.
    let (persist_tx, persist_rx) = persist_channel();
    let writer_handle = spawn_history_writer(pool.clone(), persist_rx);

    // 6. Spawn the observer server.
    let app_state = AppState::new(Arc::clone(&clock), Arc::clone(&registry), pool.clone());
    let server_config = ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
    };
    let server_handle = spawn_server(server_config, app_state, Arc::clone(&shutdown))
        .map_err(EngineError::Observer)?;
    info!(
        host = config.server.host.as_str(),
        port = config.server.port,
        "observer server started"
    );

    // 7. Cancel the shutdown token on Ctrl-C.
    {
        let shutdown = Arc::clone(&shutdown);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Ctrl-C received, shutting down");
                shutdown.cancel();
            }
        });
    }

    // 8. Run the tick loop to completion. Its final act enqueues the
    //    session-end write, so the writer must drain after this returns.
    run_stream_loop(clock, registry, persist_tx, Arc::clone(&shutdown)).await;

    // 9. Orderly shutdown: wait for the server to wind down (open
    //    WebSocket connections can outlast the grace period, so the wait
    //    is bounded), let the writer drain the queue, then close the pool.
    let mut server_handle = server_handle;
    if tokio::time::timeout(SERVER_SHUTDOWN_TIMEOUT, &mut server_handle)
        .await
        .is_err()
    {
        warn!("observer server did not shut down in time, aborting");
        server_handle.abort();
    }
    match tokio::time::timeout(WRITER_DRAIN_TIMEOUT, writer_handle).await {
        Ok(Ok(())) => {}
        Ok(Err(err)) => warn!(error = %err, "history writer task failed"),
        Err(_) => warn!("history writer did not drain in time"),
    }
    pool.close().await;

    info!("physim-engine stopped");
    Ok(())
}
