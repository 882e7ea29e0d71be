//! Simulation control endpoints: status, start/stop, config, snapshot.
//!
//! Start and stop mutate the shared clock and write the corresponding
//! durable session record before broadcasting the lifecycle event to all
//! connected subscribers. Unlike the tick loop's fire-and-forget sample
//! writes, these session writes are awaited: a control request that
//! cannot record its session reports the failure to the caller.

use axum::Json;
use axum::extract::State;
use axum::response::{Html, IntoResponse};
use chrono::Utc;
use physim_db::SessionStore;
use physim_types::{Sample, SimulationConfig, SimulationStatus, StreamEvent};
use tracing::info;

use crate::error::ObserverError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// GET / -- minimal HTML status page
// ---------------------------------------------------------------------------

/// Serve a minimal HTML page showing server status and API links.
pub async fn index(State(state): State<AppState>) -> impl IntoResponse {
    let status = state.clock.status(state.registry.count());
    let running = if status.running { "RUNNING" } else { "IDLE" };
    let iteration = status.current_iteration;
    let connected = status.connected_clients;

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>physim</title>
    <style>
        body {{
            background: #0d1117;
            color: #c9d1d9;
            font-family: 'Fira Code', 'Consolas', monospace;
            padding: 2rem;
            max-width: 720px;
            margin: 0 auto;
        }}
        h1 {{ color: #58a6ff; margin-bottom: 0.25rem; }}
        .metric {{
            display: inline-block;
            background: #161b22;
            border: 1px solid #30363d;
            border-radius: 6px;
            padding: 1rem 1.5rem;
            margin: 0.5rem 0.5rem 0.5rem 0;
            min-width: 120px;
        }}
        .metric .label {{ color: #8b949e; font-size: 0.85rem; }}
        .metric .value {{ color: #58a6ff; font-size: 1.5rem; font-weight: bold; }}
        a {{ color: #58a6ff; text-decoration: none; }}
        ul {{ list-style: none; padding: 0; }}
        li {{ padding: 0.3rem 0; }}
    </style>
</head>
<body>
    <h1>physim</h1>
    <p>Real-time physical simulation stream</p>

    <div>
        <div class="metric">
            <div class="label">State</div>
            <div class="value">{running}</div>
        </div>
        <div class="metric">
            <div class="label">Iteration</div>
            <div class="value">{iteration}</div>
        </div>
        <div class="metric">
            <div class="label">Subscribers</div>
            <div class="value">{connected}</div>
        </div>
    </div>

    <h2>API</h2>
    <ul>
        <li><a href="/api/simulation/status">/api/simulation/status</a> -- run state snapshot</li>
        <li><a href="/api/simulation/config">/api/simulation/config</a> -- generator tuning</li>
        <li><a href="/api/simulation/snapshot">/api/simulation/snapshot</a> -- on-demand sample</li>
        <li><a href="/api/history">/api/history</a> -- recorded sessions</li>
        <li><a href="/api/history/range">/api/history/range</a> -- samples by time range</li>
        <li><code>ws://host:port/ws/stream</code> -- live sample stream</li>
    </ul>
</body>
</html>"#
    ))
}

// ---------------------------------------------------------------------------
// GET /api/simulation/status
// ---------------------------------------------------------------------------

/// Return the current run state snapshot, including the number of
/// connected real-time subscribers.
pub async fn get_status(State(state): State<AppState>) -> Json<SimulationStatus> {
    Json(state.clock.status(state.registry.count()))
}

// ---------------------------------------------------------------------------
// POST /api/simulation/start
// ---------------------------------------------------------------------------

/// Start a new session and return its identifier.
///
/// Starting while a session is active replaces the in-memory session;
/// the previous durable record is left open (the caller may end it first
/// via the stop endpoint).
pub async fn start_simulation(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ObserverError> {
    let session_id = state.clock.start();
    info!(session = %session_id, "simulation started via API");

    SessionStore::new(state.pool.pool())
        .create_session(session_id, Utc::now())
        .await?;

    let _ = state.registry.broadcast(&StreamEvent::SessionStarted {
        session_id: Some(session_id),
    });

    Ok(Json(serde_json::json!({
        "message": "Simulation started successfully",
        "session_id": session_id,
    })))
}

// ---------------------------------------------------------------------------
// POST /api/simulation/stop
// ---------------------------------------------------------------------------

/// Stop the current session.
///
/// The final iteration count is read before the clock is stopped (stop
/// does not reset the counter) and written into the durable record.
/// Stopping while idle is a no-op that still broadcasts the lifecycle
/// event, mirroring the clock's own tolerance for redundant stops.
pub async fn stop_simulation(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ObserverError> {
    let iterations = state.clock.current_iteration();
    let stopped = state.clock.stop();
    info!("simulation stopped via API");

    if let Some(session_id) = stopped {
        SessionStore::new(state.pool.pool())
            .end_session(session_id, Utc::now(), iterations)
            .await?;
    }

    let _ = state.registry.broadcast(&StreamEvent::SessionStopped);

    Ok(Json(serde_json::json!({
        "message": "Simulation stopped successfully",
    })))
}

// ---------------------------------------------------------------------------
// GET /api/simulation/config
// ---------------------------------------------------------------------------

/// Return the live generator configuration.
pub async fn get_config(State(state): State<AppState>) -> Json<SimulationConfig> {
    Json(state.clock.config())
}

// ---------------------------------------------------------------------------
// PUT /api/simulation/config
// ---------------------------------------------------------------------------

/// Replace the generator configuration wholesale.
///
/// Takes effect from the next tick. Bounds are not cross-validated;
/// inverted bounds produce out-of-band readings rather than an error.
pub async fn update_config(
    State(state): State<AppState>,
    Json(config): Json<SimulationConfig>,
) -> impl IntoResponse {
    state.clock.update_config(config);
    info!("simulation configuration updated");

    Json(serde_json::json!({
        "message": "Configuration updated successfully",
    }))
}

// ---------------------------------------------------------------------------
// GET /api/simulation/snapshot
// ---------------------------------------------------------------------------

/// Generate one on-demand sample outside the tick cadence.
///
/// The sample consumes an iteration number exactly like a ticked sample
/// (the clock serializes the two paths), so snapshots interleave into
/// the session's sequence. Returns 400 when the clock is idle.
pub async fn get_snapshot(
    State(state): State<AppState>,
) -> Result<Json<Sample>, ObserverError> {
    state
        .clock
        .generate_sample()
        .map(Json)
        .ok_or(ObserverError::NotRunning)
}
