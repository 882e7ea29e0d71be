//! Axum router construction for the observer API.
//!
//! Assembles all routes (REST + `WebSocket`) into a single [`Router`]
//! with CORS middleware enabled for cross-origin dashboard access.

use axum::Router;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{control, history, ws};

/// Build the complete Axum router for the observer server.
///
/// The router includes:
/// - `GET /` -- minimal HTML status page
/// - `GET /ws/stream` -- `WebSocket` sample stream
/// - `GET /api/simulation/status` -- run state snapshot
/// - `POST /api/simulation/start` -- begin a new session
/// - `POST /api/simulation/stop` -- end the current session
/// - `GET/PUT /api/simulation/config` -- generator tuning
/// - `GET /api/simulation/snapshot` -- on-demand sample
/// - `GET /api/history` -- paginated session listing
/// - `GET /api/history/range` -- samples by time range
/// - `GET /api/history/:session_id` -- one session with samples
///
/// CORS is configured to allow any origin for development. In
/// production this should be restricted.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Status page
        .route("/", get(control::index))
        // WebSocket
        .route("/ws/stream", get(ws::ws_stream))
        // Simulation control
        .route("/api/simulation/status", get(control::get_status))
        .route(
            "/api/simulation/start",
            axum::routing::post(control::start_simulation),
        )
        .route(
            "/api/simulation/stop",
            axum::routing::post(control::stop_simulation),
        )
        .route(
            "/api/simulation/config",
            get(control::get_config).put(control::update_config),
        )
        .route("/api/simulation/snapshot", get(control::get_snapshot))
        // History queries
        .route("/api/history", get(history::list_sessions))
        .route("/api/history/range", get(history::samples_by_range))
        .route("/api/history/{session_id}", get(history::get_session))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
