//! Integration tests for the observer API endpoints.
//!
//! Tests use Axum's `Router` directly via `tower::ServiceExt` without
//! starting a TCP server, against an in-memory `SQLite` history store.
//! This validates handler logic, validation, and routing without a live
//! network connection or external services.

#![allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::too_many_lines)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::{DateTime, Duration, TimeZone, Utc};
use physim_core::{SimulationClock, SubscriberRegistry};
use physim_db::{HistoryPool, SampleStore, SessionStore, SqliteConfig};
use physim_observer::router::build_router;
use physim_observer::state::AppState;
use physim_types::{Sample, SampleStatus, SessionId, SimulationConfig, StreamEvent};
use serde_json::Value;
use tower::ServiceExt;

async fn make_state() -> AppState {
    let config = SqliteConfig::new("sqlite::memory:").with_max_connections(1);
    let pool = HistoryPool::connect(&config).await.unwrap();
    pool.run_migrations().await.unwrap();

    let clock = Arc::new(SimulationClock::new(SimulationConfig::default()));
    let registry = Arc::new(SubscriberRegistry::new());
    AppState::new(clock, registry, pool)
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 5, 1, 9, 0, 0).unwrap()
}

/// RFC 3339 with a `Z` suffix: a `+00:00` offset would decode as a space
/// inside a query string.
fn query_time(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}

fn make_sample(iteration: u64, timestamp: DateTime<Utc>) -> Sample {
    Sample {
        timestamp,
        temperature: 42.5,
        pressure: 4.2,
        velocity: 12.0,
        energy: 178.25,
        status: SampleStatus::Normal,
        iteration_number: iteration,
    }
}

// =========================================================================
// Status page and status endpoint
// =========================================================================

#[tokio::test]
async fn test_index_returns_html() {
    let state = make_state().await;
    let router = build_router(state);

    let response = router
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get("content-type")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(content_type.contains("text/html"));
}

#[tokio::test]
async fn test_status_initially_idle() {
    let state = make_state().await;
    let router = build_router(state);

    let response = router
        .oneshot(
            Request::get("/api/simulation/status")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["running"], false);
    assert_eq!(json["total_iterations"], 0);
    assert_eq!(json["connected_clients"], 0);
}

// =========================================================================
// Start / stop lifecycle
// =========================================================================

#[tokio::test]
async fn test_start_creates_session_and_broadcasts() {
    let state = make_state().await;

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let _ = state.registry.register(tx);

    let router = build_router(state.clone());
    let response = router
        .oneshot(
            Request::post("/api/simulation/start")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    let session_id: SessionId =
        serde_json::from_value(json["session_id"].clone()).unwrap();

    assert!(state.clock.is_running());
    assert_eq!(state.clock.current_session_id(), Some(session_id));

    // The durable record was created before the response was produced.
    let row = SessionStore::new(state.pool.pool())
        .session_by_id(session_id)
        .await
        .unwrap();
    assert!(row.is_some());

    // Every connected subscriber saw the lifecycle event.
    let event = rx.try_recv().unwrap();
    assert_eq!(
        event,
        StreamEvent::SessionStarted {
            session_id: Some(session_id)
        }
    );
}

#[tokio::test]
async fn test_stop_ends_session_with_final_count() {
    let state = make_state().await;

    // Start through the API, tick a few samples, then stop.
    let router = build_router(state.clone());
    let response = router
        .oneshot(
            Request::post("/api/simulation/start")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let json = body_to_json(response.into_body()).await;
    let session_id: SessionId =
        serde_json::from_value(json["session_id"].clone()).unwrap();

    for _ in 0..3 {
        let _ = state.clock.generate_sample();
    }

    let router = build_router(state.clone());
    let response = router
        .oneshot(
            Request::post("/api/simulation/stop")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    assert!(!state.clock.is_running());
    let row = SessionStore::new(state.pool.pool())
        .session_by_id(session_id)
        .await
        .unwrap()
        .unwrap();
    assert!(row.stopped_at.is_some());
    assert_eq!(row.iteration_count, 3);
}

#[tokio::test]
async fn test_stop_while_idle_is_ok() {
    let state = make_state().await;
    let router = build_router(state);

    let response = router
        .oneshot(
            Request::post("/api/simulation/stop")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

// =========================================================================
// Config endpoints
// =========================================================================

#[tokio::test]
async fn test_config_roundtrip() {
    let state = make_state().await;

    let router = build_router(state.clone());
    let response = router
        .oneshot(
            Request::get("/api/simulation/config")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["update_interval_ms"], 1000);

    let mut config = SimulationConfig::default();
    config.update_interval_ms = 250;
    config.temperature_max = 80.0;

    let router = build_router(state.clone());
    let response = router
        .oneshot(
            Request::put("/api/simulation/config")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&config).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The clock sees the replacement immediately.
    assert_eq!(state.clock.update_interval_ms(), 250);

    let router = build_router(state);
    let response = router
        .oneshot(
            Request::get("/api/simulation/config")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["update_interval_ms"], 250);
    assert_eq!(json["temperature_max"], 80.0);
}

// =========================================================================
// Snapshot endpoint
// =========================================================================

#[tokio::test]
async fn test_snapshot_while_idle_is_bad_request() {
    let state = make_state().await;
    let router = build_router(state);

    let response = router
        .oneshot(
            Request::get("/api/simulation/snapshot")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["error"], "simulation is not running");
}

#[tokio::test]
async fn test_snapshot_consumes_an_iteration() {
    let state = make_state().await;
    let _ = state.clock.start();

    let router = build_router(state.clone());
    let response = router
        .oneshot(
            Request::get("/api/simulation/snapshot")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["iteration_number"], 1);
    assert!(json["energy"].as_f64().unwrap() > 0.0);

    // The on-demand sample shares the session's iteration sequence.
    assert_eq!(state.clock.current_iteration(), 1);
}

// =========================================================================
// History: session listing
// =========================================================================

#[tokio::test]
async fn test_list_sessions_most_recent_first() {
    let state = make_state().await;
    let store = SessionStore::new(state.pool.pool());

    let mut ids = Vec::new();
    for offset in 0..3_i64 {
        let id = SessionId::new();
        store
            .create_session(id, base_time() + Duration::minutes(offset))
            .await
            .unwrap();
        ids.push(id);
    }

    let router = build_router(state);
    let response = router
        .oneshot(Request::get("/api/history").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;

    let sessions = json.as_array().unwrap();
    assert_eq!(sessions.len(), 3);
    assert_eq!(sessions[0]["session_id"], ids[2].to_string());
    assert_eq!(sessions[2]["session_id"], ids[0].to_string());
    assert_eq!(sessions[0]["is_active"], true);
}

#[tokio::test]
async fn test_list_sessions_pagination_window() {
    let state = make_state().await;
    let store = SessionStore::new(state.pool.pool());

    let mut ids = Vec::new();
    for offset in 0..5_i64 {
        let id = SessionId::new();
        store
            .create_session(id, base_time() + Duration::minutes(offset))
            .await
            .unwrap();
        ids.push(id);
    }

    let router = build_router(state);
    let response = router
        .oneshot(
            Request::get("/api/history?page=2&page_size=2")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;

    // Page 2 of size 2 = the 3rd and 4th most recent sessions.
    let sessions = json.as_array().unwrap();
    assert_eq!(sessions.len(), 2);
    assert_eq!(sessions[0]["session_id"], ids[2].to_string());
    assert_eq!(sessions[1]["session_id"], ids[1].to_string());
}

#[tokio::test]
async fn test_list_sessions_rejects_invalid_pagination() {
    let state = make_state().await;

    for query in ["page=0", "page_size=0", "page_size=101"] {
        let router = build_router(state.clone());
        let response = router
            .oneshot(
                Request::get(format!("/api/history?{query}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(
            response.status(),
            StatusCode::BAD_REQUEST,
            "query {query} was accepted"
        );
    }
}

// =========================================================================
// History: session details
// =========================================================================

#[tokio::test]
async fn test_get_session_with_ordered_samples() {
    let state = make_state().await;
    let sessions = SessionStore::new(state.pool.pool());
    let samples = SampleStore::new(state.pool.pool());

    let id = SessionId::new();
    sessions.create_session(id, base_time()).await.unwrap();
    sessions
        .end_session(id, base_time() + Duration::seconds(2), 2)
        .await
        .unwrap();
    for iteration in [2_u64, 1] {
        samples
            .insert_sample(id, &make_sample(iteration, base_time()))
            .await
            .unwrap();
    }

    let router = build_router(state);
    let response = router
        .oneshot(
            Request::get(format!("/api/history/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;

    assert_eq!(json["session_id"], id.to_string());
    assert_eq!(json["iteration_count"], 2);
    assert_eq!(json["is_active"], false);
    let points = json["data_points"].as_array().unwrap();
    assert_eq!(points.len(), 2);
    assert_eq!(points[0]["iteration_number"], 1);
    assert_eq!(points[1]["iteration_number"], 2);
    assert_eq!(points[0]["status"], "Normal");
}

#[tokio::test]
async fn test_get_session_not_found() {
    let state = make_state().await;
    let router = build_router(state);

    let fake_id = uuid::Uuid::now_v7();
    let response = router
        .oneshot(
            Request::get(format!("/api/history/{fake_id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_session_invalid_uuid() {
    let state = make_state().await;
    let router = build_router(state);

    let response = router
        .oneshot(
            Request::get("/api/history/not-a-uuid")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// =========================================================================
// History: time-range queries
// =========================================================================

#[tokio::test]
async fn test_range_query_returns_window_ascending() {
    let state = make_state().await;
    let sessions = SessionStore::new(state.pool.pool());
    let samples = SampleStore::new(state.pool.pool());

    let id = SessionId::new();
    sessions.create_session(id, base_time()).await.unwrap();
    let t = base_time();
    for (iteration, offset) in [(1_u64, -10_i64), (2, -5), (3, 0), (4, 5), (5, 10)] {
        samples
            .insert_sample(id, &make_sample(iteration, t + Duration::minutes(offset)))
            .await
            .unwrap();
    }

    let start = query_time(t - Duration::minutes(6));
    let end = query_time(t + Duration::minutes(6));
    let router = build_router(state);
    let response = router
        .oneshot(
            Request::get(format!("/api/history/range?start={start}&end={end}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;

    assert_eq!(json["returned_count"], 3);
    let points = json["data_points"].as_array().unwrap();
    assert_eq!(points.len(), 3);
    assert_eq!(points[0]["iteration_number"], 2);
    assert_eq!(points[2]["iteration_number"], 4);
    assert_eq!(points[0]["session_id"], id.to_string());
}

#[tokio::test]
async fn test_range_query_rejects_inverted_range() {
    let state = make_state().await;
    let router = build_router(state);

    let start = query_time(base_time());
    let end = query_time(base_time() - Duration::minutes(1));
    let response = router
        .oneshot(
            Request::get(format!("/api/history/range?start={start}&end={end}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_range_query_rejects_oversized_page() {
    let state = make_state().await;
    let router = build_router(state);

    let start = query_time(base_time());
    let end = query_time(base_time() + Duration::minutes(1));
    let response = router
        .oneshot(
            Request::get(format!(
                "/api/history/range?start={start}&end={end}&page_size=5001"
            ))
            .body(Body::empty())
            .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// =========================================================================
// Routing
// =========================================================================

#[tokio::test]
async fn test_nonexistent_route_returns_404() {
    let state = make_state().await;
    let router = build_router(state);

    let response = router
        .oneshot(
            Request::get("/api/nonexistent")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
