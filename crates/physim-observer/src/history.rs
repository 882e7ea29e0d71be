//! History query endpoints: paginated sessions and time-ranged samples.
//!
//! All pagination is offset-based (skip/take, no persisted cursor) and
//! validated here at the boundary: the store never sees a page below 1
//! or a page size outside its endpoint's cap.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use chrono::{DateTime, Utc};
use physim_db::{SampleRow, SampleStore, SessionRow, SessionStore};
use physim_types::{SessionId, SessionSummary};
use uuid::Uuid;

use crate::error::ObserverError;
use crate::state::AppState;

/// Default page size for the session listing.
const SESSIONS_DEFAULT_PAGE_SIZE: u32 = 50;

/// Maximum page size for the session listing.
const SESSIONS_MAX_PAGE_SIZE: u32 = 100;

/// Default page size for time-range queries.
const RANGE_DEFAULT_PAGE_SIZE: u32 = 1000;

/// Maximum page size for time-range queries.
const RANGE_MAX_PAGE_SIZE: u32 = 5000;

// ---------------------------------------------------------------------------
// Query parameter structs
// ---------------------------------------------------------------------------

/// Query parameters for the `GET /api/history` endpoint.
#[derive(Debug, serde::Deserialize)]
pub struct SessionsQuery {
    /// 1-based page number (default 1).
    pub page: Option<u32>,
    /// Number of sessions per page (default 50, max 100).
    pub page_size: Option<u32>,
}

/// Query parameters for the `GET /api/history/range` endpoint.
#[derive(Debug, serde::Deserialize)]
pub struct RangeQuery {
    /// Inclusive range start (RFC 3339).
    pub start: DateTime<Utc>,
    /// Inclusive range end (RFC 3339).
    pub end: DateTime<Utc>,
    /// 1-based page number (default 1).
    pub page: Option<u32>,
    /// Number of samples per page (default 1000, max 5000).
    pub page_size: Option<u32>,
}

// ---------------------------------------------------------------------------
// GET /api/history -- list sessions (paginated)
// ---------------------------------------------------------------------------

/// List recorded sessions, most recent first.
pub async fn list_sessions(
    State(state): State<AppState>,
    Query(params): Query<SessionsQuery>,
) -> Result<impl IntoResponse, ObserverError> {
    let (skip, take) = pagination(
        params.page,
        params.page_size,
        SESSIONS_DEFAULT_PAGE_SIZE,
        SESSIONS_MAX_PAGE_SIZE,
    )?;

    let rows = SessionStore::new(state.pool.pool())
        .list_sessions(skip, take)
        .await?;

    let sessions: Vec<SessionSummary> = rows
        .iter()
        .map(summary_from_row)
        .collect::<Result<_, _>>()?;

    Ok(Json(sessions))
}

// ---------------------------------------------------------------------------
// GET /api/history/:session_id -- one session with its samples
// ---------------------------------------------------------------------------

/// Return a single session with all of its samples, ordered by iteration
/// number ascending.
pub async fn get_session(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, ObserverError> {
    let session_id = SessionId::from(parse_uuid(&id_str)?);

    let Some((session, samples)) = SessionStore::new(state.pool.pool())
        .session_with_samples(session_id)
        .await?
    else {
        return Err(ObserverError::NotFound(format!(
            "session {session_id} not found"
        )));
    };

    let summary = summary_from_row(&session)?;
    let data_points: Vec<serde_json::Value> =
        samples.iter().map(sample_json_without_session).collect();

    let mut body = serde_json::to_value(&summary)?;
    if let Some(object) = body.as_object_mut() {
        object.insert(String::from("data_points"), data_points.into());
    }

    Ok(Json(body))
}

// ---------------------------------------------------------------------------
// GET /api/history/range -- samples across sessions by time range
// ---------------------------------------------------------------------------

/// Return samples across all sessions with `start <= timestamp <= end`,
/// ordered by timestamp ascending.
pub async fn samples_by_range(
    State(state): State<AppState>,
    Query(params): Query<RangeQuery>,
) -> Result<impl IntoResponse, ObserverError> {
    if params.start >= params.end {
        return Err(ObserverError::InvalidQuery(String::from(
            "start time must be before end time",
        )));
    }
    let (skip, take) = pagination(
        params.page,
        params.page_size,
        RANGE_DEFAULT_PAGE_SIZE,
        RANGE_MAX_PAGE_SIZE,
    )?;

    let rows = SampleStore::new(state.pool.pool())
        .samples_by_time_range(params.start, params.end, skip, take)
        .await?;

    let data_points: Vec<serde_json::Value> = rows
        .iter()
        .map(|row| {
            serde_json::json!({
                "session_id": row.session_id,
                "timestamp": row.timestamp,
                "temperature": row.temperature,
                "pressure": row.pressure,
                "velocity": row.velocity,
                "energy": row.energy,
                "status": row.status,
                "iteration_number": row.iteration_number,
            })
        })
        .collect();

    Ok(Json(serde_json::json!({
        "start_time": params.start,
        "end_time": params.end,
        "returned_count": data_points.len(),
        "data_points": data_points,
    })))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Validate page/page-size inputs and convert them to skip/take.
fn pagination(
    page: Option<u32>,
    page_size: Option<u32>,
    default_size: u32,
    max_size: u32,
) -> Result<(u64, u64), ObserverError> {
    let page = page.unwrap_or(1);
    if page < 1 {
        return Err(ObserverError::InvalidQuery(String::from(
            "page must be at least 1",
        )));
    }

    let size = page_size.unwrap_or(default_size);
    if size < 1 || size > max_size {
        return Err(ObserverError::InvalidQuery(format!(
            "page_size must be between 1 and {max_size}"
        )));
    }

    let skip = u64::from(page.saturating_sub(1)).saturating_mul(u64::from(size));
    Ok((skip, u64::from(size)))
}

/// Parse a UUID from a string, returning an [`ObserverError`] on failure.
fn parse_uuid(s: &str) -> Result<Uuid, ObserverError> {
    s.parse::<Uuid>()
        .map_err(|e| ObserverError::InvalidUuid(format!("{s}: {e}")))
}

/// Build a [`SessionSummary`] from a stored row.
///
/// A session identifier that does not parse back to a UUID means the
/// table was written by something else entirely; surface it as an
/// internal error rather than skipping the row silently.
fn summary_from_row(row: &SessionRow) -> Result<SessionSummary, ObserverError> {
    let id = row
        .id
        .parse::<Uuid>()
        .map_err(|e| ObserverError::Internal(format!("corrupt session id {}: {e}", row.id)))?;
    let iteration_count = u64::try_from(row.iteration_count).unwrap_or(0);
    Ok(SessionSummary::from_parts(
        SessionId::from(id),
        row.started_at,
        row.stopped_at,
        iteration_count,
    ))
}

/// Render a sample row without its session identifier (the owning
/// session is implied by the enclosing response).
fn sample_json_without_session(row: &SampleRow) -> serde_json::Value {
    serde_json::json!({
        "timestamp": row.timestamp,
        "temperature": row.temperature,
        "pressure": row.pressure,
        "velocity": row.velocity,
        "energy": row.energy,
        "status": row.status,
        "iteration_number": row.iteration_number,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_defaults() {
        let (skip, take) = pagination(None, None, 50, 100).unwrap_or((u64::MAX, u64::MAX));
        assert_eq!(skip, 0);
        assert_eq!(take, 50);
    }

    #[test]
    fn pagination_computes_skip() {
        let (skip, take) = pagination(Some(3), Some(20), 50, 100).unwrap_or((0, 0));
        assert_eq!(skip, 40);
        assert_eq!(take, 20);
    }

    #[test]
    fn pagination_rejects_zero_page() {
        assert!(pagination(Some(0), None, 50, 100).is_err());
    }

    #[test]
    fn pagination_rejects_out_of_range_size() {
        assert!(pagination(None, Some(0), 50, 100).is_err());
        assert!(pagination(None, Some(101), 50, 100).is_err());
        assert!(pagination(None, Some(100), 50, 100).is_ok());
    }
}
