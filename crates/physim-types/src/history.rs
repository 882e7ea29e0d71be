//! Response models for the history query surface.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::SessionId;

/// Summary of one recorded session, as served by the session listing.
///
/// `duration_seconds` and `is_active` are derived from the stop timestamp
/// at construction time: a session with no stop timestamp is active and
/// has no duration yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSummary {
    /// The session identifier.
    pub session_id: SessionId,
    /// Wall-clock time the session started.
    pub started_at: DateTime<Utc>,
    /// Wall-clock time the session stopped, if it has.
    pub stopped_at: Option<DateTime<Utc>>,
    /// Final iteration count (meaningful once stopped).
    pub iteration_count: u64,
    /// Session length in seconds, present only once stopped.
    pub duration_seconds: Option<f64>,
    /// Whether the session has no stop timestamp yet.
    pub is_active: bool,
}

impl SessionSummary {
    /// Build a summary from the durable session fields, deriving
    /// `duration_seconds` and `is_active`.
    pub fn from_parts(
        session_id: SessionId,
        started_at: DateTime<Utc>,
        stopped_at: Option<DateTime<Utc>>,
        iteration_count: u64,
    ) -> Self {
        let duration_seconds = stopped_at.map(|stopped| {
            let millis = stopped.signed_duration_since(started_at).num_milliseconds();
            to_seconds(millis)
        });
        Self {
            session_id,
            started_at,
            stopped_at,
            iteration_count,
            duration_seconds,
            is_active: stopped_at.is_none(),
        }
    }
}

/// Convert a signed millisecond count to fractional seconds.
#[allow(clippy::cast_precision_loss)]
fn to_seconds(millis: i64) -> f64 {
    // Precision loss only matters beyond ~285,000 years of session length.
    millis as f64 / 1000.0
}
