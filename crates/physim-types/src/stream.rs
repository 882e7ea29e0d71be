//! Push events for real-time subscribers and commands for the
//! persistence work queue.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::SessionId;
use crate::sample::Sample;

/// Event pushed to connected real-time subscribers.
///
/// Serialized as a tagged JSON object, e.g.
/// `{"event":"sample_received","sample":{...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum StreamEvent {
    /// A session started. The identifier is absent when this event is an
    /// individually-requested acknowledgement and the clock is idle.
    SessionStarted {
        /// Identifier of the session that started, when one is active.
        session_id: Option<SessionId>,
    },
    /// The current session stopped.
    SessionStopped,
    /// A sample was generated this tick.
    SampleReceived {
        /// The generated reading.
        sample: Sample,
    },
}

/// Command submitted to the history-writer work queue.
///
/// The tick loop and the control handlers enqueue these without awaiting
/// the write; a single worker consumes them in order, so a
/// [`PersistCommand::SessionEnded`] is always applied after every sample
/// enqueued before it.
#[derive(Debug, Clone, PartialEq)]
pub enum PersistCommand {
    /// Durably create a session record.
    SessionStarted {
        /// The new session's identifier.
        session_id: SessionId,
        /// Wall-clock time the session started.
        started_at: DateTime<Utc>,
    },
    /// Durably append one sample to a session.
    Sample {
        /// The owning session.
        session_id: SessionId,
        /// The reading to append.
        sample: Sample,
    },
    /// Durably mark a session ended.
    SessionEnded {
        /// The session to end.
        session_id: SessionId,
        /// Wall-clock time the session stopped.
        stopped_at: DateTime<Utc>,
        /// Final iteration count at stop time.
        iteration_count: u64,
    },
}
