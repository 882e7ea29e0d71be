//! Session record operations.
//!
//! Sessions are created when the clock starts and ended exactly once when
//! it stops. The durable record is deliberately decoupled from the
//! in-memory clock: create/end are explicit calls, so a failed write
//! leaves a session that is never marked ended -- readers must treat an
//! "active" session with no recent samples as valid, if stale, state.

use chrono::{DateTime, Utc};
use physim_types::SessionId;
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::error::DbError;
use crate::sample_store::{SampleRow, SampleStore};

/// Operations on the `sessions` table.
pub struct SessionStore<'a> {
    pool: &'a SqlitePool,
}

impl<'a> SessionStore<'a> {
    /// Create a new session store bound to a connection pool.
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new session record with no stop timestamp.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Sqlite`] if the insert fails (including a
    /// duplicate session identifier).
    pub async fn create_session(
        &self,
        session_id: SessionId,
        started_at: DateTime<Utc>,
    ) -> Result<(), DbError> {
        sqlx::query(
            r"INSERT INTO sessions (id, started_at, stopped_at, iteration_count)
              VALUES (?, ?, NULL, 0)",
        )
        .bind(session_id.to_string())
        .bind(started_at)
        .execute(self.pool)
        .await?;

        info!(session = %session_id, "created session record");
        Ok(())
    }

    /// Mark a session ended with its final iteration count.
    ///
    /// An unknown session identifier is a logged warning, not an error:
    /// the durable record may be missing when its create failed.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Sqlite`] if the update fails.
    pub async fn end_session(
        &self,
        session_id: SessionId,
        stopped_at: DateTime<Utc>,
        iteration_count: u64,
    ) -> Result<(), DbError> {
        let count = i64::try_from(iteration_count).unwrap_or(i64::MAX);
        let result = sqlx::query(
            r"UPDATE sessions SET stopped_at = ?, iteration_count = ? WHERE id = ?",
        )
        .bind(stopped_at)
        .bind(count)
        .bind(session_id.to_string())
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            warn!(session = %session_id, "session not found for ending");
            return Ok(());
        }

        info!(
            session = %session_id,
            iterations = iteration_count,
            "ended session record"
        );
        Ok(())
    }

    /// Fetch one session row by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Sqlite`] if the query fails.
    pub async fn session_by_id(
        &self,
        session_id: SessionId,
    ) -> Result<Option<SessionRow>, DbError> {
        let row = sqlx::query_as::<_, SessionRow>(
            r"SELECT id, started_at, stopped_at, iteration_count
              FROM sessions
              WHERE id = ?",
        )
        .bind(session_id.to_string())
        .fetch_optional(self.pool)
        .await?;

        Ok(row)
    }

    /// Fetch a session together with its samples, ordered by iteration
    /// number ascending. Returns `None` when the session does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Sqlite`] if either query fails.
    pub async fn session_with_samples(
        &self,
        session_id: SessionId,
    ) -> Result<Option<(SessionRow, Vec<SampleRow>)>, DbError> {
        let Some(session) = self.session_by_id(session_id).await? else {
            return Ok(None);
        };

        let samples = SampleStore::new(self.pool)
            .samples_by_session(session_id)
            .await?;

        Ok(Some((session, samples)))
    }

    /// List sessions ordered by start time descending (most recent first).
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Sqlite`] if the query fails.
    pub async fn list_sessions(&self, skip: u64, take: u64) -> Result<Vec<SessionRow>, DbError> {
        let limit = i64::try_from(take).unwrap_or(i64::MAX);
        let offset = i64::try_from(skip).unwrap_or(i64::MAX);
        let rows = sqlx::query_as::<_, SessionRow>(
            r"SELECT id, started_at, stopped_at, iteration_count
              FROM sessions
              ORDER BY started_at DESC
              LIMIT ? OFFSET ?",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Delete a session and, via the cascade, all of its samples.
    ///
    /// Returns `true` when a row was deleted.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Sqlite`] if the delete fails.
    pub async fn delete_session(&self, session_id: SessionId) -> Result<bool, DbError> {
        let result = sqlx::query(r"DELETE FROM sessions WHERE id = ?")
            .bind(session_id.to_string())
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// A row from the `sessions` table.
///
/// Uses runtime types rather than compile-time checked types to avoid
/// requiring a live database during builds.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SessionRow {
    /// The session identifier (UUID text).
    pub id: String,
    /// Wall-clock time the session started.
    pub started_at: DateTime<Utc>,
    /// Wall-clock time the session stopped, if it has.
    pub stopped_at: Option<DateTime<Utc>>,
    /// Final iteration count (0 until the session is ended).
    pub iteration_count: i64,
}
