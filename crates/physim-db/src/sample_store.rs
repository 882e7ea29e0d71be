//! Sample append and query operations.

use chrono::{DateTime, Utc};
use physim_types::{Sample, SessionId};
use sqlx::SqlitePool;

use crate::error::DbError;

/// Operations on the `samples` table.
pub struct SampleStore<'a> {
    pool: &'a SqlitePool,
}

impl<'a> SampleStore<'a> {
    /// Create a new sample store bound to a connection pool.
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Append one sample to a session.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Sqlite`] if the insert fails (including a
    /// missing owning session, rejected by the foreign key).
    pub async fn insert_sample(
        &self,
        session_id: SessionId,
        sample: &Sample,
    ) -> Result<(), DbError> {
        let iteration = i64::try_from(sample.iteration_number).unwrap_or(i64::MAX);
        sqlx::query(
            r"INSERT INTO samples
              (session_id, timestamp, temperature, pressure, velocity, energy, status, iteration_number)
              VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(session_id.to_string())
        .bind(sample.timestamp)
        .bind(sample.temperature)
        .bind(sample.pressure)
        .bind(sample.velocity)
        .bind(sample.energy)
        .bind(sample.status.as_str())
        .bind(iteration)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Fetch all samples for one session, ordered by iteration number
    /// ascending.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Sqlite`] if the query fails.
    pub async fn samples_by_session(
        &self,
        session_id: SessionId,
    ) -> Result<Vec<SampleRow>, DbError> {
        let rows = sqlx::query_as::<_, SampleRow>(
            r"SELECT id, session_id, timestamp, temperature, pressure, velocity, energy, status, iteration_number
              FROM samples
              WHERE session_id = ?
              ORDER BY iteration_number ASC",
        )
        .bind(session_id.to_string())
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }

    /// Fetch samples across all sessions with `start <= timestamp <= end`,
    /// ordered by timestamp ascending.
    ///
    /// `start < end` is the caller's precondition; an inverted range
    /// simply matches nothing.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Sqlite`] if the query fails.
    pub async fn samples_by_time_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        skip: u64,
        take: u64,
    ) -> Result<Vec<SampleRow>, DbError> {
        let limit = i64::try_from(take).unwrap_or(i64::MAX);
        let offset = i64::try_from(skip).unwrap_or(i64::MAX);
        let rows = sqlx::query_as::<_, SampleRow>(
            r"SELECT id, session_id, timestamp, temperature, pressure, velocity, energy, status, iteration_number
              FROM samples
              WHERE timestamp >= ? AND timestamp <= ?
              ORDER BY timestamp ASC
              LIMIT ? OFFSET ?",
        )
        .bind(start)
        .bind(end)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool)
        .await?;

        Ok(rows)
    }
}

/// A row from the `samples` table.
///
/// Uses runtime types rather than compile-time checked types to avoid
/// requiring a live database during builds. The status is kept as the
/// stored text label; consumers embed it directly in responses.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SampleRow {
    /// Auto-incremented sample ID.
    pub id: i64,
    /// The owning session identifier (UUID text).
    pub session_id: String,
    /// Wall-clock time the reading was generated.
    pub timestamp: DateTime<Utc>,
    /// Temperature reading.
    pub temperature: f64,
    /// Pressure reading.
    pub pressure: f64,
    /// Velocity reading.
    pub velocity: f64,
    /// Derived energy.
    pub energy: f64,
    /// Status label as stored.
    pub status: String,
    /// 1-based iteration number within the owning session.
    pub iteration_number: i64,
}
