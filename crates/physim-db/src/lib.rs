//! Data layer for the physim history store (`SQLite`).
//!
//! The history store is the durable record of sessions and their
//! samples. Writes arrive on a bounded work queue consumed by the
//! [`writer`] worker so the live broadcast path never blocks on the
//! store; reads serve the paginated history API.
//!
//! # Modules
//!
//! - [`sqlite`] -- Connection pool, configuration, and migrations
//! - [`session_store`] -- Session create/end/list/fetch/delete
//! - [`sample_store`] -- Sample append and time-range queries
//! - [`writer`] -- The fire-and-forget persistence worker
//! - [`error`] -- Shared error types

pub mod error;
pub mod sample_store;
pub mod session_store;
pub mod sqlite;
pub mod writer;

// Re-export primary types for convenience.
pub use error::DbError;
pub use sample_store::{SampleRow, SampleStore};
pub use session_store::{SessionRow, SessionStore};
pub use sqlite::{HistoryPool, SqliteConfig};
pub use writer::{PERSIST_QUEUE_CAPACITY, persist_channel, spawn_history_writer};
