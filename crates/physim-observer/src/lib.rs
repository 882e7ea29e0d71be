//! Observer API server for the physim streaming service.
//!
//! This crate provides an Axum HTTP server that exposes:
//!
//! - **`WebSocket` endpoint** (`/ws/stream`) pushing every generated
//!   sample and session lifecycle event to connected subscribers
//! - **Control endpoints** for start/stop, status, configuration, and
//!   on-demand snapshots
//! - **History endpoints** for offset-paginated sessions and time-ranged
//!   sample queries
//! - **Minimal HTML status page** (`GET /`)
//!
//! # Architecture
//!
//! Handlers share the simulation clock and subscriber registry with the
//! tick loop through [`AppState`]. Real-time delivery and history reads
//! run as ordinary request tasks; nothing here blocks the tick cycle.

pub mod control;
pub mod error;
pub mod history;
pub mod router;
pub mod server;
pub mod startup;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use router::build_router;
pub use server::{ServerConfig, ServerError, start_server};
pub use startup::{StartupError, spawn_server};
pub use state::AppState;
