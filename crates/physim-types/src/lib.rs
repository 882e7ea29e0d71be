//! Shared type definitions for the physim streaming service.
//!
//! This crate holds the data model shared by the simulation core, the
//! data layer, and the observer API: typed identifiers, the generated
//! [`Sample`] reading, the mutable [`SimulationConfig`], push events for
//! real-time subscribers, and commands for the persistence work queue.
//! No I/O happens here.

pub mod config;
pub mod history;
pub mod ids;
pub mod sample;
pub mod stream;

// Re-export primary types for convenience.
pub use config::{SimulationConfig, SimulationStatus};
pub use history::SessionSummary;
pub use ids::{SessionId, SubscriberId};
pub use sample::{Sample, SampleStatus};
pub use stream::{PersistCommand, StreamEvent};
