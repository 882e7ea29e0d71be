//! Simulation clock, sample generator, subscriber registry, and tick loop
//! for the physim streaming service.
//!
//! This crate owns the live session/broadcast core: one shared
//! [`SimulationClock`] drives a background tick loop that fans each
//! generated [`Sample`](physim_types::Sample) out to every connected
//! subscriber and hands the same sample to the persistence work queue
//! without waiting on it.
//!
//! # Modules
//!
//! - [`clock`] -- Run/stop state, session identity, and the iteration
//!   counter behind a single mutual-exclusion boundary.
//! - [`config`] -- Application configuration loading from
//!   `physim-config.yaml` into strongly-typed structs.
//! - [`generator`] -- Pure reading computation from elapsed time, config,
//!   and randomness.
//! - [`registry`] -- Connected-subscriber tracking with broadcast-to-all
//!   and send-to-one.
//! - [`runner`] -- The long-lived tick loop.
//! - [`shutdown`] -- Cooperative cancellation token for the tick loop.

pub mod clock;
pub mod config;
pub mod generator;
pub mod registry;
pub mod runner;
pub mod shutdown;

// Re-export primary types for convenience.
pub use clock::SimulationClock;
pub use config::{AppConfig, ConfigError};
pub use registry::SubscriberRegistry;
pub use runner::run_stream_loop;
pub use shutdown::ShutdownToken;
