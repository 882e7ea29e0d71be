//! Runtime-tunable simulation configuration and status snapshot.
//!
//! [`SimulationConfig`] is the single live, process-wide configuration for
//! the sample generator and the tick loop. It is replaced wholesale by the
//! `PUT /api/simulation/config` endpoint and read by every tick. Bounds
//! are deliberately not cross-validated (`min <= max` is the operator's
//! responsibility); the generator produces out-of-band readings rather
//! than failing when bounds are inverted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Tunable parameters for the sample generator and tick loop.
///
/// All fields have serde defaults so a partial config document (or an
/// absent one) yields the stock tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Real-time milliseconds between ticks.
    #[serde(default = "default_update_interval_ms")]
    pub update_interval_ms: u64,

    /// Lower temperature bound.
    #[serde(default = "default_temperature_min")]
    pub temperature_min: f64,

    /// Upper temperature bound.
    #[serde(default = "default_temperature_max")]
    pub temperature_max: f64,

    /// Lower pressure bound.
    #[serde(default = "default_pressure_min")]
    pub pressure_min: f64,

    /// Upper pressure bound.
    #[serde(default = "default_pressure_max")]
    pub pressure_max: f64,

    /// Lower velocity bound.
    #[serde(default = "default_velocity_min")]
    pub velocity_min: f64,

    /// Upper velocity bound.
    #[serde(default = "default_velocity_max")]
    pub velocity_max: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            update_interval_ms: default_update_interval_ms(),
            temperature_min: default_temperature_min(),
            temperature_max: default_temperature_max(),
            pressure_min: default_pressure_min(),
            pressure_max: default_pressure_max(),
            velocity_min: default_velocity_min(),
            velocity_max: default_velocity_max(),
        }
    }
}

const fn default_update_interval_ms() -> u64 {
    1000
}

const fn default_temperature_min() -> f64 {
    20.0
}

const fn default_temperature_max() -> f64 {
    100.0
}

const fn default_pressure_min() -> f64 {
    1.0
}

const fn default_pressure_max() -> f64 {
    10.0
}

const fn default_velocity_min() -> f64 {
    0.0
}

const fn default_velocity_max() -> f64 {
    50.0
}

/// Point-in-time snapshot of the clock state served by the status endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationStatus {
    /// Whether a session is currently active.
    pub running: bool,
    /// Total iterations generated since the current session started.
    pub total_iterations: u64,
    /// The most recently assigned iteration number.
    pub current_iteration: u64,
    /// Wall-clock time the current (or last) session started, if any.
    pub start_time: Option<DateTime<Utc>>,
    /// Number of currently connected real-time subscribers.
    pub connected_clients: usize,
}
