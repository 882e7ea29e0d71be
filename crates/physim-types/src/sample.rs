//! Generated readings and their status classification.
//!
//! A [`Sample`] is one reading of the simulated physical process. Samples
//! are immutable once produced: the generator computes all fields in a
//! single pass and nothing downstream mutates them. Samples broadcast to
//! live subscribers carry no session identifier; the data layer keys the
//! durable copy by session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status classification derived from a sample's readings.
///
/// Evaluated in severity order by the generator: `Critical` wins over
/// `Warning`, which wins over `HighActivity`, which wins over `Normal`.
/// The serialized labels (including the space in `"High Activity"`) are
/// part of the wire and storage format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SampleStatus {
    /// All readings within normal operating bounds.
    Normal,
    /// Elevated temperature or low pressure.
    Warning,
    /// Velocity above the high-activity threshold.
    #[serde(rename = "High Activity")]
    HighActivity,
    /// Temperature above the critical threshold.
    Critical,
}

impl SampleStatus {
    /// Return the canonical label used on the wire and in storage.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Warning => "Warning",
            Self::HighActivity => "High Activity",
            Self::Critical => "Critical",
        }
    }
}

impl core::fmt::Display for SampleStatus {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One reading of the simulated physical process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Wall-clock time the reading was generated.
    pub timestamp: DateTime<Utc>,
    /// Temperature reading, rounded to 2 decimal places.
    pub temperature: f64,
    /// Pressure reading, rounded to 2 decimal places.
    pub pressure: f64,
    /// Velocity reading, rounded to 2 decimal places.
    pub velocity: f64,
    /// Energy derived from velocity and temperature, rounded to 2 decimal places.
    pub energy: f64,
    /// Status classification derived from the readings.
    pub status: SampleStatus,
    /// 1-based iteration number within the owning session.
    pub iteration_number: u64,
}
