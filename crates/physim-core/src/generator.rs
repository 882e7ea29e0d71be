//! Pure sample computation from elapsed time, configuration, and randomness.
//!
//! The generator performs no I/O and holds no state: given the same rng
//! draws it always produces the same reading. The formulas model a
//! warming, gradually accelerating process -- temperature oscillates and
//! drifts upward, pressure varies inversely with temperature, velocity
//! ramps over the first minute, and energy is derived from both.

use chrono::Utc;
use physim_types::{Sample, SampleStatus, SimulationConfig};
use rand::Rng;

/// Temperature above which a sample is classified [`SampleStatus::Critical`].
const CRITICAL_TEMPERATURE: f64 = 90.0;

/// Temperature above which a sample is classified [`SampleStatus::Warning`].
const WARNING_TEMPERATURE: f64 = 75.0;

/// Pressure below which a sample is classified [`SampleStatus::Warning`].
const WARNING_PRESSURE: f64 = 2.0;

/// Velocity above which a sample is classified [`SampleStatus::HighActivity`].
const HIGH_ACTIVITY_VELOCITY: f64 = 40.0;

/// Compute one reading for the given elapsed session time.
///
/// Draws three uniform values from `rng` in a fixed order (temperature,
/// pressure, velocity), so a seeded rng yields a reproducible sample.
/// All readings are rounded to 2 decimal places before being returned.
/// The caller assigns the iteration number; the generator stamps it into
/// the returned sample unchanged.
pub fn generate(
    elapsed_seconds: f64,
    config: &SimulationConfig,
    iteration_number: u64,
    rng: &mut impl Rng,
) -> Sample {
    // Temperature increases with time and oscillates.
    let temperature = config.temperature_min
        + (config.temperature_max - config.temperature_min)
            * (0.5 + 0.3 * (elapsed_seconds / 10.0).sin() + 0.2 * rng.random::<f64>());

    // Pressure varies inversely with temperature.
    let pressure = config.pressure_max
        - (temperature - config.temperature_min)
            / (config.temperature_max - config.temperature_min)
            * (config.pressure_max - config.pressure_min)
        + rng.random::<f64>() * 0.5;

    // Velocity ramps toward its upper bound over the first 60 seconds.
    let velocity = config.velocity_min
        + (config.velocity_max - config.velocity_min) * (elapsed_seconds / 60.0).min(1.0)
        + (rng.random::<f64>() - 0.5) * 5.0;

    let energy = 0.5 * velocity * velocity + temperature * 2.5;

    let status = classify(temperature, pressure, velocity);

    Sample {
        timestamp: Utc::now(),
        temperature: round2(temperature),
        pressure: round2(pressure),
        velocity: round2(velocity),
        energy: round2(energy),
        status,
        iteration_number,
    }
}

/// Classify a reading; the first matching threshold wins.
const fn classify(temperature: f64, pressure: f64, velocity: f64) -> SampleStatus {
    if temperature > CRITICAL_TEMPERATURE {
        SampleStatus::Critical
    } else if temperature > WARNING_TEMPERATURE || pressure < WARNING_PRESSURE {
        SampleStatus::Warning
    } else if velocity > HIGH_ACTIVITY_VELOCITY {
        SampleStatus::HighActivity
    } else {
        SampleStatus::Normal
    }
}

/// Round to 2 decimal places.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
