//! Simulation clock: run/stop state, session identity, and the iteration
//! counter.
//!
//! The clock is the single source of truth for "is a session active". All
//! of its mutable state -- the running flag, start time, iteration
//! counter, current session identifier, live configuration, and the rng
//! -- sits behind one mutex, so the tick loop, an on-demand snapshot
//! request, and concurrent start/stop calls can never observe a
//! half-applied transition. Contention is tick-rate scale; finer locking
//! would buy nothing.

use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use physim_types::{Sample, SessionId, SimulationConfig, SimulationStatus};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::generator;

/// Mutable clock state guarded by the clock's mutex.
#[derive(Debug)]
struct ClockState {
    /// Whether a session is currently active.
    running: bool,
    /// Wall-clock time the current (or last) session started.
    start_time: Option<DateTime<Utc>>,
    /// Iterations generated since the current session started.
    iteration: u64,
    /// Identifier of the active session, present only while running.
    session_id: Option<SessionId>,
    /// Live generator configuration, replaced wholesale on update.
    config: SimulationConfig,
    /// Randomness source for the generator.
    rng: StdRng,
}

/// Shared simulation clock.
///
/// Wrapped in an `Arc` and shared between the tick loop and request
/// handlers. Every operation takes `&self`; interior mutability is
/// confined to the single mutex.
#[derive(Debug)]
pub struct SimulationClock {
    state: Mutex<ClockState>,
}

impl SimulationClock {
    /// Create a clock in the idle state with OS-seeded randomness.
    pub fn new(config: SimulationConfig) -> Self {
        Self::with_rng(config, StdRng::from_os_rng())
    }

    /// Create a clock with an explicit rng (deterministic tests).
    pub fn with_rng(config: SimulationConfig, rng: StdRng) -> Self {
        Self {
            state: Mutex::new(ClockState {
                running: false,
                start_time: None,
                iteration: 0,
                session_id: None,
                config,
                rng,
            }),
        }
    }

    /// Acquire the state mutex, recovering from poisoning.
    ///
    /// Clock operations never panic while holding the lock, but a
    /// poisoned mutex must not take the whole stream down.
    fn lock(&self) -> MutexGuard<'_, ClockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Begin a new session and return its identifier.
    ///
    /// Resets the iteration counter, records the start time, and stores a
    /// fresh session identifier. Starting while already running silently
    /// replaces the in-memory session; the previous session's durable
    /// record is the caller's responsibility to end.
    pub fn start(&self) -> SessionId {
        let session_id = SessionId::new();
        let mut state = self.lock();
        state.running = true;
        state.start_time = Some(Utc::now());
        state.iteration = 0;
        state.session_id = Some(session_id);
        session_id
    }

    /// Stop the current session, returning its identifier if one was active.
    ///
    /// The iteration counter is left untouched so callers can still read
    /// the final count after stopping.
    pub fn stop(&self) -> Option<SessionId> {
        let mut state = self.lock();
        state.running = false;
        state.session_id.take()
    }

    /// Whether a session is currently active.
    pub fn is_running(&self) -> bool {
        self.lock().running
    }

    /// The most recently assigned iteration number.
    pub fn current_iteration(&self) -> u64 {
        self.lock().iteration
    }

    /// Identifier of the active session, if any.
    pub fn current_session_id(&self) -> Option<SessionId> {
        self.lock().session_id
    }

    /// Snapshot the clock state for the status endpoint.
    pub fn status(&self, connected_clients: usize) -> SimulationStatus {
        let state = self.lock();
        SimulationStatus {
            running: state.running,
            total_iterations: state.iteration,
            current_iteration: state.iteration,
            start_time: state.start_time,
            connected_clients,
        }
    }

    /// Return a copy of the live configuration.
    pub fn config(&self) -> SimulationConfig {
        self.lock().config.clone()
    }

    /// Replace the configuration wholesale.
    ///
    /// Takes effect from the next tick; readers never observe a partial
    /// update. Bounds are not cross-validated.
    pub fn update_config(&self, config: SimulationConfig) {
        self.lock().config = config;
    }

    /// Read the current tick interval in milliseconds.
    pub fn update_interval_ms(&self) -> u64 {
        self.lock().config.update_interval_ms
    }

    /// Generate the next sample for the active session.
    ///
    /// Returns `None` when the clock is idle. Otherwise assigns the next
    /// iteration number (1-based, strictly increasing, exactly once per
    /// sample) and delegates to the generator with the elapsed session
    /// time. Safe under concurrent callers: the tick loop and an
    /// on-demand snapshot request serialize on the clock mutex.
    pub fn generate_sample(&self) -> Option<Sample> {
        let mut state = self.lock();
        if !state.running {
            return None;
        }

        let now = Utc::now();
        state.iteration = state.iteration.saturating_add(1);
        let started = state.start_time.unwrap_or(now);
        let elapsed = elapsed_seconds(started, now);

        let iteration = state.iteration;
        let config = state.config.clone();
        let sample = generator::generate(elapsed, &config, iteration, &mut state.rng);
        Some(sample)
    }
}

/// Elapsed fractional seconds between two instants, floored at zero.
#[allow(clippy::cast_precision_loss)]
fn elapsed_seconds(start: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let millis = now.signed_duration_since(start).num_milliseconds().max(0);
    millis as f64 / 1000.0
}
