//! Shared application state for the observer API server.
//!
//! [`AppState`] bundles the handles every request path needs: the
//! simulation clock (single mutual-exclusion boundary over run state),
//! the subscriber registry for real-time fan-out, and the history pool
//! for paginated reads and control-path session writes. Cloning is
//! cheap; the clock and registry are shared behind [`Arc`]s and the pool
//! is itself a cheap handle.
//!
//! Sample persistence does not flow through here: the tick loop hands
//! samples to the history-writer work queue directly, so a slow store
//! never adds latency to request handling or live delivery.

use std::sync::Arc;

use physim_core::{SimulationClock, SubscriberRegistry};
use physim_db::HistoryPool;

/// Shared state for the Axum application, injected via the `State`
/// extractor.
#[derive(Clone)]
pub struct AppState {
    /// The simulation clock shared with the tick loop.
    pub clock: Arc<SimulationClock>,
    /// Registry of connected real-time subscribers.
    pub registry: Arc<SubscriberRegistry>,
    /// History database pool for reads and control-path session writes.
    pub pool: HistoryPool,
}

impl AppState {
    /// Assemble the application state from its shared parts.
    pub const fn new(
        clock: Arc<SimulationClock>,
        registry: Arc<SubscriberRegistry>,
        pool: HistoryPool,
    ) -> Self {
        Self {
            clock,
            registry,
            pool,
        }
    }
}
