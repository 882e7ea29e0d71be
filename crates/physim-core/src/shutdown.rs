//! Cooperative cancellation for the tick loop.
//!
//! Cancellation is expected control flow, not an error: the loop checks
//! the token at the top of each iteration and races it against the
//! inter-tick sleep, then performs its best-effort session-end write
//! before exiting.

use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::Notify;

/// One-shot cancellation token shared between the tick loop and the
/// process shutdown path.
#[derive(Debug, Default)]
pub struct ShutdownToken {
    cancelled: AtomicBool,
    notify: Notify,
}

impl ShutdownToken {
    /// Create a token in the not-cancelled state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation and wake every waiting task.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
        self.notify.notify_waiters();
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }

    /// Resolve once cancellation is requested.
    ///
    /// Usable inside `select!` to interrupt the inter-tick sleep. Returns
    /// immediately if the token is already cancelled.
    pub async fn cancelled(&self) {
        loop {
            if self.is_cancelled() {
                return;
            }
            let notified = self.notify.notified();
            // Re-check after registering so a cancel between the first
            // check and registration cannot be missed.
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }
}
