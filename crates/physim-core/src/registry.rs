//! Connected-subscriber tracking with broadcast-to-all and send-to-one.
//!
//! Each subscriber is an opaque send handle: the WebSocket layer registers
//! an unbounded channel sender and forwards whatever arrives on the
//! receiving end to its socket. Join and leave are independent of the
//! tick loop; a subscriber that joins mid-tick starts receiving from the
//! next broadcast, and delivery to a subscriber that has already gone is
//! a swallowed no-op, never an error.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use physim_types::{StreamEvent, SubscriberId};
use tokio::sync::mpsc;
use tracing::debug;

/// Registry of live subscribers keyed by their identifier.
#[derive(Debug, Default)]
pub struct SubscriberRegistry {
    subscribers: RwLock<HashMap<SubscriberId, mpsc::UnboundedSender<StreamEvent>>>,
}

impl SubscriberRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber's send handle and return its identifier.
    pub fn register(&self, sender: mpsc::UnboundedSender<StreamEvent>) -> SubscriberId {
        let id = SubscriberId::new();
        self.subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, sender);
        debug!(subscriber = %id, "subscriber registered");
        id
    }

    /// Remove a subscriber. Returns `false` if it was already gone.
    pub fn unregister(&self, id: SubscriberId) -> bool {
        let removed = self
            .subscribers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id)
            .is_some();
        if removed {
            debug!(subscriber = %id, "subscriber unregistered");
        }
        removed
    }

    /// Number of currently registered subscribers.
    pub fn count(&self) -> usize {
        self.subscribers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Deliver an event to every current subscriber.
    ///
    /// Iterates a stable snapshot of the member set taken under the read
    /// lock, so concurrent joins and leaves cannot race the fan-out: a
    /// subscriber joining mid-broadcast simply receives from the next
    /// one. Returns the number of successful deliveries; failed sends to
    /// disconnected subscribers are swallowed.
    pub fn broadcast(&self, event: &StreamEvent) -> usize {
        let snapshot: Vec<(SubscriberId, mpsc::UnboundedSender<StreamEvent>)> = {
            let guard = self
                .subscribers
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            guard.iter().map(|(id, tx)| (*id, tx.clone())).collect()
        };

        let mut delivered: usize = 0;
        for (id, sender) in snapshot {
            if sender.send(event.clone()).is_ok() {
                delivered = delivered.saturating_add(1);
            } else {
                debug!(subscriber = %id, "dropping delivery to gone subscriber");
            }
        }
        delivered
    }

    /// Deliver an event to exactly one subscriber.
    ///
    /// Returns `true` on success; an unknown or disconnected subscriber
    /// yields `false`, never an error.
    pub fn send_to(&self, id: SubscriberId, event: StreamEvent) -> bool {
        let sender = {
            let guard = self
                .subscribers
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            guard.get(&id).cloned()
        };
        match sender {
            Some(tx) => tx.send(event).is_ok(),
            None => false,
        }
    }
}
