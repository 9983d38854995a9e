//! # Notification channel for runtime events.
//!
//! [`Notifier`] is a thin wrapper around [`tokio::sync::broadcast`] that provides
//! non-blocking publishing of [`Event`]s from the event bus and the shutdown
//! orchestrator to any number of observers (logging, metrics, host UI).
//!
//! ## Architecture
//! ```text
//! Publishers:                          Observers:
//!   EventBus ─────────────┐        ┌──► LogWriter (tracing)
//!   ShutdownOrchestrator ─┼─► Notifier ──► host receivers
//!   shutdown runner ──────┘        └──► tests
//! ```
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never blocks; it calls `broadcast::Sender::send`.
//! - **Bounded capacity**: a single ring buffer stores recent events for all receivers.
//! - **Lag handling**: slow receivers get `RecvError::Lagged(n)` and skip `n` oldest items.
//! - **No persistence**: events are lost if there are no active receivers at send time.

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for runtime notifications.
///
/// Cheap to clone (internally holds an `Arc`-backed sender).
#[derive(Clone, Debug)]
pub struct Notifier {
    tx: broadcast::Sender<Event>,
}

impl Notifier {
    /// Creates a new notifier with the given channel capacity (clamped to 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel::<Event>(capacity.max(1));
        Self { tx }
    }

    /// Publishes an event to all active receivers.
    ///
    /// If there are no receivers, the event is dropped.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates a new receiver that will observe subsequent events.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }

    /// Number of live receivers.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(256)
    }
}
