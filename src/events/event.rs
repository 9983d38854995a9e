//! # Runtime notifications emitted by the bus and the shutdown orchestrator.
//!
//! The [`EventKind`] enum classifies notifications across two categories:
//! - **Delivery events**: handler failures and dropped messages on the event bus
//! - **Shutdown events**: phase changes and per-task outcomes
//!
//! The [`Event`] struct carries additional metadata such as timestamps, task name,
//! subscriber name, reasons and durations.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use termvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::TaskError)
//!     .with_task("flush-cache")
//!     .with_reason("disk full")
//!     .with_duration(Duration::from_millis(12));
//!
//! assert_eq!(ev.kind, EventKind::TaskError);
//! assert_eq!(ev.task.as_deref(), Some("flush-cache"));
//! assert_eq!(ev.duration_ms, Some(12));
//! ```

use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Delivery events ===
    /// A subscriber handler failed or panicked.
    ///
    /// Sets:
    /// - `subscriber`: subscriber name
    /// - `message_id`: id of the message being delivered
    /// - `reason`: handler error message
    DeliveryError,

    /// A pending message was discarded without delivery.
    ///
    /// Sets:
    /// - `message_id`: id of the dropped message
    /// - `reason`: `"ttl_expired"` or `"queue_full"`
    MessageDropped,

    // === Shutdown task events ===
    /// Shutdown task is about to execute.
    ///
    /// Sets:
    /// - `task`: task id
    TaskStarting,

    /// Shutdown task finished successfully.
    ///
    /// Sets:
    /// - `task`: task id
    /// - `duration_ms`: execution time
    TaskComplete,

    /// Shutdown task failed (error, panic or timeout).
    ///
    /// Sets:
    /// - `task`: task id
    /// - `reason`: error message
    /// - `duration_ms`: execution time
    TaskError,

    /// Shutdown task lost the race against its timer (always followed by `TaskError`).
    ///
    /// Sets:
    /// - `task`: task id
    /// - `timeout_ms`: configured timeout
    TaskTimeout,

    /// Non-critical task skipped because the orchestrator is in forced mode.
    ///
    /// Sets:
    /// - `task`: task id
    TaskSkipped,

    /// A critical task failed during the graceful phase; escalation requested.
    ///
    /// Sets:
    /// - `task`: failed task id
    /// - `reason`: failure message
    RequestForcedShutdown,

    // === Shutdown phase events ===
    /// Graceful shutdown initiated.
    ///
    /// Sets:
    /// - `reason`: initiation reason
    ShutdownInitiated,

    /// Orchestrator entered forced mode.
    ///
    /// Sets:
    /// - `reason`: escalation reason
    ForcedShutdown,

    /// All applicable tasks have been attempted.
    ///
    /// Sets:
    /// - `duration_ms`: time since initiation
    ShutdownComplete,

    /// The absolute teardown budget was exceeded; the host must terminate.
    ///
    /// Sets:
    /// - `timeout_ms`: absolute budget
    ForceDeadlineExceeded,
}

impl EventKind {
    /// Stable kebab-case name (for logs).
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::DeliveryError => "delivery-error",
            EventKind::MessageDropped => "message-dropped",
            EventKind::TaskStarting => "task-starting",
            EventKind::TaskComplete => "task-complete",
            EventKind::TaskError => "task-error",
            EventKind::TaskTimeout => "task-timeout",
            EventKind::TaskSkipped => "task-skipped",
            EventKind::RequestForcedShutdown => "request-forced-shutdown",
            EventKind::ShutdownInitiated => "shutdown-initiated",
            EventKind::ForcedShutdown => "forced-shutdown",
            EventKind::ShutdownComplete => "shutdown-complete",
            EventKind::ForceDeadlineExceeded => "force-deadline-exceeded",
        }
    }
}

/// Runtime notification with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Shutdown task id, if applicable.
    pub task: Option<Arc<str>>,
    /// Bus subscriber name, if applicable.
    pub subscriber: Option<Arc<str>>,
    /// Bus message id, if applicable.
    pub message_id: Option<Arc<str>>,
    /// Human-readable reason (errors, drop causes, etc.).
    pub reason: Option<Arc<str>>,
    /// Elapsed time in milliseconds.
    pub duration_ms: Option<u64>,
    /// Configured timeout in milliseconds.
    pub timeout_ms: Option<u64>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            task: None,
            subscriber: None,
            message_id: None,
            reason: None,
            duration_ms: None,
            timeout_ms: None,
        }
    }

    /// Attaches a shutdown task id.
    #[inline]
    pub fn with_task(mut self, task: impl Into<Arc<str>>) -> Self {
        self.task = Some(task.into());
        self
    }

    /// Attaches a subscriber name.
    #[inline]
    pub fn with_subscriber(mut self, name: impl Into<Arc<str>>) -> Self {
        self.subscriber = Some(name.into());
        self
    }

    /// Attaches a message id.
    #[inline]
    pub fn with_message(mut self, id: impl Into<Arc<str>>) -> Self {
        self.message_id = Some(id.into());
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches an elapsed duration (stored in milliseconds, saturating).
    #[inline]
    pub fn with_duration(mut self, d: Duration) -> Self {
        self.duration_ms = Some(u64::try_from(d.as_millis()).unwrap_or(u64::MAX));
        self
    }

    /// Attaches a timeout (stored in milliseconds, saturating).
    #[inline]
    pub fn with_timeout(mut self, d: Duration) -> Self {
        self.timeout_ms = Some(u64::try_from(d.as_millis()).unwrap_or(u64::MAX));
        self
    }

    /// Checks whether the event belongs to the shutdown lifecycle.
    #[inline]
    pub fn is_shutdown(&self) -> bool {
        !matches!(
            self.kind,
            EventKind::DeliveryError | EventKind::MessageDropped
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_numbers_increase() {
        let a = Event::new(EventKind::TaskStarting);
        let b = Event::new(EventKind::TaskStarting);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn delivery_events_are_not_shutdown_events() {
        assert!(!Event::new(EventKind::DeliveryError).is_shutdown());
        assert!(Event::new(EventKind::ShutdownComplete).is_shutdown());
    }
}
