//! # LogWriter: notification-to-tracing bridge
//!
//! A minimal listener that forwards every runtime [`Event`] to `tracing`.
//! Hosts decide where the records go by installing a `tracing` subscriber.
//!
//! The services log these outcomes at `debug` only, so each one is reported once at
//! its user-facing level here.
//!
//! ## Example output (with `tracing_subscriber::fmt`)
//! ```text
//! INFO  termvisor: shutdown initiated reason="SIGTERM"
//! DEBUG termvisor: task starting task="unmount-views"
//! WARN  termvisor: task timed out task="flush-cache" timeout_ms=50
//! ERROR termvisor: task failed task="flush-cache" duration_ms=50 err="timed out after 50ms"
//! WARN  termvisor: forced shutdown reason="critical task 'flush-cache' failed"
//! ```

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::events::{Event, EventKind, Notifier};

/// Forwards runtime notifications to `tracing`.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Spawns a listener that logs every event until `token` is cancelled
    /// or the notifier is dropped.
    pub fn spawn(self, notifier: &Notifier, token: CancellationToken) -> JoinHandle<()> {
        let mut rx = notifier.subscribe();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    msg = rx.recv() => match msg {
                        Ok(ev) => self.write(&ev),
                        Err(RecvError::Lagged(n)) => {
                            warn!(skipped = n, "log writer lagged behind notifications");
                        }
                        Err(RecvError::Closed) => break,
                    }
                }
            }
        })
    }

    /// Writes a single event as a `tracing` record.
    pub fn write(&self, e: &Event) {
        let task = e.task.as_deref().unwrap_or("-");
        let reason = e.reason.as_deref().unwrap_or("-");
        match e.kind {
            EventKind::DeliveryError => {
                warn!(
                    subscriber = e.subscriber.as_deref().unwrap_or("-"),
                    message_id = e.message_id.as_deref().unwrap_or("-"),
                    err = reason,
                    "delivery error"
                );
            }
            EventKind::MessageDropped => {
                debug!(
                    message_id = e.message_id.as_deref().unwrap_or("-"),
                    reason, "message dropped"
                );
            }
            EventKind::TaskStarting => debug!(task, "task starting"),
            EventKind::TaskComplete => {
                info!(task, duration_ms = e.duration_ms, "task complete");
            }
            EventKind::TaskError => {
                error!(task, duration_ms = e.duration_ms, err = reason, "task failed");
            }
            EventKind::TaskTimeout => {
                warn!(task, timeout_ms = e.timeout_ms, "task timed out");
            }
            EventKind::TaskSkipped => info!(task, "task skipped in forced mode"),
            EventKind::RequestForcedShutdown => {
                warn!(task, err = reason, "critical task failed; forced shutdown requested");
            }
            EventKind::ShutdownInitiated => info!(reason, "shutdown initiated"),
            EventKind::ForcedShutdown => warn!(reason, "forced shutdown"),
            // The orchestrator logs these itself with the full summary.
            EventKind::ShutdownComplete => {
                debug!(duration_ms = e.duration_ms, "shutdown complete");
            }
            EventKind::ForceDeadlineExceeded => {
                debug!(timeout_ms = e.timeout_ms, "shutdown deadline exceeded");
            }
        }
    }
}
