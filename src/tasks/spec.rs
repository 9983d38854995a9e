//! # Shutdown task description.
//!
//! [`ShutdownTask`] bundles a teardown [`Task`] with the metadata the orchestrator needs:
//! a unique id, a display name, the `critical` flag, an optional timeout and optional
//! per-task callbacks.
//!
//! ## Rules
//! - Ids are unique per orchestrator; registering a duplicate id is rejected.
//! - A task without its own timeout inherits [`ShutdownConfig::task_timeout`](crate::ShutdownConfig::task_timeout)
//!   at registration.
//! - Non-critical tasks are skipped once the orchestrator is in forced mode.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//! use termvisor::{ShutdownTask, TaskError};
//!
//! let task = ShutdownTask::from_fn("save-session", "Save session", |_ctx: CancellationToken| async {
//!     Ok::<_, TaskError>(())
//! })
//! .critical()
//! .with_timeout(Duration::from_secs(2));
//!
//! assert!(task.is_critical());
//! assert_eq!(task.timeout(), Some(Duration::from_secs(2)));
//! ```

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::TaskError;
use crate::tasks::{Task, TaskFn, TaskRef};

/// Per-task error callback.
pub type ErrorCallback = Arc<dyn Fn(&TaskError) + Send + Sync>;
/// Per-task completion callback.
pub type CompleteCallback = Arc<dyn Fn() + Send + Sync>;

/// Registered unit of teardown work.
#[derive(Clone)]
pub struct ShutdownTask {
    id: Arc<str>,
    name: Arc<str>,
    critical: bool,
    timeout: Option<Duration>,
    action: TaskRef,
    on_error: Option<ErrorCallback>,
    on_complete: Option<CompleteCallback>,
}

impl ShutdownTask {
    /// Creates a non-critical task with no explicit timeout.
    pub fn new(id: impl Into<Arc<str>>, name: impl Into<Arc<str>>, action: TaskRef) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            critical: false,
            timeout: None,
            action,
            on_error: None,
            on_complete: None,
        }
    }

    /// Creates a task from a closure (see [`TaskFn`]).
    pub fn from_fn<F, Fut>(id: impl Into<Arc<str>>, name: impl Into<Arc<str>>, f: F) -> Self
    where
        F: Fn(CancellationToken) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
    {
        Self::new(id, name, TaskFn::arc(f))
    }

    /// Marks the task as critical: it still runs in forced mode, and its failure
    /// during the graceful phase escalates to forced mode.
    pub fn critical(mut self) -> Self {
        self.critical = true;
        self
    }

    /// Sets the per-task timeout. `Duration::ZERO` disables the timer.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn on_error(mut self, f: impl Fn(&TaskError) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Arc::new(f));
        self
    }

    pub fn on_complete(mut self, f: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_complete = Some(Arc::new(f));
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_critical(&self) -> bool {
        self.critical
    }

    /// Effective timeout, if any (`ZERO` is reported as `None`).
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout.filter(|d| !d.is_zero())
    }

    pub(crate) fn id_arc(&self) -> Arc<str> {
        Arc::clone(&self.id)
    }

    pub(crate) fn action(&self) -> &dyn Task {
        self.action.as_ref()
    }

    pub(crate) fn error_callback(&self) -> Option<&ErrorCallback> {
        self.on_error.as_ref()
    }

    pub(crate) fn complete_callback(&self) -> Option<&CompleteCallback> {
        self.on_complete.as_ref()
    }

    /// Fills in `timeout` when the task did not set one.
    pub(crate) fn inherit_timeout(&mut self, default: Option<Duration>) {
        if self.timeout.is_none() {
            self.timeout = default;
        }
    }
}

impl fmt::Debug for ShutdownTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShutdownTask")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("critical", &self.critical)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
