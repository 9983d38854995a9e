//! Error types used by the termvisor runtime.
//!
//! This module defines the error enums for each failure class of the runtime:
//!
//! - [`HandlerError`]: a bus subscriber failed while handling a message (recovered locally).
//! - [`TaskError`]: a shutdown task failed, panicked or timed out (recorded, never thrown).
//! - [`ViewError`]: a view lifecycle hook reported a failure.
//! - [`NavigationError`]: a navigation operation did not complete (propagated to the caller).
//!
//! All types provide helper methods (`as_label`, `as_message`) for logging/metrics.

use std::time::Duration;
use thiserror::Error;

/// # Errors produced by bus subscribers.
///
/// Returned from [`Subscribe::on_message`](crate::Subscribe::on_message) or synthesized
/// by the bus when a handler panics. Never fatal to the bus.
#[non_exhaustive]
#[derive(Error, Debug, Clone)]
pub enum HandlerError {
    /// Handler returned an error.
    #[error("handler failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Handler panicked; the panic was caught by the bus.
    #[error("handler panicked: {info}")]
    Panicked {
        /// Panic payload rendered as text.
        info: String,
    },
}

impl HandlerError {
    /// Convenience constructor for [`HandlerError::Fail`].
    pub fn fail(error: impl Into<String>) -> Self {
        HandlerError::Fail {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use termvisor::HandlerError;
    ///
    /// let err = HandlerError::fail("boom");
    /// assert_eq!(err.as_label(), "handler_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            HandlerError::Fail { .. } => "handler_failed",
            HandlerError::Panicked { .. } => "handler_panicked",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            HandlerError::Fail { error } => format!("error: {error}"),
            HandlerError::Panicked { info } => format!("panic: {info}"),
        }
    }
}

/// # Errors produced by shutdown task execution.
///
/// Task failures are recorded in the shutdown state and reported through callbacks and
/// notifications; they never escape [`ShutdownOrchestrator::execute_shutdown_tasks`](crate::ShutdownOrchestrator::execute_shutdown_tasks).
#[non_exhaustive]
#[derive(Error, Debug, Clone)]
pub enum TaskError {
    /// Task execution exceeded its timeout duration.
    #[error("timed out after {timeout:?}")]
    Timeout {
        /// The timeout duration that was exceeded.
        timeout: Duration,
    },

    /// Task execution failed.
    #[error("execution failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// Task panicked while executing.
    #[error("task panicked: {info}")]
    Panicked {
        /// Panic payload rendered as text.
        info: String,
    },

    /// Task observed cancellation and gave up.
    #[error("context cancelled")]
    Canceled,
}

impl TaskError {
    /// Convenience constructor for [`TaskError::Fail`].
    pub fn fail(error: impl Into<String>) -> Self {
        TaskError::Fail {
            error: error.into(),
        }
    }

    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use termvisor::TaskError;
    /// use std::time::Duration;
    ///
    /// let err = TaskError::Timeout { timeout: Duration::from_secs(1) };
    /// assert_eq!(err.as_label(), "task_timeout");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Timeout { .. } => "task_timeout",
            TaskError::Fail { .. } => "task_failed",
            TaskError::Panicked { .. } => "task_panicked",
            TaskError::Canceled => "task_canceled",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            TaskError::Timeout { timeout } => format!("timeout: {timeout:?}"),
            TaskError::Fail { error } => format!("error: {error}"),
            TaskError::Panicked { info } => format!("panic: {info}"),
            TaskError::Canceled => "context cancelled".to_string(),
        }
    }

    /// Returns `true` when the task lost the race against its timer.
    pub fn is_timeout(&self) -> bool {
        matches!(self, TaskError::Timeout { .. })
    }
}

/// Failure reported by a [`View`](crate::View) lifecycle hook.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ViewError(pub String);

impl ViewError {
    /// Creates a new view error with the given message.
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

impl From<&str> for ViewError {
    fn from(msg: &str) -> Self {
        Self(msg.to_string())
    }
}

impl From<String> for ViewError {
    fn from(msg: String) -> Self {
        Self(msg)
    }
}

/// Lifecycle hook that failed during a navigation operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hook {
    Mount,
    Unmount,
    SaveState,
    RestoreState,
}

impl Hook {
    /// Stable lowercase name of the hook.
    pub fn as_str(&self) -> &'static str {
        match self {
            Hook::Mount => "mount",
            Hook::Unmount => "unmount",
            Hook::SaveState => "save_state",
            Hook::RestoreState => "restore_state",
        }
    }
}

impl std::fmt::Display for Hook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// # Errors produced by navigation operations.
///
/// Unlike delivery and task errors these are **propagated** to the caller, who must
/// know that a transition did not complete cleanly.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NavigationError {
    /// No view with this id is registered.
    #[error("view '{view}' is not registered")]
    ViewNotRegistered {
        /// Requested view id.
        view: String,
    },

    /// A view with this id is already registered.
    #[error("view '{view}' is already registered")]
    ViewAlreadyRegistered {
        /// Conflicting view id.
        view: String,
    },

    /// No tab with this id exists.
    #[error("tab '{tab}' not found")]
    TabNotFound {
        /// Requested tab id.
        tab: String,
    },

    /// A view lifecycle hook failed.
    #[error("{hook} hook of view '{view}' failed: {error}")]
    Hook {
        /// View whose hook failed.
        view: String,
        /// Which hook failed.
        hook: Hook,
        /// Error reported by the hook.
        error: ViewError,
    },
}

impl NavigationError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            NavigationError::ViewNotRegistered { .. } => "nav_view_not_registered",
            NavigationError::ViewAlreadyRegistered { .. } => "nav_view_already_registered",
            NavigationError::TabNotFound { .. } => "nav_tab_not_found",
            NavigationError::Hook { .. } => "nav_hook_failed",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            NavigationError::ViewNotRegistered { view } => format!("unknown view: {view}"),
            NavigationError::ViewAlreadyRegistered { view } => format!("duplicate view: {view}"),
            NavigationError::TabNotFound { tab } => format!("unknown tab: {tab}"),
            NavigationError::Hook { view, hook, error } => {
                format!("view={view} hook={hook} error={error}")
            }
        }
    }

    pub(crate) fn hook(view: &str, hook: Hook, error: ViewError) -> Self {
        NavigationError::Hook {
            view: view.to_string(),
            hook,
            error,
        }
    }
}

/// Renders a caught panic payload as text.
pub(crate) fn panic_info(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_stable() {
        assert_eq!(HandlerError::fail("x").as_label(), "handler_failed");
        assert_eq!(TaskError::Canceled.as_label(), "task_canceled");
        assert_eq!(
            NavigationError::TabNotFound { tab: "t".into() }.as_label(),
            "nav_tab_not_found"
        );
    }

    #[test]
    fn hook_error_message_names_view_and_hook() {
        let err = NavigationError::hook("settings", Hook::Unmount, ViewError::from("busy"));
        assert_eq!(err.to_string(), "unmount hook of view 'settings' failed: busy");
        assert_eq!(err.as_message(), "view=settings hook=unmount error=busy");
    }

    #[test]
    fn panic_info_downcasts_common_payloads() {
        let boxed: Box<dyn std::any::Any + Send> = Box::new("static");
        assert_eq!(panic_info(&*boxed), "static");
        let boxed: Box<dyn std::any::Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_info(&*boxed), "owned");
        let boxed: Box<dyn std::any::Any + Send> = Box::new(42u8);
        assert_eq!(panic_info(&*boxed), "unknown panic");
    }
}
