//! # Runtime configuration.
//!
//! Provides [`RuntimeConfig`], the centralized settings for the three runtime services:
//! - [`BusConfig`] for the priority event bus,
//! - [`NavigationConfig`] for the navigation stack,
//! - [`ShutdownConfig`] for the shutdown orchestrator.
//!
//! Config is used in two ways:
//! 1. **Runtime creation**: `Runtime::builder(config)`
//! 2. **Standalone services**: `EventBus::new(config.bus, notifier)` and friends
//!
//! ## Sentinel values
//! - `max_queue_size = 0`, `batch_size = 0`, `max_history = 0` (navigation) are clamped to `1`
//! - `max_history = 0` (bus) disables message history
//! - `task_timeout = 0s` → tasks without an explicit timeout run unbounded

use std::time::Duration;

/// Settings of the priority event bus.
#[derive(Clone, Debug)]
pub struct BusConfig {
    /// Maximum number of pending messages before backpressure drops the lowest priority one.
    pub max_queue_size: usize,
    /// Number of delivered messages retained for introspection (`0` = no history).
    pub max_history: usize,
    /// Messages delivered per drain batch before yielding to other tasks.
    pub batch_size: usize,
}

impl BusConfig {
    /// Returns the queue capacity clamped to a minimum of 1.
    #[inline]
    pub fn queue_capacity(&self) -> usize {
        self.max_queue_size.max(1)
    }

    /// Returns the drain batch size clamped to a minimum of 1.
    #[inline]
    pub fn batch_size_clamped(&self) -> usize {
        self.batch_size.max(1)
    }
}

impl Default for BusConfig {
    /// Default configuration:
    ///
    /// - `max_queue_size = 1000`
    /// - `max_history = 100`
    /// - `batch_size = 10`
    fn default() -> Self {
        Self {
            max_queue_size: 1000,
            max_history: 100,
            batch_size: 10,
        }
    }
}

/// Settings of the navigation stack.
#[derive(Clone, Debug)]
pub struct NavigationConfig {
    /// Maximum number of entries kept in the navigation history.
    pub max_history: usize,
}

impl NavigationConfig {
    /// Returns the stack capacity clamped to a minimum of 1.
    #[inline]
    pub fn stack_capacity(&self) -> usize {
        self.max_history.max(1)
    }
}

impl Default for NavigationConfig {
    /// `max_history = 50`.
    fn default() -> Self {
        Self { max_history: 50 }
    }
}

/// Settings of the shutdown orchestrator.
///
/// ## Timeline
/// ```text
/// initiate()                graceful_timeout          graceful_timeout + force_timeout
///     │──────── graceful ───────────│──────── forced ──────────────│
///                                   └► set_force_mode()            └► ForceDeadlineExceeded
///                                                                     (+ process exit)
/// ```
#[derive(Clone, Debug)]
pub struct ShutdownConfig {
    /// Budget for the graceful phase; on expiry the orchestrator escalates to forced mode.
    pub graceful_timeout: Duration,
    /// Additional budget for the forced phase, counted from the end of the graceful budget.
    pub force_timeout: Duration,
    /// Timeout applied to tasks registered without an explicit one (`0s` = unbounded).
    pub task_timeout: Duration,
    /// Whether the absolute deadline terminates the process.
    ///
    /// When `false` the deadline is still reported through a notification.
    pub exit_on_deadline: bool,
    /// Exit code used when the absolute deadline terminates the process.
    pub force_exit_code: i32,
}

impl ShutdownConfig {
    /// Default per-task timeout as an `Option` (`None` when set to zero).
    #[inline]
    pub fn default_task_timeout(&self) -> Option<Duration> {
        if self.task_timeout == Duration::ZERO {
            None
        } else {
            Some(self.task_timeout)
        }
    }

    /// Absolute budget for the whole teardown, measured from initiation.
    #[inline]
    pub fn absolute_deadline(&self) -> Duration {
        self.graceful_timeout.saturating_add(self.force_timeout)
    }
}

impl Default for ShutdownConfig {
    /// Default configuration:
    ///
    /// - `graceful_timeout = 10s`
    /// - `force_timeout = 5s`
    /// - `task_timeout = 5s`
    /// - `exit_on_deadline = true`, `force_exit_code = 1`
    fn default() -> Self {
        Self {
            graceful_timeout: Duration::from_secs(10),
            force_timeout: Duration::from_secs(5),
            task_timeout: Duration::from_secs(5),
            exit_on_deadline: true,
            force_exit_code: 1,
        }
    }
}

/// Global configuration for the runtime.
///
/// ## Field semantics
/// - `bus`: event bus queue, history and batching
/// - `navigation`: history capacity
/// - `shutdown`: phase budgets and task defaults
/// - `notify_capacity`: ring buffer size of the runtime notification channel (min 1)
#[derive(Clone, Debug)]
pub struct RuntimeConfig {
    pub bus: BusConfig,
    pub navigation: NavigationConfig,
    pub shutdown: ShutdownConfig,
    pub notify_capacity: usize,
}

impl RuntimeConfig {
    /// Returns the notification capacity clamped to a minimum of 1.
    #[inline]
    pub fn notify_capacity_clamped(&self) -> usize {
        self.notify_capacity.max(1)
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            bus: BusConfig::default(),
            navigation: NavigationConfig::default(),
            shutdown: ShutdownConfig::default(),
            notify_capacity: 256,
        }
    }
}
