//! # Shutdown phase machine.
//!
//! ```text
//! Idle ──initiate──► Graceful ──all tasks attempted──► Complete
//!                       │
//!                       └─escalate──► Forced ──all critical tasks attempted──► Complete
//! ```
//!
//! Transitions are forward-only; `Forced` is only entered from `Graceful`.

use std::fmt;
use std::time::{Duration, SystemTime};

use tokio::time::Instant;

/// Orchestrator phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum ShutdownPhase {
    #[default]
    Idle,
    Graceful,
    Forced,
    Complete,
}

impl ShutdownPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShutdownPhase::Idle => "idle",
            ShutdownPhase::Graceful => "graceful",
            ShutdownPhase::Forced => "forced",
            ShutdownPhase::Complete => "complete",
        }
    }
}

impl fmt::Display for ShutdownPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of orchestrator progress.
#[derive(Debug, Clone, Default)]
pub struct ShutdownState {
    pub phase: ShutdownPhase,
    pub initiated: bool,
    /// Wall-clock initiation time.
    pub started_at: Option<SystemTime>,
    pub reason: Option<String>,
    /// Task ids in completion order.
    pub completed: Vec<String>,
    pub failed: Vec<String>,
    pub skipped: Vec<String>,
    /// Task executing right now.
    pub current: Option<String>,
    /// Whether teardown was escalated to forced mode.
    pub forced: bool,
    pub forced_reason: Option<String>,
    pub(crate) started: Option<Instant>,
    pub(crate) finished: Option<Instant>,
}

impl ShutdownState {
    /// `Idle → Graceful`. Returns `false` when already initiated.
    pub(crate) fn begin(&mut self, reason: &str) -> bool {
        if self.initiated {
            return false;
        }
        self.initiated = true;
        self.phase = ShutdownPhase::Graceful;
        self.reason = Some(reason.to_string());
        self.started_at = Some(SystemTime::now());
        self.started = Some(Instant::now());
        true
    }

    /// `Graceful → Forced`. Returns `false` from any other phase.
    pub(crate) fn escalate(&mut self, reason: &str) -> bool {
        if self.phase != ShutdownPhase::Graceful {
            return false;
        }
        self.phase = ShutdownPhase::Forced;
        self.forced = true;
        self.forced_reason = Some(reason.to_string());
        true
    }

    /// `Graceful | Forced → Complete`.
    pub(crate) fn finish(&mut self) -> bool {
        if !matches!(self.phase, ShutdownPhase::Graceful | ShutdownPhase::Forced) {
            return false;
        }
        self.phase = ShutdownPhase::Complete;
        self.current = None;
        self.finished = Some(Instant::now());
        true
    }

    /// Time since initiation, frozen at completion.
    pub fn elapsed(&self) -> Duration {
        match (self.started, self.finished) {
            (Some(s), Some(f)) => f.saturating_duration_since(s),
            (Some(s), None) => s.elapsed(),
            _ => Duration::ZERO,
        }
    }
}

/// Summary returned by [`ShutdownOrchestrator::execute_shutdown_tasks`](crate::ShutdownOrchestrator::execute_shutdown_tasks)
/// and [`ShutdownOrchestrator::metrics`](crate::ShutdownOrchestrator::metrics).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShutdownMetrics {
    pub phase: ShutdownPhase,
    pub duration: Duration,
    pub registered: usize,
    pub completed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub forced: bool,
}

impl ShutdownMetrics {
    pub(crate) fn from_state(st: &ShutdownState, registered: usize) -> Self {
        Self {
            phase: st.phase,
            duration: st.elapsed(),
            registered,
            completed: st.completed.len(),
            failed: st.failed.len(),
            skipped: st.skipped.len(),
            forced: st.forced,
        }
    }
}
