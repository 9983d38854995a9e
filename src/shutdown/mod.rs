//! # Shutdown orchestration.
//!
//! - [`ShutdownOrchestrator`] - phase machine, task runner, timers, signal and fault wiring
//! - [`ShutdownState`] / [`ShutdownPhase`] / [`ShutdownMetrics`] - progress snapshots
//! - [`ShutdownSignal`] / [`SignalAction`] / [`listen_for_signals`] - OS signal mapping
//! - [`unmount_views_task`] / [`flush_event_bus_task`] - teardown of the runtime's own services

mod builtin;
mod orchestrator;
mod runner;
mod signals;
mod state;
mod timers;

pub use builtin::{
    flush_event_bus_task, unmount_views_task, FLUSH_EVENT_BUS_TASK, UNMOUNT_VIEWS_TASK,
};
pub use orchestrator::{ExitHook, ShutdownOrchestrator, TaskCompleteHook, TaskErrorHook};
pub use signals::{listen_for_signals, ShutdownSignal, SignalAction};
pub use state::{ShutdownMetrics, ShutdownPhase, ShutdownState};
pub use timers::ActiveTimeout;
