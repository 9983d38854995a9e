//! # Teardown task abstractions.
//!
//! - [`Task`] - trait for async cancelable teardown actions
//! - [`TaskFn`] - closure-backed implementation
//! - [`TaskRef`] - shared handle (`Arc<dyn Task>`)
//! - [`ShutdownTask`] - action plus id, criticality, timeout and callbacks

mod spec;
mod task;
mod task_fn;

pub use spec::{CompleteCallback, ErrorCallback, ShutdownTask};
pub use task::{Task, TaskRef};
pub use task_fn::TaskFn;
