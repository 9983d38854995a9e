//! # Application runtime context.
//!
//! [`Runtime`] owns the notifier, the [`EventBus`](crate::EventBus), the
//! [`NavigationManager`](crate::NavigationManager) and the
//! [`ShutdownOrchestrator`](crate::ShutdownOrchestrator); [`RuntimeBuilder`] wires them
//! together and registers the built-in teardown tasks:
//!
//! ```text
//! unmount-views (critical) ──► application tasks ──► flush-event-bus
//! ```

mod builder;
#[allow(clippy::module_inception)]
mod runtime;

pub use builder::RuntimeBuilder;
pub use runtime::Runtime;
