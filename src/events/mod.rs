//! Runtime notifications: types and broadcast channel.
//!
//! This module groups the notification **data model** and the **channel** used to
//! observe what the event bus and the shutdown orchestrator are doing.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] notification classification and metadata
//! - [`Notifier`] thin wrapper over `tokio::sync::broadcast`
//! - [`LogWriter`] forwards notifications to `tracing` (feature `logging`)
//!
//! ## Quick reference
//! - **Publishers**: `EventBus` (delivery errors, drops), `ShutdownOrchestrator`
//!   and its task runner (phases, task outcomes).
//! - **Consumers**: `LogWriter`, host code via [`Notifier::subscribe`].

mod event;
#[cfg(feature = "logging")]
mod log;
mod notifier;

pub use event::{Event, EventKind};
#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use notifier::Notifier;
