//! # termvisor
//!
//! **Termvisor** is the runtime core of a long-lived interactive terminal application.
//!
//! It coordinates three in-process services:
//! - an **event bus** with priority ordering, TTL expiry and bounded-queue backpressure;
//! - a **navigation manager** that keeps a bounded view history and drives the
//!   mount / unmount / save / restore contract of screens;
//! - a **shutdown orchestrator** that runs teardown tasks under per-task timeouts and
//!   escalates from graceful to forced mode on critical failure, elapsed budget,
//!   repeated signals or faults.
//!
//! Drawing, input decoding and argument parsing belong to the host; this crate only
//! provides the coordination layer.
//!
//! ## Architecture
//! ```text
//!  application code ──publish──►┌──────────────────────────────┐
//!                               │  EventBus                    │
//!                               │  PendingQueue ─► drain loop ─┼──► subscribers
//!  NavigationManager ─"navigation.changed"─►  History          │     (Subscribe)
//!        │                      └──────────────┬───────────────┘
//!        │ View hooks                          │ DeliveryError / MessageDropped
//!        ▼                                     ▼
//!   Box<dyn View>                ┌──────────────────────────────┐
//!                                │  Notifier (broadcast)        │──► LogWriter (tracing)
//!                                └──────────────▲───────────────┘──► host receivers
//!                                               │ task / phase events
//!  SIGTERM / SIGINT / panic ──► ShutdownOrchestrator
//!                                 ├─ unmount-views   (NavigationManager)
//!                                 ├─ application tasks
//!                                 └─ flush-event-bus (EventBus)
//! ```
//!
//! ### Shutdown lifecycle
//! ```text
//! Idle ──initiate──► Graceful ──tasks done──────────────────────────► Complete
//!                       │ critical failure / graceful timer / 2nd SIGTERM / fault
//!                       ▼
//!                     Forced ──critical tasks done (others skipped)──► Complete
//!                       └─ absolute deadline ──► ForceDeadlineExceeded ──► exit hook
//! ```
//!
//! ## Features
//! | Area              | Description                                              | Key types                               |
//! |-------------------|----------------------------------------------------------|-----------------------------------------|
//! | **Event bus**     | Priority pub/sub, filters, TTL, history, metrics         | [`EventBus`], [`MessageFilter`]          |
//! | **Subscribers**   | Async handlers with isolated failures                    | [`Subscribe`], [`HandlerFn`]             |
//! | **Navigation**    | Bounded history, view lifecycle, tabs, saved state       | [`NavigationManager`], [`View`]          |
//! | **Shutdown**      | Phases, per-task timeouts, escalation, signals           | [`ShutdownOrchestrator`], [`ShutdownTask`] |
//! | **Notifications** | Broadcast stream of runtime events                       | [`Notifier`], [`Event`], [`EventKind`]   |
//! | **Runtime**       | Explicit context wiring all of the above                 | [`Runtime`], [`RuntimeBuilder`]          |
//!
//! ## Optional features
//! - `logging`: exports [`LogWriter`], a notification listener that logs through `tracing`
//!   (enabled by default).
//!
//! ## Example
//! ```rust,no_run
//! use std::sync::Arc;
//! use serde_json::json;
//! use termvisor::{HandlerError, HandlerFn, Message, MessageFilter, PublishOptions, Runtime, RuntimeConfig};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let rt = Runtime::builder(RuntimeConfig::default())
//!         .with_subscriber(
//!             "alerts",
//!             HandlerFn::arc(|msg: Arc<Message>| async move {
//!                 eprintln!("alert: {}", msg.data);
//!                 Ok::<_, HandlerError>(())
//!             }),
//!             Some(MessageFilter::new().kind("alert").min_priority(5)),
//!         )
//!         .with_signals()
//!         .build()?;
//!
//!     rt.bus().publish("alert", json!("disk almost full"), "monitor", PublishOptions::new().priority(8));
//!
//!     let report = rt.run_until_shutdown().await;
//!     eprintln!("shutdown in {:?} (forced: {})", report.duration, report.forced);
//!     Ok(())
//! }
//! ```

mod bus;
mod config;
mod error;
mod events;
mod isolate;
mod navigation;
mod runtime;
mod shutdown;
mod subscribers;
mod tasks;

// ---- Public re-exports ----

pub use bus::{BusMetrics, EventBus, Message, MessageFilter, MessageId, PublishOptions, Target};
pub use config::{BusConfig, NavigationConfig, RuntimeConfig, ShutdownConfig};
pub use error::{HandlerError, Hook, NavigationError, TaskError, ViewError};
pub use events::{Event, EventKind, Notifier};
pub use navigation::{
    KeyBinding, NavigationEntry, NavigationManager, NavigationStack, Tab, View, ViewSize,
    ViewState, NAVIGATION_CHANGED,
};
pub use runtime::{Runtime, RuntimeBuilder};
pub use shutdown::{
    flush_event_bus_task, listen_for_signals, unmount_views_task, ActiveTimeout, ExitHook,
    ShutdownMetrics, ShutdownOrchestrator, ShutdownPhase, ShutdownSignal, ShutdownState,
    SignalAction, TaskCompleteHook, TaskErrorHook, FLUSH_EVENT_BUS_TASK, UNMOUNT_VIEWS_TASK,
};
pub use subscribers::{HandlerFn, HandlerRef, Subscribe, SubscriberId, SubscriberInfo};
pub use tasks::{CompleteCallback, ErrorCallback, ShutdownTask, Task, TaskFn, TaskRef};

// Optional: expose LogWriter when the `logging` feature is enabled.
#[cfg(feature = "logging")]
pub use events::LogWriter;
