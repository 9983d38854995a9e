//! # Message subscribers for the event bus.
//!
//! This module provides the [`Subscribe`] trait, the closure-backed [`HandlerFn`],
//! and the subscriber records the bus keeps for each registration.
//!
//! ## Architecture
//! ```text
//! EventBus::subscribe(name, handler, filter) ──► Subscriber { id, name, filter, active, counters }
//!
//! drain loop / publish_sync:
//!   message ──► for each subscriber (registration order):
//!                 ├─ inactive?             → skip
//!                 ├─ not addressed/matched → skip
//!                 └─ handler.on_message()  → Ok | Err | panic
//!                                               └─► counted + DeliveryError notification
//! ```

mod handler_fn;
mod subscribe;
mod subscriber;

pub use handler_fn::{HandlerFn, HandlerRef};
pub use subscribe::Subscribe;
pub use subscriber::{SubscriberId, SubscriberInfo};

pub(crate) use subscriber::Subscriber;
