//! # Application event bus.
//!
//! - [`EventBus`] - priority pub/sub hub with TTL, backpressure and history
//! - [`Message`] / [`MessageId`] - what flows through the bus
//! - [`PublishOptions`] / [`Target`] - per-message priority, TTL, addressing, metadata
//! - [`MessageFilter`] - subscriber-side delivery constraints
//! - [`BusMetrics`] - point-in-time counters

mod event_bus;
mod filter;
mod history;
mod message;
mod metrics;
mod queue;

pub use event_bus::EventBus;
pub use filter::MessageFilter;
pub use message::{Message, MessageId, PublishOptions, Target};
pub use metrics::BusMetrics;
