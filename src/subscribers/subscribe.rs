//! # Core subscriber trait
//!
//! `Subscribe` is the extension point for plugging message handlers into the
//! [`EventBus`](crate::EventBus). Handlers are invoked by the bus's drain loop,
//! one message at a time, in subscriber-registration order.
//!
//! ## Contract
//! - Returning `Err` (or panicking) is caught by the bus: the failure is counted,
//!   reported as a `DeliveryError` notification, and delivery continues.
//! - Handlers must not call [`EventBus::flush`](crate::EventBus::flush) on the bus
//!   that is delivering to them (the drain lock is not reentrant). Publishing is fine.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use termvisor::{HandlerError, Message, Subscribe};
//!
//! struct Audit;
//!
//! #[async_trait]
//! impl Subscribe for Audit {
//!     async fn on_message(&self, msg: Arc<Message>) -> Result<(), HandlerError> {
//!         if msg.kind == "audit.reject" {
//!             return Err(HandlerError::fail("rejected"));
//!         }
//!         Ok(())
//!     }
//! }
//! ```

use std::sync::Arc;

use async_trait::async_trait;

use crate::bus::Message;
use crate::error::HandlerError;

/// Contract for bus message handlers.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handle a single message delivered by the bus.
    async fn on_message(&self, message: Arc<Message>) -> Result<(), HandlerError>;
}
