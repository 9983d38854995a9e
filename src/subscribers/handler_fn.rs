//! # Function-backed handler (`HandlerFn`)
//!
//! [`HandlerFn`] wraps a closure `F: Fn(Arc<Message>) -> Fut`, producing a fresh
//! future per delivered message. Shared state must be captured explicitly
//! (e.g. `Arc<Mutex<..>>`) inside the closure.
//!
//! ## Example
//! ```rust
//! use termvisor::{HandlerFn, HandlerRef};
//!
//! let h: HandlerRef = HandlerFn::arc(|msg| async move {
//!     println!("{} from {}", msg.kind, msg.source);
//!     Ok::<_, termvisor::HandlerError>(())
//! });
//! # let _ = h;
//! ```

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::bus::Message;
use crate::error::HandlerError;
use crate::subscribers::Subscribe;

/// Shared handle to a message handler.
pub type HandlerRef = Arc<dyn Subscribe>;

/// Function-backed handler implementation.
pub struct HandlerFn<F> {
    f: F,
}

impl<F, Fut> HandlerFn<F>
where
    F: Fn(Arc<Message>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
{
    /// Creates a new function-backed handler.
    pub fn new(f: F) -> Self {
        Self { f }
    }

    /// Creates the handler and returns it as a shared handle.
    pub fn arc(f: F) -> Arc<Self> {
        Arc::new(Self::new(f))
    }
}

#[async_trait]
impl<F, Fut> Subscribe for HandlerFn<F>
where
    F: Fn(Arc<Message>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
{
    async fn on_message(&self, message: Arc<Message>) -> Result<(), HandlerError> {
        (self.f)(message).await
    }
}
