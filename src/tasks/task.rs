//! # Teardown action abstraction.
//!
//! A [`Task`] is the async body of a [`ShutdownTask`](crate::ShutdownTask). It receives a
//! [`CancellationToken`] that is cancelled when the task loses the race against its timeout,
//! so cooperative actions can stop early instead of running on detached.

use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::TaskError;

/// Shared handle to a teardown action.
pub type TaskRef = Arc<dyn Task>;

/// # Asynchronous, cancelable teardown action.
///
/// # Example
/// ```
/// use tokio_util::sync::CancellationToken;
/// use async_trait::async_trait;
/// use termvisor::{Task, TaskError};
///
/// struct CloseDb;
///
/// #[async_trait]
/// impl Task for CloseDb {
///     async fn run(&self, ctx: CancellationToken) -> Result<(), TaskError> {
///         if ctx.is_cancelled() {
///             return Err(TaskError::Canceled);
///         }
///         // flush and close...
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Task: Send + Sync + 'static {
    /// Executes the action once.
    ///
    /// `ctx` is cancelled when the per-task timeout fires; the returned future is dropped
    /// at that point, so anything spawned elsewhere should watch the token.
    async fn run(&self, ctx: CancellationToken) -> Result<(), TaskError>;
}
