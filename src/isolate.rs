//! # Panic isolation for user callbacks.
//!
//! Subscriber handlers, shutdown actions and task callbacks run inside [`isolate`] /
//! [`isolate_sync`]: a panic is caught and returned as text instead of unwinding through
//! the runtime.
//!
//! While isolated code runs, a thread-local depth counter is raised. The process-wide
//! panic hook installed by
//! [`ShutdownOrchestrator::install_panic_hook`](crate::ShutdownOrchestrator::install_panic_hook)
//! checks [`is_isolated`] and only treats **uncaught** panics as faults.

use std::cell::Cell;
use std::future::Future;
use std::panic::{catch_unwind, AssertUnwindSafe};

use futures::future::poll_fn;
use futures::FutureExt;

use crate::error::panic_info;

thread_local! {
    static DEPTH: Cell<u32> = const { Cell::new(0) };
}

struct DepthGuard;

impl DepthGuard {
    fn enter() -> Self {
        DEPTH.with(|d| d.set(d.get() + 1));
        DepthGuard
    }
}

impl Drop for DepthGuard {
    fn drop(&mut self) {
        DEPTH.with(|d| d.set(d.get().saturating_sub(1)));
    }
}

/// Whether the current thread is executing isolated code.
pub(crate) fn is_isolated() -> bool {
    DEPTH.with(|d| d.get() > 0)
}

/// Awaits `fut`, converting a panic into `Err(panic message)`.
pub(crate) async fn isolate<F: Future>(fut: F) -> Result<F::Output, String> {
    let mut fut = Box::pin(fut);
    let guarded = poll_fn(move |cx| {
        let _depth = DepthGuard::enter();
        fut.as_mut().poll(cx)
    });
    AssertUnwindSafe(guarded)
        .catch_unwind()
        .await
        .map_err(|panic| panic_info(&*panic))
}

/// Calls `f`, converting a panic into `Err(panic message)`.
pub(crate) fn isolate_sync<R>(f: impl FnOnce() -> R) -> Result<R, String> {
    let _depth = DepthGuard::enter();
    catch_unwind(AssertUnwindSafe(f)).map_err(|panic| panic_info(&*panic))
}
