//! # Run a single shutdown task against its deadline.
//!
//! ```text
//! publish TaskStarting
//! arm "task:<id>" in the timer registry
//! select! {
//!   action.run(child) ──► Ok / Err / panic
//!   deadline elapsed  ──► cancel child token, drop the future → Timeout
//!   timer released    ──► keep awaiting the action without a bound
//! }
//! publish TaskComplete | (TaskTimeout +) TaskError
//! ```
//!
//! ## Rules
//! - Publishes **exactly one** terminal event: `TaskComplete` or `TaskError`.
//! - `TaskTimeout` is published **in addition to** `TaskError` on timeout.
//! - Panics inside the action are caught and reported as [`TaskError::Panicked`].
//! - On timeout the action's future is dropped and its token cancelled; work it detached
//!   elsewhere may keep running unless it watches the token.

use std::time::Duration;

use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::error::TaskError;
use crate::events::{Event, EventKind, Notifier};
use crate::isolate::isolate;
use crate::shutdown::timers::TimerRegistry;
use crate::tasks::ShutdownTask;

/// Outcome of one task run.
pub(crate) struct RunOutcome {
    pub(crate) result: Result<(), TaskError>,
    pub(crate) elapsed: Duration,
}

pub(crate) async fn run_once(
    task: &ShutdownTask,
    parent: &CancellationToken,
    timers: &TimerRegistry,
    notifier: &Notifier,
) -> RunOutcome {
    notifier.publish(Event::new(EventKind::TaskStarting).with_task(task.id_arc()));
    let started = Instant::now();
    let child = parent.child_token();

    let fut = isolate(task.action().run(child.clone()));
    tokio::pin!(fut);

    let result = match task.timeout() {
        Some(limit) => {
            let timer = timers.arm(format!("task:{}", task.id()), limit);
            let res = tokio::select! {
                res = &mut fut => flatten(res),
                _ = time::sleep_until(timer.deadline) => {
                    child.cancel();
                    notifier.publish(
                        Event::new(EventKind::TaskTimeout)
                            .with_task(task.id_arc())
                            .with_timeout(limit),
                    );
                    Err(TaskError::Timeout { timeout: limit })
                }
                _ = timer.token.cancelled() => {
                    debug!(task = task.id(), "task timer released; awaiting without bound");
                    flatten(fut.await)
                }
            };
            timers.release(&timer);
            res
        }
        None => flatten(fut.await),
    };

    let elapsed = started.elapsed();
    let ev = match &result {
        Ok(()) => Event::new(EventKind::TaskComplete),
        Err(e) => Event::new(EventKind::TaskError).with_reason(e.to_string()),
    };
    notifier.publish(ev.with_task(task.id_arc()).with_duration(elapsed));

    RunOutcome { result, elapsed }
}

fn flatten(res: Result<Result<(), TaskError>, String>) -> Result<(), TaskError> {
    match res {
        Ok(r) => r,
        Err(info) => Err(TaskError::Panicked { info }),
    }
}
