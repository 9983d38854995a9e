//! # Registry of pending shutdown timers.
//!
//! Every timer the orchestrator arms (the two phase timers and one deadline per running
//! task) is recorded here under a string key, so that all of them can be listed with
//! [`TimerRegistry::active`] and released at once with [`TimerRegistry::clear_all`].
//!
//! Releasing a timer cancels its token: a spawned phase timer exits without firing, and a
//! task deadline stops racing the task (the task is then awaited without a bound).

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Timer still pending at the time of the query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveTimeout {
    pub key: String,
    pub remaining: Duration,
}

struct Armed {
    id: u64,
    deadline: Instant,
    token: CancellationToken,
}

/// Handle to one armed timer.
pub(crate) struct TimerHandle {
    pub(crate) key: String,
    pub(crate) id: u64,
    pub(crate) deadline: Instant,
    pub(crate) token: CancellationToken,
}

#[derive(Default)]
pub(crate) struct TimerRegistry {
    timers: Mutex<HashMap<String, Armed>>,
    next_id: AtomicU64,
}

impl TimerRegistry {
    /// Records a timer due in `after`. Re-arming a key cancels the previous timer.
    pub(crate) fn arm(&self, key: impl Into<String>, after: Duration) -> TimerHandle {
        let key = key.into();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let deadline = Instant::now() + after;
        let token = CancellationToken::new();
        let prev = self.timers.lock().insert(
            key.clone(),
            Armed {
                id,
                deadline,
                token: token.clone(),
            },
        );
        if let Some(prev) = prev {
            prev.token.cancel();
        }
        TimerHandle {
            key,
            id,
            deadline,
            token,
        }
    }

    /// Arms a timer and spawns a task that calls `on_fire` at the deadline unless the
    /// timer is released first.
    ///
    /// Returns `false` (and arms nothing) outside a Tokio runtime.
    pub(crate) fn spawn_timer<F>(self: &Arc<Self>, key: &str, after: Duration, on_fire: F) -> bool
    where
        F: FnOnce() + Send + 'static,
    {
        let Ok(rt) = tokio::runtime::Handle::try_current() else {
            return false;
        };
        let handle = self.arm(key, after);
        let registry = Arc::clone(self);
        rt.spawn(async move {
            tokio::select! {
                _ = handle.token.cancelled() => {}
                _ = tokio::time::sleep_until(handle.deadline) => {
                    if registry.release(&handle) {
                        on_fire();
                    }
                }
            }
        });
        true
    }

    /// Removes the timer if it is still the one `handle` refers to.
    pub(crate) fn release(&self, handle: &TimerHandle) -> bool {
        let mut timers = self.timers.lock();
        match timers.get(&handle.key) {
            Some(armed) if armed.id == handle.id => {
                timers.remove(&handle.key);
                true
            }
            _ => false,
        }
    }

    /// Cancels and removes one timer by key.
    pub(crate) fn disarm(&self, key: &str) -> bool {
        match self.timers.lock().remove(key) {
            Some(armed) => {
                armed.token.cancel();
                true
            }
            None => false,
        }
    }

    /// Cancels and removes every timer; returns how many were pending.
    pub(crate) fn clear_all(&self) -> usize {
        let drained: Vec<Armed> = self.timers.lock().drain().map(|(_, a)| a).collect();
        for armed in &drained {
            armed.token.cancel();
        }
        drained.len()
    }

    /// Pending timers, soonest first.
    pub(crate) fn active(&self) -> Vec<ActiveTimeout> {
        let now = Instant::now();
        let mut out: Vec<ActiveTimeout> = self
            .timers
            .lock()
            .iter()
            .map(|(key, armed)| ActiveTimeout {
                key: key.clone(),
                remaining: armed.deadline.saturating_duration_since(now),
            })
            .collect();
        out.sort_by(|a, b| a.remaining.cmp(&b.remaining).then_with(|| a.key.cmp(&b.key)));
        out
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicBool;

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn spawned_timer_fires_once_and_unregisters() {
        let reg = Arc::new(TimerRegistry::default());
        let fired = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&fired);
        reg.spawn_timer("graceful", Duration::from_secs(1), move || {
            flag.store(true, Ordering::SeqCst);
        });

        assert_eq!(reg.active()[0].remaining, Duration::from_secs(1));
        tokio::time::sleep(Duration::from_millis(1100)).await;
        assert!(fired.load(Ordering::SeqCst));
        assert!(reg.active().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn cleared_timer_never_fires() {
        let reg = Arc::new(TimerRegistry::default());
        let fired = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&fired);
        reg.spawn_timer("force", Duration::from_secs(1), move || {
            flag.store(true, Ordering::SeqCst);
        });
        let task = reg.arm("task:x", Duration::from_secs(5));

        assert_eq!(reg.clear_all(), 2);
        assert!(task.token.is_cancelled());
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(!fired.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn rearming_replaces_and_release_checks_identity() {
        let reg = TimerRegistry::default();
        let first = reg.arm("task:a", Duration::from_secs(3));
        let second = reg.arm("task:a", Duration::from_secs(1));
        assert!(first.token.is_cancelled());

        assert!(!reg.release(&first));
        assert_eq!(reg.active().len(), 1);
        assert!(reg.release(&second));
        assert!(reg.active().is_empty());

        reg.arm("b", Duration::from_secs(2));
        reg.arm("a", Duration::from_secs(1));
        let keys: Vec<String> = reg.active().into_iter().map(|t| t.key).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert!(reg.disarm("a"));
        assert!(!reg.disarm("a"));
    }
}
