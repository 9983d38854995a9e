//! # Shutdown orchestrator.
//!
//! [`ShutdownOrchestrator`] runs registered [`ShutdownTask`]s once, in registration order,
//! each bounded by its own timeout, and escalates from graceful to forced mode when a
//! critical task fails or the graceful budget elapses.
//!
//! ## Flow
//! ```text
//! initiate(reason) ──► Graceful
//!   ├─ arm "graceful" timer (graceful_timeout)              ──► set_force_mode()
//!   └─ arm "force" timer (graceful_timeout + force_timeout) ──► ForceDeadlineExceeded + exit hook
//!
//! execute_shutdown_tasks()
//!   for task in registration order:
//!     ├─ phase Forced && !critical ──► skip (TaskSkipped)
//!     └─ execute_task(task)
//!          ├─ Ok  ──► completed, on_complete callbacks
//!          └─ Err ──► failed, on_error callbacks
//!                     └─ critical && Graceful ──► RequestForcedShutdown ──► set_force_mode()
//!   ──► Complete, clear all timers, ShutdownComplete
//! ```
//!
//! ## Rules
//! - Phase changes happen only here and are forward-only.
//! - Task execution happens at most once; later calls return the cached report.
//! - Tasks never run concurrently with each other.
//! - Callback panics are caught and logged.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::ShutdownConfig;
use crate::error::TaskError;
use crate::events::{Event, EventKind, Notifier};
use crate::isolate::{is_isolated, isolate_sync};
use crate::shutdown::runner::run_once;
use crate::shutdown::signals::{classify, ShutdownSignal, SignalAction};
use crate::shutdown::timers::{ActiveTimeout, TimerRegistry};
use crate::shutdown::{ShutdownMetrics, ShutdownPhase, ShutdownState};
use crate::tasks::ShutdownTask;

/// Global callback for successful tasks; receives the task id.
pub type TaskCompleteHook = Arc<dyn Fn(&str) + Send + Sync>;
/// Global callback for failed tasks; receives the task id and error.
pub type TaskErrorHook = Arc<dyn Fn(&str, &TaskError) + Send + Sync>;
/// Called with the exit code when the absolute deadline passes.
pub type ExitHook = Arc<dyn Fn(i32) + Send + Sync>;

const GRACEFUL_TIMER: &str = "graceful";
const FORCE_TIMER: &str = "force";

/// Coordinates teardown of the application.
pub struct ShutdownOrchestrator {
    cfg: ShutdownConfig,
    notifier: Notifier,
    state: Mutex<ShutdownState>,
    tasks: Mutex<Vec<ShutdownTask>>,
    timers: Arc<TimerRegistry>,
    complete_hooks: Mutex<Vec<TaskCompleteHook>>,
    error_hooks: Mutex<Vec<TaskErrorHook>>,
    exit_hook: Mutex<ExitHook>,
    /// Held for the whole task run; caches the final report.
    run: tokio::sync::Mutex<Option<ShutdownMetrics>>,
    phase_tx: watch::Sender<ShutdownPhase>,
    /// Parent of every task token; cancelled when the absolute deadline passes.
    token: CancellationToken,
    escalations: AtomicU64,
    me: Weak<ShutdownOrchestrator>,
}

impl ShutdownOrchestrator {
    pub fn new(cfg: ShutdownConfig, notifier: Notifier) -> Arc<Self> {
        let (phase_tx, _rx) = watch::channel(ShutdownPhase::Idle);
        Arc::new_cyclic(|me| Self {
            cfg,
            notifier,
            state: Mutex::new(ShutdownState::default()),
            tasks: Mutex::new(Vec::new()),
            timers: Arc::new(TimerRegistry::default()),
            complete_hooks: Mutex::new(Vec::new()),
            error_hooks: Mutex::new(Vec::new()),
            exit_hook: Mutex::new(Arc::new(|code: i32| {
                std::process::exit(code);
            })),
            run: tokio::sync::Mutex::new(None),
            phase_tx,
            token: CancellationToken::new(),
            escalations: AtomicU64::new(0),
            me: me.clone(),
        })
    }

    // === Registration ===

    /// Adds a task to the end of the run order.
    ///
    /// Returns `false` if the id is already registered or shutdown has begun.
    pub fn register(&self, mut task: ShutdownTask) -> bool {
        if self.state.lock().initiated {
            warn!(task = task.id(), "registration after shutdown initiation ignored");
            return false;
        }
        let mut tasks = self.tasks.lock();
        if tasks.iter().any(|t| t.id() == task.id()) {
            warn!(task = task.id(), "duplicate shutdown task id");
            return false;
        }
        task.inherit_timeout(self.cfg.default_task_timeout());
        info!(
            task = task.id(),
            name = task.name(),
            critical = task.is_critical(),
            timeout_ms = task.timeout().map(|d| d.as_millis() as u64),
            "shutdown task registered"
        );
        tasks.push(task);
        true
    }

    /// Removes a task before shutdown begins.
    pub fn unregister(&self, id: &str) -> bool {
        if self.state.lock().initiated {
            return false;
        }
        let mut tasks = self.tasks.lock();
        let before = tasks.len();
        tasks.retain(|t| t.id() != id);
        tasks.len() != before
    }

    /// Registered task ids in run order.
    pub fn task_ids(&self) -> Vec<String> {
        self.tasks.lock().iter().map(|t| t.id().to_string()).collect()
    }

    pub fn on_task_complete(&self, f: impl Fn(&str) + Send + Sync + 'static) {
        self.complete_hooks.lock().push(Arc::new(f));
    }

    pub fn on_task_error(&self, f: impl Fn(&str, &TaskError) + Send + Sync + 'static) {
        self.error_hooks.lock().push(Arc::new(f));
    }

    /// Replaces the action taken when the absolute deadline passes
    /// (`std::process::exit` by default).
    pub fn set_exit_hook(&self, f: impl Fn(i32) + Send + Sync + 'static) {
        *self.exit_hook.lock() = Arc::new(f);
    }

    // === Phase control ===

    /// `Idle → Graceful`: records the reason and arms both phase timers.
    ///
    /// Returns `false` if shutdown was already initiated.
    pub fn initiate(&self, reason: &str) -> bool {
        if !self.state.lock().begin(reason) {
            return false;
        }
        self.phase_tx.send_replace(ShutdownPhase::Graceful);
        debug!(reason, "shutdown initiated");
        self.notifier
            .publish(Event::new(EventKind::ShutdownInitiated).with_reason(reason));
        self.arm_phase_timers();
        true
    }

    fn arm_phase_timers(&self) {
        let graceful = self.cfg.graceful_timeout;
        let deadline = self.cfg.absolute_deadline();

        if !graceful.is_zero() {
            let me = self.me.clone();
            self.timers.spawn_timer(GRACEFUL_TIMER, graceful, move || {
                if let Some(me) = me.upgrade() {
                    me.set_force_mode("graceful timeout elapsed");
                }
            });
        }
        if !deadline.is_zero() {
            let me = self.me.clone();
            let armed = self.timers.spawn_timer(FORCE_TIMER, deadline, move || {
                if let Some(me) = me.upgrade() {
                    me.deadline_exceeded();
                }
            });
            if !armed {
                warn!("no async runtime; shutdown phase timers not armed");
            }
        }
    }

    /// `Graceful → Forced`. Initiates first when still idle.
    ///
    /// Returns `false` if the orchestrator is already forced or complete.
    pub fn set_force_mode(&self, reason: &str) -> bool {
        self.initiate(reason);
        if !self.state.lock().escalate(reason) {
            return false;
        }
        self.phase_tx.send_replace(ShutdownPhase::Forced);
        self.timers.disarm(GRACEFUL_TIMER);
        debug!(reason, "forced shutdown");
        self.notifier
            .publish(Event::new(EventKind::ForcedShutdown).with_reason(reason));
        true
    }

    fn deadline_exceeded(&self) {
        if self.phase() == ShutdownPhase::Complete {
            return;
        }
        let budget = self.cfg.absolute_deadline();
        error!(budget_ms = budget.as_millis() as u64, "shutdown deadline exceeded");
        self.token.cancel();
        self.notifier
            .publish(Event::new(EventKind::ForceDeadlineExceeded).with_timeout(budget));
        if self.cfg.exit_on_deadline {
            let hook = Arc::clone(&*self.exit_hook.lock());
            hook(self.cfg.force_exit_code);
        }
    }

    // === Task execution ===

    /// Runs every registered task once, in order, and moves to `Complete`.
    ///
    /// Initiates shutdown first if needed. Concurrent and repeated calls wait for the
    /// single run and receive the same report.
    pub async fn execute_shutdown_tasks(&self) -> ShutdownMetrics {
        let mut run = self.run.lock().await;
        if let Some(report) = run.as_ref() {
            return report.clone();
        }
        self.initiate("shutdown tasks executed");

        let tasks: Vec<ShutdownTask> = self.tasks.lock().clone();
        for task in &tasks {
            if self.phase() == ShutdownPhase::Forced && !task.is_critical() {
                debug!(task = task.id(), "skipping non-critical task in forced mode");
                self.state.lock().skipped.push(task.id().to_string());
                self.notifier
                    .publish(Event::new(EventKind::TaskSkipped).with_task(task.id_arc()));
                continue;
            }
            // Outcome is recorded in state; errors never escape.
            let _ = self.execute_task(task).await;
        }

        let elapsed = {
            let mut st = self.state.lock();
            st.finish();
            st.elapsed()
        };
        let released = self.timers.clear_all();
        self.phase_tx.send_replace(ShutdownPhase::Complete);
        let report = self.metrics();
        info!(
            duration_ms = elapsed.as_millis() as u64,
            completed = report.completed,
            failed = report.failed,
            skipped = report.skipped,
            forced = report.forced,
            released_timers = released,
            "shutdown complete"
        );
        self.notifier
            .publish(Event::new(EventKind::ShutdownComplete).with_duration(elapsed));

        *run = Some(report.clone());
        report
    }

    /// Runs one task against its timeout and records the outcome.
    ///
    /// A critical failure during the graceful phase requests escalation to forced mode.
    pub async fn execute_task(&self, task: &ShutdownTask) -> Result<(), TaskError> {
        self.state.lock().current = Some(task.id().to_string());
        debug!(task = task.id(), name = task.name(), "running shutdown task");

        let outcome = run_once(task, &self.token, &self.timers, &self.notifier).await;
        let duration_ms = outcome.elapsed.as_millis() as u64;

        match &outcome.result {
            Ok(()) => {
                {
                    let mut st = self.state.lock();
                    st.current = None;
                    st.completed.push(task.id().to_string());
                }
                debug!(task = task.id(), duration_ms, "shutdown task complete");
                if let Some(cb) = task.complete_callback() {
                    guard_callback(task.id(), || cb());
                }
                let hooks = self.complete_hooks.lock().clone();
                for hook in hooks {
                    guard_callback(task.id(), || hook(task.id()));
                }
            }
            Err(err) => {
                {
                    let mut st = self.state.lock();
                    st.current = None;
                    st.failed.push(task.id().to_string());
                }
                debug!(
                    task = task.id(),
                    critical = task.is_critical(),
                    duration_ms,
                    err = %err,
                    "shutdown task failed"
                );
                if let Some(cb) = task.error_callback() {
                    guard_callback(task.id(), || cb(err));
                }
                let hooks = self.error_hooks.lock().clone();
                for hook in hooks {
                    guard_callback(task.id(), || hook(task.id(), err));
                }
                if task.is_critical() && self.phase() == ShutdownPhase::Graceful {
                    self.request_forced_shutdown(task, err);
                }
            }
        }
        outcome.result
    }

    fn request_forced_shutdown(&self, task: &ShutdownTask, err: &TaskError) {
        self.escalations.fetch_add(1, Ordering::Relaxed);
        self.notifier.publish(
            Event::new(EventKind::RequestForcedShutdown)
                .with_task(task.id_arc())
                .with_reason(err.to_string()),
        );
        self.set_force_mode(&format!("critical task '{}' failed: {err}", task.id()));
    }

    /// Initiates (if needed) and runs the tasks.
    pub async fn shutdown(&self, reason: &str) -> ShutdownMetrics {
        self.initiate(reason);
        self.execute_shutdown_tasks().await
    }

    /// Runs the tasks in a background task, if a runtime is available.
    fn spawn_execution(&self) {
        match (tokio::runtime::Handle::try_current(), self.me.upgrade()) {
            (Ok(rt), Some(me)) => {
                rt.spawn(async move {
                    me.execute_shutdown_tasks().await;
                });
            }
            _ => warn!("no async runtime; shutdown tasks must be executed by the caller"),
        }
    }

    // === Signals and faults ===

    /// Reacts to a termination signal. Safe to call any number of times.
    pub fn handle_signal(&self, sig: ShutdownSignal) -> SignalAction {
        let initiated = self.state.lock().initiated;
        match classify(sig, initiated) {
            SignalAction::Graceful => {
                if !self.initiate(&format!("{sig} received")) {
                    // Lost a race with another initiator.
                    return self.handle_signal(sig);
                }
                self.spawn_execution();
                SignalAction::Graceful
            }
            SignalAction::Force => {
                if self.set_force_mode(&format!("{sig} received again")) {
                    SignalAction::Force
                } else {
                    SignalAction::Ignore
                }
            }
            SignalAction::Ignore => SignalAction::Ignore,
        }
    }

    /// Reports an unrecoverable fault: escalates to forced mode and makes sure the
    /// tasks run.
    pub fn report_fault(&self, fault: &str) -> bool {
        error!(fault, "unrecoverable fault");
        let escalated = self.set_force_mode(&format!("fault: {fault}"));
        self.spawn_execution();
        escalated
    }

    /// Chains a process-wide panic hook that reports uncaught panics as faults.
    ///
    /// Panics inside subscriber handlers, shutdown actions and callbacks are already
    /// isolated and do not count.
    pub fn install_panic_hook(&self) {
        let me = self.me.clone();
        let prev = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            prev(info);
            if is_isolated() {
                return;
            }
            if let Some(me) = me.upgrade() {
                me.report_fault(&format!("panic: {info}"));
            }
        }));
    }

    // === Introspection ===

    pub fn state(&self) -> ShutdownState {
        self.state.lock().clone()
    }

    pub fn phase(&self) -> ShutdownPhase {
        self.state.lock().phase
    }

    pub fn metrics(&self) -> ShutdownMetrics {
        let registered = self.tasks.lock().len();
        ShutdownMetrics::from_state(&self.state.lock(), registered)
    }

    /// Receiver observing every phase change.
    pub fn subscribe_phase(&self) -> watch::Receiver<ShutdownPhase> {
        self.phase_tx.subscribe()
    }

    /// Resolves once the orchestrator reaches `Complete`.
    pub async fn wait_complete(&self) {
        let mut rx = self.phase_tx.subscribe();
        let _ = rx.wait_for(|p| *p == ShutdownPhase::Complete).await;
    }

    /// Escalation requests raised by critical-task failures.
    pub fn escalation_requests(&self) -> u64 {
        self.escalations.load(Ordering::Relaxed)
    }

    /// Releases every pending phase timer and task deadline.
    pub fn clear_all_timeouts(&self) -> usize {
        self.timers.clear_all()
    }

    pub fn active_timeouts(&self) -> Vec<ActiveTimeout> {
        self.timers.active()
    }
}

fn guard_callback(task: &str, f: impl FnOnce()) {
    if let Err(info) = isolate_sync(f) {
        error!(task, panic = %info, "shutdown callback panicked");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    use super::*;

    fn cfg() -> ShutdownConfig {
        ShutdownConfig {
            exit_on_deadline: false,
            ..ShutdownConfig::default()
        }
    }

    fn ok_task(id: &str) -> ShutdownTask {
        ShutdownTask::from_fn(id, id, |_ctx: CancellationToken| async { Ok::<_, TaskError>(()) })
    }

    fn failing_task(id: &str) -> ShutdownTask {
        ShutdownTask::from_fn(id, id, |_ctx: CancellationToken| async {
            Err::<(), _>(TaskError::fail("broken"))
        })
    }

    fn hanging_task(id: &str) -> ShutdownTask {
        ShutdownTask::from_fn(id, id, |_ctx: CancellationToken| std::future::pending())
    }

    fn kinds(rx: &mut tokio::sync::broadcast::Receiver<Event>) -> Vec<EventKind> {
        let mut out = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            out.push(ev.kind);
        }
        out
    }

    #[tokio::test(start_paused = true)]
    async fn critical_timeout_forces_and_skips_rest() {
        let orch = ShutdownOrchestrator::new(cfg(), Notifier::new(64));
        let mut rx = orch.notifier.subscribe();
        assert!(orch.register(
            hanging_task("T1")
                .critical()
                .with_timeout(Duration::from_millis(50))
        ));
        assert!(orch.register(ok_task("T2")));

        orch.initiate("test");
        let report = orch.execute_shutdown_tasks().await;

        let st = orch.state();
        assert_eq!(st.phase, ShutdownPhase::Complete);
        assert!(st.forced);
        assert_eq!(st.failed, vec!["T1"]);
        assert_eq!(st.skipped, vec!["T2"]);
        assert!(st.completed.is_empty());
        assert_eq!(report.failed, 1);
        assert_eq!(report.skipped, 1);
        assert_eq!(orch.escalation_requests(), 1);
        assert!(orch.active_timeouts().is_empty());

        assert_eq!(
            kinds(&mut rx),
            vec![
                EventKind::ShutdownInitiated,
                EventKind::TaskStarting,
                EventKind::TaskTimeout,
                EventKind::TaskError,
                EventKind::RequestForcedShutdown,
                EventKind::ForcedShutdown,
                EventKind::TaskSkipped,
                EventKind::ShutdownComplete,
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn escalation_happens_once_for_many_critical_failures() {
        let orch = ShutdownOrchestrator::new(cfg(), Notifier::new(64));
        orch.register(failing_task("a").critical());
        orch.register(failing_task("b").critical());
        orch.register(ok_task("c").critical());

        orch.shutdown("test").await;

        let st = orch.state();
        assert_eq!(orch.escalation_requests(), 1);
        assert_eq!(st.failed, vec!["a", "b"]);
        assert_eq!(st.completed, vec!["c"]);
        assert!(st.forced);
    }

    #[tokio::test(start_paused = true)]
    async fn non_critical_failure_stays_graceful() {
        let orch = ShutdownOrchestrator::new(cfg(), Notifier::new(64));
        orch.register(failing_task("optional"));
        orch.register(ok_task("after"));

        let report = orch.shutdown("test").await;
        assert!(!report.forced);
        assert_eq!(report.completed, 1);
        assert_eq!(report.failed, 1);
        assert_eq!(orch.escalation_requests(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn callbacks_fire_and_panics_are_contained() {
        let orch = ShutdownOrchestrator::new(cfg(), Notifier::new(64));
        let completes = Arc::new(AtomicUsize::new(0));
        let errors = Arc::new(Mutex::new(Vec::<String>::new()));

        let c = Arc::clone(&completes);
        orch.register(ok_task("good").on_complete(move || {
            c.fetch_add(1, Ordering::SeqCst);
        }));
        orch.register(failing_task("bad").on_error(|_err| panic!("callback bug")));

        let c = Arc::clone(&completes);
        orch.on_task_complete(move |_id| {
            c.fetch_add(10, Ordering::SeqCst);
        });
        let e = Arc::clone(&errors);
        orch.on_task_error(move |id, err| e.lock().push(format!("{id}: {}", err.as_label())));

        let report = orch.shutdown("test").await;
        assert_eq!(completes.load(Ordering::SeqCst), 11);
        assert_eq!(*errors.lock(), vec!["bad: task_failed"]);
        assert_eq!(report.phase, ShutdownPhase::Complete);
    }

    #[tokio::test(start_paused = true)]
    async fn tasks_run_once_and_in_order() {
        let orch = ShutdownOrchestrator::new(cfg(), Notifier::new(64));
        let order = Arc::new(Mutex::new(Vec::new()));
        for id in ["first", "second", "third"] {
            let order = Arc::clone(&order);
            orch.register(ShutdownTask::from_fn(id, id, move |_ctx: CancellationToken| {
                let order = Arc::clone(&order);
                async move {
                    tokio::time::sleep(Duration::from_millis(5)).await;
                    order.lock().push(id);
                    Ok::<_, TaskError>(())
                }
            }));
        }
        assert!(!orch.register(ok_task("first")));

        let (a, b) = tokio::join!(orch.shutdown("x"), orch.execute_shutdown_tasks());
        assert_eq!(a, b);
        orch.execute_shutdown_tasks().await;

        assert_eq!(*order.lock(), vec!["first", "second", "third"]);
        assert_eq!(orch.state().reason.as_deref(), Some("x"));
        assert!(!orch.register(ok_task("late")));
    }

    #[tokio::test(start_paused = true)]
    async fn graceful_timer_escalates_and_deadline_calls_exit_hook() {
        let orch = ShutdownOrchestrator::new(
            ShutdownConfig {
                graceful_timeout: Duration::from_millis(100),
                force_timeout: Duration::from_millis(100),
                task_timeout: Duration::ZERO,
                exit_on_deadline: true,
                force_exit_code: 3,
            },
            Notifier::new(64),
        );
        let exit_code = Arc::new(Mutex::new(None));
        let slot = Arc::clone(&exit_code);
        orch.set_exit_hook(move |code| *slot.lock() = Some(code));
        orch.register(hanging_task("stuck").critical());

        orch.initiate("test");
        let keys: Vec<String> = orch.active_timeouts().into_iter().map(|t| t.key).collect();
        assert_eq!(keys, vec!["graceful", "force"]);

        let runner = Arc::clone(&orch);
        let handle = tokio::spawn(async move { runner.execute_shutdown_tasks().await });

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(orch.phase(), ShutdownPhase::Forced);
        assert!(exit_code.lock().is_none());

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(*exit_code.lock(), Some(3));

        // The deadline cancelled the task token, but the stuck action ignores it.
        assert!(!handle.is_finished());
        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn completion_clears_phase_timers() {
        let orch = ShutdownOrchestrator::new(cfg(), Notifier::new(64));
        orch.register(ok_task("quick"));
        orch.initiate("test");
        assert_eq!(orch.active_timeouts().len(), 2);

        orch.execute_shutdown_tasks().await;
        assert!(orch.active_timeouts().is_empty());
        assert!(!orch.set_force_mode("too late"));
        assert_eq!(orch.phase(), ShutdownPhase::Complete);
    }

    #[tokio::test(start_paused = true)]
    async fn signals_are_idempotent() {
        let orch = ShutdownOrchestrator::new(cfg(), Notifier::new(64));
        let runs = Arc::new(AtomicUsize::new(0));
        let r = Arc::clone(&runs);
        orch.register(ShutdownTask::from_fn("count", "count", move |_ctx: CancellationToken| {
            let r = Arc::clone(&r);
            async move {
                r.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(10)).await;
                Ok::<_, TaskError>(())
            }
        }));

        assert_eq!(orch.handle_signal(ShutdownSignal::Interrupt), SignalAction::Graceful);
        assert_eq!(orch.handle_signal(ShutdownSignal::Interrupt), SignalAction::Ignore);
        assert_eq!(orch.handle_signal(ShutdownSignal::Terminate), SignalAction::Force);
        assert_eq!(orch.handle_signal(ShutdownSignal::Terminate), SignalAction::Ignore);

        orch.wait_complete().await;
        assert_eq!(runs.load(Ordering::SeqCst), 0);
        assert_eq!(orch.state().skipped, vec!["count"]);
    }

    #[tokio::test(start_paused = true)]
    async fn fault_forces_from_idle_and_runs_tasks() {
        let orch = ShutdownOrchestrator::new(cfg(), Notifier::new(64));
        orch.register(ok_task("must-run").critical());
        orch.register(ok_task("optional"));

        assert!(orch.report_fault("worker crashed"));
        assert!(!orch.report_fault("again"));
        orch.wait_complete().await;

        let st = orch.state();
        assert!(st.forced);
        assert_eq!(st.completed, vec!["must-run"]);
        assert_eq!(st.skipped, vec!["optional"]);
        assert_eq!(st.reason.as_deref(), Some("fault: worker crashed"));
    }

    #[tokio::test(start_paused = true)]
    async fn phase_watch_observes_transitions() {
        let orch = ShutdownOrchestrator::new(cfg(), Notifier::new(64));
        let mut rx = orch.subscribe_phase();
        assert_eq!(*rx.borrow(), ShutdownPhase::Idle);

        orch.set_force_mode("manual");
        assert!(rx.has_changed().unwrap_or(false));
        assert_eq!(*rx.borrow_and_update(), ShutdownPhase::Forced);
        assert!(orch.state().initiated);
    }
}
