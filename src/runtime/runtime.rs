use std::sync::Arc;

use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::bus::EventBus;
use crate::config::RuntimeConfig;
use crate::events::{Event, Notifier};
use crate::navigation::NavigationManager;
use crate::runtime::RuntimeBuilder;
use crate::shutdown::{ShutdownMetrics, ShutdownOrchestrator};

/// Explicit application context owning the three services.
///
/// ## Example
/// ```rust,no_run
/// use termvisor::{Runtime, RuntimeConfig};
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let rt = Runtime::builder(RuntimeConfig::default())
///         .with_signals()
///         .build()?;
///
///     // drive navigation and publish messages...
///
///     let report = rt.run_until_shutdown().await;
///     println!("teardown took {:?}", report.duration);
///     Ok(())
/// }
/// ```
pub struct Runtime {
    pub(crate) cfg: RuntimeConfig,
    pub(crate) notifier: Notifier,
    pub(crate) bus: Arc<EventBus>,
    pub(crate) navigation: Arc<NavigationManager>,
    pub(crate) shutdown: Arc<ShutdownOrchestrator>,
    /// Cancels background listeners (signals, log writer).
    pub(crate) token: CancellationToken,
}

impl Runtime {
    pub fn builder(cfg: RuntimeConfig) -> RuntimeBuilder {
        RuntimeBuilder::new(cfg)
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.cfg
    }

    pub fn bus(&self) -> &Arc<EventBus> {
        &self.bus
    }

    pub fn navigation(&self) -> &Arc<NavigationManager> {
        &self.navigation
    }

    pub fn shutdown_orchestrator(&self) -> &Arc<ShutdownOrchestrator> {
        &self.shutdown
    }

    /// Receiver for runtime notifications.
    pub fn subscribe_events(&self) -> broadcast::Receiver<Event> {
        self.notifier.subscribe()
    }

    /// Waits until shutdown completes (triggered by a signal, a fault or
    /// [`Runtime::shutdown`]) and releases the runtime's resources.
    pub async fn run_until_shutdown(&self) -> ShutdownMetrics {
        self.shutdown.wait_complete().await;
        self.finish()
    }

    /// Runs the teardown now and releases the runtime's resources.
    pub async fn shutdown(&self, reason: &str) -> ShutdownMetrics {
        self.shutdown.shutdown(reason).await;
        self.finish()
    }

    fn finish(&self) -> ShutdownMetrics {
        self.token.cancel();
        self.bus.destroy();
        let report = self.shutdown.metrics();
        info!(
            duration_ms = report.duration.as_millis() as u64,
            forced = report.forced,
            "runtime stopped"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use parking_lot::Mutex;
    use serde_json::{json, Value};
    use tokio_util::sync::CancellationToken;

    use super::*;
    use crate::bus::{Message, PublishOptions};
    use crate::error::{HandlerError, TaskError, ViewError};
    use crate::navigation::View;
    use crate::shutdown::{ShutdownPhase, FLUSH_EVENT_BUS_TASK, UNMOUNT_VIEWS_TASK};
    use crate::subscribers::HandlerFn;
    use crate::tasks::ShutdownTask;

    struct Screen(&'static str);

    #[async_trait]
    impl View for Screen {
        fn id(&self) -> &str {
            self.0
        }

        async fn mount(&mut self, _params: &Value) -> Result<(), ViewError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn builder_wires_services_and_task_order() {
        let rt = Runtime::builder(RuntimeConfig::default())
            .with_view(Box::new(Screen("home")))
            .with_task(ShutdownTask::from_fn("save", "Save", |_ctx: CancellationToken| async {
                Ok::<_, TaskError>(())
            }))
            .build()
            .expect("build");

        assert_eq!(
            rt.shutdown_orchestrator().task_ids(),
            vec![UNMOUNT_VIEWS_TASK, "save", FLUSH_EVENT_BUS_TASK]
        );
        assert!(rt.navigation().is_registered("home").await);
    }

    #[tokio::test]
    async fn duplicate_views_fail_build() {
        let res = Runtime::builder(RuntimeConfig::default())
            .with_view(Box::new(Screen("home")))
            .with_view(Box::new(Screen("home")))
            .build();
        assert_eq!(res.err().map(|e| e.as_label()), Some("nav_view_already_registered"));
    }

    #[tokio::test(start_paused = true)]
    async fn end_to_end_shutdown_delivers_last_messages() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let rt = Arc::new(
            Runtime::builder(RuntimeConfig::default())
                .with_subscriber(
                    "audit",
                    HandlerFn::arc(move |msg: Arc<Message>| {
                        let sink = Arc::clone(&sink);
                        async move {
                            sink.lock().push(msg.kind.clone());
                            Ok::<_, HandlerError>(())
                        }
                    }),
                    None,
                )
                .with_view(Box::new(Screen("home")))
                .with_exit_hook(|_code| {})
                .build()
                .expect("build"),
        );
        rt.navigation().navigate_to("home", None).await.expect("home");

        let waiter = Arc::clone(&rt);
        let done = tokio::spawn(async move { waiter.run_until_shutdown().await });

        rt.bus().pause();
        rt.bus()
            .publish("session.closing", json!({}), "app", PublishOptions::default());

        let report = rt.shutdown("user quit").await;
        assert_eq!(report.phase, ShutdownPhase::Complete);
        assert_eq!(report.completed, 2);
        assert!(!report.forced);

        let waited = tokio::time::timeout(Duration::from_secs(1), done)
            .await
            .expect("waiter finished")
            .expect("join");
        assert_eq!(waited.completed, 2);

        assert_eq!(
            *seen.lock(),
            vec!["navigation.changed", "session.closing", "navigation.changed"]
        );
        assert!(rt.bus().is_destroyed());
        assert!(rt.navigation().active_view().await.is_none());
    }
}
