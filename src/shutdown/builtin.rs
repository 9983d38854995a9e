//! Teardown tasks wired by the runtime for its own services.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::bus::EventBus;
use crate::error::TaskError;
use crate::navigation::NavigationManager;
use crate::tasks::ShutdownTask;

pub const UNMOUNT_VIEWS_TASK: &str = "unmount-views";
pub const FLUSH_EVENT_BUS_TASK: &str = "flush-event-bus";

/// Critical task: saves and unmounts the active view so it can release the terminal.
pub fn unmount_views_task(nav: Arc<NavigationManager>) -> ShutdownTask {
    ShutdownTask::from_fn(UNMOUNT_VIEWS_TASK, "Unmount views", move |_ctx: CancellationToken| {
        let nav = Arc::clone(&nav);
        async move {
            let unmounted = nav
                .unmount_active()
                .await
                .map_err(|e| TaskError::fail(e.to_string()))?;
            debug!(unmounted, "active view released");
            Ok::<_, TaskError>(())
        }
    })
    .critical()
}

/// Best-effort task: delivers pending messages (even if the bus was paused), then
/// pauses the bus.
pub fn flush_event_bus_task(bus: Arc<EventBus>) -> ShutdownTask {
    ShutdownTask::from_fn(FLUSH_EVENT_BUS_TASK, "Flush event bus", move |ctx: CancellationToken| {
        let bus = Arc::clone(&bus);
        async move {
            bus.resume();
            tokio::select! {
                _ = ctx.cancelled() => {
                    bus.pause();
                    return Err(TaskError::Canceled);
                }
                _ = bus.flush() => {}
            }
            bus.pause();
            debug!(pending = bus.metrics().queue_size, "event bus flushed");
            Ok::<_, TaskError>(())
        }
    })
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use serde_json::{json, Value};

    use super::*;
    use crate::bus::{Message, MessageFilter, PublishOptions};
    use crate::config::{BusConfig, NavigationConfig, ShutdownConfig};
    use crate::error::{HandlerError, ViewError};
    use crate::events::Notifier;
    use crate::navigation::View;
    use crate::shutdown::{ShutdownMetrics, ShutdownOrchestrator};
    use crate::subscribers::HandlerFn;

    struct Plain;

    #[async_trait]
    impl View for Plain {
        fn id(&self) -> &str {
            "plain"
        }

        async fn mount(&mut self, _params: &Value) -> Result<(), ViewError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn builtin_tasks_release_views_and_drain_bus() {
        let notifier = Notifier::new(64);
        let bus = EventBus::new(BusConfig::default(), notifier.clone());
        let nav = Arc::new(NavigationManager::with_bus(
            NavigationConfig::default(),
            Arc::clone(&bus),
        ));
        nav.register_view(Box::new(Plain)).await.expect("register");
        nav.navigate_to("plain", None).await.expect("navigate");

        bus.pause();
        bus.publish("app.saved", json!(1), "test", PublishOptions::default());

        let orch = ShutdownOrchestrator::new(
            ShutdownConfig {
                exit_on_deadline: false,
                ..ShutdownConfig::default()
            },
            notifier,
        );
        orch.register(unmount_views_task(Arc::clone(&nav)));
        orch.register(flush_event_bus_task(Arc::clone(&bus)));

        let report = orch.shutdown("test").await;
        assert_eq!(report.completed, 2);
        assert!(nav.active_view().await.is_none());
        assert!(bus.is_paused());
        assert_eq!(bus.metrics().queue_size, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn quit_handler_can_run_shutdown_and_flush() {
        let notifier = Notifier::new(64);
        let bus = EventBus::new(BusConfig::default(), notifier.clone());
        let orch = ShutdownOrchestrator::new(
            ShutdownConfig {
                exit_on_deadline: false,
                ..ShutdownConfig::default()
            },
            notifier,
        );
        orch.register(flush_event_bus_task(Arc::clone(&bus)));

        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        bus.subscribe(
            "recorder",
            HandlerFn::arc(move |msg: Arc<Message>| {
                let sink = Arc::clone(&sink);
                async move {
                    sink.lock().push(msg.kind.clone());
                    Ok::<_, HandlerError>(())
                }
            }),
            None,
        );

        let report: Arc<parking_lot::Mutex<Option<ShutdownMetrics>>> = Arc::default();
        let slot = Arc::clone(&report);
        let o = Arc::clone(&orch);
        bus.subscribe(
            "quit",
            HandlerFn::arc(move |_msg: Arc<Message>| {
                let (o, slot) = (Arc::clone(&o), Arc::clone(&slot));
                async move {
                    let metrics = o.shutdown("user quit").await;
                    *slot.lock() = Some(metrics);
                    Ok::<_, HandlerError>(())
                }
            }),
            Some(MessageFilter::new().kind("app.quit")),
        );

        let started = tokio::time::Instant::now();
        bus.publish("app.quit", Value::Null, "keys", PublishOptions::new().priority(10));
        bus.publish("app.saved", json!(1), "test", PublishOptions::default());
        bus.flush().await;

        let report = report.lock().clone().expect("shutdown ran inside the handler");
        assert_eq!(report.completed, 1);
        assert_eq!(report.failed, 0);
        assert!(started.elapsed() < Duration::from_secs(1));
        assert_eq!(*seen.lock(), vec!["app.quit".to_string(), "app.saved".to_string()]);
        assert!(bus.is_paused());
        assert_eq!(bus.metrics().queue_size, 0);
    }
}
