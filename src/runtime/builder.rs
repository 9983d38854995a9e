use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::bus::{EventBus, MessageFilter};
use crate::config::RuntimeConfig;
use crate::error::NavigationError;
use crate::events::Notifier;
use crate::navigation::{NavigationManager, View};
use crate::runtime::Runtime;
use crate::shutdown::{
    flush_event_bus_task, listen_for_signals, unmount_views_task, ShutdownOrchestrator,
};
use crate::subscribers::HandlerRef;
use crate::tasks::ShutdownTask;

/// Builder for constructing a [`Runtime`] with optional features.
pub struct RuntimeBuilder {
    cfg: RuntimeConfig,
    subscribers: Vec<(String, HandlerRef, Option<MessageFilter>)>,
    views: Vec<Box<dyn View>>,
    tasks: Vec<ShutdownTask>,
    exit_hook: Option<Box<dyn Fn(i32) + Send + Sync>>,
    signals: bool,
    panic_hook: bool,
    #[cfg(feature = "logging")]
    log_writer: bool,
}

impl RuntimeBuilder {
    pub fn new(cfg: RuntimeConfig) -> Self {
        Self {
            cfg,
            subscribers: Vec::new(),
            views: Vec::new(),
            tasks: Vec::new(),
            exit_hook: None,
            signals: false,
            panic_hook: false,
            #[cfg(feature = "logging")]
            log_writer: false,
        }
    }

    /// Subscribes a handler to the event bus at build time.
    pub fn with_subscriber(
        mut self,
        name: impl Into<String>,
        handler: HandlerRef,
        filter: Option<MessageFilter>,
    ) -> Self {
        self.subscribers.push((name.into(), handler, filter));
        self
    }

    /// Registers a view with the navigation manager.
    pub fn with_view(mut self, view: Box<dyn View>) -> Self {
        self.views.push(view);
        self
    }

    /// Registers an application teardown task.
    ///
    /// Application tasks run after the views are unmounted and before the event bus
    /// is flushed, so messages they publish are still delivered.
    pub fn with_task(mut self, task: ShutdownTask) -> Self {
        self.tasks.push(task);
        self
    }

    /// Replaces `std::process::exit` as the reaction to the absolute shutdown deadline.
    pub fn with_exit_hook(mut self, f: impl Fn(i32) + Send + Sync + 'static) -> Self {
        self.exit_hook = Some(Box::new(f));
        self
    }

    /// Listens for SIGTERM/SIGINT and forwards them to the orchestrator.
    pub fn with_signals(mut self) -> Self {
        self.signals = true;
        self
    }

    /// Installs a process-wide panic hook that reports uncaught panics as faults.
    pub fn with_panic_hook(mut self) -> Self {
        self.panic_hook = true;
        self
    }

    /// Logs every runtime notification through `tracing`.
    #[cfg(feature = "logging")]
    pub fn with_log_writer(mut self) -> Self {
        self.log_writer = true;
        self
    }

    /// Builds the runtime.
    ///
    /// Construction order: notifier → event bus → navigation manager → orchestrator.
    /// Background listeners (signals, log writer) are spawned only inside a Tokio runtime.
    pub fn build(self) -> Result<Runtime, NavigationError> {
        let notifier = Notifier::new(self.cfg.notify_capacity_clamped());
        let token = CancellationToken::new();

        let bus = EventBus::new(self.cfg.bus.clone(), notifier.clone());
        for (name, handler, filter) in self.subscribers {
            bus.subscribe(&name, handler, filter);
        }

        let navigation = Arc::new(NavigationManager::with_views(
            self.cfg.navigation.clone(),
            Some(Arc::clone(&bus)),
            self.views,
        )?);

        let shutdown = ShutdownOrchestrator::new(self.cfg.shutdown.clone(), notifier.clone());
        if let Some(hook) = self.exit_hook {
            shutdown.set_exit_hook(hook);
        }
        shutdown.register(unmount_views_task(Arc::clone(&navigation)));
        for task in self.tasks {
            shutdown.register(task);
        }
        shutdown.register(flush_event_bus_task(Arc::clone(&bus)));

        if self.panic_hook {
            shutdown.install_panic_hook();
        }

        let in_runtime = tokio::runtime::Handle::try_current().is_ok();
        if self.signals {
            if in_runtime {
                listen_for_signals(Arc::clone(&shutdown), token.clone());
            } else {
                warn!("signal listener requires a Tokio runtime; skipped");
            }
        }
        #[cfg(feature = "logging")]
        if self.log_writer {
            if in_runtime {
                crate::events::LogWriter::new().spawn(&notifier, token.clone());
            } else {
                warn!("log writer requires a Tokio runtime; skipped");
            }
        }

        Ok(Runtime {
            cfg: self.cfg,
            notifier,
            bus,
            navigation,
            shutdown,
            token,
        })
    }
}
