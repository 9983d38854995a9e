//! # Example: Terminal shell lifecycle
//!
//! Wires a runtime with two screens, an alert subscriber and one application teardown
//! task, then walks through navigation and shutdown.
//!
//! Run with `RUST_LOG=debug cargo run --example shell` and press Ctrl-C within two
//! seconds to see signal-driven shutdown; otherwise the demo quits on its own.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use termvisor::{
    HandlerError, HandlerFn, KeyBinding, Message, MessageFilter, PublishOptions, Runtime,
    RuntimeConfig, ShutdownTask, TaskError, View, ViewError, ViewSize, ViewState,
};

/// Scrollable list remembering its cursor across visits.
struct Inbox {
    cursor: i64,
}

#[async_trait]
impl View for Inbox {
    fn id(&self) -> &str {
        "inbox"
    }

    async fn mount(&mut self, _params: &Value) -> Result<(), ViewError> {
        Ok(())
    }

    async fn save_state(&mut self) -> Result<Option<ViewState>, ViewError> {
        Ok(Some(json!({ "cursor": self.cursor })))
    }

    async fn restore_state(&mut self, state: ViewState) -> Result<(), ViewError> {
        self.cursor = state["cursor"].as_i64().unwrap_or(0);
        Ok(())
    }

    fn render(&self, size: ViewSize) -> Vec<String> {
        vec![format!("[inbox] cursor={} ({}x{})", self.cursor, size.width, size.height)]
    }

    fn key_bindings(&self) -> Vec<KeyBinding> {
        vec![
            KeyBinding::new("j", "down", "inbox.down"),
            KeyBinding::new("enter", "open", "inbox.open"),
        ]
    }
}

/// Detail screen showing one message.
struct Detail {
    item: Value,
}

#[async_trait]
impl View for Detail {
    fn id(&self) -> &str {
        "detail"
    }

    async fn mount(&mut self, params: &Value) -> Result<(), ViewError> {
        self.item = params.clone();
        Ok(())
    }

    fn render(&self, _size: ViewSize) -> Vec<String> {
        vec![format!("[detail] {}", self.item)]
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let alerts = HandlerFn::arc(|msg: Arc<Message>| async move {
        println!("[alerts] {} (priority {}): {}", msg.kind, msg.priority, msg.data);
        Ok::<_, HandlerError>(())
    });

    let save_session = ShutdownTask::from_fn(
        "save-session",
        "Save session",
        |_ctx: CancellationToken| async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            println!("[save-session] session written");
            Ok::<(), TaskError>(())
        },
    )
    .critical()
    .with_timeout(Duration::from_secs(1));

    let rt = Runtime::builder(RuntimeConfig::default())
        .with_view(Box::new(Inbox { cursor: 0 }))
        .with_view(Box::new(Detail { item: Value::Null }))
        .with_subscriber(
            "alerts",
            alerts,
            Some(MessageFilter::new().kind("alert").min_priority(5)),
        )
        .with_task(save_session)
        .with_signals()
        .with_panic_hook()
        .with_log_writer()
        .build()?;

    let nav = rt.navigation();
    nav.resize(ViewSize::new(80, 24)).await;
    nav.navigate_to("inbox", None).await?;
    nav.navigate_to("detail", Some(json!({ "subject": "quarterly report" })))
        .await?;
    print_screen(&rt).await;
    nav.go_back().await?;
    print_screen(&rt).await;

    let bus = rt.bus();
    bus.publish("alert", json!("low battery"), "power", PublishOptions::new().priority(3));
    bus.publish("alert", json!("disk almost full"), "disk", PublishOptions::new().priority(8));
    bus.flush().await;
    println!("bus metrics: {:?}", bus.metrics());

    let report = tokio::select! {
        report = rt.run_until_shutdown() => report,
        _ = tokio::time::sleep(Duration::from_secs(2)) => rt.shutdown("demo finished").await,
    };
    println!(
        "shutdown {:?} in {:?}: completed={} failed={} skipped={}",
        report.phase, report.duration, report.completed, report.failed, report.skipped
    );
    Ok(())
}

async fn print_screen(rt: &Runtime) {
    let nav = rt.navigation();
    let lines = nav.render_active().await.unwrap_or_default();
    let keys: Vec<String> = nav
        .active_key_bindings()
        .await
        .into_iter()
        .map(|k| format!("{}={}", k.key, k.description))
        .collect();
    println!("{} | keys: {}", lines.join(" "), keys.join(", "));
}
