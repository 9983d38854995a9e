//! # OS signal wiring.
//!
//! Maps termination signals onto orchestrator actions:
//!
//! | Signal     | Before initiation  | After initiation           |
//! |------------|--------------------|----------------------------|
//! | `SIGTERM`  | graceful shutdown  | forced mode                |
//! | `SIGINT`   | graceful shutdown  | ignored (already running)  |
//!
//! Repeated signals never run tasks twice: the graceful path goes through
//! [`ShutdownOrchestrator::shutdown`](crate::ShutdownOrchestrator::shutdown), whose
//! task execution is idempotent.
//!
//! **Unix:** `SIGTERM` and `SIGINT` are handled. **Windows:** only Ctrl-C, mapped
//! to [`ShutdownSignal::Interrupt`].

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::shutdown::ShutdownOrchestrator;

/// Signals the orchestrator reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownSignal {
    Terminate,
    Interrupt,
}

impl ShutdownSignal {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShutdownSignal::Terminate => "SIGTERM",
            ShutdownSignal::Interrupt => "SIGINT",
        }
    }
}

impl fmt::Display for ShutdownSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a received signal led to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalAction {
    /// Graceful shutdown started (tasks are executing in the background).
    Graceful,
    /// Orchestrator escalated to forced mode.
    Force,
    /// Nothing to do.
    Ignore,
}

/// Spawns a task that forwards OS signals to `orchestrator` until `token` is cancelled
/// or shutdown completes.
///
/// The signal streams are registered once, before the first wait, so a signal that
/// arrives while the previous one is being handled is still observed.
pub fn listen_for_signals(
    orchestrator: Arc<ShutdownOrchestrator>,
    token: CancellationToken,
) -> JoinHandle<std::io::Result<()>> {
    tokio::spawn(async move {
        let source = OsSignals::register()?;
        forward_signals(orchestrator, token, source).await
    })
}

/// A persistent stream of termination signals.
#[async_trait]
pub(crate) trait SignalSource: Send {
    async fn recv(&mut self) -> std::io::Result<ShutdownSignal>;
}

pub(crate) async fn forward_signals<S: SignalSource>(
    orchestrator: Arc<ShutdownOrchestrator>,
    token: CancellationToken,
    mut source: S,
) -> std::io::Result<()> {
    loop {
        let sig = tokio::select! {
            _ = token.cancelled() => return Ok(()),
            _ = orchestrator.wait_complete() => return Ok(()),
            sig = source.recv() => sig?,
        };
        info!(signal = %sig, "signal received");
        orchestrator.handle_signal(sig);
    }
}

#[cfg(unix)]
struct OsSignals {
    sigterm: tokio::signal::unix::Signal,
    sigint: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl OsSignals {
    fn register() -> std::io::Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};

        Ok(Self {
            sigterm: signal(SignalKind::terminate())?,
            sigint: signal(SignalKind::interrupt())?,
        })
    }
}

#[cfg(unix)]
#[async_trait]
impl SignalSource for OsSignals {
    async fn recv(&mut self) -> std::io::Result<ShutdownSignal> {
        let sig = tokio::select! {
            Some(()) = self.sigterm.recv() => ShutdownSignal::Terminate,
            Some(()) = self.sigint.recv() => ShutdownSignal::Interrupt,
            else => return Err(closed()),
        };
        Ok(sig)
    }
}

#[cfg(windows)]
struct OsSignals {
    ctrl_c: tokio::signal::windows::CtrlC,
}

#[cfg(windows)]
impl OsSignals {
    fn register() -> std::io::Result<Self> {
        Ok(Self {
            ctrl_c: tokio::signal::windows::ctrl_c()?,
        })
    }
}

#[cfg(windows)]
#[async_trait]
impl SignalSource for OsSignals {
    async fn recv(&mut self) -> std::io::Result<ShutdownSignal> {
        self.ctrl_c.recv().await.ok_or_else(closed)?;
        Ok(ShutdownSignal::Interrupt)
    }
}

fn closed() -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::BrokenPipe, "signal stream closed")
}

/// Decides the action for `sig` given whether shutdown was already initiated.
pub(crate) fn classify(sig: ShutdownSignal, initiated: bool) -> SignalAction {
    match (sig, initiated) {
        (_, false) => SignalAction::Graceful,
        (ShutdownSignal::Terminate, true) => SignalAction::Force,
        (ShutdownSignal::Interrupt, true) => {
            warn!(signal = %sig, "shutdown already in progress");
            SignalAction::Ignore
        }
    }
}
