//! Process shutdown signals.
//!
//! Handlers are registered when [`ShutdownSignal::install`] returns, so a
//! signal that arrives while a remote call is in flight is buffered instead of
//! terminating the process.

use anyhow::{Context, Result};

#[cfg(unix)]
use tokio::signal::unix::{Signal, SignalKind, signal};
#[cfg(windows)]
use tokio::signal::windows::{CtrlC, ctrl_c};

/// Ctrl-C and SIGTERM (runner job cancellation) listeners.
pub struct ShutdownSignal {
    #[cfg(unix)]
    interrupt: Signal,
    #[cfg(unix)]
    terminate: Signal,
    #[cfg(windows)]
    ctrl_c: CtrlC,
}

impl ShutdownSignal {
    /// Register the signal handlers.
    ///
    /// # Errors
    ///
    /// Returns an error if the runtime cannot register a handler.
    #[cfg(unix)]
    pub fn install() -> Result<Self> {
        Ok(Self {
            interrupt: signal(SignalKind::interrupt()).context("registering SIGINT handler")?,
            terminate: signal(SignalKind::terminate()).context("registering SIGTERM handler")?,
        })
    }

    /// Register the signal handlers.
    ///
    /// # Errors
    ///
    /// Returns an error if the runtime cannot register a handler.
    #[cfg(windows)]
    pub fn install() -> Result<Self> {
        Ok(Self {
            ctrl_c: ctrl_c().context("registering Ctrl-C handler")?,
        })
    }

    /// Resolves once a signal has been received since `install`.
    ///
    /// Cancel safe; a signal delivered before the first poll is not lost.
    pub async fn recv(&mut self) {
        #[cfg(unix)]
        tokio::select! {
            _ = self.interrupt.recv() => {},
            _ = self.terminate.recv() => {},
        }
        #[cfg(windows)]
        self.ctrl_c.recv().await;

        tracing::info!("received shutdown signal");
    }
}
