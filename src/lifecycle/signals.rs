//! OS signal handling.
//!
//! # Responsibilities
//! - SIGHUP → background reload (ignored while one is running)
//! - SIGINT/SIGTERM → process shutdown
//!
//! # Design Decisions
//! - Uses Tokio's signal handling (async-safe)
//! - Each SIGHUP spawns its reload instead of awaiting it, so a signal that
//!   lands mid-reload hits the in-progress check and is dropped, not queued

#[cfg(unix)]
use tokio::sync::broadcast;

#[cfg(unix)]
use crate::pilot::ServicePilot;

/// SIGHUP listener that turns each signal into a reload.
#[cfg(unix)]
pub struct ReloadSignal {
    hangup: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl ReloadSignal {
    /// Register the SIGHUP handler. From here on SIGHUP no longer
    /// terminates the process.
    pub fn install() -> std::io::Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};
        let hangup = signal(SignalKind::hangup())?;
        Ok(Self { hangup })
    }

    /// Trigger a reload on every SIGHUP until shutdown.
    pub async fn run(mut self, pilot: ServicePilot, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!("Listening for SIGHUP to reload services");
        loop {
            tokio::select! {
                received = self.hangup.recv() => {
                    if received.is_none() {
                        tracing::warn!("SIGHUP stream closed");
                        break;
                    }
                    pilot.trigger_reload("sighup");
                }
                _ = shutdown.recv() => {
                    tracing::debug!("Signal listener received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }
}

/// Wait for Ctrl+C, or SIGTERM on unix.
pub async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut terminate = signal(SignalKind::terminate())?;
        tokio::select! {
            result = tokio::signal::ctrl_c() => result?,
            _ = terminate.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
    }

    tracing::info!("Shutdown signal received");
    Ok(())
}
