//! Startup orchestration.
//!
//! # Responsibilities
//! - Start the metrics exporter when enabled
//! - Populate the registry before anything can select from it
//! - Start background reload triggers
//!
//! # Design Decisions
//! - Fail fast: any registry population error is fatal
//! - Triggers start last, once the registry is serving

use std::time::Duration;
use tokio::task::JoinHandle;

use crate::config::PilotConfig;
use crate::error::PilotError;
use crate::lifecycle::refresh::RefreshTimer;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::pilot::ServicePilot;

/// A bootstrapped pilot plus the background tasks that reload it.
pub struct Running {
    pub pilot: ServicePilot,
    shutdown: Shutdown,
    tasks: Vec<JoinHandle<()>>,
}

impl Running {
    /// Stop the background triggers and wait for them to exit.
    pub async fn shutdown(self) {
        self.shutdown.trigger();
        for task in self.tasks {
            if let Err(e) = task.await {
                tracing::warn!(error = %e, "Background task ended abnormally");
            }
        }
        tracing::info!("Background tasks stopped");
    }
}

/// Bootstrap the registry from `config` and install the configured triggers.
pub async fn start(config: &PilotConfig) -> Result<Running, PilotError> {
    let obs = &config.observability;
    if obs.metrics_enabled {
        match obs.metrics_address.parse() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics exporter");
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %obs.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let pilot = ServicePilot::bootstrap(config).await?;
    tracing::info!(
        services = ?pilot.services(),
        generation = pilot.generation(),
        "Service registry ready"
    );

    let shutdown = Shutdown::new();
    let mut tasks = Vec::new();

    if config.reload.on_sighup {
        #[cfg(unix)]
        {
            match crate::lifecycle::signals::ReloadSignal::install() {
                Ok(signal) => tasks.push(tokio::spawn(signal.run(pilot.clone(), shutdown.subscribe()))),
                Err(e) => tracing::error!(error = %e, "Failed to install SIGHUP handler"),
            }
        }
        #[cfg(not(unix))]
        {
            tracing::warn!("SIGHUP reload is not supported on this platform");
        }
    }

    if let Some(secs) = config.reload.refresh_interval_secs {
        let timer = RefreshTimer::new(pilot.clone(), Duration::from_secs(secs));
        tasks.push(tokio::spawn(timer.run(shutdown.subscribe())));
    }

    Ok(Running {
        pilot,
        shutdown,
        tasks,
    })
}
