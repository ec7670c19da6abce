//! Periodic reload trigger.

use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::{self, MissedTickBehavior};

use crate::pilot::ServicePilot;

/// Reloads the registry on a fixed interval.
pub struct RefreshTimer {
    pilot: ServicePilot,
    interval: Duration,
}

impl RefreshTimer {
    pub fn new(pilot: ServicePilot, interval: Duration) -> Self {
        Self { pilot, interval }
    }

    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        tracing::info!(interval = ?self.interval, "Periodic refresh starting");

        let mut ticker = time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick fires immediately; the registry was just populated.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.pilot.trigger_reload("timer");
                }
                _ = shutdown.recv() => {
                    tracing::debug!("Periodic refresh received shutdown signal, exiting loop");
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::StaticCatalog;
    use crate::lifecycle::Shutdown;
    use crate::registry::Endpoint;
    use crate::resilience::LookupPolicy;
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_refreshes_on_interval() {
        let catalog = Arc::new(StaticCatalog::new());
        catalog.set("web", vec![Endpoint::new("old", 80)]);
        let pilot = ServicePilot::with_catalog(vec!["web".into()], catalog.clone(), LookupPolicy::default())
            .await
            .unwrap();

        let shutdown = Shutdown::new();
        let timer = RefreshTimer::new(pilot.clone(), Duration::from_secs(10));
        let handle = tokio::spawn(timer.run(shutdown.subscribe()));

        catalog.set("web", vec![Endpoint::new("new", 80)]);
        let mut state = pilot.subscribe();
        state.wait_for(|s| s.completed >= 2 && !s.in_progress).await.unwrap();

        assert_eq!(pilot.select("web").unwrap(), Endpoint::new("new", 80));
        assert_eq!(pilot.generation(), 2);

        shutdown.trigger();
        handle.await.unwrap();
    }
}
