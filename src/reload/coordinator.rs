//! Reload coordination.
//!
//! # Responsibilities
//! - Populate the registry once at startup (all services must resolve)
//! - Refresh every service from the catalog on demand
//! - Allow at most one reload in flight; extra triggers are no-ops
//! - Tell waiters when a reload finishes
//!
//! # Design Decisions
//! - The in-progress flag lives inside the watch channel, so check-and-set
//!   is one atomic step and completion is a non-blocking send
//! - A failed lookup keeps the service's last-known-good entry; successful
//!   lookups from the same reload are still published (no rollback)
//! - The flag is cleared by a drop guard, so a cancelled reload never leaves
//!   waiters stuck

use futures_util::future::join_all;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::watch;

use crate::catalog::CatalogProvider;
use crate::error::{CatalogError, PilotError};
use crate::observability::metrics;
use crate::registry::{BackendEntry, BackendRegistry, Endpoint, Snapshot};
use crate::resilience::{lookup_with_retry, LookupPolicy};

/// Reload state broadcast to waiters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReloadState {
    /// A reload is running.
    pub in_progress: bool,
    /// Number of reloads that have finished, successfully or not.
    pub completed: u64,
    /// Registry generation after the last finished reload.
    pub generation: u64,
}

/// Result of a reload request that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReloadOutcome {
    /// Every service was refreshed and a new snapshot published.
    Applied(ReloadReport),
    /// Another reload was already running; nothing was done.
    Skipped,
}

/// Summary of a completed reload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReloadReport {
    pub generation: u64,
    pub refreshed: Vec<String>,
    pub duration: Duration,
}

/// Refreshes the registry from the catalog.
pub struct ReloadCoordinator {
    registry: Arc<BackendRegistry>,
    catalog: Arc<dyn CatalogProvider>,
    services: Vec<String>,
    policy: LookupPolicy,
    state: watch::Sender<ReloadState>,
}

impl std::fmt::Debug for ReloadCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReloadCoordinator")
            .field("catalog", &self.catalog.name())
            .field("services", &self.services)
            .field("policy", &self.policy)
            .field("state", &*self.state.borrow())
            .finish()
    }
}

impl ReloadCoordinator {
    /// Resolve every service and build the initial registry.
    ///
    /// Fails if any service cannot be resolved; no registry is created in
    /// that case.
    pub async fn bootstrap(
        services: Vec<String>,
        catalog: Arc<dyn CatalogProvider>,
        policy: LookupPolicy,
    ) -> Result<Self, PilotError> {
        let started = Instant::now();
        tracing::info!(
            provider = catalog.name(),
            services = services.len(),
            "Populating backend registry"
        );

        let results = fetch_all(catalog.as_ref(), &services, &policy).await;

        let mut entries = HashMap::with_capacity(results.len());
        let mut first_error = None;
        for (service, result) in results {
            match result {
                Ok(endpoints) => {
                    tracing::debug!(service = %service, endpoints = endpoints.len(), "Service resolved");
                    if endpoints.is_empty() {
                        tracing::warn!(service = %service, "Service has no endpoints");
                    }
                    entries.insert(service, Arc::new(BackendEntry::new(endpoints)));
                }
                Err(e) => {
                    tracing::error!(service = %service, error = %e, "Failed to resolve service at startup");
                    metrics::record_lookup_failure(&service);
                    if first_error.is_none() {
                        first_error = Some(PilotError::from_catalog(&service, e));
                    }
                }
            }
        }
        if let Some(err) = first_error {
            metrics::record_reload("bootstrap_failed", started.elapsed());
            return Err(err);
        }

        let registry = Arc::new(BackendRegistry::new(Snapshot::default()));
        registry.publish(Snapshot::new(1, entries));
        metrics::record_reload("bootstrap", started.elapsed());
        tracing::info!(elapsed = ?started.elapsed(), "Backend registry populated");

        let (state, _) = watch::channel(ReloadState {
            in_progress: false,
            completed: 1,
            generation: 1,
        });

        Ok(Self {
            registry,
            catalog,
            services,
            policy,
            state,
        })
    }

    /// Refresh every service from the catalog.
    ///
    /// Returns `Skipped` if a reload is already running. If some lookups
    /// fail, the successful ones are still published and `ReloadFailed`
    /// names the services left on their previous endpoints.
    pub async fn reload(&self) -> Result<ReloadOutcome, PilotError> {
        let Some(_guard) = InProgressGuard::acquire(self) else {
            tracing::debug!("Reload already in progress, ignoring trigger");
            metrics::record_reload("skipped", Duration::ZERO);
            return Ok(ReloadOutcome::Skipped);
        };

        let started = Instant::now();
        tracing::info!(services = self.services.len(), "Reloading services from catalog");

        let results = fetch_all(self.catalog.as_ref(), &self.services, &self.policy).await;
        let previous = self.registry.snapshot();

        let mut entries = HashMap::with_capacity(results.len());
        let mut refreshed = Vec::new();
        let mut failed = Vec::new();
        for (service, result) in results {
            match result {
                Ok(endpoints) => {
                    tracing::debug!(service = %service, endpoints = endpoints.len(), "Service refreshed");
                    entries.insert(service.clone(), Arc::new(BackendEntry::new(endpoints)));
                    refreshed.push(service);
                }
                Err(e) => {
                    tracing::warn!(
                        service = %service,
                        error = %e,
                        "Failed to refresh service, keeping last known endpoints"
                    );
                    metrics::record_lookup_failure(&service);
                    if let Some(entry) = previous.get(&service) {
                        entries.insert(service.clone(), entry.clone());
                    }
                    failed.push(service);
                }
            }
        }

        let generation = if refreshed.is_empty() {
            previous.generation()
        } else {
            let next = previous.generation() + 1;
            self.registry.publish(Snapshot::new(next, entries));
            next
        };
        let duration = started.elapsed();

        if failed.is_empty() {
            metrics::record_reload("ok", duration);
            tracing::info!(generation, elapsed = ?duration, "Reload complete");
            Ok(ReloadOutcome::Applied(ReloadReport {
                generation,
                refreshed,
                duration,
            }))
        } else {
            metrics::record_reload("failed", duration);
            tracing::error!(
                generation,
                failed = ?failed,
                refreshed = refreshed.len(),
                "Reload finished with failures"
            );
            Err(PilotError::ReloadFailed { failed, generation })
        }
    }

    /// Whether a reload is running right now.
    pub fn is_reloading(&self) -> bool {
        self.state.borrow().in_progress
    }

    /// Wait until no reload is running. Returns immediately if idle.
    pub async fn wait_idle(&self) {
        let mut rx = self.state.subscribe();
        // The sender lives as long as `self`, so this cannot observe a closed channel.
        let _ = rx.wait_for(|state| !state.in_progress).await;
    }

    /// Subscribe to reload state changes.
    pub fn subscribe(&self) -> watch::Receiver<ReloadState> {
        self.state.subscribe()
    }

    pub fn registry(&self) -> &Arc<BackendRegistry> {
        &self.registry
    }

    /// Services this coordinator refreshes, in configuration order.
    pub fn services(&self) -> &[String] {
        &self.services
    }
}

/// Holds the in-progress flag for the lifetime of one reload.
struct InProgressGuard<'a> {
    coordinator: &'a ReloadCoordinator,
}

impl<'a> InProgressGuard<'a> {
    fn acquire(coordinator: &'a ReloadCoordinator) -> Option<Self> {
        let acquired = coordinator.state.send_if_modified(|state| {
            if state.in_progress {
                false
            } else {
                state.in_progress = true;
                true
            }
        });
        acquired.then(|| Self { coordinator })
    }
}

impl Drop for InProgressGuard<'_> {
    fn drop(&mut self) {
        let generation = self.coordinator.registry.generation();
        self.coordinator.state.send_modify(|state| {
            state.in_progress = false;
            state.completed += 1;
            state.generation = generation;
        });
    }
}

/// Look up every service concurrently, preserving input order.
async fn fetch_all(
    catalog: &dyn CatalogProvider,
    services: &[String],
    policy: &LookupPolicy,
) -> Vec<(String, Result<Vec<Endpoint>, CatalogError>)> {
    let lookups = services.iter().map(|service| async move {
        let result = lookup_with_retry(catalog, service, policy).await;
        (service.clone(), result)
    });
    join_all(lookups).await
}
