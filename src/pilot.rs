//! The service-discovery handle callers hold.

use std::sync::Arc;
use tokio::sync::watch;

use crate::catalog::{CatalogProvider, ConsulCatalog, StaticCatalog};
use crate::config::validation::{validate_config, ValidationError};
use crate::config::{ConfigError, PilotConfig};
use crate::error::PilotError;
use crate::registry::Endpoint;
use crate::reload::{ReloadCoordinator, ReloadOutcome, ReloadState};
use crate::resilience::LookupPolicy;

/// Round-robin endpoint selection over catalog-backed services.
///
/// Cheap to clone; clones share the same registry and reload state. A
/// `ServicePilot` only exists once every configured service has been
/// resolved, so the first `select` always sees a populated registry.
#[derive(Debug, Clone)]
pub struct ServicePilot {
    coordinator: Arc<ReloadCoordinator>,
}

impl ServicePilot {
    /// Build the catalog described by `config` and populate the registry.
    pub async fn bootstrap(config: &PilotConfig) -> Result<Self, PilotError> {
        validate_config(config).map_err(ConfigError::Validation)?;
        let catalog = build_catalog(config)?;
        Self::with_catalog(config.service_names(), catalog, LookupPolicy::from(&config.catalog)).await
    }

    /// Populate the registry for `services` from any catalog provider.
    pub async fn with_catalog(
        services: Vec<String>,
        catalog: Arc<dyn CatalogProvider>,
        policy: LookupPolicy,
    ) -> Result<Self, PilotError> {
        let mut names: Vec<String> = Vec::with_capacity(services.len());
        for service in services {
            if !names.contains(&service) {
                names.push(service);
            }
        }
        if names.is_empty() || names.iter().any(|n| n.trim().is_empty()) {
            return Err(ConfigError::Validation(vec![ValidationError::new(
                "backends",
                "service names must be non-empty and at least one is required",
            )])
            .into());
        }

        let coordinator = ReloadCoordinator::bootstrap(names, catalog, policy).await?;
        Ok(Self {
            coordinator: Arc::new(coordinator),
        })
    }

    /// Next endpoint for `service` in round-robin order. Never blocks.
    pub fn select(&self, service: &str) -> Result<Endpoint, PilotError> {
        self.coordinator.registry().select(service)
    }

    /// Like [`select`](Self::select), but first waits for any in-flight
    /// reload to finish so the answer comes from the refreshed registry.
    pub async fn select_settled(&self, service: &str) -> Result<Endpoint, PilotError> {
        self.coordinator.wait_idle().await;
        self.select(service)
    }

    /// Refresh all services from the catalog. A no-op if one is already running.
    pub async fn reload(&self) -> Result<ReloadOutcome, PilotError> {
        self.coordinator.reload().await
    }

    /// Start a reload in the background and log its outcome.
    pub fn trigger_reload(&self, source: &'static str) -> tokio::task::JoinHandle<()> {
        let pilot = self.clone();
        tokio::spawn(async move {
            tracing::info!(source, "Reload triggered");
            match pilot.reload().await {
                Ok(ReloadOutcome::Applied(report)) => {
                    tracing::debug!(source, generation = report.generation, "Triggered reload applied");
                }
                Ok(ReloadOutcome::Skipped) => {
                    tracing::info!(source, "Reload already running, trigger ignored");
                }
                Err(e) => tracing::error!(source, error = %e, "Triggered reload failed"),
            }
        })
    }

    pub fn is_reloading(&self) -> bool {
        self.coordinator.is_reloading()
    }

    /// Registry generation; bumps each time a reload publishes.
    pub fn generation(&self) -> u64 {
        self.coordinator.registry().generation()
    }

    /// Configured services, in configuration order.
    pub fn services(&self) -> Vec<String> {
        self.coordinator.services().to_vec()
    }

    /// Current endpoints for `service`.
    pub fn endpoints(&self, service: &str) -> Result<Vec<Endpoint>, PilotError> {
        self.coordinator
            .registry()
            .endpoints(service)
            .ok_or_else(|| PilotError::UnknownService(service.to_string()))
    }

    /// Watch reload progress.
    pub fn subscribe(&self) -> watch::Receiver<ReloadState> {
        self.coordinator.subscribe()
    }
}

/// Pick the catalog provider for a config: Consul when an address is set,
/// otherwise the declared static services.
pub fn build_catalog(config: &PilotConfig) -> Result<Arc<dyn CatalogProvider>, PilotError> {
    match config.consul.as_deref().map(str::trim).filter(|a| !a.is_empty()) {
        Some(address) => {
            let catalog = ConsulCatalog::new(address, &config.catalog).map_err(|e| {
                ConfigError::Validation(vec![ValidationError::new("consul", e.to_string())])
            })?;
            tracing::info!(address = %catalog.base_url(), "Using Consul catalog");
            Ok(Arc::new(catalog))
        }
        None => {
            tracing::info!(services = config.static_services.len(), "Using static catalog");
            Ok(Arc::new(StaticCatalog::from_config(&config.static_services)))
        }
    }
}
