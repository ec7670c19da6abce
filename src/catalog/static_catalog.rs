//! In-memory catalog provider.

use arc_swap::ArcSwapOption;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;

use crate::catalog::CatalogProvider;
use crate::config::StaticServiceConfig;
use crate::error::CatalogError;
use crate::registry::Endpoint;

/// Catalog backed by a map that can be edited at runtime.
///
/// Used when services are declared in the config file, and as a stand-in
/// for a real catalog in tests.
#[derive(Debug, Default)]
pub struct StaticCatalog {
    services: DashMap<String, Vec<Endpoint>>,
    outage: ArcSwapOption<String>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `static_services` config entries.
    pub fn from_config(services: &[StaticServiceConfig]) -> Self {
        let catalog = Self::new();
        for service in services {
            catalog.set(&service.name, service.endpoints.clone());
        }
        catalog
    }

    /// Replace the endpoints for `service`.
    pub fn set(&self, service: &str, endpoints: Vec<Endpoint>) {
        self.services.insert(service.to_string(), endpoints);
    }

    /// Forget `service`; later lookups fail with `ServiceNotFound`.
    pub fn remove(&self, service: &str) {
        self.services.remove(service);
    }

    /// Make every lookup fail with `Unavailable` until cleared with `None`.
    pub fn set_outage(&self, reason: Option<&str>) {
        self.outage.store(reason.map(|r| Arc::new(r.to_string())));
    }
}

#[async_trait]
impl CatalogProvider for StaticCatalog {
    async fn lookup(&self, service: &str) -> Result<Vec<Endpoint>, CatalogError> {
        if let Some(reason) = self.outage.load_full() {
            return Err(CatalogError::Unavailable(reason.to_string()));
        }

        self.services
            .get(service)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| CatalogError::ServiceNotFound(service.to_string()))
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_lookup_and_edit() {
        let catalog = StaticCatalog::new();
        catalog.set("web", vec![Endpoint::new("10.0.0.1", 80)]);

        assert_eq!(catalog.lookup("web").await.unwrap(), vec![Endpoint::new("10.0.0.1", 80)]);
        assert_eq!(
            catalog.lookup("db").await.unwrap_err(),
            CatalogError::ServiceNotFound("db".into())
        );

        catalog.remove("web");
        assert!(matches!(catalog.lookup("web").await, Err(CatalogError::ServiceNotFound(_))));
    }

    #[tokio::test]
    async fn test_outage() {
        let catalog = StaticCatalog::new();
        catalog.set("web", vec![Endpoint::new("10.0.0.1", 80)]);

        catalog.set_outage(Some("connection refused"));
        assert_eq!(
            catalog.lookup("web").await.unwrap_err(),
            CatalogError::Unavailable("connection refused".into())
        );

        catalog.set_outage(None);
        assert!(catalog.lookup("web").await.is_ok());
    }

    #[tokio::test]
    async fn test_from_config() {
        let catalog = StaticCatalog::from_config(&[StaticServiceConfig {
            name: "web".into(),
            endpoints: vec![Endpoint::new("a", 1), Endpoint::new("b", 2)],
        }]);
        assert_eq!(catalog.lookup("web").await.unwrap().len(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_edits_and_lookups() {
        let catalog = Arc::new(StaticCatalog::new());
        catalog.set("web", vec![Endpoint::new("a", 1)]);

        let mut handles = Vec::new();
        for i in 0..4u16 {
            let catalog = catalog.clone();
            handles.push(tokio::spawn(async move {
                for _ in 0..100 {
                    catalog.set("web", vec![Endpoint::new("a", i)]);
                    let endpoints = catalog.lookup("web").await.unwrap();
                    assert_eq!(endpoints.len(), 1);
                }
            }));
        }
        for h in handles {
            h.await.unwrap();
        }
        assert_eq!(catalog.lookup("web").await.unwrap()[0].address, "a");
    }
}
