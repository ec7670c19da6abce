//! Error types shared across the crate.

use std::time::Duration;
use thiserror::Error;

use crate::config::loader::ConfigError;

/// Errors returned by a [`CatalogProvider`](crate::catalog::CatalogProvider).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// Transport or provider failure.
    #[error("catalog unavailable: {0}")]
    Unavailable(String),

    /// The catalog has no record of the service.
    #[error("service not found in catalog: {0}")]
    ServiceNotFound(String),

    /// Lookup did not finish within the configured deadline.
    #[error("catalog lookup timed out after {0:?}")]
    Timeout(Duration),

    /// The catalog answered with something we cannot turn into endpoints.
    #[error("invalid catalog response: {0}")]
    InvalidResponse(String),
}

impl CatalogError {
    /// Whether another attempt could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, CatalogError::Unavailable(_) | CatalogError::Timeout(_))
    }
}

/// Top-level error for bootstrap, selection and reload.
#[derive(Debug, Error)]
pub enum PilotError {
    /// Startup configuration is missing or malformed.
    #[error("invalid configuration: {0}")]
    ConfigInvalid(#[from] ConfigError),

    /// The catalog could not be reached for a service.
    #[error("catalog unavailable for service '{service}': {source}")]
    CatalogUnavailable {
        service: String,
        #[source]
        source: CatalogError,
    },

    /// The catalog does not know a configured service.
    #[error("service '{0}' not found in catalog")]
    ServiceNotFound(String),

    /// The caller asked for a service that was never configured.
    #[error("unknown service: {0}")]
    UnknownService(String),

    /// The service is configured but currently has no endpoints.
    #[error("service '{0}' has no endpoints")]
    ServiceEmptyList(String),

    /// One or more services could not be refreshed.
    #[error("reload failed for services [{}] (generation {generation})", failed.join(", "))]
    ReloadFailed { failed: Vec<String>, generation: u64 },
}

impl PilotError {
    /// Map a catalog failure for `service` onto the public error kinds.
    pub fn from_catalog(service: &str, err: CatalogError) -> Self {
        match err {
            CatalogError::ServiceNotFound(_) => PilotError::ServiceNotFound(service.to_string()),
            other => PilotError::CatalogUnavailable {
                service: service.to_string(),
                source: other,
            },
        }
    }
}
