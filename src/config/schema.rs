//! Configuration schema definitions.
//!
//! The file format is a superset of the containerpilot layout: a `consul`
//! address and a `backends` list of `{ "name": ... }` objects. Keys this
//! crate does not use are ignored.

use serde::{Deserialize, Serialize};

use crate::registry::Endpoint;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct PilotConfig {
    /// Consul agent address (e.g., "consul:8500" or "http://127.0.0.1:8500").
    pub consul: Option<String>,

    /// Services to track.
    pub backends: Vec<BackendConfig>,

    /// Services with fixed endpoints, used instead of Consul when `consul` is unset.
    pub static_services: Vec<StaticServiceConfig>,

    /// Catalog lookup settings.
    pub catalog: CatalogConfig,

    /// Reload trigger settings.
    pub reload: ReloadConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl PilotConfig {
    /// Names of the tracked services, in declaration order.
    pub fn service_names(&self) -> Vec<String> {
        self.backends.iter().map(|b| b.name.clone()).collect()
    }
}

/// A tracked service.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendConfig {
    /// Service name as registered in the catalog.
    pub name: String,
}

/// A service whose endpoints are declared in the config file.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StaticServiceConfig {
    pub name: String,
    #[serde(default)]
    pub endpoints: Vec<Endpoint>,
}

/// Catalog lookup configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Deadline for a single lookup in seconds.
    pub timeout_secs: u64,

    /// Attempts per lookup, including the first.
    pub max_attempts: u32,

    /// Base delay for exponential backoff in milliseconds.
    pub base_delay_ms: u64,

    /// Maximum delay for exponential backoff in milliseconds.
    pub max_delay_ms: u64,

    /// Consul datacenter to query (agent default when unset).
    pub datacenter: Option<String>,

    /// Consul ACL token.
    pub token: Option<String>,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 5,
            max_attempts: 3,
            base_delay_ms: 100,
            max_delay_ms: 2000,
            datacenter: None,
            token: None,
        }
    }
}

/// Reload trigger configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ReloadConfig {
    /// Reload on SIGHUP.
    pub on_sighup: bool,

    /// Also reload on a fixed interval (disabled when unset).
    pub refresh_interval_secs: Option<u64>,
}

impl Default for ReloadConfig {
    fn default() -> Self {
        Self {
            on_sighup: true,
            refresh_interval_secs: None,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable the Prometheus endpoint.
    pub metrics_enabled: bool,

    /// Prometheus endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
