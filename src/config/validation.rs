//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Require a catalog address and a non-empty service list
//! - Validate value ranges (timeouts > 0, delays ordered)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: PilotConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::fmt;
use std::net::SocketAddr;

use crate::catalog::consul::parse_catalog_address;
use crate::config::schema::PilotConfig;

/// A single semantic problem with a config.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check a parsed config for semantic errors.
pub fn validate_config(config: &PilotConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match config.consul.as_deref().map(str::trim) {
        Some(address) if !address.is_empty() => match parse_catalog_address(address) {
            Ok(url) if url.host_str().is_some_and(|h| !h.is_empty()) => {}
            Ok(_) => errors.push(ValidationError::new("consul", "address has no host")),
            Err(e) => errors.push(ValidationError::new("consul", format!("malformed address: {}", e))),
        },
        _ if config.static_services.is_empty() => {
            errors.push(ValidationError::new("consul", "catalog address is required"));
        }
        _ => {}
    }

    if config.backends.is_empty() {
        errors.push(ValidationError::new("backends", "at least one service must be configured"));
    }
    let mut seen = HashSet::new();
    for (i, backend) in config.backends.iter().enumerate() {
        let name = backend.name.trim();
        if name.is_empty() {
            errors.push(ValidationError::new(format!("backends[{}].name", i), "must not be empty"));
        } else if !seen.insert(name) {
            errors.push(ValidationError::new(
                format!("backends[{}].name", i),
                format!("duplicate service '{}'", name),
            ));
        }
    }

    for (i, service) in config.static_services.iter().enumerate() {
        if service.name.trim().is_empty() {
            errors.push(ValidationError::new(format!("static_services[{}].name", i), "must not be empty"));
        }
        for (j, endpoint) in service.endpoints.iter().enumerate() {
            if endpoint.address.trim().is_empty() {
                errors.push(ValidationError::new(
                    format!("static_services[{}].endpoints[{}].address", i, j),
                    "must not be empty",
                ));
            }
        }
    }

    let catalog = &config.catalog;
    if catalog.timeout_secs == 0 {
        errors.push(ValidationError::new("catalog.timeout_secs", "must be greater than 0"));
    }
    if catalog.max_attempts == 0 {
        errors.push(ValidationError::new("catalog.max_attempts", "must be at least 1"));
    }
    if catalog.base_delay_ms > catalog.max_delay_ms {
        errors.push(ValidationError::new(
            "catalog.base_delay_ms",
            "must not exceed catalog.max_delay_ms",
        ));
    }

    if config.reload.refresh_interval_secs == Some(0) {
        errors.push(ValidationError::new("reload.refresh_interval_secs", "must be greater than 0"));
    }

    let obs = &config.observability;
    if obs.metrics_enabled && obs.metrics_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::new(
            "observability.metrics_address",
            format!("not a socket address: {}", obs.metrics_address),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::{BackendConfig, StaticServiceConfig};
    use crate::registry::Endpoint;

    fn valid() -> PilotConfig {
        PilotConfig {
            consul: Some("consul:8500".into()),
            backends: vec![BackendConfig { name: "web".into() }],
            ..Default::default()
        }
    }

    fn fields(config: &PilotConfig) -> Vec<String> {
        validate_config(config)
            .unwrap_err()
            .into_iter()
            .map(|e| e.field)
            .collect()
    }

    #[test]
    fn test_valid_config() {
        assert!(validate_config(&valid()).is_ok());
    }

    #[test]
    fn test_missing_address_and_services() {
        let config = PilotConfig::default();
        assert_eq!(fields(&config), vec!["consul", "backends"]);
    }

    #[test]
    fn test_static_services_replace_address() {
        let mut config = valid();
        config.consul = None;
        config.static_services.push(StaticServiceConfig {
            name: "web".into(),
            endpoints: vec![Endpoint::new("10.0.0.1", 80)],
        });
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = valid();
        config.consul = Some("http://".into());
        config.backends.push(BackendConfig { name: "web".into() });
        config.backends.push(BackendConfig { name: "  ".into() });
        config.catalog.timeout_secs = 0;
        config.catalog.base_delay_ms = 5000;
        config.reload.refresh_interval_secs = Some(0);

        assert_eq!(
            fields(&config),
            vec![
                "consul",
                "backends[1].name",
                "backends[2].name",
                "catalog.timeout_secs",
                "catalog.base_delay_ms",
                "reload.refresh_interval_secs",
            ]
        );
    }

    #[test]
    fn test_metrics_address_checked_when_enabled() {
        let mut config = valid();
        config.observability.metrics_address = "nope".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        assert_eq!(fields(&config), vec!["observability.metrics_address"]);
    }
}
