//! Retry logic for catalog lookups.
//!
//! # Responsibilities
//! - Bound every lookup with a deadline
//! - Retry transient failures with exponential backoff + jitter
//!
//! # Design Decisions
//! - `ServiceNotFound` and malformed responses are final, never retried
//! - The last error is returned once attempts are exhausted

use std::time::Duration;

use crate::catalog::CatalogProvider;
use crate::config::CatalogConfig;
use crate::error::CatalogError;
use crate::registry::Endpoint;
use crate::resilience::backoff::calculate_backoff;
use crate::resilience::timeouts::with_timeout;

/// How a single service lookup is bounded and retried.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupPolicy {
    pub timeout: Duration,
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for LookupPolicy {
    fn default() -> Self {
        Self::from(&CatalogConfig::default())
    }
}

impl From<&CatalogConfig> for LookupPolicy {
    fn from(config: &CatalogConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.timeout_secs),
            max_attempts: config.max_attempts.max(1),
            base_delay_ms: config.base_delay_ms,
            max_delay_ms: config.max_delay_ms,
        }
    }
}

/// Look up `service`, retrying transient failures per `policy`.
pub async fn lookup_with_retry(
    catalog: &dyn CatalogProvider,
    service: &str,
    policy: &LookupPolicy,
) -> Result<Vec<Endpoint>, CatalogError> {
    let mut attempt = 0;
    loop {
        attempt += 1;
        match with_timeout(policy.timeout, catalog.lookup(service)).await {
            Ok(endpoints) => return Ok(endpoints),
            Err(e) if e.is_retryable() && attempt < policy.max_attempts => {
                let delay = calculate_backoff(attempt, policy.base_delay_ms, policy.max_delay_ms);
                tracing::info!(
                    service = %service,
                    provider = catalog.name(),
                    attempt,
                    delay = ?delay,
                    error = %e,
                    "Retrying catalog lookup"
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }
}
