//! Catalog provider subsystem.
//!
//! # Data Flow
//! ```text
//! reload / bootstrap
//!     → CatalogProvider::lookup(service)
//!         - consul.rs (HTTP catalog API)
//!         - static_catalog.rs (in-memory, config-declared)
//!     → ordered Vec<Endpoint> or CatalogError
//! ```
//!
//! # Design Decisions
//! - The registry only depends on the trait; providers are swappable
//! - Providers do not retry or enforce deadlines; resilience wraps them
//! - An empty list is a valid answer, not an error

pub mod consul;
pub mod static_catalog;

use async_trait::async_trait;

use crate::error::CatalogError;
use crate::registry::Endpoint;

pub use consul::ConsulCatalog;
pub use static_catalog::StaticCatalog;

/// Resolves a service name to its current endpoints.
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Return the endpoints for `service` in catalog order.
    async fn lookup(&self, service: &str) -> Result<Vec<Endpoint>, CatalogError>;

    /// Short provider name for logs.
    fn name(&self) -> &'static str;
}
