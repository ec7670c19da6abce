//! Client-side service discovery cache.
//!
//! Resolves a logical service name to one of its endpoints in round-robin
//! order, refreshing endpoint lists from a catalog (Consul) at startup and
//! whenever a reload is triggered.

pub mod catalog;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod observability;
pub mod pilot;
pub mod registry;
pub mod reload;
pub mod resilience;

pub use config::PilotConfig;
pub use error::{CatalogError, PilotError};
pub use pilot::ServicePilot;
pub use registry::Endpoint;
pub use reload::{ReloadOutcome, ReloadReport};
