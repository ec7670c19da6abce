//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (JSON/TOML), path from argument or $CONTAINERPILOT
//!     → loader.rs (expand {{ .VAR }} templates, parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → PilotConfig (validated, immutable)
//!     → ServicePilot::bootstrap
//! ```
//!
//! # Design Decisions
//! - Config is read once at startup; reloads re-query the catalog, not the file
//! - All sections have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::PilotConfig;
pub use schema::BackendConfig;
pub use schema::CatalogConfig;
pub use schema::ReloadConfig;
pub use schema::StaticServiceConfig;
pub use schema::ObservabilityConfig;
pub use schema::LogFormat;
