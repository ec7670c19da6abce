//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Load config → Bootstrap registry → Start reload triggers
//!
//! Triggers:
//!     SIGHUP (signals.rs)        → ServicePilot::trigger_reload
//!     interval (refresh.rs)      → ServicePilot::trigger_reload
//!
//! Shutdown (shutdown.rs):
//!     SIGINT/SIGTERM → broadcast stop → triggers exit
//! ```
//!
//! # Design Decisions
//! - Ordered startup: registry first, triggers after
//! - Triggers never run a reload inline; overlapping triggers are dropped

pub mod refresh;
pub mod shutdown;
pub mod signals;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{start, Running};
