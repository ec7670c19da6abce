//! Reload subsystem.
//!
//! # Data Flow
//! ```text
//! bootstrap:
//!     every service → catalog lookup (timeout + retry)
//!     → all succeed? build generation 1 : abort startup
//!
//! trigger (SIGHUP, timer, API):
//!     in-progress flag free? else no-op
//!     → every service → catalog lookup
//!     → new entries for successes, old entries kept for failures
//!     → publish snapshot generation n+1
//!     → clear flag, notify waiters
//! ```

pub mod coordinator;

pub use coordinator::{ReloadCoordinator, ReloadOutcome, ReloadReport, ReloadState};
