//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Catalog lookup:
//!     → timeouts.rs (enforce per-attempt deadline)
//!     → On transient failure: retries.rs (retry with backoff.rs delay)
//!     → final Result handed to the reload coordinator
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every catalog call has a deadline
//! - Only transport failures and timeouts are retried
//! - A hung catalog can delay a reload, never stall it forever

pub mod backoff;
pub mod retries;
pub mod timeouts;

pub use retries::{lookup_with_retry, LookupPolicy};
