//! Backend registry subsystem.
//!
//! # Data Flow
//! ```text
//! select(name)
//!     → load current Snapshot (lock-free)
//!     → look up BackendEntry by service name
//!     → round_robin.rs (return endpoint under cursor, advance cursor)
//!
//! reload
//!     → build a complete new Snapshot off to the side
//!     → publish() swaps it in with one atomic store
//! ```
//!
//! # Design Decisions
//! - Readers never block and never see a half-built snapshot
//! - Entries are replaced wholesale; cursors are never carried onto a new list
//! - An entry that was not refreshed is shared (same `Arc`) with the next
//!   snapshot, so its cursor keeps advancing across the swap

pub mod endpoint;
pub mod round_robin;

use arc_swap::ArcSwap;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::PilotError;
use crate::observability::metrics;

pub use endpoint::Endpoint;
pub use round_robin::BackendEntry;

/// An immutable view of every tracked service at one point in time.
#[derive(Debug, Default)]
pub struct Snapshot {
    generation: u64,
    entries: HashMap<String, Arc<BackendEntry>>,
}

impl Snapshot {
    pub fn new(generation: u64, entries: HashMap<String, Arc<BackendEntry>>) -> Self {
        Self {
            generation,
            entries,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn get(&self, service: &str) -> Option<&Arc<BackendEntry>> {
        self.entries.get(service)
    }

    pub fn entries(&self) -> &HashMap<String, Arc<BackendEntry>> {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Owns the current snapshot and serves round-robin selections from it.
#[derive(Debug)]
pub struct BackendRegistry {
    current: ArcSwap<Snapshot>,
}

impl BackendRegistry {
    /// Create a registry from an already populated snapshot.
    pub fn new(snapshot: Snapshot) -> Self {
        Self {
            current: ArcSwap::from_pointee(snapshot),
        }
    }

    /// Select the next endpoint for `service`.
    pub fn select(&self, service: &str) -> Result<Endpoint, PilotError> {
        let snapshot = self.current.load();

        let Some(entry) = snapshot.get(service) else {
            tracing::debug!(service = %service, "Service not in registry");
            metrics::record_selection(service, "unknown");
            return Err(PilotError::UnknownService(service.to_string()));
        };

        match entry.next_endpoint() {
            Some(endpoint) => {
                metrics::record_selection(service, "ok");
                Ok(endpoint.clone())
            }
            None => {
                tracing::debug!(service = %service, "Service has no endpoints");
                metrics::record_selection(service, "empty");
                Err(PilotError::ServiceEmptyList(service.to_string()))
            }
        }
    }

    /// Current snapshot. Holding it does not block a concurrent publish.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.current.load_full()
    }

    /// Atomically replace the current snapshot.
    pub fn publish(&self, snapshot: Snapshot) {
        for (service, entry) in snapshot.entries() {
            metrics::record_endpoint_count(service, entry.len());
        }
        tracing::debug!(
            generation = snapshot.generation(),
            services = snapshot.len(),
            "Publishing registry snapshot"
        );
        self.current.store(Arc::new(snapshot));
    }

    pub fn generation(&self) -> u64 {
        self.current.load().generation()
    }

    /// Current endpoint list for `service`, in catalog order.
    pub fn endpoints(&self, service: &str) -> Option<Vec<Endpoint>> {
        self.current
            .load()
            .get(service)
            .map(|entry| entry.endpoints().to_vec())
    }

    /// Names of all tracked services, sorted.
    pub fn services(&self) -> Vec<String> {
        let mut names: Vec<String> = self.current.load().entries().keys().cloned().collect();
        names.sort();
        names
    }
}
