//! Round-robin selection over a single service's endpoints.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::registry::endpoint::Endpoint;

/// Endpoint list and rotation cursor for one service.
///
/// The list is fixed for the lifetime of the entry. A reload replaces the
/// whole entry, so a cursor is never applied to a list it was not built for.
#[derive(Debug)]
pub struct BackendEntry {
    endpoints: Vec<Endpoint>,
    /// Always `< endpoints.len()` when the list is non-empty.
    cursor: AtomicUsize,
}

impl BackendEntry {
    /// Create an entry with the cursor at the first endpoint.
    pub fn new(endpoints: Vec<Endpoint>) -> Self {
        Self {
            endpoints,
            cursor: AtomicUsize::new(0),
        }
    }

    /// Return the endpoint under the cursor and advance it, wrapping at the end.
    /// Returns `None` for an empty list.
    pub fn next_endpoint(&self) -> Option<&Endpoint> {
        let len = self.endpoints.len();
        if len == 0 {
            return None;
        }

        let index = self
            .cursor
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |c| Some((c + 1) % len))
            .unwrap_or_else(|c| c);
        self.endpoints.get(index)
    }

    /// Current list in catalog order.
    pub fn endpoints(&self) -> &[Endpoint] {
        &self.endpoints
    }

    /// Index of the endpoint the next selection will return.
    pub fn cursor(&self) -> usize {
        self.cursor.load(Ordering::Acquire)
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn abc() -> Vec<Endpoint> {
        vec![
            Endpoint::new("a", 1),
            Endpoint::new("b", 2),
            Endpoint::new("c", 3),
        ]
    }

    #[test]
    fn test_round_robin() {
        let entry = BackendEntry::new(abc());

        assert_eq!(entry.next_endpoint().unwrap().address, "a");
        assert_eq!(entry.next_endpoint().unwrap().address, "b");
        assert_eq!(entry.next_endpoint().unwrap().address, "c");
        assert_eq!(entry.next_endpoint().unwrap().address, "a");
        assert_eq!(entry.cursor(), 1);
    }

    #[test]
    fn test_single_endpoint() {
        let entry = BackendEntry::new(vec![Endpoint::new("only", 80)]);
        for _ in 0..5 {
            assert_eq!(entry.next_endpoint().unwrap().address, "only");
            assert_eq!(entry.cursor(), 0);
        }
    }

    #[test]
    fn test_empty_entry() {
        let entry = BackendEntry::new(Vec::new());
        assert!(entry.is_empty());
        assert!(entry.next_endpoint().is_none());
        assert_eq!(entry.cursor(), 0);
    }

    #[test]
    fn test_concurrent_selection_is_fair() {
        let entry = Arc::new(BackendEntry::new(abc()));
        let mut handles = Vec::new();
        for _ in 0..4 {
            let entry = entry.clone();
            handles.push(std::thread::spawn(move || {
                let mut counts = [0usize; 3];
                for _ in 0..300 {
                    let ep = entry.next_endpoint().unwrap();
                    counts[(ep.port - 1) as usize] += 1;
                }
                counts
            }));
        }

        let mut totals = [0usize; 3];
        for h in handles {
            let counts = h.join().unwrap();
            for i in 0..3 {
                totals[i] += counts[i];
            }
        }
        // 1200 selections over 3 endpoints: every slot is visited exactly 400 times.
        assert_eq!(totals, [400, 400, 400]);
        assert_eq!(entry.cursor(), 0);
    }
}
