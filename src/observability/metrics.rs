//! Run counters
//!
//! Counters only, monotonic, reset on process start.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Counters for one upgrade run
#[derive(Debug, Default)]
pub struct MetricsRegistry {
    /// Collections that got a reconstruction pass
    collections_processed: AtomicU64,
    /// Collections that needed no work
    collections_skipped: AtomicU64,
    /// Collections whose reconstruction failed
    collections_failed: AtomicU64,
    minor_versions_created: AtomicU64,
    hit_ranges_inserted: AtomicU64,
}

impl MetricsRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment_collections_processed(&self) {
        self.collections_processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_collections_skipped(&self) {
        self.collections_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_collections_failed(&self) {
        self.collections_failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_minor_versions(&self, count: u64) {
        self.minor_versions_created.fetch_add(count, Ordering::Relaxed);
    }

    pub fn add_hit_ranges(&self, count: u64) {
        self.hit_ranges_inserted.fetch_add(count, Ordering::Relaxed);
    }

    /// Point-in-time copy of every counter
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            collections_processed: self.collections_processed.load(Ordering::Relaxed),
            collections_skipped: self.collections_skipped.load(Ordering::Relaxed),
            collections_failed: self.collections_failed.load(Ordering::Relaxed),
            minor_versions_created: self.minor_versions_created.load(Ordering::Relaxed),
            hit_ranges_inserted: self.hit_ranges_inserted.load(Ordering::Relaxed),
        }
    }
}

/// A point-in-time snapshot of all metrics
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub collections_processed: u64,
    pub collections_skipped: u64,
    pub collections_failed: u64,
    pub minor_versions_created: u64,
    pub hit_ranges_inserted: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_registry_has_zero_values() {
        let snapshot = MetricsRegistry::new().snapshot();
        assert_eq!(snapshot.collections_processed, 0);
        assert_eq!(snapshot.collections_skipped, 0);
        assert_eq!(snapshot.collections_failed, 0);
        assert_eq!(snapshot.minor_versions_created, 0);
        assert_eq!(snapshot.hit_ranges_inserted, 0);
    }

    #[test]
    fn test_increment_counters() {
        let registry = MetricsRegistry::new();
        registry.increment_collections_processed();
        registry.increment_collections_processed();
        registry.increment_collections_skipped();
        registry.increment_collections_failed();
        registry.add_minor_versions(3);
        registry.add_hit_ranges(5);

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.collections_processed, 2);
        assert_eq!(snapshot.collections_skipped, 1);
        assert_eq!(snapshot.collections_failed, 1);
        assert_eq!(snapshot.minor_versions_created, 3);
        assert_eq!(snapshot.hit_ranges_inserted, 5);
    }

    #[test]
    fn test_snapshot_serializes() {
        let registry = MetricsRegistry::new();
        registry.add_minor_versions(2);

        let json = serde_json::to_value(registry.snapshot()).unwrap();
        assert_eq!(json["minor_versions_created"], 2);
        assert_eq!(json["collections_failed"], 0);
    }

    #[test]
    fn test_thread_safety() {
        use std::sync::Arc;
        use std::thread;

        let registry = Arc::new(MetricsRegistry::new());
        let mut handles = vec![];

        for _ in 0..4 {
            let reg = Arc::clone(&registry);
            handles.push(thread::spawn(move || {
                for _ in 0..50 {
                    reg.increment_collections_processed();
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(registry.snapshot().collections_processed, 200);
    }
}
