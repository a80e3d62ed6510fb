//! Staleness tracking.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counts change signals so that readers can tell whether the snapshot they
/// hold predates the latest signal.
///
/// Every signal bumps a version. A snapshot records the version it was loaded
/// at; it is stale whenever the current version differs. Any number of
/// signals between two requests therefore costs a single reload, and a signal
/// that lands while a reload is running keeps the store stale afterwards.
#[derive(Debug)]
pub struct ChangeTracker {
    /// Version of the newest signal. Starts ahead of every snapshot.
    version: AtomicU64,
}

impl ChangeTracker {
    /// Create a tracker that reports stale until the first load.
    pub fn new() -> Self {
        Self {
            version: AtomicU64::new(1),
        }
    }

    /// Record a change signal. Never blocks.
    pub fn mark_stale(&self) {
        self.version.fetch_add(1, Ordering::AcqRel);
    }

    /// The current version; a reload should be tagged with the value read
    /// before it starts querying sources.
    pub fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    /// Whether a snapshot loaded at `loaded_version` is out of date.
    pub fn is_stale(&self, loaded_version: u64) -> bool {
        self.version() != loaded_version
    }
}

impl Default for ChangeTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_stale() {
        let tracker = ChangeTracker::new();
        assert!(tracker.is_stale(0));
    }

    #[test]
    fn test_burst_collapses_into_one_version() {
        let tracker = ChangeTracker::new();
        let loaded = tracker.version();
        assert!(!tracker.is_stale(loaded));

        for _ in 0..100 {
            tracker.mark_stale();
        }

        assert!(tracker.is_stale(loaded));
        let reloaded = tracker.version();
        assert!(!tracker.is_stale(reloaded));
    }
}
