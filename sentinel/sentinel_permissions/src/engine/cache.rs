//! Decision cache.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use crate::model::DecisionKey;

/// Copy-on-write map of decisions.
///
/// The map itself is immutable; inserting builds a new map from the current
/// one plus the entry and swaps the pointer. Readers hold the lock only long
/// enough to clone the pointer, so they always see a complete map. Writers
/// copy and swap under one write guard, so concurrent inserts of different
/// keys are all kept.
#[derive(Debug, Default)]
pub struct DecisionCache {
    entries: RwLock<Arc<HashMap<DecisionKey, bool>>>,
}

impl DecisionCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current map.
    pub fn snapshot(&self) -> Arc<HashMap<DecisionKey, bool>> {
        self.entries.read().clone()
    }

    /// Look up a decision.
    pub fn get(&self, key: &DecisionKey) -> Option<bool> {
        self.snapshot().get(key).copied()
    }

    /// Publish a new map holding everything currently cached plus `key`.
    ///
    /// # Arguments
    ///
    /// * `key` - The principal and resource the decision was made for.
    /// * `allowed` - The decision.
    pub fn insert(&self, key: DecisionKey, allowed: bool) {
        let mut entries = self.entries.write();
        if entries.get(&key) == Some(&allowed) {
            return;
        }

        let mut next = HashMap::with_capacity(entries.len() + 1);
        next.extend(entries.iter().map(|(k, v)| (k.clone(), *v)));
        next.insert(key, allowed);
        *entries = Arc::new(next);
    }

    /// Number of cached decisions.
    pub fn len(&self) -> usize {
        self.snapshot().len()
    }

    /// Whether nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.snapshot().is_empty()
    }
}
