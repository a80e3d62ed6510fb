//! In-memory permission repository.

use parking_lot::RwLock;
use sentinel_core::Result;

use super::PermissionRepository;
use crate::change::ChangeNotifier;

/// An in-memory permission repository.
///
/// Every mutation fires the repository's [`ChangeNotifier`], so a manager
/// subscribed to it reloads on its next decision.
pub struct InMemoryPermissionRepository<T> {
    /// The records, in insertion order.
    records: RwLock<Vec<T>>,

    /// Signals mutations to subscribers.
    notifier: ChangeNotifier,
}

impl<T: Clone + Send + Sync> InMemoryPermissionRepository<T> {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::with_records(Vec::new())
    }

    /// Create a repository holding `records`.
    pub fn with_records(records: Vec<T>) -> Self {
        Self {
            records: RwLock::new(records),
            notifier: ChangeNotifier::new(),
        }
    }

    /// The feed fired after each mutation.
    pub fn notifier(&self) -> ChangeNotifier {
        self.notifier.clone()
    }

    /// Append a record.
    pub fn insert(&self, record: T) {
        self.records.write().push(record);
        self.notifier.notify();
    }

    /// Append several records with a single change signal.
    pub fn extend(&self, records: impl IntoIterator<Item = T>) {
        self.records.write().extend(records);
        self.notifier.notify();
    }

    /// Remove every record matching `matcher` and return how many went.
    pub fn remove_where<F>(&self, matcher: F) -> usize
    where
        F: Fn(&T) -> bool,
    {
        let removed = {
            let mut records = self.records.write();
            let before = records.len();
            records.retain(|r| !matcher(r));
            before - records.len()
        };

        if removed > 0 {
            self.notifier.notify();
        }
        removed
    }

    /// Replace the whole record set.
    pub fn replace_all(&self, records: Vec<T>) {
        *self.records.write() = records;
        self.notifier.notify();
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Whether the repository holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl<T: Clone + Send + Sync> Default for InMemoryPermissionRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + Sync> PermissionRepository<T> for InMemoryPermissionRepository<T> {
    fn search(&self) -> Result<Vec<T>> {
        Ok(self.records.read().clone())
    }
}
