//! Permission storage.
//!
//! Source repositories own the permission records; the engine only reads them
//! through [`PermissionRepository`] and keeps an immutable
//! [`PermissionSnapshot`] of the last full load.

mod in_memory;
mod snapshot;

pub use in_memory::InMemoryPermissionRepository;
pub use snapshot::PermissionSnapshot;

use sentinel_core::Result;
use std::sync::Arc;

/// Trait for permission record sources.
///
/// Implementations are free to block on I/O; the engine only calls
/// [`search`](PermissionRepository::search) while reloading.
pub trait PermissionRepository<T>: Send + Sync {
    /// Return every record currently held by the source.
    ///
    /// Order matters for role permissions: within one resource, the first
    /// record naming a role wins.
    fn search(&self) -> Result<Vec<T>>;
}

impl<T, R: PermissionRepository<T> + ?Sized> PermissionRepository<T> for Arc<R> {
    fn search(&self) -> Result<Vec<T>> {
        (**self).search()
    }
}
