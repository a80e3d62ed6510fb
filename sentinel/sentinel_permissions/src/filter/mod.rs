//! Role-gated row filtering.
//!
//! Filters narrow a dataset of some type `T` for principals that hold (or do
//! not hold) a given role. They are registered per type and applied in
//! registration order, either eagerly to a `Vec<T>` or lazily to a [`Query`].

mod query;
mod registry;

pub use query::{InMemoryQuery, Query};
pub use registry::{FilterHandle, FilterRegistry};

use std::sync::Arc;

/// A data type that can be filtered and access-checked as a whole.
pub trait DataSource: 'static {
    /// Resource identifier naming this type, e.g. `Sales.Invoice`.
    const RESOURCE_NAME: &'static str;
}

/// A predicate over items of type `T`.
pub trait Specification<T>: Send + Sync {
    /// Whether `item` passes.
    fn is_satisfied_by(&self, item: &T) -> bool;
}

impl<T, F> Specification<T> for F
where
    F: Fn(&T) -> bool + Send + Sync,
{
    fn is_satisfied_by(&self, item: &T) -> bool {
        self(item)
    }
}

/// Shared handle to a specification.
pub type SpecificationRef<T> = Arc<dyn Specification<T>>;
