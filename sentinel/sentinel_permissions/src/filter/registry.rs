//! Filter registry.
//!
//! Each data type owns an ordered list of entries. Lists are copy-on-write:
//! registration and disposal publish a new list, and readers work on the
//! list they cloned, so iteration never sees a half-updated list.

use dashmap::DashMap;
use sentinel_core::Principal;
use std::any::{Any, TypeId};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tracing::debug;

use super::{DataSource, Query, Specification, SpecificationRef};

/// One registered filter.
struct FilterEntry {
    /// Unique within the registry.
    id: u64,

    /// The role this filter is gated on.
    role: String,

    /// Apply to principals *without* the role instead of those with it.
    inverse: bool,

    /// An `Arc<dyn Specification<T>>` for the list's type.
    specification: Box<dyn Any + Send + Sync>,
}

impl FilterEntry {
    fn applies_to(&self, principal: &str) -> bool {
        (principal == self.role) != self.inverse
    }
}

type FilterList = Arc<Vec<Arc<FilterEntry>>>;

struct RegistryInner {
    /// Filter lists by data type.
    lists: DashMap<TypeId, FilterList>,

    /// Source of entry IDs.
    next_id: AtomicU64,
}

impl RegistryInner {
    fn remove(&self, type_id: TypeId, id: u64) -> bool {
        let Some(mut list) = self.lists.get_mut(&type_id) else {
            return false;
        };

        if !list.iter().any(|entry| entry.id == id) {
            return false;
        }

        let remaining: Vec<Arc<FilterEntry>> = list
            .iter()
            .filter(|entry| entry.id != id)
            .cloned()
            .collect();
        *list = Arc::new(remaining);
        true
    }
}

/// Registry of role-gated filters, keyed by data type.
///
/// Cloning shares the underlying lists.
#[derive(Clone)]
pub struct FilterRegistry {
    inner: Arc<RegistryInner>,
}

impl FilterRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                lists: DashMap::new(),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    /// Register a filter for `T`.
    ///
    /// # Arguments
    ///
    /// * `specification` - The predicate items must satisfy.
    /// * `role` - The role the filter is gated on.
    /// * `inverse` - With `false` the filter applies to principals named
    ///   `role`; with `true` it applies to everyone else.
    ///
    /// # Returns
    ///
    /// A handle that removes exactly this entry when disposed.
    pub fn register_filter<T, S>(
        &self,
        specification: S,
        role: impl Into<String>,
        inverse: bool,
    ) -> FilterHandle
    where
        T: DataSource,
        S: Specification<T> + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let type_id = TypeId::of::<T>();
        let role = role.into();

        debug!(
            data_type = T::RESOURCE_NAME,
            role = %role,
            inverse,
            filter_id = id,
            "Registering filter"
        );

        let specification: SpecificationRef<T> = Arc::new(specification);
        let entry = Arc::new(FilterEntry {
            id,
            role,
            inverse,
            specification: Box::new(specification),
        });

        {
            let mut list = self.inner.lists.entry(type_id).or_default();
            let mut next = Vec::with_capacity(list.len() + 1);
            next.extend(list.iter().cloned());
            next.push(entry);
            *list = Arc::new(next);
        }

        FilterHandle {
            registry: Arc::downgrade(&self.inner),
            type_id,
            id,
            data_type: T::RESOURCE_NAME,
            disposed: AtomicBool::new(false),
        }
    }

    /// Filter a collection for `principal`.
    ///
    /// Applicable filters are ANDed in registration order. When nothing is
    /// registered for `T` the input is handed back untouched.
    pub fn apply_filters<T, P>(&self, principal: &P, data: Vec<T>) -> Vec<T>
    where
        T: DataSource,
        P: Principal + ?Sized,
    {
        let specifications = self.applicable::<T>(principal.name());
        if specifications.is_empty() {
            return data;
        }

        data.into_iter()
            .filter(|item| specifications.iter().all(|s| s.is_satisfied_by(item)))
            .collect()
    }

    /// Append the filters applicable to `principal` onto `query`.
    pub fn apply_query_filters<T, P, Q>(&self, principal: &P, query: Q) -> Q
    where
        T: DataSource,
        P: Principal + ?Sized,
        Q: Query<T>,
    {
        self.applicable::<T>(principal.name())
            .into_iter()
            .fold(query, |query, specification| query.filter(specification))
    }

    /// Number of filters registered for `T`.
    pub fn filter_count<T: DataSource>(&self) -> usize {
        self.list::<T>().map_or(0, |list| list.len())
    }

    /// Whether no filters are registered for any type.
    pub fn is_empty(&self) -> bool {
        self.inner.lists.iter().all(|list| list.is_empty())
    }

    fn list<T: DataSource>(&self) -> Option<FilterList> {
        self.inner
            .lists
            .get(&TypeId::of::<T>())
            .map(|list| list.value().clone())
    }

    fn applicable<T: DataSource>(&self, principal: &str) -> Vec<SpecificationRef<T>> {
        let Some(list) = self.list::<T>() else {
            return Vec::new();
        };

        list.iter()
            .filter(|entry| entry.applies_to(principal))
            .filter_map(|entry| {
                entry
                    .specification
                    .downcast_ref::<SpecificationRef<T>>()
                    .cloned()
            })
            .collect()
    }
}

impl Default for FilterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FilterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterRegistry")
            .field("types", &self.inner.lists.len())
            .finish()
    }
}

/// Disposal handle for a registered filter.
///
/// The filter stays registered until [`dispose`](FilterHandle::dispose) is
/// called; dropping the handle leaves it in place.
pub struct FilterHandle {
    registry: Weak<RegistryInner>,
    type_id: TypeId,
    id: u64,
    data_type: &'static str,
    disposed: AtomicBool,
}

impl FilterHandle {
    /// Remove the filter. Later calls do nothing.
    pub fn dispose(&self) {
        if self.disposed.swap(true, Ordering::AcqRel) {
            return;
        }

        if let Some(registry) = self.registry.upgrade() {
            if registry.remove(self.type_id, self.id) {
                debug!(
                    data_type = self.data_type,
                    filter_id = self.id,
                    "Disposed filter"
                );
            }
        }
    }

    /// Whether [`dispose`](FilterHandle::dispose) has been called.
    pub fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }

    /// Resource name of the filtered type.
    pub fn data_type(&self) -> &'static str {
        self.data_type
    }
}

impl fmt::Debug for FilterHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterHandle")
            .field("data_type", &self.data_type)
            .field("id", &self.id)
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::InMemoryQuery;
    use sentinel_core::Identity;

    #[derive(Debug, Clone, PartialEq)]
    struct Invoice {
        region: &'static str,
        amount: u32,
    }

    impl DataSource for Invoice {
        const RESOURCE_NAME: &'static str = "Sales.Invoice";
    }

    #[derive(Debug, Clone, PartialEq)]
    struct Payslip {
        employee: &'static str,
    }

    impl DataSource for Payslip {
        const RESOURCE_NAME: &'static str = "Hr.Payslip";
    }

    fn invoices() -> Vec<Invoice> {
        vec![
            Invoice { region: "north", amount: 100 },
            Invoice { region: "south", amount: 2_000 },
            Invoice { region: "north", amount: 5_000 },
        ]
    }

    #[test]
    fn test_no_filters_returns_input() {
        let registry = FilterRegistry::new();
        let data = invoices();
        let result = registry.apply_filters(&Identity::new("anyone"), data.clone());
        assert_eq!(result, data);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_role_and_inverse_gating() {
        let registry = FilterRegistry::new();
        let _north =
            registry.register_filter(|i: &Invoice| i.region == "north", "regional", false);
        let _small = registry.register_filter(|i: &Invoice| i.amount < 1_000, "regional", true);

        let regional = registry.apply_filters(&Identity::new("regional"), invoices());
        assert_eq!(regional.len(), 2);
        assert!(regional.iter().all(|i| i.region == "north"));

        let other = registry.apply_filters(&Identity::new("other"), invoices());
        assert_eq!(other, vec![Invoice { region: "north", amount: 100 }]);
    }

    #[test]
    fn test_filters_are_anded() {
        let registry = FilterRegistry::new();
        let _a = registry.register_filter(|i: &Invoice| i.region == "north", "auditor", false);
        let _b = registry.register_filter(|i: &Invoice| i.amount > 1_000, "auditor", false);

        let result = registry.apply_filters(&Identity::new("auditor"), invoices());
        assert_eq!(result, vec![Invoice { region: "north", amount: 5_000 }]);
    }

    #[test]
    fn test_lists_are_per_type() {
        let registry = FilterRegistry::new();
        let _handle = registry.register_filter(|_: &Payslip| false, "clerk", false);

        assert_eq!(registry.filter_count::<Payslip>(), 1);
        assert_eq!(registry.filter_count::<Invoice>(), 0);

        let result = registry.apply_filters(&Identity::new("clerk"), invoices());
        assert_eq!(result.len(), 3);

        let slips = registry.apply_filters(
            &Identity::new("clerk"),
            vec![Payslip { employee: "kim" }],
        );
        assert!(slips.is_empty());
    }

    #[test]
    fn test_dispose_removes_only_its_entry() {
        let registry = FilterRegistry::new();
        let north = registry.register_filter(|i: &Invoice| i.region == "north", "auditor", false);
        let _large = registry.register_filter(|i: &Invoice| i.amount > 1_000, "auditor", false);
        assert_eq!(registry.filter_count::<Invoice>(), 2);

        north.dispose();
        assert!(north.is_disposed());
        assert_eq!(registry.filter_count::<Invoice>(), 1);

        let result = registry.apply_filters(&Identity::new("auditor"), invoices());
        assert_eq!(result.len(), 2);
        assert!(result.iter().all(|i| i.amount > 1_000));

        north.dispose();
        assert_eq!(registry.filter_count::<Invoice>(), 1);
    }

    #[test]
    fn test_dropping_handle_keeps_filter() {
        let registry = FilterRegistry::new();
        drop(registry.register_filter(|_: &Invoice| false, "auditor", false));
        assert_eq!(registry.filter_count::<Invoice>(), 1);
    }

    #[test]
    fn test_handle_outlives_registry() {
        let registry = FilterRegistry::new();
        let handle = registry.register_filter(|_: &Invoice| true, "auditor", false);
        drop(registry);
        handle.dispose();
        assert!(handle.is_disposed());
        assert_eq!(handle.data_type(), "Sales.Invoice");
    }

    #[test]
    fn test_query_filters() {
        let registry = FilterRegistry::new();
        let _north = registry.register_filter(|i: &Invoice| i.region == "north", "regional", false);
        let _ignored = registry.register_filter(|_: &Invoice| false, "regional", true);

        let query = registry
            .apply_query_filters(&Identity::new("regional"), InMemoryQuery::new(invoices()));
        assert_eq!(query.filter_count(), 1);
        assert_eq!(query.execute().len(), 2);
    }
}
