//! Permission manager.
//!
//! The manager owns the current permission snapshot together with the
//! decision cache built against it. Both are replaced as one unit whenever a
//! change signal has arrived since the snapshot was loaded.

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use sentinel_core::{PermissionError, Principal, ResourcePath, Result};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::cache::DecisionCache;
use super::resolver;
use crate::change::{ChangeFeed, ChangeTracker, Subscription};
use crate::config::PermissionsConfig;
use crate::filter::{DataSource, FilterHandle, FilterRegistry, Query, Specification};
use crate::model::{DecisionKey, GlobalPermission, Resolution, RolePermission};
use crate::store::{PermissionRepository, PermissionSnapshot};

type GlobalRepository = Arc<dyn PermissionRepository<GlobalPermission>>;
type RoleRepository = Arc<dyn PermissionRepository<RolePermission>>;

/// A snapshot and the decisions computed against it.
#[derive(Debug)]
struct Generation {
    snapshot: PermissionSnapshot,
    decisions: DecisionCache,
}

impl Generation {
    fn new(snapshot: PermissionSnapshot) -> Self {
        Self {
            snapshot,
            decisions: DecisionCache::new(),
        }
    }
}

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    reloads: AtomicU64,
    reload_failures: AtomicU64,
}

/// Point-in-time engine statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecisionStats {
    /// Decisions served from the cache.
    pub cache_hits: u64,

    /// Decisions that had to be resolved.
    pub cache_misses: u64,

    /// Reloads whose snapshot was published. A reload finishing after a
    /// newer one is discarded and not counted.
    pub reloads: u64,

    /// Reloads aborted by a source error.
    pub reload_failures: u64,

    /// Decisions cached for the current snapshot.
    pub cached_decisions: usize,

    /// Global rules in the current snapshot.
    pub global_rules: usize,

    /// Resources with role rules in the current snapshot.
    pub role_resources: usize,

    /// When the current snapshot was loaded, if ever.
    pub loaded_at: Option<DateTime<Utc>>,
}

/// The access-control decision engine.
///
/// `PermissionManager` is `Send + Sync`; share it behind an `Arc` and call it
/// from as many threads as needed.
pub struct PermissionManager {
    /// Engine configuration.
    config: PermissionsConfig,

    /// Source of global permissions, if any.
    global_repository: Option<GlobalRepository>,

    /// Source of role permissions, if any.
    role_repository: Option<RoleRepository>,

    /// Shared with the change handlers.
    tracker: Arc<ChangeTracker>,

    /// The current snapshot and its decisions.
    current: RwLock<Arc<Generation>>,

    /// Change feed subscriptions, released on close.
    subscriptions: Mutex<Vec<Subscription>>,

    /// Role-gated filters.
    filters: FilterRegistry,

    /// Statistics.
    counters: Counters,
}

impl PermissionManager {
    /// Start building a manager.
    pub fn builder() -> PermissionManagerBuilder {
        PermissionManagerBuilder::default()
    }

    /// A manager with no sources; every decision is the configured default.
    pub fn new(config: PermissionsConfig) -> Self {
        Self::builder().config(config).build()
    }

    /// The engine configuration.
    pub fn config(&self) -> &PermissionsConfig {
        &self.config
    }

    /// Decide whether `principal` may access `resource`.
    ///
    /// # Arguments
    ///
    /// * `resource` - The resource identifier. `None` is treated as the empty
    ///   identifier.
    /// * `principal` - Who is asking; only its name is used.
    ///
    /// # Returns
    ///
    /// `Ok(true)` if access is allowed. The only error is a failed reload, in
    /// which case the store stays stale and the next call retries.
    pub fn can_access<P>(&self, resource: Option<&str>, principal: &P) -> Result<bool>
    where
        P: Principal + ?Sized,
    {
        let generation = self.current_generation()?;
        let key = DecisionKey::new(principal.name(), resource);

        if let Some(allowed) = generation.decisions.get(&key) {
            self.counters.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(allowed);
        }
        self.counters.misses.fetch_add(1, Ordering::Relaxed);

        let resolution = self.resolve(&generation.snapshot, &key.resource, principal.name());
        debug!(
            principal = %key.principal,
            resource = %key.resource,
            decision = %resolution,
            "Resolved access decision"
        );

        generation.decisions.insert(key, resolution.allowed);
        Ok(resolution.allowed)
    }

    /// Decide access to the resource named by data type `T`.
    pub fn can_access_type<T, P>(&self, principal: &P) -> Result<bool>
    where
        T: DataSource,
        P: Principal + ?Sized,
    {
        self.can_access(Some(T::RESOURCE_NAME), principal)
    }

    /// Like [`can_access`](Self::can_access) but turns a denial into
    /// [`PermissionError::Forbidden`].
    pub fn ensure_access<P>(&self, resource: &str, principal: &P) -> Result<()>
    where
        P: Principal + ?Sized,
    {
        if self.can_access(Some(resource), principal)? {
            Ok(())
        } else {
            Err(PermissionError::Forbidden(resource.to_string()).into())
        }
    }

    /// Resolve without touching the cache.
    ///
    /// # Returns
    ///
    /// The decision together with the rule (or default) that produced it.
    pub fn explain<P>(&self, resource: Option<&str>, principal: &P) -> Result<Resolution>
    where
        P: Principal + ?Sized,
    {
        let generation = self.current_generation()?;
        Ok(self.resolve(
            &generation.snapshot,
            resource.unwrap_or_default(),
            principal.name(),
        ))
    }

    /// Mark the store stale as if a change signal had arrived.
    pub fn invalidate(&self) {
        self.tracker.mark_stale();
    }

    /// Current statistics.
    pub fn stats(&self) -> DecisionStats {
        let generation = self.current.read().clone();
        let loaded = generation.snapshot.version() > 0;

        DecisionStats {
            cache_hits: self.counters.hits.load(Ordering::Relaxed),
            cache_misses: self.counters.misses.load(Ordering::Relaxed),
            reloads: self.counters.reloads.load(Ordering::Relaxed),
            reload_failures: self.counters.reload_failures.load(Ordering::Relaxed),
            cached_decisions: generation.decisions.len(),
            global_rules: generation.snapshot.global_count(),
            role_resources: generation.snapshot.role_resource_count(),
            loaded_at: loaded.then(|| generation.snapshot.loaded_at()),
        }
    }

    /// The role-gated filter registry.
    pub fn filters(&self) -> &FilterRegistry {
        &self.filters
    }

    /// Register a filter for `T`. See [`FilterRegistry::register_filter`].
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
        self.filters.register_filter(specification, role, inverse)
    }

    /// Filter a collection for `principal`. See [`FilterRegistry::apply_filters`].
    pub fn apply_filters<T, P>(&self, principal: &P, data: Vec<T>) -> Vec<T>
    where
        T: DataSource,
        P: Principal + ?Sized,
    {
        self.filters.apply_filters(principal, data)
    }

    /// Filter a query for `principal`. See [`FilterRegistry::apply_query_filters`].
    pub fn apply_query_filters<T, P, Q>(&self, principal: &P, query: Q) -> Q
    where
        T: DataSource,
        P: Principal + ?Sized,
        Q: Query<T>,
    {
        self.filters.apply_query_filters(principal, query)
    }

    /// Release both change feed subscriptions. Safe to call more than once;
    /// also happens when the manager is dropped.
    pub fn close(&self) {
        let subscriptions = std::mem::take(&mut *self.subscriptions.lock());
        for subscription in &subscriptions {
            subscription.unsubscribe();
        }
        if !subscriptions.is_empty() {
            debug!(count = subscriptions.len(), "Released change subscriptions");
        }
    }

    fn resolve(
        &self,
        snapshot: &PermissionSnapshot,
        resource: &str,
        principal: &str,
    ) -> Resolution {
        let path = ResourcePath::parse(resource, self.config.separator);
        resolver::resolve(snapshot, &path, principal, self.config.open_by_default)
    }

    /// Return the current generation, reloading first if it is stale.
    ///
    /// Concurrent callers may reload at the same time. Each publishes a
    /// complete generation and an older one never replaces a newer one.
    fn current_generation(&self) -> Result<Arc<Generation>> {
        let current = self.current.read().clone();
        let version = self.tracker.version();
        if !self.tracker.is_stale(current.snapshot.version()) {
            return Ok(current);
        }

        debug!(
            from = current.snapshot.version(),
            to = version,
            "Permission store is stale, reloading"
        );

        let snapshot = PermissionSnapshot::load(
            self.global_repository.as_deref(),
            self.role_repository.as_deref(),
            version,
        )
        .map_err(|e| {
            self.counters.reload_failures.fetch_add(1, Ordering::Relaxed);
            warn!(error = %e, "Permission reload failed");
            e
        })?;

        let mut slot = self.current.write();
        if slot.snapshot.version() >= version {
            debug!(
                version,
                published = slot.snapshot.version(),
                "Discarding reload superseded by a newer snapshot"
            );
            return Ok(slot.clone());
        }

        info!(
            global_rules = snapshot.global_count(),
            role_resources = snapshot.role_resource_count(),
            version,
            "Reloaded permissions"
        );
        self.counters.reloads.fetch_add(1, Ordering::Relaxed);

        *slot = Arc::new(Generation::new(snapshot));
        Ok(slot.clone())
    }
}

impl Drop for PermissionManager {
    fn drop(&mut self) {
        self.close();
    }
}

/// Builder for [`PermissionManager`].
#[derive(Default)]
pub struct PermissionManagerBuilder {
    config: PermissionsConfig,
    global_repository: Option<GlobalRepository>,
    role_repository: Option<RoleRepository>,
    global_changes: Option<Box<dyn ChangeFeed>>,
    role_changes: Option<Box<dyn ChangeFeed>>,
    filters: Option<FilterRegistry>,
}

impl PermissionManagerBuilder {
    /// Use `config`.
    pub fn config(mut self, config: PermissionsConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the answer for resources no rule covers.
    pub fn open_by_default(mut self, open_by_default: bool) -> Self {
        self.config.open_by_default = open_by_default;
        self
    }

    /// Read global permissions from `repository`.
    pub fn global_repository(
        mut self,
        repository: impl PermissionRepository<GlobalPermission> + 'static,
    ) -> Self {
        self.global_repository = Some(Arc::new(repository));
        self
    }

    /// Read role permissions from `repository`.
    pub fn role_repository(
        mut self,
        repository: impl PermissionRepository<RolePermission> + 'static,
    ) -> Self {
        self.role_repository = Some(Arc::new(repository));
        self
    }

    /// Reload global permissions when `feed` signals.
    pub fn global_changes(mut self, feed: impl ChangeFeed + 'static) -> Self {
        self.global_changes = Some(Box::new(feed));
        self
    }

    /// Reload role permissions when `feed` signals.
    pub fn role_changes(mut self, feed: impl ChangeFeed + 'static) -> Self {
        self.role_changes = Some(Box::new(feed));
        self
    }

    /// Share an existing filter registry instead of creating a new one.
    pub fn filters(mut self, filters: FilterRegistry) -> Self {
        self.filters = Some(filters);
        self
    }

    /// Subscribe to the change feeds and build the manager.
    ///
    /// Nothing is loaded yet; the first decision triggers the initial load.
    pub fn build(self) -> PermissionManager {
        let tracker = Arc::new(ChangeTracker::new());

        let subscriptions: Vec<Subscription> = [self.global_changes, self.role_changes]
            .into_iter()
            .flatten()
            .map(|feed| {
                let tracker = tracker.clone();
                feed.subscribe(Arc::new(move || tracker.mark_stale()))
            })
            .collect();

        PermissionManager {
            config: self.config,
            global_repository: self.global_repository,
            role_repository: self.role_repository,
            tracker,
            current: RwLock::new(Arc::new(Generation::new(PermissionSnapshot::empty()))),
            subscriptions: Mutex::new(subscriptions),
            filters: self.filters.unwrap_or_default(),
            counters: Counters::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::change::ChangeNotifier;
    use crate::store::InMemoryPermissionRepository;
    use sentinel_core::{Error, Identity};
    use std::sync::atomic::AtomicBool;

    struct FlakyRepository {
        inner: InMemoryPermissionRepository<GlobalPermission>,
        failing: AtomicBool,
    }

    impl PermissionRepository<GlobalPermission> for FlakyRepository {
        fn search(&self) -> Result<Vec<GlobalPermission>> {
            if self.failing.load(Ordering::SeqCst) {
                return Err(PermissionError::SourceUnavailable("timeout".into()).into());
            }
            self.inner.search()
        }
    }

    #[test]
    fn test_no_sources_uses_default() {
        let open = PermissionManager::new(PermissionsConfig::default());
        let closed = PermissionManager::new(PermissionsConfig::with_open_by_default(false));
        let user = Identity::new("u");

        for resource in [None, Some(""), Some("A"), Some("A.B.C")] {
            assert!(open.can_access(resource, &user).unwrap());
            assert!(!closed.can_access(resource, &user).unwrap());
        }
    }

    #[test]
    fn test_cache_hit_skips_resolution() {
        let manager = PermissionManager::new(PermissionsConfig::default());
        let user = Identity::new("u");

        assert!(manager.can_access(Some("A.B"), &user).unwrap());
        assert!(manager.can_access(Some("A.B"), &user).unwrap());

        let stats = manager.stats();
        assert_eq!(stats.cache_misses, 1);
        assert_eq!(stats.cache_hits, 1);
        assert_eq!(stats.cached_decisions, 1);
        assert_eq!(stats.reloads, 1);
    }

    #[test]
    fn test_absent_and_empty_resource_share_a_key() {
        let manager = PermissionManager::new(PermissionsConfig::default());
        let user = Identity::new("u");

        manager.can_access(None, &user).unwrap();
        manager.can_access(Some(""), &user).unwrap();

        assert_eq!(manager.stats().cache_hits, 1);
    }

    #[test]
    fn test_reload_failure_propagates_and_retries() {
        let repository = Arc::new(FlakyRepository {
            inner: InMemoryPermissionRepository::with_records(vec![GlobalPermission::new(
                "A", false,
            )]),
            failing: AtomicBool::new(true),
        });
        let manager = PermissionManager::builder()
            .global_repository(repository.clone())
            .build();
        let user = Identity::new("u");

        let result = manager.can_access(Some("A"), &user);
        assert!(matches!(
            result,
            Err(Error::Permission(PermissionError::ReloadFailed { category: "global", .. }))
        ));
        assert_eq!(manager.stats().reload_failures, 1);

        repository.failing.store(false, Ordering::SeqCst);
        assert!(!manager.can_access(Some("A"), &user).unwrap());
        assert_eq!(manager.stats().reloads, 1);
    }

    #[test]
    fn test_ensure_access() {
        let globals = InMemoryPermissionRepository::with_records(vec![GlobalPermission::new(
            "Hr", false,
        )]);
        let manager = PermissionManager::builder().global_repository(globals).build();
        let user = Identity::new("u");

        assert!(manager.ensure_access("Sales", &user).is_ok());
        match manager.ensure_access("Hr.Payslip", &user) {
            Err(Error::Permission(PermissionError::Forbidden(resource))) => {
                assert_eq!(resource, "Hr.Payslip")
            }
            other => panic!("expected forbidden, got {:?}", other),
        }
    }

    #[test]
    fn test_close_releases_subscriptions() {
        let global_feed = ChangeNotifier::new();
        let role_feed = ChangeNotifier::new();
        let manager = PermissionManager::builder()
            .global_changes(global_feed.clone())
            .role_changes(role_feed.clone())
            .build();

        assert_eq!(global_feed.subscriber_count(), 1);
        assert_eq!(role_feed.subscriber_count(), 1);

        manager.close();
        manager.close();
        assert_eq!(global_feed.subscriber_count(), 0);
        assert_eq!(role_feed.subscriber_count(), 0);
    }

    #[test]
    fn test_drop_releases_subscriptions() {
        let feed = ChangeNotifier::new();
        let manager = PermissionManager::builder().global_changes(feed.clone()).build();
        assert_eq!(feed.subscriber_count(), 1);

        drop(manager);
        assert_eq!(feed.subscriber_count(), 0);
    }

    #[test]
    fn test_custom_separator() {
        let globals = InMemoryPermissionRepository::with_records(vec![GlobalPermission::new(
            "sales/invoice",
            false,
        )]);
        let config = PermissionsConfig {
            separator: '/',
            ..PermissionsConfig::default()
        };
        let manager = PermissionManager::builder()
            .config(config)
            .global_repository(globals)
            .build();
        let user = Identity::new("u");

        assert!(!manager.can_access(Some("sales/invoice/42"), &user).unwrap());
        assert!(manager.can_access(Some("sales.invoice.42"), &user).unwrap());
    }
}
