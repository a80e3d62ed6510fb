//! Immutable permission snapshots.

use chrono::{DateTime, Utc};
use sentinel_core::{PermissionError, Result};
use std::collections::HashMap;
use tracing::debug;

use super::PermissionRepository;
use crate::model::{GlobalPermission, RoleGrant, RolePermission};

/// Both permission indexes as produced by one reload pass.
#[derive(Debug, Clone)]
pub struct PermissionSnapshot {
    /// Global rules by resource identifier.
    global: HashMap<String, bool>,

    /// Role rules by resource identifier, in source order.
    roles: HashMap<String, Vec<RoleGrant>>,

    /// Change tracker version this snapshot was loaded at.
    version: u64,

    /// When the snapshot was built.
    loaded_at: DateTime<Utc>,
}

impl PermissionSnapshot {
    /// A snapshot with no rules, tagged with version 0 so that it is always
    /// stale against a fresh tracker.
    pub fn empty() -> Self {
        Self::from_records(Vec::new(), Vec::new(), 0)
    }

    /// Build the indexes from raw records.
    ///
    /// A repeated global name keeps its last value. Role records are grouped
    /// by name and keep their relative order.
    pub fn from_records(
        global: Vec<GlobalPermission>,
        roles: Vec<RolePermission>,
        version: u64,
    ) -> Self {
        let global = global
            .into_iter()
            .map(|p| (p.name, p.is_allowed))
            .collect::<HashMap<_, _>>();

        let mut grouped: HashMap<String, Vec<RoleGrant>> = HashMap::new();
        for permission in roles {
            let grant = permission.grant();
            grouped.entry(permission.name).or_default().push(grant);
        }

        Self {
            global,
            roles: grouped,
            version,
            loaded_at: Utc::now(),
        }
    }

    /// Query both sources and build a snapshot.
    ///
    /// # Arguments
    ///
    /// * `global` - Source of global permissions; `None` contributes nothing.
    /// * `roles` - Source of role permissions; `None` contributes nothing.
    /// * `version` - The change tracker version read before querying.
    ///
    /// # Returns
    ///
    /// The snapshot, or `PermissionError::ReloadFailed` naming the source that
    /// failed. A failing source aborts the whole load so that the two indexes
    /// never come from different passes.
    pub fn load(
        global: Option<&dyn PermissionRepository<GlobalPermission>>,
        roles: Option<&dyn PermissionRepository<RolePermission>>,
        version: u64,
    ) -> Result<Self> {
        let global_records = match global {
            Some(repository) => repository
                .search()
                .map_err(|e| PermissionError::ReloadFailed {
                    category: "global",
                    reason: e.to_string(),
                })?,
            None => Vec::new(),
        };

        let role_records = match roles {
            Some(repository) => repository
                .search()
                .map_err(|e| PermissionError::ReloadFailed {
                    category: "role",
                    reason: e.to_string(),
                })?,
            None => Vec::new(),
        };

        debug!(
            global = global_records.len(),
            roles = role_records.len(),
            version,
            "Loaded permission records"
        );

        Ok(Self::from_records(global_records, role_records, version))
    }

    /// Look up the global rule attached to exactly `name`.
    pub fn global(&self, name: &str) -> Option<bool> {
        self.global.get(name).copied()
    }

    /// The ordered role grants attached to exactly `name`.
    pub fn roles(&self, name: &str) -> Option<&[RoleGrant]> {
        self.roles.get(name).map(Vec::as_slice)
    }

    /// Number of distinct global rules.
    pub fn global_count(&self) -> usize {
        self.global.len()
    }

    /// Number of resources carrying role rules.
    pub fn role_resource_count(&self) -> usize {
        self.roles.len()
    }

    /// Change tracker version this snapshot was loaded at.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// When the snapshot was built.
    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }
}
