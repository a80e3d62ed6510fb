//! Integration with the permission engine
//!
//! Loads permission records from disk and wires them into a
//! [`PermissionManager`] backed by in-memory repositories.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::{debug, info};

use sentinel_permissions::{
    GlobalPermission, InMemoryPermissionRepository, PermissionManager, PermissionsConfig,
    RolePermission,
};

use crate::commands::SourceArgs;

/// Records and settings read from the command line sources.
#[derive(Debug, Default)]
pub struct LoadedSources {
    pub config: PermissionsConfig,
    pub global: Vec<GlobalPermission>,
    pub roles: Vec<RolePermission>,
}

fn load_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let records: Vec<T> = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    debug!(path = %path.display(), count = records.len(), "Loaded permission records");
    Ok(records)
}

/// Read the configuration and every record file named in `sources`.
pub fn load_sources(sources: &SourceArgs) -> Result<LoadedSources> {
    let mut config = match &sources.config {
        Some(path) => PermissionsConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => PermissionsConfig::default(),
    };
    if let Some(open_by_default) = sources.open_by_default {
        config.open_by_default = open_by_default;
    }

    let global = match &sources.global {
        Some(path) => load_records(path)?,
        None => Vec::new(),
    };
    let roles = match &sources.roles {
        Some(path) => load_records(path)?,
        None => Vec::new(),
    };

    Ok(LoadedSources {
        config,
        global,
        roles,
    })
}

/// Build a manager over the records named in `sources`.
pub fn build_manager(sources: &SourceArgs) -> Result<PermissionManager> {
    let loaded = load_sources(sources)?;

    info!(
        global = loaded.global.len(),
        roles = loaded.roles.len(),
        open_by_default = loaded.config.open_by_default,
        "Building permission manager"
    );

    let manager = PermissionManager::builder()
        .config(loaded.config)
        .global_repository(InMemoryPermissionRepository::with_records(loaded.global))
        .role_repository(InMemoryPermissionRepository::with_records(loaded.roles))
        .build();
    Ok(manager)
}

/// Find records that can never decide anything.
///
/// A global rule is shadowed by a later rule with the same name. A role rule
/// is shadowed by an earlier rule with the same name and role.
pub fn lint(sources: &LoadedSources) -> Vec<String> {
    let mut warnings = Vec::new();

    let mut last_global: HashMap<&str, usize> = HashMap::new();
    for (index, rule) in sources.global.iter().enumerate() {
        last_global.insert(rule.name.as_str(), index);
    }
    for (index, rule) in sources.global.iter().enumerate() {
        if last_global.get(rule.name.as_str()) != Some(&index) {
            warnings.push(format!("global rule {} is overridden by a later rule", rule));
        }
    }

    let mut seen_roles: HashSet<(&str, &str)> = HashSet::new();
    for rule in &sources.roles {
        if !seen_roles.insert((rule.name.as_str(), rule.role_id.as_str())) {
            warnings.push(format!("role rule {} is shadowed by an earlier rule", rule));
        }
    }

    warnings
}
