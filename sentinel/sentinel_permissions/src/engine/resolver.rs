//! Decision resolution.
//!
//! Resolution is a pure function of a snapshot, a resource path, a principal
//! name and the configured default. Global rules fall back from the most
//! specific namespace to the least; any matching role rule, at any level,
//! overrides whatever the global rules said.

use sentinel_core::ResourcePath;

use crate::model::{DecisionSource, Resolution};
use crate::store::PermissionSnapshot;

/// Resolve the namespace default for the first `depth` segments of `path`.
///
/// Falls back one segment at a time; when no level has a global rule the
/// configured default answers.
pub fn resolve_global(
    snapshot: &PermissionSnapshot,
    path: &ResourcePath<'_>,
    depth: usize,
    open_by_default: bool,
) -> Resolution {
    if depth == 0 {
        return Resolution::new(open_by_default, DecisionSource::Default);
    }

    let name = path.prefix(depth);
    match snapshot.global(&name) {
        Some(allowed) => Resolution::new(allowed, DecisionSource::Global { rule: name }),
        None => resolve_global(snapshot, path, depth - 1, open_by_default),
    }
}

/// Find the role override for `principal`, scanning from the full path down
/// to the first segment. Within one level the first grant naming the
/// principal wins.
pub fn resolve_role(
    snapshot: &PermissionSnapshot,
    path: &ResourcePath<'_>,
    principal: &str,
) -> Option<Resolution> {
    path.ancestors().find_map(|(_, name)| {
        let grant = snapshot
            .roles(&name)?
            .iter()
            .find(|grant| grant.role_id == principal)?;

        Some(Resolution::new(
            grant.is_allowed,
            DecisionSource::Role {
                role_id: grant.role_id.clone(),
                rule: name,
            },
        ))
    })
}

/// Full resolution: the global answer, overridden by a role rule if any.
pub fn resolve(
    snapshot: &PermissionSnapshot,
    path: &ResourcePath<'_>,
    principal: &str,
    open_by_default: bool,
) -> Resolution {
    let global = resolve_global(snapshot, path, path.len(), open_by_default);
    resolve_role(snapshot, path, principal).unwrap_or(global)
}
