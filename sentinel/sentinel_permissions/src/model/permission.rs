//! Permission record model.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A namespace default.
///
/// Applies to the named resource and everything nested beneath it, unless a
/// more specific global rule or any matching role rule exists.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalPermission {
    /// The resource identifier this rule is attached to.
    #[serde(alias = "Name")]
    pub name: String,

    /// Whether access is allowed.
    #[serde(alias = "IsAllowed")]
    pub is_allowed: bool,
}

impl GlobalPermission {
    /// Create a new global permission.
    pub fn new(name: impl Into<String>, is_allowed: bool) -> Self {
        Self {
            name: name.into(),
            is_allowed,
        }
    }
}

impl fmt::Display for GlobalPermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verdict = if self.is_allowed { "allow" } else { "deny" };
        write!(f, "{} '{}'", verdict, self.name)
    }
}

/// A role-scoped override.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RolePermission {
    /// The resource identifier this rule is attached to.
    #[serde(alias = "Name")]
    pub name: String,

    /// The role this rule applies to, compared against principal names.
    #[serde(alias = "RoleID", alias = "roleID")]
    pub role_id: String,

    /// Whether access is allowed.
    #[serde(alias = "IsAllowed")]
    pub is_allowed: bool,
}

impl RolePermission {
    /// Create a new role permission.
    pub fn new(name: impl Into<String>, role_id: impl Into<String>, is_allowed: bool) -> Self {
        Self {
            name: name.into(),
            role_id: role_id.into(),
            is_allowed,
        }
    }

    /// The grant this record contributes to its resource's role list.
    pub fn grant(&self) -> RoleGrant {
        RoleGrant {
            role_id: self.role_id.clone(),
            is_allowed: self.is_allowed,
        }
    }
}

impl fmt::Display for RolePermission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verdict = if self.is_allowed { "allow" } else { "deny" };
        write!(f, "{} '{}' for role '{}'", verdict, self.name, self.role_id)
    }
}

/// One `(role, verdict)` pair in a resource's ordered role list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RoleGrant {
    /// The role identifier.
    pub role_id: String,

    /// Whether access is allowed for that role.
    pub is_allowed: bool,
}
