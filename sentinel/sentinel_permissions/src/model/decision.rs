//! Resolution results.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Where a decision came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DecisionSource {
    /// No rule matched; the configured default answered.
    Default,

    /// A global rule on the named namespace answered.
    Global {
        /// The namespace the rule is attached to.
        rule: String,
    },

    /// A role rule on the named namespace overrode the global answer.
    Role {
        /// The namespace the rule is attached to.
        rule: String,
        /// The role that matched.
        role_id: String,
    },
}

impl fmt::Display for DecisionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => write!(f, "default"),
            Self::Global { rule } => write!(f, "global rule '{}'", rule),
            Self::Role { rule, role_id } => {
                write!(f, "role rule '{}' for '{}'", rule, role_id)
            }
        }
    }
}

/// The outcome of resolving one resource for one principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    /// Whether access is allowed.
    pub allowed: bool,

    /// The rule (or default) that decided.
    pub source: DecisionSource,
}

impl Resolution {
    /// Build a resolution.
    pub fn new(allowed: bool, source: DecisionSource) -> Self {
        Self { allowed, source }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verdict = if self.allowed { "allow" } else { "deny" };
        write!(f, "{} ({})", verdict, self.source)
    }
}

/// Cache key for a decision.
///
/// Displays as `principal:resource`. The parts are kept apart so that a
/// principal name containing `:` can never collide with another key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DecisionKey {
    /// The principal name.
    pub principal: String,

    /// The resource identifier, empty when none was given.
    pub resource: String,
}

impl DecisionKey {
    /// Build a key; an absent resource is stored as the empty string.
    pub fn new(principal: impl Into<String>, resource: Option<&str>) -> Self {
        Self {
            principal: principal.into(),
            resource: resource.unwrap_or_default().to_string(),
        }
    }
}

impl fmt::Display for DecisionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.principal, self.resource)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decision_key() {
        let key = DecisionKey::new("alice", Some("Sales.Invoice"));
        assert_eq!(key.to_string(), "alice:Sales.Invoice");
        assert_eq!(DecisionKey::new("alice", None), DecisionKey::new("alice", Some("")));
        assert_ne!(
            DecisionKey::new("a:b", Some("c")),
            DecisionKey::new("a", Some("b:c"))
        );
    }

    #[test]
    fn test_resolution_display() {
        let resolution = Resolution::new(
            true,
            DecisionSource::Role {
                rule: "Sales".into(),
                role_id: "clerk".into(),
            },
        );
        assert_eq!(resolution.to_string(), "allow (role rule 'Sales' for 'clerk')");
        assert_eq!(
            Resolution::new(false, DecisionSource::Default).to_string(),
            "deny (default)"
        );
    }
}
