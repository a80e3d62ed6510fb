//! Principal types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Anything that can ask for access.
///
/// The engine only ever looks at the name. Role permissions and filters match
/// when their role identifier equals this name exactly.
pub trait Principal {
    /// The name used for role matching and as part of the decision cache key.
    fn name(&self) -> &str;
}

/// A plain named principal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    /// The principal name.
    pub name: String,
}

impl Identity {
    /// Create a new identity with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Principal for Identity {
    fn name(&self) -> &str {
        &self.name
    }
}

impl<P: Principal + ?Sized> Principal for &P {
    fn name(&self) -> &str {
        (**self).name()
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}
