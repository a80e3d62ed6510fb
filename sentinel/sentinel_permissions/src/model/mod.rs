//! Permission models.
//!
//! This module defines the permission records read from source repositories
//! and the resolution results produced by the engine.

pub mod decision;
pub mod permission;

pub use decision::{DecisionKey, DecisionSource, Resolution};
pub use permission::{GlobalPermission, RoleGrant, RolePermission};
