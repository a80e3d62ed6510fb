//! Permission decision engine.
//!
//! This module provides the resolvers, the decision cache and the manager
//! that ties them to the change-aware permission store.

mod cache;
mod manager;
pub mod resolver;

pub use cache::DecisionCache;
pub use manager::{DecisionStats, PermissionManager, PermissionManagerBuilder};
