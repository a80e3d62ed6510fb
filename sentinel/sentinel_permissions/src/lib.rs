//! # Sentinel Permissions
//!
//! `sentinel_permissions` answers "may this principal touch this resource?"
//! and narrows datasets according to role-gated filters.
//!
//! Key concepts:
//!
//! 1. **Global Permission**: A namespace default. A rule on `Sales` applies to
//!    `Sales.Invoice` and everything below it unless a more specific rule
//!    exists.
//!
//! 2. **Role Permission**: An override for one role at some namespace level.
//!    A matching role rule at any level outranks every global rule.
//!
//! 3. **Decision Cache**: Answers are memoized per principal and resource
//!    until either permission source signals a change.
//!
//! 4. **Filter Registry**: Per-type predicates that apply to a principal
//!    depending on whether it holds (or does not hold) a given role.
//!
//! ## Usage Example
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use sentinel_core::Identity;
//! use sentinel_permissions::{
//!     GlobalPermission, InMemoryPermissionRepository, PermissionManager, RolePermission,
//! };
//!
//! let globals = Arc::new(InMemoryPermissionRepository::new());
//! globals.insert(GlobalPermission::new("Sales", false));
//!
//! let roles = Arc::new(InMemoryPermissionRepository::new());
//! roles.insert(RolePermission::new("Sales", "accountant", true));
//!
//! let manager = PermissionManager::builder()
//!     .global_repository(globals.clone())
//!     .global_changes(globals.notifier())
//!     .role_repository(roles.clone())
//!     .role_changes(roles.notifier())
//!     .build();
//!
//! assert!(manager.can_access(Some("Sales.Invoice"), &Identity::new("accountant")).unwrap());
//! assert!(!manager.can_access(Some("Sales.Invoice"), &Identity::new("guest")).unwrap());
//! ```

pub mod change;
pub mod config;
pub mod engine;
pub mod filter;
pub mod model;
pub mod store;

// Re-export key types and traits for convenience
pub use change::{ChangeFeed, ChangeNotifier, ChangeTracker, Subscription};
pub use config::PermissionsConfig;
pub use engine::{DecisionCache, DecisionStats, PermissionManager, PermissionManagerBuilder};
pub use filter::{DataSource, FilterHandle, FilterRegistry, InMemoryQuery, Query, Specification};
pub use model::{DecisionSource, GlobalPermission, Resolution, RoleGrant, RolePermission};
pub use store::{InMemoryPermissionRepository, PermissionRepository, PermissionSnapshot};
