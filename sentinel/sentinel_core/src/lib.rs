//! # Sentinel Core
//!
//! `sentinel_core` provides the building blocks shared by the Sentinel
//! permission engine: the error hierarchy, the principal and resource path
//! types, and small utilities such as log level parsing.
//!
//! ## Core Concepts
//!
//! 1. **Principal**: Whoever asks for access. Only its name matters; a role is
//!    an opaque string compared by equality against that name.
//!
//! 2. **Resource Path**: A hierarchical identifier such as `Sales.Invoice.Read`,
//!    split into segments by a literal separator character. Rules attached to
//!    a prefix apply to everything nested beneath it.
//!
//! ## Crate Structure
//!
//! - **error**: Error types for all Sentinel components
//! - **types**: Principal and resource path types
//! - **utils**: Utility types and helpers

pub mod error;
pub mod types;
pub mod utils;

// Re-export key types for convenience
pub use error::{ConfigError, Error, PermissionError, Result};
pub use types::{Identity, Principal, ResourcePath, DEFAULT_SEPARATOR};
pub use utils::LogLevel;
