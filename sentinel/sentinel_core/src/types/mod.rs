//! Core data types.
//!
//! This module defines the principal and resource path types used by the
//! permission engine.

pub mod identity;
pub mod resource;

pub use identity::{Identity, Principal};
pub use resource::{ResourcePath, DEFAULT_SEPARATOR};
