//! Error types for the Sentinel permission engine.
//!
//! The root error type, `Error`, wraps the subsystem-specific errors so that
//! callers can handle everything uniformly at the top level.

use thiserror::Error;

/// Root error type for the Sentinel system.
#[derive(Debug, Error)]
pub enum Error {
    /// Permission engine errors
    #[error("Permission error: {0}")]
    Permission(#[from] PermissionError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while loading or evaluating permissions.
#[derive(Debug, Error)]
pub enum PermissionError {
    /// A source repository failed while the rule set was being reloaded
    #[error("Failed to reload {category} permissions: {reason}")]
    ReloadFailed {
        /// Which rule category was being loaded (`global` or `role`)
        category: &'static str,
        /// The underlying failure
        reason: String,
    },

    /// A source repository could not be queried
    #[error("Permission source unavailable: {0}")]
    SourceUnavailable(String),

    /// Access to the resource was denied
    #[error("Access forbidden: {0}")]
    Forbidden(String),
}

/// Errors related to configuration handling.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration could not be parsed
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    /// The configuration parsed but holds an unusable value
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Result type used throughout the Sentinel system.
pub type Result<T> = std::result::Result<T, Error>;
