//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Construction-time option is out of range or missing
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The size estimator could not size a value
    #[error("Size estimation failed for key '{key}': {reason}")]
    SizeEstimation { key: String, reason: String },

    /// The disposal worker has stopped; carries the key left undisposed
    #[error("Disposal worker is gone, '{0}' was not disposed")]
    WorkerGone(String),
}

impl CacheError {
    /// Shorthand for building an `InvalidConfig` error.
    pub fn config(msg: impl Into<String>) -> Self {
        CacheError::InvalidConfig(msg.into())
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
