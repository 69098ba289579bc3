//! Error types for the cache family
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for every cache variant.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Absent key or value, or a non-positive construction parameter
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Invalid factory configuration, or a sweeper that could not start
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A lock could not be acquired within the allotted time
    #[error("Lock timeout: {0}")]
    LockTimeout(String),
}

// == Result Type Alias ==
/// Convenience Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CacheError::InvalidArgument("Key cannot be absent".to_string());
        assert_eq!(err.to_string(), "Invalid argument: Key cannot be absent");

        let err = CacheError::Configuration("unknown cache kind".to_string());
        assert_eq!(err.to_string(), "Configuration error: unknown cache kind");
    }
}
