//! # Domain Errors
//!
//! `NotFound` variants are ordinary outcomes ("not synced yet") and are not
//! logged as errors. `InvariantViolation` means a caller upstream broke
//! height contiguity and is always logged loudly.

use thiserror::Error;

/// Errors raised by a `HeaderStore` backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// I/O failure in the backend.
    #[error("Store I/O error: {message}")]
    Io { message: String },

    /// Stored data could not be decoded.
    #[error("Store corruption: {message}")]
    Corrupted { message: String },
}

/// Header cache error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    /// No header at this height, in cache or store.
    #[error("No header at height {height}")]
    HeightNotFound { height: u32 },

    /// No header with this id, in cache or store.
    #[error("No header with id {id}")]
    IdNotFound { id: String },

    /// Store holds no headers at all.
    #[error("Chain is empty")]
    EmptyChain,

    /// Operation would break the cached window's contiguity.
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// Store failure, propagated unchanged.
    #[error(transparent)]
    Storage(#[from] StoreError),

    /// Rejected configuration.
    #[error("Invalid cache config: {0}")]
    InvalidConfig(String),
}

impl CacheError {
    /// Whether this is a normal "absent" outcome.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CacheError::HeightNotFound { .. } | CacheError::IdNotFound { .. } | CacheError::EmptyChain
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_errors_pass_through() {
        let err: CacheError = StoreError::Io {
            message: "disk gone".into(),
        }
        .into();
        assert_eq!(err.to_string(), "Store I/O error: disk gone");
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_not_found_classification() {
        assert!(CacheError::HeightNotFound { height: 3 }.is_not_found());
        assert!(CacheError::EmptyChain.is_not_found());
        assert!(!CacheError::InvariantViolation("gap".into()).is_not_found());
    }
}
