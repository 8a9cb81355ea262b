//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for cache operations.
///
/// Generic over the key type so a rejected insert hands the offending key
/// back to the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError<K> {
    /// Key is already present, expired or not
    #[error("key {0:?} already exists")]
    DuplicateKey(K),

    /// Eviction checks could not be started
    #[error("invalid cancellation signal: {0}")]
    InvalidSignal(&'static str),
}

impl<K> CacheError<K> {
    /// Returns the conflicting key for a `DuplicateKey` error.
    pub fn key(&self) -> Option<&K> {
        match self {
            CacheError::DuplicateKey(key) => Some(key),
            CacheError::InvalidSignal(_) => None,
        }
    }

    /// Consumes the error and returns the conflicting key, if any.
    pub fn into_key(self) -> Option<K> {
        match self {
            CacheError::DuplicateKey(key) => Some(key),
            CacheError::InvalidSignal(_) => None,
        }
    }
}

// == Result Type Alias ==
/// Convenience Result type for cache operations.
pub type Result<T, K> = std::result::Result<T, CacheError<K>>;
