//! Mem Cache - An in-process key-value cache
//!
//! Provides a concurrent store with per-entry TTL expiration and an optional
//! background task that sweeps expired entries on a fixed interval.

pub mod cache;
pub mod config;
pub mod error;
pub mod tasks;

pub use cache::{CacheStats, MemCache};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
pub use tokio_util::sync::CancellationToken;
