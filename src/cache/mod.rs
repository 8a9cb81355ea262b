//! Cache Module
//!
//! Provides a concurrent in-memory store with TTL expiration.

mod entry;
mod stats;
mod store;


// Re-export public types
pub use stats::CacheStats;
pub use store::MemCache;
