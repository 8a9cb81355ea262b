//! Background Tasks Module
//!
//! Contains background tasks that run periodically while a cache is in use.
//!
//! # Tasks
//! - Eviction sweep: Removes expired cache entries at the configured interval

mod eviction;

pub use eviction::spawn_eviction_task;
