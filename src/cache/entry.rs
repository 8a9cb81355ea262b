//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::Duration;

use tokio::time::Instant;

// == Cache Entry ==
/// A stored value together with its absolute expiration deadline.
#[derive(Debug, Clone)]
pub(crate) struct CacheEntry<V> {
    /// The stored value
    pub value: V,
    /// Expiration deadline, None = beyond the clock's range (never expires)
    pub expires_at: Option<Instant>,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new entry expiring `ttl_secs` seconds from `now`.
    ///
    /// A zero or negative TTL yields an entry that is already expired.
    pub fn new(value: V, ttl_secs: i64, now: Instant) -> Self {
        Self {
            value,
            expires_at: deadline(now, ttl_secs),
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at the given instant.
    ///
    /// An entry is expired once `now` is at or past its deadline.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        match self.expires_at {
            Some(expires) => now >= expires,
            None => false,
        }
    }

    /// Checks if the entry has expired against the current time.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }
}

/// Computes `now + ttl_secs`, saturating at `now` for negative TTLs.
fn deadline(now: Instant, ttl_secs: i64) -> Option<Instant> {
    let ttl = Duration::from_secs(ttl_secs.unsigned_abs());
    if ttl_secs >= 0 {
        now.checked_add(ttl)
    } else {
        Some(now.checked_sub(ttl).unwrap_or(now))
    }
}
