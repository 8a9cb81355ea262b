//! Cache Store Module
//!
//! Main cache engine: a single reader/writer lock guarding a HashMap of
//! timestamped entries.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::entry::CacheEntry;
use super::stats::{CacheStats, StatsCounters};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::tasks::spawn_eviction_task;

/// State shared between every handle to one cache and its sweep tasks.
struct Shared<K, V> {
    store: RwLock<HashMap<K, CacheEntry<V>>>,
    stats: StatsCounters,
    sweep_interval: Duration,
    default_ttl_secs: i64,
}

// == Mem Cache ==
/// In-memory key-value cache with per-entry expiration.
///
/// Cloning yields another handle to the same store. Separately constructed
/// caches share nothing.
///
/// Expired entries are reported as absent by [`get`](Self::get) but stay in
/// the store until [`delete`](Self::delete) or [`evict`](Self::evict) removes
/// them, so they keep blocking [`add`](Self::add) for the same key until then.
pub struct MemCache<K, V> {
    shared: Arc<Shared<K, V>>,
}

impl<K, V> Clone for MemCache<K, V> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<K, V> Debug for MemCache<K, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemCache")
            .field("entries", &self.shared.store.read().len())
            .field("sweep_interval", &self.shared.sweep_interval)
            .field("default_ttl_secs", &self.shared.default_ttl_secs)
            .finish()
    }
}

impl<K, V> MemCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    // == Constructor ==
    /// Creates an empty cache.
    ///
    /// # Arguments
    /// * `sweep_interval` - Period of the background eviction sweep
    /// * `default_ttl` - TTL used by [`add`](Self::add), truncated to whole seconds
    pub fn new(sweep_interval: Duration, default_ttl: Duration) -> Self {
        let default_ttl_secs = i64::try_from(default_ttl.as_secs()).unwrap_or(i64::MAX);
        Self {
            shared: Arc::new(Shared {
                store: RwLock::new(HashMap::new()),
                stats: StatsCounters::default(),
                sweep_interval,
                default_ttl_secs,
            }),
        }
    }

    /// Creates an empty cache from a [`CacheConfig`].
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.sweep_interval(), config.default_ttl())
    }

    pub fn sweep_interval(&self) -> Duration {
        self.shared.sweep_interval
    }

    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.shared.default_ttl_secs.unsigned_abs())
    }

    // == Add ==
    /// Inserts a key-value pair using the default TTL.
    pub fn add(&self, key: K, value: V) -> Result<(), K> {
        self.add_with_ttl(key, value, self.shared.default_ttl_secs)
    }

    /// Inserts a key-value pair expiring `ttl_secs` seconds from now.
    ///
    /// Never overwrites: fails with [`CacheError::DuplicateKey`] if the key is
    /// present, even when the existing entry has already expired.
    pub fn add_with_ttl(&self, key: K, value: V, ttl_secs: i64) -> Result<(), K> {
        let mut store = self.shared.store.write();

        if store.contains_key(&key) {
            debug!("rejected insert of duplicate key");
            return Err(CacheError::DuplicateKey(key));
        }

        store.insert(key, CacheEntry::new(value, ttl_secs, Instant::now()));
        Ok(())
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// Returns None if the key is absent or its entry has expired. An expired
    /// entry is left in place.
    pub fn get(&self, key: &K) -> Option<V> {
        let store = self.shared.store.read();

        match store.get(key) {
            Some(entry) if !entry.is_expired() => {
                self.shared.stats.record_hit();
                Some(entry.value.clone())
            }
            _ => {
                self.shared.stats.record_miss();
                None
            }
        }
    }

    // == Delete ==
    /// Removes an entry by key. Absent keys are ignored.
    pub fn delete(&self, key: &K) {
        self.shared.store.write().remove(key);
    }

    // == Evict ==
    /// Removes every entry whose deadline is at or before the moment of the
    /// call, in one pass under the write lock.
    ///
    /// Returns the number of entries removed.
    pub fn evict(&self) -> usize {
        let mut store = self.shared.store.write();
        let now = Instant::now();

        let expired_keys: Vec<K> = store
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired_keys {
            store.remove(key);
        }

        self.shared.stats.record_evictions(expired_keys.len());
        expired_keys.len()
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let total_entries = self.shared.store.read().len();
        self.shared.stats.snapshot(total_entries)
    }

    // == Length ==
    /// Returns the number of stored entries, including expired ones not yet
    /// removed.
    pub fn len(&self) -> usize {
        self.shared.store.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.store.read().is_empty()
    }
}

impl<K, V> MemCache<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    // == Eviction Checks ==
    /// Starts a background task that calls [`evict`](Self::evict) every
    /// sweep interval until `signal` is cancelled.
    ///
    /// Returns immediately. Fails with [`CacheError::InvalidSignal`] when no
    /// signal is given or when called outside a tokio runtime. Each call
    /// starts an independent task; nothing stops two from running at once.
    pub fn start_eviction_checks(
        &self,
        signal: Option<CancellationToken>,
    ) -> Result<JoinHandle<()>, K> {
        let Some(token) = signal else {
            return Err(CacheError::InvalidSignal("signal is absent"));
        };
        spawn_eviction_task(self.clone(), self.shared.sweep_interval, token)
            .ok_or(CacheError::InvalidSignal("no tokio runtime to drive eviction"))
    }
}
