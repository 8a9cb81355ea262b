//! Integration Tests for the cache engine
//!
//! Exercises the public API end to end, including the background sweep and
//! concurrent access from several threads.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use mem_cache::{CacheConfig, CacheError, CancellationToken, MemCache};
use tokio_test::{assert_err, assert_ok};

// == Helper Functions ==

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn fruit() -> HashMap<&'static str, &'static str> {
    HashMap::from([("mykey1", "value1"), ("banana", "peel"), ("cherry", "pit")])
}

// == Expiry Scenarios ==

#[tokio::test(start_paused = true)]
async fn test_happy_path_with_expire() {
    init_tracing();
    let cache: MemCache<&str, &str> =
        MemCache::new(Duration::from_secs(1), Duration::from_secs(5));
    let token = CancellationToken::new();
    let handle = assert_ok!(cache.start_eviction_checks(Some(token.clone())));

    for (key, value) in fruit() {
        assert_ok!(cache.add(key, value));
    }
    for (key, value) in fruit() {
        assert_eq!(cache.get(&key), Some(value));
    }

    tokio::time::sleep(Duration::from_secs(7)).await;

    for key in fruit().keys() {
        assert_eq!(cache.get(key), None);
    }

    // The sweep physically removed the entries, so re-adding succeeds
    assert!(cache.is_empty());
    assert_ok!(cache.add("mykey1", "fresh"));
    assert_eq!(cache.get(&"mykey1"), Some("fresh"));

    token.cancel();
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_expired_key_blocks_readd_until_removed() {
    let cache: MemCache<&str, &str> =
        MemCache::new(Duration::from_secs(1), Duration::from_secs(5));

    assert_ok!(cache.add("a", "x"));
    tokio::time::sleep(Duration::from_secs(7)).await;

    // Logically absent but physically present
    assert_eq!(cache.get(&"a"), None);
    let err = assert_err!(cache.add("a", "y"));
    assert_eq!(err, CacheError::DuplicateKey("a"));

    cache.delete(&"a");
    assert_ok!(cache.add("a", "y"));
    assert_eq!(cache.get(&"a"), Some("y"));
}

#[test]
fn test_duplicate_add_keeps_original() {
    let cache: MemCache<&str, &str> =
        MemCache::new(Duration::from_secs(1), Duration::from_secs(5));

    assert_ok!(cache.add("b", "1"));
    let err = assert_err!(cache.add("b", "2"));

    assert_eq!(err.to_string(), "key \"b\" already exists");
    assert_eq!(cache.get(&"b"), Some("1"));
}

// == Eviction Lifecycle ==

#[tokio::test(start_paused = true)]
async fn test_no_sweep_after_cancel() {
    let cache: MemCache<u32, u32> = MemCache::new(Duration::from_secs(1), Duration::from_secs(1));
    let token = CancellationToken::new();
    let handle = assert_ok!(cache.start_eviction_checks(Some(token.clone())));

    token.cancel();
    handle.await.unwrap();

    assert_ok!(cache.add(1, 1));
    tokio::time::sleep(Duration::from_secs(5)).await;

    assert_eq!(cache.get(&1), None);
    assert_eq!(cache.len(), 1, "Cancelled sweep must not evict");

    // A fresh call resumes sweeping
    let token = CancellationToken::new();
    let handle = assert_ok!(cache.start_eviction_checks(Some(token.clone())));
    tokio::time::sleep(Duration::from_millis(1500)).await;
    assert!(cache.is_empty());

    token.cancel();
    handle.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_overlapping_sweep_tasks() {
    let cache: MemCache<u32, u32> = MemCache::new(Duration::from_secs(1), Duration::from_secs(2));
    let first = CancellationToken::new();
    let second = CancellationToken::new();
    let h1 = assert_ok!(cache.start_eviction_checks(Some(first.clone())));
    let h2 = assert_ok!(cache.start_eviction_checks(Some(second.clone())));

    for i in 0..10 {
        assert_ok!(cache.add(i, i));
    }
    tokio::time::sleep(Duration::from_millis(3500)).await;

    assert!(cache.is_empty());
    assert_eq!(cache.stats().evictions, 10);

    first.cancel();
    second.cancel();
    h1.await.unwrap();
    h2.await.unwrap();
}

#[tokio::test]
async fn test_start_eviction_checks_requires_signal() {
    let cache: MemCache<u32, u32> = MemCache::from_config(&CacheConfig::default());
    let err = assert_err!(cache.start_eviction_checks(None));
    assert!(matches!(err, CacheError::InvalidSignal(_)));

    // Still usable without the background sweep
    assert_ok!(cache.add(1, 10));
    assert_eq!(cache.get(&1), Some(10));
}

// == Concurrency ==

#[test]
fn test_concurrent_writers_distinct_keys() {
    let cache: MemCache<String, usize> =
        MemCache::new(Duration::from_secs(1), Duration::from_secs(60));

    std::thread::scope(|scope| {
        for i in 0..16 {
            let cache = cache.clone();
            scope.spawn(move || {
                assert_ok!(cache.add(format!("key-{i}"), i));
            });
        }
    });

    assert_eq!(cache.len(), 16);
    for i in 0..16 {
        assert_eq!(cache.get(&format!("key-{i}")), Some(i));
    }
}

#[test]
fn test_concurrent_writers_same_key_one_wins() {
    let cache: MemCache<&str, usize> =
        MemCache::new(Duration::from_secs(1), Duration::from_secs(60));
    let winners = Arc::new(std::sync::atomic::AtomicUsize::new(0));

    std::thread::scope(|scope| {
        for i in 0..8 {
            let cache = cache.clone();
            let winners = Arc::clone(&winners);
            scope.spawn(move || {
                if cache.add("contested", i).is_ok() {
                    winners.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                }
            });
        }
    });

    assert_eq!(winners.load(std::sync::atomic::Ordering::SeqCst), 1);
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_concurrent_readers_and_writers() {
    let cache: MemCache<usize, usize> =
        MemCache::new(Duration::from_secs(1), Duration::from_secs(60));

    std::thread::scope(|scope| {
        for t in 0..4 {
            let cache = cache.clone();
            scope.spawn(move || {
                for i in 0..250 {
                    let key = t * 1000 + i;
                    cache.add(key, i).unwrap();
                    assert_eq!(cache.get(&key), Some(i));
                    if i % 2 == 0 {
                        cache.delete(&key);
                    }
                    cache.evict();
                }
            });
        }
    });

    assert_eq!(cache.len(), 4 * 125);
    assert_eq!(cache.get(&1), Some(1));
    assert_eq!(cache.get(&2), None);
}
