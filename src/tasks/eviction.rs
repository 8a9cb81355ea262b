//! Eviction Sweep Task
//!
//! Background task that periodically removes expired cache entries.

use std::hash::Hash;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cache::MemCache;

/// Smallest period the sweep will run at.
const MIN_SWEEP_INTERVAL: Duration = Duration::from_millis(1);

/// Spawns a background task that calls [`MemCache::evict`] every `interval`
/// until `token` is cancelled.
///
/// The first sweep happens one full interval after the call; an interval too
/// large to schedule means no sweep ever runs. Ticks missed
/// while a sweep is still running are skipped rather than queued. Once the
/// token fires the task exits and is never restarted.
///
/// # Returns
/// A JoinHandle for the spawned task, or None when called outside a tokio
/// runtime.
///
/// # Example
/// ```ignore
/// let cache: MemCache<String, String> = MemCache::new(Duration::from_secs(1), Duration::from_secs(300));
/// let token = CancellationToken::new();
/// let handle = spawn_eviction_task(cache.clone(), cache.sweep_interval(), token.clone());
/// // Later, during shutdown:
/// token.cancel();
/// ```
pub fn spawn_eviction_task<K, V>(
    cache: MemCache<K, V>,
    interval: Duration,
    token: CancellationToken,
) -> Option<JoinHandle<()>>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    let runtime = Handle::try_current().ok()?;

    let period = if interval.is_zero() {
        warn!(
            "Eviction interval is zero, clamping to {:?}",
            MIN_SWEEP_INTERVAL
        );
        MIN_SWEEP_INTERVAL
    } else {
        interval
    };

    Some(runtime.spawn(async move {
        info!("Starting eviction checks with interval of {:?}", period);

        let Some(start) = Instant::now().checked_add(period) else {
            warn!(
                "Eviction interval {:?} is beyond the clock's range, no sweeps will run",
                period
            );
            token.cancelled().await;
            info!("Eviction checks cancelled");
            return;
        };

        let mut ticker = interval_at(start, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;

                _ = token.cancelled() => {
                    info!("Eviction checks cancelled");
                    return;
                }
                _ = ticker.tick() => {
                    let removed = cache.evict();

                    if removed > 0 {
                        info!("Eviction sweep: removed {} expired entries", removed);
                    } else {
                        debug!("Eviction sweep: no expired entries found");
                    }
                }
            }
        }
    }))
}
