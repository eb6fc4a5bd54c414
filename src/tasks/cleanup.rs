//! TTL Cleanup Tasks
//!
//! Eager expiry sweeps: a one-shot deferred sweep scheduled by
//! `ScoredCache::cleanup` when the cache is not under pressure, and an
//! optional periodic sweep.

use std::sync::atomic::Ordering;
use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::scored::{ScoredCache, Shared};

/// Schedules one sweep on the runtime unless one is already pending.
///
/// Returns false when a sweep was already pending.
pub(crate) fn schedule_deferred_cleanup<V>(shared: &Arc<Shared<V>>) -> bool
where
    V: Clone + Send + Sync + 'static,
{
    if shared
        .cleanup_pending
        .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
        .is_err()
    {
        debug!("cleanup already pending");
        return false;
    }

    let shared = Arc::clone(shared);
    tokio::spawn(async move {
        let delay = shared.config.cleanup_delay;
        if delay.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(delay).await;
        }

        let removed = shared.store.write().await.cleanup_expired();
        shared.cleanup_pending.store(false, Ordering::Release);
        debug!(removed, "deferred cleanup finished");
    });
    true
}

/// Spawns a background task that periodically cleans up expired cache entries.
///
/// The task sleeps for `interval` between sweeps and holds only a weak
/// reference to the cache, so it stops on its own once the cache is
/// dropped. The returned handle can abort it earlier.
///
/// # Example
/// ```ignore
/// let cache = ScoredCache::new(CacheConfig::default())?;
/// let cleanup_handle = spawn_cleanup_task(&cache, Duration::from_secs(60));
/// // Later, during shutdown:
/// cleanup_handle.abort();
/// ```
pub fn spawn_cleanup_task<V>(cache: &ScoredCache<V>, interval: Duration) -> JoinHandle<()>
where
    V: Clone + Send + Sync + 'static,
{
    let shared: Weak<Shared<V>> = Arc::downgrade(cache.shared());

    tokio::spawn(async move {
        info!(
            "Starting TTL cleanup task with interval of {} ms",
            interval.as_millis()
        );

        loop {
            tokio::time::sleep(interval).await;

            let Some(shared) = shared.upgrade() else {
                debug!("cache dropped, stopping cleanup task");
                break;
            };
            let removed = shared.store.write().await.cleanup_expired();

            if removed > 0 {
                info!("TTL cleanup: removed {} expired entries", removed);
            } else {
                debug!("TTL cleanup: no expired entries found");
            }
        }
    })
}
