//! Scored Cache
//!
//! Shared async facade over [`CacheStore`]. One lock guards the whole
//! engine; disposers and loaders always run outside it, on their own tasks,
//! so they may call back into the cache.

use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::cache::{
    ByteLenEstimator, ByteSize, CacheBuilder, CacheStore, EntryMeta, Loader, StatsReport,
};
use crate::config::CacheConfig;
use crate::error::Result;
use crate::tasks::{
    enqueue_batch, flush, run_warmup, schedule_deferred_cleanup, spawn_cleanup_task,
    BatchCoalescer, BatchPhase, PendingOp, WarmupReport,
};

/// State shared between the facade and its background tasks.
#[derive(Debug)]
pub(crate) struct Shared<V> {
    pub(crate) store: RwLock<CacheStore<V>>,
    pub(crate) batch: BatchCoalescer<V>,
    pub(crate) cleanup_pending: AtomicBool,
    pub(crate) config: CacheConfig,
    periodic_cleanup: Mutex<Option<JoinHandle<()>>>,
}

impl<V> Drop for Shared<V> {
    fn drop(&mut self) {
        let periodic = self
            .periodic_cleanup
            .get_mut()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(handle) = periodic.take() {
            handle.abort();
        }
    }
}

// == Scored Cache ==
/// Cheaply clonable handle to one cache instance.
#[derive(Debug)]
pub struct ScoredCache<V> {
    shared: Arc<Shared<V>>,
}

impl<V> Clone for ScoredCache<V> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<V: ByteSize + Clone + Send + Sync + 'static> ScoredCache<V> {
    // == Constructor ==
    /// Creates a cache that sizes values by byte length. Must run inside a
    /// tokio runtime.
    pub fn new(config: CacheConfig) -> Result<Self> {
        CacheBuilder::new(config)
            .size_estimator(ByteLenEstimator)
            .build()
    }
}

impl<V: Clone + Send + Sync + 'static> ScoredCache<V> {
    pub fn builder(config: CacheConfig) -> CacheBuilder<V> {
        CacheBuilder::new(config)
    }

    pub(crate) fn from_store(store: CacheStore<V>) -> Self {
        let config = store.config().clone();
        let cache = Self {
            shared: Arc::new(Shared {
                store: RwLock::new(store),
                batch: BatchCoalescer::new(config.batch_debounce),
                cleanup_pending: AtomicBool::new(false),
                periodic_cleanup: Mutex::new(None),
                config,
            }),
        };

        if let Some(interval) = cache.shared.config.cleanup_interval {
            let handle = spawn_cleanup_task(&cache, interval);
            if let Ok(mut slot) = cache.shared.periodic_cleanup.lock() {
                *slot = Some(handle);
            }
        }
        cache
    }

    pub(crate) fn shared(&self) -> &Arc<Shared<V>> {
        &self.shared
    }

    pub fn config(&self) -> &CacheConfig {
        &self.shared.config
    }

    // == Core Operations ==
    /// Returns the live value for `key`, recording a hit or miss.
    pub async fn get(&self, key: &str) -> Option<V> {
        self.shared.store.write().await.get(key)
    }

    /// Inserts or overwrites, evicting as needed.
    pub async fn set(&self, key: impl Into<String>, value: V) -> Result<()> {
        self.shared.store.write().await.set(key, value)
    }

    pub async fn delete(&self, key: &str) -> bool {
        self.shared.store.write().await.delete(key)
    }

    /// Presence check without touching access metadata.
    pub async fn has(&self, key: &str) -> bool {
        self.shared.store.write().await.has(key)
    }

    pub async fn clear(&self) {
        let dropped = self.shared.store.write().await.clear();
        debug!(dropped, "cache cleared");
    }

    pub async fn keys(&self) -> Vec<String> {
        self.shared.store.read().await.keys()
    }

    pub async fn values(&self) -> Vec<V> {
        self.shared.store.read().await.values()
    }

    pub async fn len(&self) -> usize {
        self.shared.store.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.shared.store.read().await.is_empty()
    }

    pub async fn memory_usage(&self) -> usize {
        self.shared.store.read().await.memory_usage()
    }

    pub async fn stats(&self) -> StatsReport {
        self.shared.store.read().await.stats()
    }

    /// Keys from least to most recently used.
    pub async fn recency_order(&self) -> Vec<String> {
        self.shared.store.read().await.recency_order()
    }

    pub async fn entry_meta(&self, key: &str) -> Option<EntryMeta> {
        self.shared.store.read().await.entry_meta(key).cloned()
    }

    // == Cleanup ==
    /// Sweeps expired entries.
    ///
    /// At or above the pressure threshold the sweep runs now and the number
    /// removed is returned. Below it the sweep is deferred to a background
    /// task and 0 is returned; calls made while one is pending do nothing.
    pub async fn cleanup(&self) -> usize {
        let mut store = self.shared.store.write().await;
        if store.under_pressure() {
            let removed = store.cleanup_expired();
            debug!(removed, "inline cleanup");
            return removed;
        }
        drop(store);
        schedule_deferred_cleanup(&self.shared);
        0
    }

    // == Batching ==
    /// Queues sets for the next debounced flush.
    pub fn batch_set<K, I>(&self, entries: I)
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        let ops = entries
            .into_iter()
            .map(|(key, value)| (key.into(), PendingOp::Set(value)))
            .collect();
        enqueue_batch(&self.shared, ops);
    }

    /// Queues deletes for the next debounced flush.
    pub fn batch_delete<K, I>(&self, keys: I)
    where
        K: Into<String>,
        I: IntoIterator<Item = K>,
    {
        let ops = keys
            .into_iter()
            .map(|key| (key.into(), PendingOp::Delete))
            .collect();
        enqueue_batch(&self.shared, ops);
    }

    /// Applies pending batch operations now. Returns how many were applied.
    pub async fn flush_batch(&self) -> usize {
        flush(&self.shared, None).await
    }

    pub fn batch_phase(&self) -> BatchPhase {
        self.shared.batch.phase()
    }

    // == Warmup ==
    /// Loads `keys` concurrently through `loader` and inserts what arrives.
    /// Never fails; see the report for how many keys made it in.
    pub async fn warmup<K, I>(&self, keys: I, loader: impl Loader<V>) -> WarmupReport
    where
        K: Into<String>,
        I: IntoIterator<Item = K>,
    {
        let keys = keys.into_iter().map(Into::into).collect();
        run_warmup(self, keys, Arc::new(loader)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn config(max_entries: usize) -> CacheConfig {
        CacheConfig {
            max_entries,
            ..CacheConfig::default()
        }
    }

    #[tokio::test]
    async fn test_facade_roundtrip() {
        let cache: ScoredCache<String> = ScoredCache::new(config(10)).unwrap();

        cache.set("a", "1".to_string()).await.unwrap();
        assert_eq!(cache.get("a").await, Some("1".to_string()));
        assert!(cache.has("a").await);
        assert_eq!(cache.keys().await, vec!["a"]);
        assert_eq!(cache.values().await, vec!["1".to_string()]);
        assert!(cache.delete("a").await);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let cache: ScoredCache<String> = ScoredCache::new(config(10)).unwrap();
        let other = cache.clone();

        other.set("k", "v".to_string()).await.unwrap();
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_cleanup_defers_when_not_under_pressure() {
        let cache: ScoredCache<String> = ScoredCache::new(config(10)).unwrap();
        cache.set("a", "1".to_string()).await.unwrap();

        assert_eq!(cache.cleanup().await, 0);
        assert_eq!(cache.cleanup().await, 0);
    }

    #[tokio::test]
    async fn test_periodic_cleanup_from_config() {
        let config = CacheConfig {
            cleanup_interval: Some(Duration::from_millis(10)),
            ..config(10)
        };
        let cache: ScoredCache<String> = ScoredCache::new(config).unwrap();
        let handle_present = cache
            .shared
            .periodic_cleanup
            .lock()
            .map(|slot| slot.is_some())
            .unwrap_or(false);
        assert!(handle_present);
    }

    #[tokio::test]
    async fn test_flush_batch_applies_immediately() {
        let cache: ScoredCache<String> = ScoredCache::new(config(10)).unwrap();
        cache.batch_set([("a", "1".to_string()), ("b", "2".to_string())]);
        cache.batch_delete(["b"]);
        assert_eq!(cache.batch_phase(), BatchPhase::Pending);

        assert_eq!(cache.flush_batch().await, 2);
        assert_eq!(cache.keys().await, vec!["a"]);
        assert_eq!(cache.batch_phase(), BatchPhase::Idle);

        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(cache.keys().await, vec!["a"], "aborted timer applies nothing");
    }
}
