//! Cache Store Module
//!
//! Main cache engine: scored eviction, TTL expiry and memory accounting over
//! a single recency-ordered map.

use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, warn};

use crate::cache::{
    ByteLenEstimator, ByteSize, CacheBuilder, CacheEntry, CacheStats, Clock, Compressor,
    EntryMeta, RecencyMap, ScoreFunction, SizeEstimator, StatsReport,
};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::tasks::DisposalQueue;

// == Cache Store ==
/// Bounded cache with scored eviction and TTL support.
///
/// Invariants after every public call:
/// - `memory_usage` equals the sum of every entry's `size_bytes`
/// - after `set`, the store is within both limits or holds only the new entry
/// - expired entries are never returned
pub struct CacheStore<V> {
    /// Key-value storage in recency order
    entries: RecencyMap<V>,
    /// Sum of entry sizes
    memory_usage: usize,
    /// Performance statistics
    stats: CacheStats,
    config: CacheConfig,
    estimator: Arc<dyn SizeEstimator<V>>,
    scorer: Arc<dyn ScoreFunction>,
    compressor: Option<Arc<dyn Compressor<V>>>,
    clock: Arc<dyn Clock>,
    /// Removed values go here when a disposer is installed
    disposal: Option<DisposalQueue<V>>,
}

impl<V> fmt::Debug for CacheStore<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheStore")
            .field("len", &self.entries.len())
            .field("memory_usage", &self.memory_usage)
            .field("stats", &self.stats)
            .field("config", &self.config)
            .finish()
    }
}

impl<V: ByteSize + Clone + Send + Sync + 'static> CacheStore<V> {
    // == Constructor ==
    /// Creates a store that sizes values by byte length and uses the
    /// default scorer and system clock.
    pub fn new(config: CacheConfig) -> Result<Self> {
        CacheBuilder::new(config)
            .size_estimator(ByteLenEstimator)
            .build_store()
    }
}

impl<V: Clone + Send + 'static> CacheStore<V> {
    pub(crate) fn from_parts(
        config: CacheConfig,
        estimator: Arc<dyn SizeEstimator<V>>,
        scorer: Arc<dyn ScoreFunction>,
        compressor: Option<Arc<dyn Compressor<V>>>,
        clock: Arc<dyn Clock>,
        disposal: Option<DisposalQueue<V>>,
    ) -> Self {
        Self {
            entries: RecencyMap::new(),
            memory_usage: 0,
            stats: CacheStats::new(),
            config,
            estimator,
            scorer,
            compressor,
            clock,
            disposal,
        }
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// A hit refreshes the entry's access metadata and score and moves it to
    /// the most-recently-used end. Expired entries are removed and counted
    /// as misses.
    pub fn get(&mut self, key: &str) -> Option<V> {
        let started = Instant::now();
        let found = self.lookup(key);

        if self.config.enable_statistics {
            match found {
                Some(_) => self.stats.record_hit(),
                None => self.stats.record_miss(),
            }
            self.stats.record_access_time(started.elapsed());
        }
        found
    }

    fn lookup(&mut self, key: &str) -> Option<V> {
        let now = self.clock.now_ms();
        if self.entries.get(key)?.meta.is_expired(now, self.config.ttl) {
            debug!(key = %key, "lazily expiring entry");
            self.remove_entry(key);
            return None;
        }

        let entry = self.entries.get_mut(key)?;
        entry.meta.record_access(now);
        entry.meta.score = self.scorer.score(&entry.meta, now);
        let stored = entry.value.clone();
        let compressed = entry.meta.compressed;
        self.entries.touch(key);

        if !compressed {
            return Some(stored);
        }
        let compressor = self.compressor.clone()?;
        match compressor.decompress(&stored) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(key = %key, error = %err, "decompression failed, dropping entry");
                self.remove_entry(key);
                None
            }
        }
    }

    // == Set ==
    /// Stores a key-value pair, evicting as needed.
    ///
    /// Overwriting resets the entry's metadata and hands the superseded value
    /// to the disposer. When a limit would be breached, expired entries are
    /// swept first, then the lowest-scored entries are evicted until the new
    /// entry fits or nothing else is left.
    ///
    /// # Errors
    /// `SizeEstimation` if the estimator cannot size `value`; the store is
    /// left untouched.
    pub fn set(&mut self, key: impl Into<String>, value: V) -> Result<()> {
        let key = key.into();
        let size = self
            .estimator
            .estimate(&value)
            .map_err(|err| CacheError::SizeEstimation {
                key: key.clone(),
                reason: format!("{err:#}"),
            })?;
        let (value, size, compressed) = self.maybe_compress(value, size);
        let now = self.clock.now_ms();

        if let Some(old) = self.entries.remove(&key) {
            self.memory_usage -= old.meta.size_bytes;
            debug!(key = %key, "overwriting entry");
            self.dispose(old);
        }

        self.make_room(size, now);

        let mut meta = EntryMeta::new(now, size);
        meta.compressed = compressed;
        meta.score = self.scorer.score(&meta, now);
        self.entries.insert(CacheEntry::new(key, value, meta));
        self.memory_usage += size;
        Ok(())
    }

    fn maybe_compress(&mut self, value: V, size: usize) -> (V, usize, bool) {
        let Some(compressor) = self.compressor.as_ref() else {
            return (value, size, false);
        };
        if !self.config.enable_compression || size < self.config.compression_threshold_bytes {
            return (value, size, false);
        }
        match compressor.compress(&value, size) {
            Some((packed, packed_size)) => {
                if self.config.enable_statistics {
                    self.stats.record_compression();
                }
                (packed, packed_size, true)
            }
            None => (value, size, false),
        }
    }

    fn over_limits(&self, incoming: usize) -> bool {
        self.entries.len() + 1 > self.config.max_entries
            || self.memory_usage + incoming > self.config.max_memory_bytes
    }

    // == Eviction ==
    /// Frees space for an entry of `incoming` bytes.
    ///
    /// Scores are snapshotted once, after the expiry sweep. The sort is
    /// stable over least-recently-used-first order, so equal scores evict
    /// the oldest entry first.
    fn make_room(&mut self, incoming: usize, now: u64) {
        if !self.over_limits(incoming) {
            return;
        }
        let expired = self.sweep_expired(now);
        if expired > 0 {
            debug!(expired, "swept expired entries before eviction");
        }
        if !self.over_limits(incoming) {
            return;
        }

        let mut candidates: Vec<(f64, String)> = self
            .entries
            .iter_lru()
            .map(|entry| (self.scorer.score(&entry.meta, now), entry.key.clone()))
            .collect();
        candidates.sort_by(|a, b| a.0.total_cmp(&b.0));

        for (score, key) in candidates {
            if !self.over_limits(incoming) {
                break;
            }
            debug!(key = %key, score, "evicting entry");
            self.remove_entry(&key);
        }
    }

    // == Delete ==
    /// Removes an entry by key, returning whether anything was removed.
    pub fn delete(&mut self, key: &str) -> bool {
        self.remove_entry(key).is_some()
    }

    // == Has ==
    /// True if the key is present and live. Does not count as an access;
    /// an expired entry found here is removed.
    pub fn has(&mut self, key: &str) -> bool {
        let now = self.clock.now_ms();
        let expired = match self.entries.get(key) {
            Some(entry) => entry.meta.is_expired(now, self.config.ttl),
            None => return false,
        };
        if expired {
            self.remove_entry(key);
        }
        !expired
    }

    // == Clear ==
    /// Disposes every entry and empties the store. Returns how many entries
    /// were dropped.
    pub fn clear(&mut self) -> usize {
        let drained = self.entries.drain();
        let count = drained.len();
        for entry in drained {
            self.dispose(entry);
        }
        self.memory_usage = 0;
        count
    }

    // == Snapshots ==
    /// Live keys, least recently used first. Expired entries are skipped,
    /// not removed.
    pub fn keys(&self) -> Vec<String> {
        let now = self.clock.now_ms();
        self.entries
            .iter_lru()
            .filter(|entry| !entry.meta.is_expired(now, self.config.ttl))
            .map(|entry| entry.key.clone())
            .collect()
    }

    /// Live values, least recently used first. Expired entries are skipped,
    /// not removed.
    pub fn values(&self) -> Vec<V> {
        let now = self.clock.now_ms();
        self.entries
            .iter_lru()
            .filter(|entry| !entry.meta.is_expired(now, self.config.ttl))
            .filter_map(|entry| self.restore(entry))
            .collect()
    }

    fn restore(&self, entry: &CacheEntry<V>) -> Option<V> {
        if !entry.meta.compressed {
            return Some(entry.value.clone());
        }
        let compressor = self.compressor.as_ref()?;
        match compressor.decompress(&entry.value) {
            Ok(value) => Some(value),
            Err(err) => {
                warn!(key = %entry.key, error = %err, "decompression failed");
                None
            }
        }
    }

    // == Cleanup Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let now = self.clock.now_ms();
        self.sweep_expired(now)
    }

    fn sweep_expired(&mut self, now: u64) -> usize {
        let ttl = self.config.ttl;
        let expired: Vec<String> = self
            .entries
            .iter_lru()
            .filter(|entry| entry.meta.is_expired(now, ttl))
            .map(|entry| entry.key.clone())
            .collect();

        for key in &expired {
            self.remove_entry(key);
        }
        expired.len()
    }

    // == Removal ==
    fn remove_entry(&mut self, key: &str) -> Option<()> {
        let entry = self.entries.remove(key)?;
        self.memory_usage -= entry.meta.size_bytes;
        if self.config.enable_statistics {
            self.stats.record_eviction();
        }
        self.dispose(entry);
        Some(())
    }

    fn dispose(&self, entry: CacheEntry<V>) {
        if let Some(queue) = &self.disposal {
            if let Err(err) = queue.push(entry.key, entry.value) {
                warn!(error = %err, "value dropped undisposed");
            }
        }
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> StatsReport {
        StatsReport::new(
            &self.stats,
            self.entries.len(),
            self.memory_usage,
            self.config.max_entries,
            self.config.max_memory_bytes,
        )
    }

    // == Accessors ==
    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Estimated bytes held.
    pub fn memory_usage(&self) -> usize {
        self.memory_usage
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Keys from least to most recently used, expired ones included.
    pub fn recency_order(&self) -> Vec<String> {
        self.entries
            .iter_lru()
            .map(|entry| entry.key.clone())
            .collect()
    }

    /// Metadata for a key without touching it.
    pub fn entry_meta(&self, key: &str) -> Option<&EntryMeta> {
        self.entries.get(key).map(|entry| &entry.meta)
    }

    /// Whether occupancy is high enough that a cleanup should run inline.
    pub fn under_pressure(&self) -> bool {
        self.entries.len() >= self.config.cleanup_threshold()
    }

    /// Recomputes the byte total from scratch.
    #[cfg(test)]
    pub(crate) fn summed_sizes(&self) -> usize {
        self.entries
            .iter_lru()
            .map(|entry| entry.meta.size_bytes)
            .sum()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;
    use crate::tasks::Disposal;
    use std::time::Duration;
    use tokio::sync::mpsc::UnboundedReceiver;

    fn config(max_entries: usize, max_memory_bytes: usize) -> CacheConfig {
        CacheConfig {
            max_entries,
            max_memory_bytes,
            ttl: Duration::from_millis(1_000),
            ..CacheConfig::default()
        }
    }

    fn store_with_clock(config: CacheConfig) -> (CacheStore<String>, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(1_000_000));
        let store = CacheBuilder::new(config)
            .size_estimator(ByteLenEstimator)
            .clock(clock.clone())
            .build_store()
            .unwrap();
        (store, clock)
    }

    /// Store whose removals land in a channel the test can inspect.
    fn store_with_queue(
        config: CacheConfig,
    ) -> (CacheStore<String>, UnboundedReceiver<Disposal<String>>) {
        let (queue, rx) = DisposalQueue::channel();
        let store: CacheStore<String> = CacheStore::from_parts(
            config,
            Arc::new(ByteLenEstimator),
            Arc::new(crate::cache::DefaultScorer::default()),
            None,
            Arc::new(ManualClock::new(0)),
            Some(queue),
        );
        (store, rx)
    }

    fn drain(rx: &mut UnboundedReceiver<Disposal<String>>) -> Vec<String> {
        let mut keys = Vec::new();
        while let Ok(job) = rx.try_recv() {
            keys.push(job.key);
        }
        keys
    }

    #[test]
    fn test_store_new() {
        let store: CacheStore<String> = CacheStore::new(CacheConfig::default()).unwrap();
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
        assert_eq!(store.memory_usage(), 0);
    }

    #[test]
    fn test_store_set_and_get() {
        let (mut store, _) = store_with_clock(config(100, 1 << 20));

        store.set("key1", "value1".to_string()).unwrap();
        assert_eq!(store.get("key1"), Some("value1".to_string()));
        assert_eq!(store.len(), 1);
        assert_eq!(store.memory_usage(), 6);
    }

    #[test]
    fn test_store_get_nonexistent() {
        let (mut store, _) = store_with_clock(config(100, 1 << 20));
        assert_eq!(store.get("nonexistent"), None);
        assert_eq!(store.stats().misses, 1);
    }

    #[test]
    fn test_get_updates_metadata() {
        let (mut store, clock) = store_with_clock(config(100, 1 << 20));
        store.set("k", "v".to_string()).unwrap();

        clock.advance(Duration::from_millis(200));
        store.get("k").unwrap();
        store.get("k").unwrap();

        let meta = store.entry_meta("k").unwrap();
        assert_eq!(meta.access_count, 3);
        assert_eq!(meta.last_accessed_at, 1_000_200);
        assert_eq!(meta.created_at, 1_000_000);
        assert!(meta.score > 0.0);
    }

    #[test]
    fn test_store_overwrite_adjusts_accounting() {
        let (mut store, _) = store_with_clock(config(100, 1 << 20));

        store.set("key1", "value1".to_string()).unwrap();
        store.get("key1");
        store.set("key1", "v2".to_string()).unwrap();

        assert_eq!(store.get("key1"), Some("v2".to_string()));
        assert_eq!(store.len(), 1);
        assert_eq!(store.memory_usage(), 2);
        assert_eq!(store.entry_meta("key1").unwrap().access_count, 2);
    }

    #[test]
    fn test_overwrite_resets_ttl() {
        let (mut store, clock) = store_with_clock(config(100, 1 << 20));
        store.set("k", "a".to_string()).unwrap();
        clock.advance(Duration::from_millis(800));
        store.set("k", "b".to_string()).unwrap();
        clock.advance(Duration::from_millis(800));

        assert_eq!(store.get("k"), Some("b".to_string()));
    }

    #[test]
    fn test_store_delete() {
        let (mut store, _) = store_with_clock(config(100, 1 << 20));

        store.set("key1", "value1".to_string()).unwrap();
        assert!(store.delete("key1"));
        assert!(!store.delete("key1"));

        assert!(store.is_empty());
        assert_eq!(store.memory_usage(), 0);
        assert_eq!(store.stats().evictions, 1);
    }

    #[test]
    fn test_ttl_boundary() {
        let (mut store, clock) = store_with_clock(config(100, 1 << 20));
        store.set("early", "x".to_string()).unwrap();
        store.set("late", "x".to_string()).unwrap();

        clock.advance(Duration::from_millis(999));
        assert!(store.get("early").is_some());
        assert_eq!(store.stats().hits, 1);

        clock.advance(Duration::from_millis(2));
        assert!(store.get("late").is_none());
        assert_eq!(store.stats().misses, 1);
        assert_eq!(store.len(), 1, "expired entry removed on read");
    }

    #[test]
    fn test_has_is_a_peek() {
        let (mut store, clock) = store_with_clock(config(100, 1 << 20));
        store.set("a", "1".to_string()).unwrap();
        store.set("b", "2".to_string()).unwrap();

        assert!(store.has("a"));
        assert!(!store.has("zzz"));
        assert_eq!(store.recency_order(), vec!["a", "b"]);
        assert_eq!(store.entry_meta("a").unwrap().access_count, 1);
        assert_eq!(store.stats().hits + store.stats().misses, 0);

        clock.advance(Duration::from_millis(1_001));
        assert!(!store.has("a"));
        assert!(store.entry_meta("a").is_none());
    }

    #[test]
    fn test_keys_and_values_skip_expired_without_removing() {
        let (mut store, clock) = store_with_clock(config(100, 1 << 20));
        store.set("old", "1".to_string()).unwrap();
        clock.advance(Duration::from_millis(600));
        store.set("new", "2".to_string()).unwrap();
        clock.advance(Duration::from_millis(600));

        assert_eq!(store.keys(), vec!["new"]);
        assert_eq!(store.values(), vec!["2".to_string()]);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_eviction_by_count_uses_scores() {
        let mut store: CacheStore<String> = CacheBuilder::new(config(3, 1 << 20))
            .size_estimator(ByteLenEstimator)
            .score_function(|meta: &EntryMeta, _now: u64| meta.size_bytes as f64)
            .clock(Arc::new(ManualClock::new(0)))
            .build_store()
            .unwrap();

        store.set("A", "x".repeat(10)).unwrap();
        store.set("B", "x".repeat(5)).unwrap();
        store.set("C", "x".repeat(20)).unwrap();

        store.set("D", "x".repeat(30)).unwrap();
        assert_eq!(store.recency_order(), vec!["A", "C", "D"]);

        store.set("E", "x".repeat(40)).unwrap();
        assert_eq!(store.recency_order(), vec!["C", "D", "E"]);
        assert_eq!(store.stats().evictions, 2);
    }

    #[test]
    fn test_equal_scores_evict_oldest_first() {
        let (mut store, _) = store_with_clock(config(2, 1 << 20));

        store.set("a", "x".to_string()).unwrap();
        store.set("b", "y".to_string()).unwrap();
        store.set("c", "z".to_string()).unwrap();

        assert_eq!(store.keys(), vec!["b", "c"]);
    }

    #[test]
    fn test_reads_protect_entries() {
        let (mut store, _) = store_with_clock(config(3, 1 << 20));
        store.set("key1", "value1".to_string()).unwrap();
        store.set("key2", "value2".to_string()).unwrap();
        store.set("key3", "value3".to_string()).unwrap();

        store.get("key1").unwrap();
        store.set("key4", "value4".to_string()).unwrap();

        assert!(store.has("key1"));
        assert!(!store.has("key2"));
    }

    #[test]
    fn test_eviction_by_memory() {
        let (mut store, _) = store_with_clock(config(100, 10));
        store.set("a", "xxxx".to_string()).unwrap();
        store.set("b", "xxxx".to_string()).unwrap();
        store.set("c", "xxxx".to_string()).unwrap();

        assert_eq!(store.keys(), vec!["b", "c"]);
        assert_eq!(store.memory_usage(), 8);
    }

    #[test]
    fn test_oversized_entry_is_accepted_alone() {
        let (mut store, _) = store_with_clock(config(100, 10));
        store.set("a", "xx".to_string()).unwrap();
        store.set("b", "xx".to_string()).unwrap();
        store.set("huge", "x".repeat(50)).unwrap();

        assert_eq!(store.keys(), vec!["huge"]);
        assert_eq!(store.memory_usage(), 50);
        assert_eq!(store.summed_sizes(), 50);
    }

    #[test]
    fn test_expired_entries_go_before_scored_eviction() {
        let (mut store, clock) = store_with_clock(config(3, 1 << 20));
        store.set("stale", "x".to_string()).unwrap();
        clock.advance(Duration::from_millis(900));
        store.set("cold", "x".to_string()).unwrap();
        store.set("warm", "x".to_string()).unwrap();
        clock.advance(Duration::from_millis(200));

        // Removing the expired entry is enough, no live entry is evicted.
        store.set("fresh", "x".to_string()).unwrap();
        assert_eq!(store.keys(), vec!["cold", "warm", "fresh"]);
    }

    #[test]
    fn test_clear_is_idempotent() {
        let (mut store, mut rx) = store_with_queue(config(10, 1 << 20));
        store.set("a", "1".to_string()).unwrap();
        store.set("b", "2".to_string()).unwrap();

        assert_eq!(store.clear(), 2);
        assert_eq!(drain(&mut rx), vec!["a", "b"]);

        assert_eq!(store.clear(), 0);
        assert!(drain(&mut rx).is_empty());
        assert_eq!(store.len(), 0);
        assert_eq!(store.memory_usage(), 0);
        assert_eq!(store.stats().evictions, 0);
    }

    #[test]
    fn test_every_removal_is_disposed() {
        let (mut store, mut rx) = store_with_queue(config(2, 1 << 20));
        store.set("a", "1".to_string()).unwrap();
        store.set("b", "2".to_string()).unwrap();
        store.set("a", "3".to_string()).unwrap(); // overwrite
        store.set("c", "4".to_string()).unwrap(); // evicts b
        store.delete("c");

        assert_eq!(drain(&mut rx), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_cleanup_expired() {
        let (mut store, clock) = store_with_clock(config(100, 1 << 20));
        store.set("key1", "value1".to_string()).unwrap();
        clock.advance(Duration::from_millis(500));
        store.set("key2", "value2".to_string()).unwrap();
        clock.advance(Duration::from_millis(600));

        assert_eq!(store.cleanup_expired(), 1);
        assert_eq!(store.len(), 1);
        assert!(store.get("key2").is_some());
        assert_eq!(store.memory_usage(), store.summed_sizes());
    }

    #[test]
    fn test_size_estimator_failure_propagates() {
        let mut store: CacheStore<String> = CacheBuilder::new(config(10, 1 << 20))
            .size_estimator(|value: &String| -> anyhow::Result<usize> {
                anyhow::ensure!(!value.is_empty(), "cannot size empty payload");
                Ok(value.len())
            })
            .build_store()
            .unwrap();

        store.set("ok", "v".to_string()).unwrap();
        let err = store.set("ok", String::new()).unwrap_err();
        assert!(matches!(err, CacheError::SizeEstimation { .. }));
        assert_eq!(store.get("ok"), Some("v".to_string()), "old value kept");
    }

    #[test]
    fn test_statistics_can_be_disabled() {
        let cfg = CacheConfig {
            enable_statistics: false,
            ..config(1, 1 << 20)
        };
        let (mut store, _) = store_with_clock(cfg);
        store.set("a", "1".to_string()).unwrap();
        store.get("a");
        store.get("b");
        store.set("c", "1".to_string()).unwrap();

        let stats = store.stats();
        assert_eq!((stats.hits, stats.misses, stats.evictions), (0, 0, 0));
        assert_eq!(stats.size, 1);
    }

    #[test]
    fn test_stats_report() {
        let (mut store, _) = store_with_clock(config(100, 1 << 20));
        store.set("key1", "x".repeat(2048)).unwrap();
        store.get("key1").unwrap();
        store.get("key1").unwrap();
        store.get("key1").unwrap();
        store.get("nonexistent");

        let stats = store.stats();
        assert_eq!(stats.hits, 3);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hit_rate, 0.75);
        assert_eq!(stats.size, 1);
        assert_eq!(stats.memory_usage, 2048);
        assert_eq!(stats.max_size, 100);
        assert_eq!(stats.memory_efficiency, 2.0);
    }

    /// Reverses strings and halves their accounted size.
    struct Reverser;

    impl Compressor<String> for Reverser {
        fn compress(&self, value: &String, size_bytes: usize) -> Option<(String, usize)> {
            Some((value.chars().rev().collect(), size_bytes / 2))
        }

        fn decompress(&self, stored: &String) -> anyhow::Result<String> {
            Ok(stored.chars().rev().collect())
        }
    }

    #[test]
    fn test_compression_extension_point() {
        let cfg = CacheConfig {
            enable_compression: true,
            compression_threshold_bytes: 4,
            ..config(10, 1 << 20)
        };
        let mut store: CacheStore<String> = CacheBuilder::new(cfg)
            .size_estimator(ByteLenEstimator)
            .compressor(Reverser)
            .build_store()
            .unwrap();

        store.set("small", "abc".to_string()).unwrap();
        store.set("big", "abcdef".to_string()).unwrap();

        assert!(!store.entry_meta("small").unwrap().compressed);
        assert!(store.entry_meta("big").unwrap().compressed);
        assert_eq!(store.memory_usage(), 3 + 3);
        assert_eq!(store.get("big"), Some("abcdef".to_string()));
        assert_eq!(store.values(), vec!["abc".to_string(), "abcdef".to_string()]);
        assert_eq!(store.stats().compressions, 1);
    }

    #[test]
    fn test_compressor_ignored_when_disabled() {
        let mut store: CacheStore<String> = CacheBuilder::new(config(10, 1 << 20))
            .size_estimator(ByteLenEstimator)
            .compressor(Reverser)
            .build_store()
            .unwrap();

        store.set("big", "x".repeat(4096)).unwrap();
        assert!(!store.entry_meta("big").unwrap().compressed);
        assert_eq!(store.stats().compressions, 0);
    }
}
