//! Cache Statistics Module
//!
//! Tracks cache performance metrics including hits, misses, evictions and
//! read latency.

use std::time::Duration;

use serde::Serialize;

/// Nominal unit for the memory-efficiency ratio.
const NOMINAL_ENTRY_BYTES: f64 = 1024.0;

// == Cache Stats ==
/// Running counters owned by the store.
#[derive(Debug, Clone, Default)]
pub struct CacheStats {
    /// Number of successful cache retrievals
    pub hits: u64,
    /// Number of failed cache retrievals (key not found or expired)
    pub misses: u64,
    /// Number of single-entry removals (delete, eviction, expiry)
    pub evictions: u64,
    /// Number of values stored in compressed form
    pub compressions: u64,
    /// Sum of `get` durations
    pub total_access_time: Duration,
    /// Number of timed `get` calls
    pub timed_accesses: u64,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Mean duration of a `get`, zero before the first call.
    pub fn avg_access_latency(&self) -> Duration {
        if self.timed_accesses == 0 {
            Duration::ZERO
        } else {
            let nanos = self.total_access_time.as_nanos() / u128::from(self.timed_accesses);
            Duration::from_nanos(nanos as u64)
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn record_compression(&mut self) {
        self.compressions += 1;
    }

    pub fn record_access_time(&mut self, elapsed: Duration) {
        self.total_access_time += elapsed;
        self.timed_accesses += 1;
    }
}

// == Stats Report ==
/// Point-in-time view returned by `stats()`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatsReport {
    pub size: usize,
    pub memory_usage: usize,
    pub max_size: usize,
    pub max_memory: usize,
    pub hit_rate: f64,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub compressions: u64,
    /// Mean `get` latency in milliseconds
    pub avg_access_latency_ms: f64,
    /// Average bytes per entry in KiB, zero when empty
    pub memory_efficiency: f64,
}

impl StatsReport {
    pub fn new(
        stats: &CacheStats,
        size: usize,
        memory_usage: usize,
        max_size: usize,
        max_memory: usize,
    ) -> Self {
        let memory_efficiency = if size == 0 {
            0.0
        } else {
            memory_usage as f64 / size as f64 / NOMINAL_ENTRY_BYTES
        };
        Self {
            size,
            memory_usage,
            max_size,
            max_memory,
            hit_rate: stats.hit_rate(),
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            compressions: stats.compressions,
            avg_access_latency_ms: stats.avg_access_latency().as_secs_f64() * 1_000.0,
            memory_efficiency,
        }
    }
}
