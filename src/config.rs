//! Configuration Module
//!
//! Handles loading, defaulting and validating cache configuration.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{CacheError, Result};

/// Default entry cap.
pub const DEFAULT_MAX_ENTRIES: usize = 100;
/// Default memory cap (50 MiB).
pub const DEFAULT_MAX_MEMORY_BYTES: usize = 50 * 1024 * 1024;
/// Default time to live (30 minutes).
pub const DEFAULT_TTL: Duration = Duration::from_secs(30 * 60);

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
/// Strategy objects (estimator, scorer, disposer) are installed through
/// [`CacheBuilder`](crate::cache::CacheBuilder) instead.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of entries before eviction triggers
    pub max_entries: usize,
    /// Maximum estimated bytes before eviction triggers
    pub max_memory_bytes: usize,
    /// Age after which an entry is treated as expired
    pub ttl: Duration,
    /// Enables the compression extension point
    pub enable_compression: bool,
    /// Smallest estimated size that is offered to the compressor
    pub compression_threshold_bytes: usize,
    /// Toggles hit/miss/latency bookkeeping
    pub enable_statistics: bool,
    /// Quiet period after the last batch call before pending operations flush
    pub batch_debounce: Duration,
    /// Occupancy ratio at or above which `cleanup()` runs inline
    pub cleanup_pressure: f64,
    /// Delay before a deferred cleanup sweep runs
    pub cleanup_delay: Duration,
    /// Interval of the optional periodic sweep task
    pub cleanup_interval: Option<Duration>,
}

impl CacheConfig {
    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_MAX_ENTRIES` - Maximum entries (default: 100)
    /// - `CACHE_MAX_MEMORY_BYTES` - Maximum estimated bytes (default: 50 MiB)
    /// - `CACHE_TTL_SECS` - TTL in seconds (default: 1800)
    /// - `CACHE_ENABLE_COMPRESSION` - `true`/`false` (default: false)
    /// - `CACHE_COMPRESSION_THRESHOLD` - bytes (default: 1024)
    /// - `CACHE_ENABLE_STATISTICS` - `true`/`false` (default: true)
    /// - `CACHE_BATCH_DEBOUNCE_MS` - debounce window (default: 10)
    /// - `CACHE_CLEANUP_PRESSURE` - occupancy ratio (default: 0.9)
    /// - `CACHE_CLEANUP_DELAY_MS` - deferred sweep delay (default: 0)
    /// - `CACHE_CLEANUP_INTERVAL_SECS` - periodic sweep interval (default: disabled)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_entries: env_or("CACHE_MAX_ENTRIES", defaults.max_entries),
            max_memory_bytes: env_or("CACHE_MAX_MEMORY_BYTES", defaults.max_memory_bytes),
            ttl: Duration::from_secs(env_or("CACHE_TTL_SECS", defaults.ttl.as_secs())),
            enable_compression: env_or("CACHE_ENABLE_COMPRESSION", defaults.enable_compression),
            compression_threshold_bytes: env_or(
                "CACHE_COMPRESSION_THRESHOLD",
                defaults.compression_threshold_bytes,
            ),
            enable_statistics: env_or("CACHE_ENABLE_STATISTICS", defaults.enable_statistics),
            batch_debounce: Duration::from_millis(env_or(
                "CACHE_BATCH_DEBOUNCE_MS",
                defaults.batch_debounce.as_millis() as u64,
            )),
            cleanup_pressure: env_or("CACHE_CLEANUP_PRESSURE", defaults.cleanup_pressure),
            cleanup_delay: Duration::from_millis(env_or(
                "CACHE_CLEANUP_DELAY_MS",
                defaults.cleanup_delay.as_millis() as u64,
            )),
            cleanup_interval: env::var("CACHE_CLEANUP_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
        }
    }

    // == Validate ==
    /// Rejects limits that would make the cache misbehave silently later.
    pub fn validate(&self) -> Result<()> {
        if self.max_entries == 0 {
            return Err(CacheError::config("max_entries must be greater than zero"));
        }
        if self.max_memory_bytes == 0 {
            return Err(CacheError::config(
                "max_memory_bytes must be greater than zero",
            ));
        }
        if self.ttl.is_zero() {
            return Err(CacheError::config("ttl must be greater than zero"));
        }
        if !(self.cleanup_pressure > 0.0 && self.cleanup_pressure <= 1.0) {
            return Err(CacheError::config(format!(
                "cleanup_pressure must be in (0, 1], got {}",
                self.cleanup_pressure
            )));
        }
        if matches!(self.cleanup_interval, Some(interval) if interval.is_zero()) {
            return Err(CacheError::config("cleanup_interval must be non-zero"));
        }
        Ok(())
    }

    /// Entry count at or above which `cleanup()` runs synchronously.
    pub fn cleanup_threshold(&self) -> usize {
        (self.max_entries as f64 * self.cleanup_pressure).ceil() as usize
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            max_memory_bytes: DEFAULT_MAX_MEMORY_BYTES,
            ttl: DEFAULT_TTL,
            enable_compression: false,
            compression_threshold_bytes: 1024,
            enable_statistics: true,
            batch_debounce: Duration::from_millis(10),
            cleanup_pressure: 0.9,
            cleanup_delay: Duration::ZERO,
            cleanup_interval: None,
        }
    }
}

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
