//! Cache Entry Module
//!
//! Defines a cached value together with the access metadata used for
//! expiry and eviction scoring.

use std::time::Duration;

// == Entry Metadata ==
/// Access and sizing metadata tracked for every entry.
///
/// Timestamps are milliseconds on the cache's [`Clock`](super::Clock).
#[derive(Debug, Clone, PartialEq)]
pub struct EntryMeta {
    /// Set on insert and reset on every overwrite
    pub created_at: u64,
    /// Updated on every successful read
    pub last_accessed_at: u64,
    /// Successful reads plus one for the insert
    pub access_count: u64,
    /// Estimated footprint, fixed until the next overwrite
    pub size_bytes: usize,
    /// Last computed eviction score
    pub score: f64,
    /// Whether the stored value went through the compressor
    pub compressed: bool,
}

impl EntryMeta {
    // == Constructor ==
    /// Metadata for a freshly inserted value.
    pub fn new(now_ms: u64, size_bytes: usize) -> Self {
        Self {
            created_at: now_ms,
            last_accessed_at: now_ms,
            access_count: 1,
            size_bytes,
            score: 0.0,
            compressed: false,
        }
    }

    /// Milliseconds since the entry was inserted or last overwritten.
    pub fn age_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.created_at)
    }

    /// Milliseconds since the last successful read (or the insert).
    pub fn idle_ms(&self, now_ms: u64) -> u64 {
        now_ms.saturating_sub(self.last_accessed_at)
    }

    // == Is Expired ==
    /// Checks whether the entry has outlived `ttl`.
    ///
    /// Boundary condition: an entry exactly `ttl` old is still live; it
    /// expires once its age strictly exceeds the TTL.
    pub fn is_expired(&self, now_ms: u64, ttl: Duration) -> bool {
        u128::from(self.age_ms(now_ms)) > ttl.as_millis()
    }

    /// Records a successful read.
    pub fn record_access(&mut self, now_ms: u64) {
        self.last_accessed_at = now_ms;
        self.access_count = self.access_count.saturating_add(1);
    }
}

// == Cache Entry ==
/// Represents a single cache entry with value and metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// Key the entry is stored under
    pub key: String,
    /// The stored (possibly compressed) value
    pub value: V,
    /// Access metadata
    pub meta: EntryMeta,
}

impl<V> CacheEntry<V> {
    pub fn new(key: String, value: V, meta: EntryMeta) -> Self {
        Self { key, value, meta }
    }
}
