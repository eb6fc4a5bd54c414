//! Scored Cache - A bounded in-memory cache with scored eviction
//!
//! Keeps string-keyed values under an entry cap and a memory cap. When a
//! limit is hit, expired entries go first, then the entries with the lowest
//! usefulness score. Removed values are handed to an async disposer.

pub mod cache;
pub mod config;
pub mod error;
pub mod scored;
pub mod tasks;

pub use cache::{
    ByteLenEstimator, ByteSize, CacheBuilder, CacheStore, Clock, Compressor, DefaultScorer,
    Disposer, EntryMeta, Loader, ManualClock, MediaEstimator, ScoreFunction, ScoreWeights,
    SizeEstimator, StatsReport, SystemClock,
};
pub use config::CacheConfig;
pub use error::{CacheError, Result};
pub use scored::ScoredCache;
pub use tasks::{spawn_cleanup_task, BatchPhase, WarmupReport};
