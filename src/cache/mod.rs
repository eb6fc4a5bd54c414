//! Cache Module
//!
//! Synchronous cache engine: entry storage with recency order, scored
//! eviction, TTL expiry, memory accounting and statistics.

mod builder;
mod clock;
mod entry;
mod estimator;
mod hooks;
mod policy;
mod recency;
mod stats;
mod store;


// Re-export public types
pub use builder::CacheBuilder;
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::{CacheEntry, EntryMeta};
pub use estimator::{ByteLenEstimator, ByteSize, MediaEstimator, SizeEstimator};
pub use hooks::{BoxFuture, Compressor, Disposer, Loader};
pub use policy::{DefaultScorer, ScoreFunction, ScoreWeights};
pub use recency::RecencyMap;
pub use stats::{CacheStats, StatsReport};
pub use store::CacheStore;
