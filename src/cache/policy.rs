//! Eviction Policy Module
//!
//! Scores entries from frequency, recency, size and age. Lower scores are
//! evicted first.

use std::fmt::Debug;

use crate::cache::EntryMeta;

/// Ranks an entry for eviction. Lower evicts first.
pub trait ScoreFunction: Send + Sync {
    fn score(&self, meta: &EntryMeta, now_ms: u64) -> f64;
}

impl<F> ScoreFunction for F
where
    F: Fn(&EntryMeta, u64) -> f64 + Send + Sync,
{
    fn score(&self, meta: &EntryMeta, now_ms: u64) -> f64 {
        self(meta, now_ms)
    }
}

// == Score Weights ==
/// Weights and ceilings for the four scoring terms.
///
/// Recency and age are measured in seconds, size in KiB.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreWeights {
    pub frequency_weight: f64,
    /// Idle time after which the recency bonus reaches zero
    pub recency_ceiling_secs: f64,
    pub recency_weight: f64,
    /// Size at which the size bonus reaches zero
    pub size_ceiling_kib: f64,
    pub size_penalty_weight: f64,
    /// Age after which the age bonus reaches zero
    pub age_ceiling_secs: f64,
    pub age_weight: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            frequency_weight: 100.0,
            recency_ceiling_secs: 3_600.0,
            recency_weight: 0.1,
            size_ceiling_kib: 10_240.0,
            size_penalty_weight: 0.01,
            age_ceiling_secs: 86_400.0,
            age_weight: 0.001,
        }
    }
}

// == Default Scorer ==
/// Additive combination of the four terms.
#[derive(Debug, Clone, Default)]
pub struct DefaultScorer {
    weights: ScoreWeights,
}

impl DefaultScorer {
    pub fn new(weights: ScoreWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &ScoreWeights {
        &self.weights
    }

    /// `ln(access_count + 1) * w`; repeat reads raise the score.
    pub fn frequency_term(&self, meta: &EntryMeta) -> f64 {
        ((meta.access_count as f64) + 1.0).ln() * self.weights.frequency_weight
    }

    /// Decays to zero once idle longer than the recency ceiling.
    pub fn recency_term(&self, meta: &EntryMeta, now_ms: u64) -> f64 {
        let idle_secs = meta.idle_ms(now_ms) as f64 / 1_000.0;
        (self.weights.recency_ceiling_secs - idle_secs).max(0.0) * self.weights.recency_weight
    }

    /// Larger entries earn a smaller bonus.
    pub fn size_term(&self, meta: &EntryMeta) -> f64 {
        let size_kib = meta.size_bytes as f64 / 1_024.0;
        (self.weights.size_ceiling_kib - size_kib).max(0.0) * self.weights.size_penalty_weight
    }

    /// Very old entries lose their age bonus even while hot.
    pub fn age_term(&self, meta: &EntryMeta, now_ms: u64) -> f64 {
        let age_secs = meta.age_ms(now_ms) as f64 / 1_000.0;
        (self.weights.age_ceiling_secs - age_secs).max(0.0) * self.weights.age_weight
    }
}

impl ScoreFunction for DefaultScorer {
    fn score(&self, meta: &EntryMeta, now_ms: u64) -> f64 {
        self.frequency_term(meta)
            + self.recency_term(meta, now_ms)
            + self.size_term(meta)
            + self.age_term(meta, now_ms)
    }
}
