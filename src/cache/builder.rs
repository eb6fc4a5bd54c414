//! Cache Builder
//!
//! Wires a [`CacheConfig`] together with the strategy objects the cache
//! calls out to.

use std::sync::Arc;

use crate::cache::{
    CacheStore, Clock, Compressor, DefaultScorer, Disposer, ScoreFunction, SizeEstimator,
    SystemClock,
};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::scored::ScoredCache;
use crate::tasks::spawn_disposal_worker;

/// Builder for [`CacheStore`] and [`ScoredCache`].
///
/// A size estimator is mandatory; everything else has a default.
///
/// # Example
/// ```ignore
/// let cache = CacheBuilder::new(CacheConfig::default())
///     .size_estimator(MediaEstimator::image())
///     .disposer(|key: String, uri: String| async move { release(&key, &uri).await })
///     .build()?;
/// ```
pub struct CacheBuilder<V> {
    config: CacheConfig,
    estimator: Option<Arc<dyn SizeEstimator<V>>>,
    scorer: Arc<dyn ScoreFunction>,
    disposer: Option<Arc<dyn Disposer<V>>>,
    compressor: Option<Arc<dyn Compressor<V>>>,
    clock: Arc<dyn Clock>,
}

impl<V: Clone + Send + Sync + 'static> CacheBuilder<V> {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            config,
            estimator: None,
            scorer: Arc::new(DefaultScorer::default()),
            disposer: None,
            compressor: None,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn size_estimator(mut self, estimator: impl SizeEstimator<V> + 'static) -> Self {
        self.estimator = Some(Arc::new(estimator));
        self
    }

    /// Replaces the default four-term scorer.
    pub fn score_function(mut self, scorer: impl ScoreFunction + 'static) -> Self {
        self.scorer = Arc::new(scorer);
        self
    }

    /// Installs the callback run on every removal.
    pub fn disposer(mut self, disposer: impl Disposer<V>) -> Self {
        self.disposer = Some(Arc::new(disposer));
        self
    }

    /// Installs the compression extension; only used with `enable_compression`.
    pub fn compressor(mut self, compressor: impl Compressor<V> + 'static) -> Self {
        self.compressor = Some(Arc::new(compressor));
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    // == Build Store ==
    /// Builds the bare synchronous engine.
    ///
    /// # Errors
    /// - `InvalidConfig` if the config fails validation or no size
    ///   estimator was supplied
    /// - `InvalidConfig` if a disposer is installed outside a tokio runtime
    pub fn build_store(self) -> Result<CacheStore<V>> {
        self.config.validate()?;
        let estimator = self
            .estimator
            .ok_or_else(|| CacheError::config("a size estimator is required"))?;
        let disposal = match self.disposer {
            Some(disposer) => Some(spawn_disposal_worker(disposer)?.0),
            None => None,
        };
        Ok(CacheStore::from_parts(
            self.config,
            estimator,
            self.scorer,
            self.compressor,
            self.clock,
            disposal,
        ))
    }

    // == Build ==
    /// Builds the shared facade. Must run inside a tokio runtime.
    pub fn build(self) -> Result<ScoredCache<V>> {
        tokio::runtime::Handle::try_current()
            .map_err(|_| CacheError::config("ScoredCache requires a running tokio runtime"))?;
        let store = self.build_store()?;
        Ok(ScoredCache::from_store(store))
    }
}
