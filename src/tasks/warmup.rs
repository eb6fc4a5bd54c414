//! Warmup Loader
//!
//! Best-effort bulk population: one concurrent load per key, failures
//! isolated per key.

use std::sync::Arc;

use serde::Serialize;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::cache::Loader;
use crate::scored::ScoredCache;

/// Outcome of a warmup run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WarmupReport {
    pub requested: usize,
    pub loaded: usize,
    pub failed: usize,
}

/// Loads every key concurrently and inserts each value as it arrives.
///
/// A failed, panicking or unsizable load is logged and counted; it never
/// affects the other keys and never fails the warmup.
pub(crate) async fn run_warmup<V>(
    cache: &ScoredCache<V>,
    keys: Vec<String>,
    loader: Arc<dyn Loader<V>>,
) -> WarmupReport
where
    V: Clone + Send + Sync + 'static,
{
    let mut report = WarmupReport {
        requested: keys.len(),
        ..WarmupReport::default()
    };

    let mut loads = JoinSet::new();
    for key in keys {
        let loader = Arc::clone(&loader);
        loads.spawn(async move {
            let result = loader.load(key.clone()).await;
            (key, result)
        });
    }

    while let Some(joined) = loads.join_next().await {
        match joined {
            Ok((key, Ok(value))) => match cache.set(key.clone(), value).await {
                Ok(()) => report.loaded += 1,
                Err(err) => {
                    warn!(key = %key, error = %err, "warmup value rejected");
                    report.failed += 1;
                }
            },
            Ok((key, Err(err))) => {
                warn!(key = %key, error = %err, "warmup load failed");
                report.failed += 1;
            }
            Err(err) => {
                error!(error = %err, "warmup load panicked");
                report.failed += 1;
            }
        }
    }

    info!(
        requested = report.requested,
        loaded = report.loaded,
        failed = report.failed,
        "warmup finished"
    );
    report
}
