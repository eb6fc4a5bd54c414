//! Disposal Worker
//!
//! Removed values are handed to a background task that starts one disposal
//! task per value, so removal never waits on a disposer and a slow, failing
//! or panicking disposer only affects its own value.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle, JoinSet};
use tracing::{debug, error, warn};

use crate::cache::Disposer;
use crate::error::{CacheError, Result};

/// One removed value awaiting release.
#[derive(Debug)]
pub struct Disposal<V> {
    pub key: String,
    pub value: V,
}

// == Disposal Queue ==
/// Sending half held by the store. Sending never blocks.
#[derive(Debug, Clone)]
pub struct DisposalQueue<V> {
    tx: mpsc::UnboundedSender<Disposal<V>>,
}

impl<V> DisposalQueue<V> {
    /// Builds a queue whose receiving half the caller drives.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Disposal<V>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Queues a removed value for release.
    ///
    /// # Errors
    /// `WorkerGone` if the worker has stopped; the value is dropped
    /// undisposed.
    pub fn push(&self, key: String, value: V) -> Result<()> {
        self.tx
            .send(Disposal { key, value })
            .map_err(|mpsc::error::SendError(job)| CacheError::WorkerGone(job.key))
    }
}

type Outcome = (String, std::result::Result<anyhow::Result<()>, JoinError>);

fn report((key, outcome): Outcome) {
    match outcome {
        Ok(Ok(())) => debug!(key = %key, "disposed"),
        Ok(Err(err)) => warn!(key = %key, error = %err, "disposer failed"),
        Err(err) => error!(key = %key, error = %err, "disposer panicked"),
    }
}

/// Spawns the worker that feeds queued removals to `disposer`.
///
/// Disposals start in removal order but run concurrently, each on its own
/// task. The worker stops accepting work once every [`DisposalQueue`] clone
/// has been dropped, then waits for the disposals still in flight.
///
/// # Errors
/// Returns `InvalidConfig` when called outside a tokio runtime.
pub fn spawn_disposal_worker<V: Send + 'static>(
    disposer: Arc<dyn Disposer<V>>,
) -> Result<(DisposalQueue<V>, JoinHandle<()>)> {
    let runtime = tokio::runtime::Handle::try_current()
        .map_err(|_| CacheError::config("a disposer requires a running tokio runtime"))?;
    let (queue, mut rx) = DisposalQueue::channel();

    let handle = runtime.spawn(async move {
        let mut in_flight: JoinSet<Outcome> = JoinSet::new();
        loop {
            tokio::select! {
                received = rx.recv() => {
                    let Some(Disposal { key, value }) = received else {
                        break;
                    };
                    let release = tokio::spawn(disposer.dispose(key.clone(), value));
                    // The inner task isolates a panic and keeps the key for the log line.
                    in_flight.spawn(async move { (key, release.await) });
                }
                Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                    if let Ok(outcome) = joined {
                        report(outcome);
                    }
                }
            }
        }

        while let Some(joined) = in_flight.join_next().await {
            if let Ok(outcome) = joined {
                report(outcome);
            }
        }
        debug!("disposal worker stopped");
    });

    Ok((queue, handle))
}
