//! Batch Coalescer
//!
//! Merges bursts of batched sets and deletes into one pending table that is
//! flushed once the burst has been quiet for the debounce window.
//!
//! Phases: `Idle -> Pending(timer) -> Flushing -> Idle`. Every enqueue
//! bumps a generation counter and re-arms the timer; a timer that wakes up
//! with a stale generation does nothing. A timer takes itself out of the
//! state before it starts flushing, so only sleeping timers are ever aborted.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::scored::Shared;

/// One pending batched operation.
#[derive(Debug, Clone, PartialEq)]
pub enum PendingOp<V> {
    Set(V),
    Delete,
}

/// Observable coalescer phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchPhase {
    Idle,
    Pending,
    Flushing,
}

#[derive(Debug)]
struct BatchState<V> {
    generation: u64,
    next_seq: u64,
    timer: Option<JoinHandle<()>>,
    flushing: bool,
    /// key -> (sequence of first enqueue, latest op)
    ops: HashMap<String, (u64, PendingOp<V>)>,
}

// == Batch Coalescer ==
#[derive(Debug)]
pub struct BatchCoalescer<V> {
    state: Mutex<BatchState<V>>,
    /// Held while a table is applied so flushes never interleave
    flush_lock: tokio::sync::Mutex<()>,
    debounce: Duration,
}

impl<V> BatchCoalescer<V> {
    pub fn new(debounce: Duration) -> Self {
        Self {
            state: Mutex::new(BatchState {
                generation: 0,
                next_seq: 0,
                timer: None,
                flushing: false,
                ops: HashMap::new(),
            }),
            flush_lock: tokio::sync::Mutex::new(()),
            debounce,
        }
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    fn state(&self) -> MutexGuard<'_, BatchState<V>> {
        // State is plain data; a poisoned lock is still consistent.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn phase(&self) -> BatchPhase {
        let state = self.state();
        if state.flushing {
            BatchPhase::Flushing
        } else if state.timer.is_some() {
            BatchPhase::Pending
        } else {
            BatchPhase::Idle
        }
    }

    /// Number of distinct keys waiting for the next flush.
    pub fn pending_len(&self) -> usize {
        self.state().ops.len()
    }

    // == Enqueue ==
    /// Merges `ops` into the pending table (last write per key wins),
    /// cancels the sleeping timer and arms a new one via `arm`, which is
    /// given the new generation.
    pub fn enqueue<I, F>(&self, ops: I, arm: F)
    where
        I: IntoIterator<Item = (String, PendingOp<V>)>,
        F: FnOnce(u64) -> JoinHandle<()>,
    {
        let mut guard = self.state();
        let state = &mut *guard;
        for (key, op) in ops {
            match state.ops.entry(key) {
                Entry::Occupied(mut slot) => slot.get_mut().1 = op,
                Entry::Vacant(slot) => {
                    slot.insert((state.next_seq, op));
                    state.next_seq += 1;
                }
            }
        }
        state.generation += 1;
        if let Some(stale) = state.timer.take() {
            stale.abort();
        }
        state.timer = Some(arm(state.generation));
    }

    /// Claims the table for the timer armed at `generation`. Returns `None`
    /// if a later enqueue has superseded it.
    fn begin_flush(&self, generation: u64) -> Option<Vec<(String, PendingOp<V>)>> {
        let mut state = self.state();
        if state.generation != generation {
            return None;
        }
        state.timer = None;
        Some(Self::take_ops(&mut state))
    }

    /// Claims the table regardless of any armed timer.
    fn take_all(&self) -> Vec<(String, PendingOp<V>)> {
        let mut state = self.state();
        state.generation += 1;
        if let Some(timer) = state.timer.take() {
            timer.abort();
        }
        Self::take_ops(&mut state)
    }

    fn take_ops(state: &mut BatchState<V>) -> Vec<(String, PendingOp<V>)> {
        state.flushing = true;
        let mut ops: Vec<(u64, String, PendingOp<V>)> = state
            .ops
            .drain()
            .map(|(key, (seq, op))| (seq, key, op))
            .collect();
        ops.sort_by_key(|(seq, _, _)| *seq);
        ops.into_iter().map(|(_, key, op)| (key, op)).collect()
    }

    fn finish_flush(&self) {
        self.state().flushing = false;
    }
}

/// Queues `ops` on the cache's coalescer and re-arms the debounce timer.
pub(crate) fn enqueue_batch<V>(shared: &Arc<Shared<V>>, ops: Vec<(String, PendingOp<V>)>)
where
    V: Clone + Send + Sync + 'static,
{
    shared.batch.enqueue(ops, |generation| {
        let shared = Arc::clone(shared);
        tokio::spawn(async move {
            tokio::time::sleep(shared.batch.debounce()).await;
            flush(&shared, Some(generation)).await;
        })
    });
}

/// Applies a pending table through the normal set/delete path.
///
/// With `Some(generation)` only the matching timer's table is flushed;
/// `None` flushes whatever is pending now. Returns the number of
/// operations applied.
pub(crate) async fn flush<V>(shared: &Shared<V>, generation: Option<u64>) -> usize
where
    V: Clone + Send + Sync + 'static,
{
    let _serial = shared.batch.flush_lock.lock().await;
    let ops = match generation {
        Some(generation) => match shared.batch.begin_flush(generation) {
            Some(ops) => ops,
            None => return 0,
        },
        None => shared.batch.take_all(),
    };

    let applied = ops.len();
    if applied > 0 {
        let mut store = shared.store.write().await;
        for (key, op) in ops {
            match op {
                PendingOp::Set(value) => {
                    if let Err(err) = store.set(key, value) {
                        warn!(error = %err, "batched set failed");
                    }
                }
                PendingOp::Delete => {
                    store.delete(&key);
                }
            }
        }
    }
    shared.batch.finish_flush();
    debug!(applied, "flushed batch");
    applied
}
