//! Background Tasks Module
//!
//! Work the cache hands to the tokio scheduler instead of running inline.
//!
//! # Tasks
//! - Disposal: runs the disposer for removed values
//! - Batch flush: applies coalesced batch operations after the debounce window
//! - TTL Cleanup: deferred and periodic expiry sweeps
//! - Warmup: concurrent best-effort population

mod batch;
mod cleanup;
mod disposal;
mod warmup;

pub use batch::{BatchCoalescer, BatchPhase, PendingOp};
pub use cleanup::spawn_cleanup_task;
pub use disposal::{spawn_disposal_worker, Disposal, DisposalQueue};
pub use warmup::WarmupReport;

pub(crate) use batch::{enqueue_batch, flush};
pub(crate) use cleanup::schedule_deferred_cleanup;
pub(crate) use warmup::run_warmup;
