//! Dispatch engine: a fixed pool of worker threads draining a shared queue of
//! work items.
//!
//! Per item a worker takes a host slot, resolves the link with retry, gives
//! the slot back, records the outcome, merges the session's cookies into the
//! shared jar and reports progress. Every item yields exactly one outcome;
//! a failing or panicking item never stops the batch.

mod engine;
mod progress;
mod summary;
mod worker;

pub use engine::{DispatchConfig, DispatchEngine};
pub use progress::ProgressEvent;
pub use summary::BatchSummary;

/// Reason recorded when a host stayed busy for the whole admission wait.
pub const SKIPPED_REASON: &str = "semaphore timeout";
