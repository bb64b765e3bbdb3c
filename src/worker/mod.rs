//! Parallel search: workers, their pool, and the coordinator that
//! aggregates them.
//!
//! This module provides:
//! - Independent CPU workers, one thread each
//! - A single aggregation thread that owns all counters
//! - The event stream consumed by the CLI (or any other front end)

mod coordinator;
mod cpu;
mod event;
mod message;
mod pool;
mod stats;

pub use coordinator::{SearchCoordinator, SearchOptions, SearchStart, StopHandle};
pub use cpu::{SearchWorker, DEFAULT_BATCH_SIZE};
pub use event::{SearchEvent, SearchOutcome, SearchSummary};
pub use message::{FoundRecord, ProgressSample, WorkerMessage};
pub use pool::WorkerPool;
pub use stats::{ProgressReport, SearchStats};

use crate::matcher::CriteriaError;

/// Reasons a search request is refused before any worker runs.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error(transparent)]
    Criteria(#[from] CriteriaError),
    #[error("Worker count must be at least 1")]
    NoWorkers,
    #[error("Failed to spawn thread: {0}")]
    Spawn(#[source] std::io::Error),
}
