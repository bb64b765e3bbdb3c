//! Events emitted by the coordinator to its consumer.

use std::time::Duration;

use crate::matcher::SearchCriteria;

use super::FoundRecord;

/// The external event stream of one search run.
///
/// Exactly one `Started` comes first. `Completed` and `Stopped` are terminal:
/// nothing follows them for that run.
#[derive(Debug, Clone)]
pub enum SearchEvent {
    Started {
        worker_count: usize,
        criteria: SearchCriteria,
        target_count: u64,
    },
    Progress {
        total_attempts: u64,
        /// Attempts per second over the last reporting window
        throughput: f64,
    },
    Found {
        record: FoundRecord,
        found_count: u64,
        target_count: u64,
    },
    Completed {
        found_count: u64,
        total_attempts: u64,
    },
    Stopped {
        found_count: u64,
    },
    /// Non-fatal unless followed by `Stopped`.
    Error {
        message: String,
    },
}

impl SearchEvent {
    /// Returns true for `Completed` and `Stopped`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SearchEvent::Completed { .. } | SearchEvent::Stopped { .. })
    }
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The target count was reached.
    Completed,
    /// Cancelled through `stop()`.
    Stopped,
    /// Every worker faulted.
    Failed,
}

/// Final state of a run, returned when the coordinator is joined.
#[derive(Debug, Clone)]
pub struct SearchSummary {
    pub outcome: SearchOutcome,
    pub worker_count: usize,
    pub found_count: u64,
    pub total_attempts: u64,
    /// Every record emitted this run, including ones the sink failed to persist
    pub records: Vec<FoundRecord>,
    pub elapsed: Duration,
}

impl SearchSummary {
    /// Average attempts per second over the whole run.
    pub fn keys_per_second(&self) -> f64 {
        let elapsed = self.elapsed.as_secs_f64();
        if elapsed > 0.0 {
            self.total_attempts as f64 / elapsed
        } else {
            0.0
        }
    }
}
