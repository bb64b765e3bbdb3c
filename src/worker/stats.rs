//! Attempt and match counters owned by the coordinator.

use std::time::{Duration, Instant};

/// A throughput sample ready to be reported.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressReport {
    pub total_attempts: u64,
    /// Attempts per second since the previous report
    pub throughput: f64,
}

/// Aggregate statistics for one run.
///
/// Only the aggregation thread writes these, so plain integers suffice.
#[derive(Debug, Clone)]
pub struct SearchStats {
    total_attempts: u64,
    found_count: u64,
    start_time: Instant,
    report_interval: Duration,
    window_start: Instant,
    window_attempts: u64,
}

impl SearchStats {
    /// Creates stats starting at `now`, reporting at most once per `report_interval`.
    pub fn new(now: Instant, report_interval: Duration) -> Self {
        Self {
            total_attempts: 0,
            found_count: 0,
            start_time: now,
            report_interval,
            window_start: now,
            window_attempts: 0,
        }
    }

    /// Adds a progress delta. Returns a report once the interval has elapsed.
    pub fn record_progress(&mut self, attempts: u64, now: Instant) -> Option<ProgressReport> {
        self.total_attempts = self.total_attempts.saturating_add(attempts);
        self.window_attempts = self.window_attempts.saturating_add(attempts);

        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed < self.report_interval {
            return None;
        }

        let secs = elapsed.as_secs_f64();
        let throughput = if secs > 0.0 {
            self.window_attempts as f64 / secs
        } else {
            0.0
        };
        self.window_start = now;
        self.window_attempts = 0;

        Some(ProgressReport {
            total_attempts: self.total_attempts,
            throughput,
        })
    }

    /// Counts one match and returns the new total.
    pub fn record_found(&mut self) -> u64 {
        self.found_count += 1;
        self.found_count
    }

    /// Returns the total attempts across all workers.
    pub fn total_attempts(&self) -> u64 {
        self.total_attempts
    }

    /// Returns the total matches found.
    pub fn found_count(&self) -> u64 {
        self.found_count
    }

    /// Returns the elapsed time since the run started.
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_is_sum_of_deltas() {
        let t0 = Instant::now();
        let mut stats = SearchStats::new(t0, Duration::from_secs(3600));
        let deltas = [10_000u64, 1, 0, 250, 10_000, 7];
        for (i, delta) in deltas.iter().enumerate() {
            stats.record_progress(*delta, t0 + Duration::from_millis(i as u64));
        }
        assert_eq!(stats.total_attempts(), deltas.iter().sum::<u64>());
    }

    #[test]
    fn test_reports_once_per_interval() {
        let t0 = Instant::now();
        let mut stats = SearchStats::new(t0, Duration::from_secs(1));

        assert!(stats.record_progress(1000, t0 + Duration::from_millis(400)).is_none());
        assert!(stats.record_progress(1000, t0 + Duration::from_millis(800)).is_none());

        let report = stats
            .record_progress(2000, t0 + Duration::from_secs(2))
            .unwrap();
        assert_eq!(report.total_attempts, 4000);
        assert!((report.throughput - 2000.0).abs() < 1e-9);

        // Window resets after a report
        assert!(stats.record_progress(500, t0 + Duration::from_millis(2500)).is_none());
        let report = stats
            .record_progress(500, t0 + Duration::from_secs(3))
            .unwrap();
        assert_eq!(report.total_attempts, 5000);
        assert!((report.throughput - 1000.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_interval_reports_every_sample() {
        let t0 = Instant::now();
        let mut stats = SearchStats::new(t0, Duration::ZERO);
        let report = stats.record_progress(10, t0).unwrap();
        assert_eq!(report.total_attempts, 10);
        assert_eq!(report.throughput, 0.0);
    }

    #[test]
    fn test_found_count() {
        let mut stats = SearchStats::new(Instant::now(), Duration::from_secs(1));
        assert_eq!(stats.record_found(), 1);
        assert_eq!(stats.record_found(), 2);
        assert_eq!(stats.found_count(), 2);
    }
}
