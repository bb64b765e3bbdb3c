//! Search coordination: owns the pool, aggregates worker messages and
//! publishes the event stream.

use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossbeam_channel::{bounded, select, unbounded, Receiver, Sender};
use rand::RngCore;
use tracing::{error, info, warn};

use crate::crypto::RandomSource;
use crate::matcher::SearchCriteria;
use crate::sink::ResultSink;

use super::cpu::DEFAULT_BATCH_SIZE;
use super::{
    FoundRecord, ProgressSample, SearchError, SearchEvent, SearchOutcome, SearchStats,
    SearchSummary, WorkerMessage, WorkerPool,
};

/// Capacity of the worker → coordinator channel.
const INBOX_CAPACITY: usize = 256;

/// Tunables that are not part of a search request.
#[derive(Debug, Clone)]
pub struct SearchOptions {
    /// Attempts per worker between progress samples and stop checks
    pub batch_size: u64,
    /// Minimum time between `Progress` events
    pub report_interval: Duration,
    /// Where worker RNGs come from
    pub random: RandomSource,
    /// Upper bound on workers; defaults to the host's CPU count
    pub max_workers: usize,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            report_interval: Duration::from_secs(1),
            random: RandomSource::Entropy,
            max_workers: num_cpus::get(),
        }
    }
}

/// Returned by a successful `start`.
#[derive(Debug)]
pub struct SearchStart {
    /// Workers actually spawned after clamping
    pub worker_count: usize,
    /// The run's event stream. Disconnects after the terminal event.
    pub events: Receiver<SearchEvent>,
}

#[derive(Debug)]
enum Control {
    Stop,
}

/// Requests cancellation of the current run from another thread
/// (e.g. a signal handler). Unlike [`SearchCoordinator::stop`] it does not wait.
#[derive(Debug, Clone)]
pub struct StopHandle {
    control: Sender<Control>,
}

impl StopHandle {
    /// Asks the run to stop. Harmless if it already ended.
    pub fn stop(&self) {
        let _ = self.control.send(Control::Stop);
    }
}

struct ActiveSearch {
    control: Sender<Control>,
    aggregator: JoinHandle<SearchSummary>,
}

/// Runs vanity searches: one at a time, each with its own worker pool.
///
/// Found records are appended to the shared sink `S`, which outlives runs.
pub struct SearchCoordinator<S: ResultSink + 'static> {
    sink: Arc<Mutex<S>>,
    options: SearchOptions,
    active: Option<ActiveSearch>,
}

impl<S: ResultSink + 'static> SearchCoordinator<S> {
    /// Creates a coordinator with default options.
    pub fn new(sink: S) -> Self {
        Self::with_options(sink, SearchOptions::default())
    }

    /// Creates a coordinator with explicit options.
    pub fn with_options(sink: S, options: SearchOptions) -> Self {
        Self {
            sink: Arc::new(Mutex::new(sink)),
            options,
            active: None,
        }
    }

    /// Starts a search, stopping any run still in progress.
    ///
    /// `target_count` of 0 searches until stopped. `worker_count` is clamped
    /// to `options.max_workers`; the effective count is returned and carried
    /// by the `Started` event.
    pub fn start(
        &mut self,
        criteria: SearchCriteria,
        worker_count: usize,
        target_count: u64,
    ) -> Result<SearchStart, SearchError> {
        let random = self.options.random;
        self.start_with_rng(criteria, worker_count, target_count, move |id| {
            random.rng_for(id)
        })
    }

    /// Like [`start`](Self::start), with worker RNGs built by `rng_factory(worker_id)`.
    pub fn start_with_rng<F, R>(
        &mut self,
        criteria: SearchCriteria,
        worker_count: usize,
        target_count: u64,
        rng_factory: F,
    ) -> Result<SearchStart, SearchError>
    where
        F: Fn(usize) -> R,
        R: RngCore + Send + 'static,
    {
        criteria.validate()?;
        if worker_count == 0 {
            return Err(SearchError::NoWorkers);
        }

        self.stop();

        let limit = self.options.max_workers.max(1);
        let effective = worker_count.min(limit);
        if effective < worker_count {
            warn!(
                requested = worker_count,
                effective, "worker count clamped to available parallelism"
            );
        }

        let (event_tx, event_rx) = unbounded();
        let (worker_tx, worker_rx) = bounded(INBOX_CAPACITY);
        let (control_tx, control_rx) = unbounded();

        let pool = WorkerPool::spawn(
            effective,
            &criteria,
            self.options.batch_size,
            worker_tx,
            rng_factory,
        )?;

        let worker_count = pool.num_workers();
        info!(
            workers = worker_count,
            target = target_count,
            criteria = %criteria.describe(),
            "search started"
        );
        let _ = event_tx.send(SearchEvent::Started {
            worker_count,
            criteria,
            target_count,
        });

        let aggregator = Aggregator {
            inbox: worker_rx,
            control: control_rx,
            pool,
            run: RunState {
                stats: SearchStats::new(Instant::now(), self.options.report_interval),
                target_count,
                live_workers: worker_count,
                worker_count,
                records: Vec::new(),
                sink: Arc::clone(&self.sink),
                events: event_tx,
            },
        };

        let handle = thread::Builder::new()
            .name("vanity-coordinator".into())
            .spawn(move || aggregator.run())
            .map_err(SearchError::Spawn)?;

        self.active = Some(ActiveSearch {
            control: control_tx,
            aggregator: handle,
        });

        Ok(SearchStart {
            worker_count,
            events: event_rx,
        })
    }

    /// Stops the current run and waits for it to wind down.
    ///
    /// Emits `Stopped` unless the run already ended; once this returns no
    /// further events are sent. Returns `None` when nothing was running.
    pub fn stop(&mut self) -> Option<SearchSummary> {
        let active = self.active.take()?;
        let _ = active.control.send(Control::Stop);
        Self::join(active)
    }

    /// Waits for the current run to end on its own (target reached, or
    /// stopped through a [`StopHandle`]).
    pub fn wait(&mut self) -> Option<SearchSummary> {
        let active = self.active.take()?;
        Self::join(active)
    }

    fn join(active: ActiveSearch) -> Option<SearchSummary> {
        match active.aggregator.join() {
            Ok(summary) => Some(summary),
            Err(_) => {
                error!("coordinator thread panicked");
                None
            }
        }
    }

    /// Returns a handle that can request cancellation of the current run.
    pub fn stop_handle(&self) -> Option<StopHandle> {
        self.active.as_ref().map(|active| StopHandle {
            control: active.control.clone(),
        })
    }

    /// Returns true while a run has not reached its terminal event.
    pub fn is_running(&self) -> bool {
        self.active
            .as_ref()
            .is_some_and(|active| !active.aggregator.is_finished())
    }

    /// Snapshot of every record held by the sink.
    pub fn records(&self) -> Vec<FoundRecord> {
        self.sink
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .records()
            .to_vec()
    }
}

impl<S: ResultSink + 'static> Drop for SearchCoordinator<S> {
    fn drop(&mut self) {
        self.stop();
    }
}

/// The single consumer of worker messages for one run.
///
/// Field order matters: `inbox` is dropped before `pool`, so workers blocked
/// on a full channel are released before the pool joins them.
struct Aggregator<S: ResultSink + 'static> {
    inbox: Receiver<WorkerMessage>,
    control: Receiver<Control>,
    pool: WorkerPool,
    run: RunState<S>,
}

impl<S: ResultSink + 'static> Aggregator<S> {
    fn run(self) -> SearchSummary {
        let Aggregator {
            inbox,
            control,
            pool,
            mut run,
        } = self;

        let outcome = loop {
            let step = select! {
                recv(control) -> _ => Some(SearchOutcome::Stopped),
                recv(inbox) -> message => match message {
                    Ok(message) => run.handle(message),
                    Err(_) => {
                        run.emit_error("all workers exited".into());
                        Some(SearchOutcome::Failed)
                    }
                },
            };
            if let Some(outcome) = step {
                break outcome;
            }
        };

        pool.stop();
        run.emit_terminal(outcome);
        drop(inbox);
        drop(control);
        pool.join();

        info!(
            ?outcome,
            found = run.stats.found_count(),
            attempts = run.stats.total_attempts(),
            "search finished"
        );
        run.into_summary(outcome)
    }
}

struct RunState<S: ResultSink + 'static> {
    stats: SearchStats,
    target_count: u64,
    live_workers: usize,
    worker_count: usize,
    records: Vec<FoundRecord>,
    sink: Arc<Mutex<S>>,
    events: Sender<SearchEvent>,
}

impl<S: ResultSink + 'static> RunState<S> {
    /// Applies one worker message; returns the outcome if the run should end.
    fn handle(&mut self, message: WorkerMessage) -> Option<SearchOutcome> {
        match message {
            WorkerMessage::Found(record) => self.on_found(record),
            WorkerMessage::Progress(sample) => {
                self.on_progress(sample);
                None
            }
            WorkerMessage::Fault { worker_id, message } => self.on_fault(worker_id, message),
        }
    }

    fn on_found(&mut self, record: FoundRecord) -> Option<SearchOutcome> {
        let found_count = self.stats.record_found();
        info!(
            address = %record.address,
            worker = record.worker_id,
            attempt = record.found_at_attempt,
            found_count,
            "match found"
        );

        let persisted = self
            .sink
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .append(&record);
        self.records.push(record.clone());

        self.emit(SearchEvent::Found {
            record,
            found_count,
            target_count: self.target_count,
        });
        if let Err(e) = persisted {
            warn!(error = %e, "failed to persist found record");
            self.emit_error(e.to_string());
        }

        (self.target_count > 0 && found_count >= self.target_count)
            .then_some(SearchOutcome::Completed)
    }

    fn on_progress(&mut self, sample: ProgressSample) {
        if let Some(report) = self.stats.record_progress(sample.attempts, Instant::now()) {
            self.emit(SearchEvent::Progress {
                total_attempts: report.total_attempts,
                throughput: report.throughput,
            });
        }
    }

    fn on_fault(&mut self, worker_id: usize, message: String) -> Option<SearchOutcome> {
        self.live_workers = self.live_workers.saturating_sub(1);
        error!(
            worker = worker_id,
            remaining = self.live_workers,
            %message,
            "worker failed"
        );
        self.emit_error(format!("Worker {} error: {}", worker_id, message));

        if self.live_workers == 0 {
            self.emit_error("All workers failed".into());
            return Some(SearchOutcome::Failed);
        }
        None
    }

    fn emit_terminal(&self, outcome: SearchOutcome) {
        let found_count = self.stats.found_count();
        self.emit(match outcome {
            SearchOutcome::Completed => SearchEvent::Completed {
                found_count,
                total_attempts: self.stats.total_attempts(),
            },
            SearchOutcome::Stopped | SearchOutcome::Failed => SearchEvent::Stopped { found_count },
        });
    }

    fn emit_error(&self, message: String) {
        self.emit(SearchEvent::Error { message });
    }

    fn emit(&self, event: SearchEvent) {
        // The consumer may have dropped its receiver; the run carries on.
        let _ = self.events.send(event);
    }

    fn into_summary(self, outcome: SearchOutcome) -> SearchSummary {
        SearchSummary {
            outcome,
            worker_count: self.worker_count,
            found_count: self.stats.found_count(),
            total_attempts: self.stats.total_attempts(),
            records: self.records,
            elapsed: self.stats.elapsed(),
        }
    }
}
