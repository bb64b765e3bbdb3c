//! Worker pool management.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::Sender;
use rand::RngCore;
use tracing::error;

use crate::matcher::SearchCriteria;

use super::{SearchError, SearchWorker, WorkerMessage};

/// The set of worker threads of one run, sharing a stop flag.
pub struct WorkerPool {
    /// Number of workers
    num_workers: usize,
    /// Worker thread handles (Option to allow taking during join)
    handles: Option<Vec<JoinHandle<()>>>,
    /// Shared stop flag
    stop_flag: Arc<AtomicBool>,
}

impl WorkerPool {
    /// Spawns `num_workers` threads, each owning the RNG built by `rng_factory(id)`.
    ///
    /// A worker that panics is reported as [`WorkerMessage::Fault`] on `tx`.
    pub fn spawn<F, R>(
        num_workers: usize,
        criteria: &SearchCriteria,
        batch_size: u64,
        tx: Sender<WorkerMessage>,
        rng_factory: F,
    ) -> Result<Self, SearchError>
    where
        F: Fn(usize) -> R,
        R: RngCore + Send + 'static,
    {
        let stop_flag = Arc::new(AtomicBool::new(false));
        let mut pool = Self {
            num_workers,
            handles: Some(Vec::with_capacity(num_workers)),
            stop_flag,
        };

        for id in 0..num_workers {
            let criteria = criteria.clone();
            let rng = rng_factory(id);
            let tx = tx.clone();
            let stop_flag = pool.stop_flag.clone();

            let handle = thread::Builder::new()
                .name(format!("vanity-worker-{}", id))
                .spawn(move || {
                    let worker =
                        SearchWorker::new(id, criteria, rng, batch_size, tx.clone(), stop_flag);
                    if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| worker.run())) {
                        let message = panic_message(payload.as_ref());
                        error!(worker = id, %message, "worker panicked");
                        let _ = tx.send(WorkerMessage::Fault {
                            worker_id: id,
                            message,
                        });
                    }
                })
                .map_err(SearchError::Spawn)?;

            if let Some(handles) = pool.handles.as_mut() {
                handles.push(handle);
            }
        }

        Ok(pool)
    }

    /// Signals all workers to stop at their next batch boundary.
    pub fn stop(&self) {
        self.stop_flag.store(true, Ordering::Relaxed);
    }

    /// Stops and waits for all workers to exit.
    ///
    /// Workers blocked on a full channel only return once its receiver is
    /// gone, so drop the receiver first.
    pub fn join(mut self) {
        self.join_all();
    }

    fn join_all(&mut self) {
        self.stop();
        if let Some(handles) = self.handles.take() {
            for handle in handles {
                let _ = handle.join();
            }
        }
    }

    /// Returns the number of workers.
    pub fn num_workers(&self) -> usize {
        self.num_workers
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.join_all();
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::RandomSource;
    use crate::matcher::MatchPattern;
    use crossbeam_channel::bounded;

    #[test]
    fn test_pool_spawns_and_stops() {
        let (tx, rx) = bounded(16);
        let criteria = SearchCriteria::single(MatchPattern::prefix("ffffffffff"));
        let pool = WorkerPool::spawn(2, &criteria, 50, tx, |id| {
            RandomSource::Seeded(5).rng_for(id)
        })
        .unwrap();
        assert_eq!(pool.num_workers(), 2);

        let mut seen = [false; 2];
        while !(seen[0] && seen[1]) {
            if let Ok(WorkerMessage::Progress(sample)) = rx.recv() {
                seen[sample.worker_id] = true;
            }
        }

        pool.stop();
        drop(rx);
        pool.join();
    }

    #[test]
    fn test_panic_message() {
        assert_eq!(panic_message(&"boom"), "boom");
        assert_eq!(panic_message(&String::from("bang")), "bang");
        assert_eq!(panic_message(&42u8), "unknown panic");
    }
}
