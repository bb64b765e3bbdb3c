//! CPU-based search worker.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam_channel::Sender;
use rand::RngCore;
use tracing::debug;

use crate::crypto::KeypairGenerator;
use crate::matcher::SearchCriteria;

use super::{FoundRecord, ProgressSample, WorkerMessage};

/// Default number of attempts between progress samples and stop checks.
pub const DEFAULT_BATCH_SIZE: u64 = 10_000;

/// A worker that generates and tests keypairs on its own thread.
///
/// Owns its RNG and secp256k1 context; shares nothing with other workers
/// except the outbound channel and the stop flag.
pub struct SearchWorker<R> {
    /// Worker ID
    id: usize,
    /// The criteria to match against
    criteria: SearchCriteria,
    generator: KeypairGenerator<R>,
    batch_size: u64,
    /// Channel to the coordinator
    tx: Sender<WorkerMessage>,
    /// Shared stop flag, read at batch boundaries
    stop_flag: Arc<AtomicBool>,
}

impl<R: RngCore> SearchWorker<R> {
    /// Creates a new worker.
    pub fn new(
        id: usize,
        criteria: SearchCriteria,
        rng: R,
        batch_size: u64,
        tx: Sender<WorkerMessage>,
        stop_flag: Arc<AtomicBool>,
    ) -> Self {
        Self {
            id,
            criteria,
            generator: KeypairGenerator::with_rng(rng),
            batch_size: batch_size.max(1),
            tx,
            stop_flag,
        }
    }

    /// Runs the worker loop.
    ///
    /// Generates keypairs and tests them against the criteria until:
    /// - Stop flag is set (checked once per batch)
    /// - Channel is closed
    pub fn run(mut self) {
        let mut attempts: u64 = 0;

        while !self.stop_flag.load(Ordering::Relaxed) {
            for _ in 0..self.batch_size {
                attempts += 1;
                let keypair = self.generator.generate();

                if self.criteria.matches(keypair.address()) {
                    let record = FoundRecord::from_keypair(&keypair, attempts, self.id);
                    if self.tx.send(WorkerMessage::Found(record)).is_err() {
                        return;
                    }
                }
            }

            let sample = ProgressSample {
                worker_id: self.id,
                attempts: self.batch_size,
            };
            if self.tx.send(WorkerMessage::Progress(sample)).is_err() {
                return;
            }
        }

        debug!(worker = self.id, attempts, "worker stopped");
    }
}
