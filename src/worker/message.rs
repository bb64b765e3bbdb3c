//! Messages flowing from workers to the coordinator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::crypto::Keypair;

/// A matching keypair, as reported and persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoundRecord {
    /// The Ethereum address (checksummed with 0x prefix)
    pub address: String,
    /// The private key (hex encoded, no 0x prefix)
    pub private_key: String,
    /// Uncompressed public key (hex encoded, `04` prefix)
    pub public_key: String,
    /// 1-based attempt index within the reporting worker
    pub found_at_attempt: u64,
    pub timestamp: DateTime<Utc>,
    /// The ID of the worker that found this result
    #[serde(default)]
    pub worker_id: usize,
}

impl FoundRecord {
    /// Builds the record for a matching keypair. Computes the checksum.
    pub fn from_keypair(keypair: &Keypair, found_at_attempt: u64, worker_id: usize) -> Self {
        Self {
            address: keypair.address().to_checksum(),
            private_key: keypair.private_key_hex(),
            public_key: keypair.public_key_hex(),
            found_at_attempt,
            timestamp: Utc::now(),
            worker_id,
        }
    }
}

/// Attempts completed by one worker since its previous sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressSample {
    pub worker_id: usize,
    pub attempts: u64,
}

/// Everything a worker can tell the coordinator.
#[derive(Debug, Clone)]
pub enum WorkerMessage {
    Found(FoundRecord),
    Progress(ProgressSample),
    /// The worker died; `message` is the panic payload when it was a string.
    Fault { worker_id: usize, message: String },
}
