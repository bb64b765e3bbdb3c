//! Append-only destinations for found records.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::worker::FoundRecord;

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Failed to parse {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Receives every record the coordinator emits, in order.
///
/// A failed `append` is reported but does not stop the search; sinks
/// should keep the record in memory even when persistence fails.
pub trait ResultSink: Send {
    fn append(&mut self, record: &FoundRecord) -> Result<(), SinkError>;

    /// All records held by the sink, oldest first.
    fn records(&self) -> &[FoundRecord];
}

/// Keeps records in memory only.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Vec<FoundRecord>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResultSink for MemorySink {
    fn append(&mut self, record: &FoundRecord) -> Result<(), SinkError> {
        self.records.push(record.clone());
        Ok(())
    }

    fn records(&self) -> &[FoundRecord] {
        &self.records
    }
}

/// Persists records as a pretty-printed JSON array, rewritten on every append.
#[derive(Debug)]
pub struct JsonFileSink {
    path: PathBuf,
    records: Vec<FoundRecord>,
}

impl JsonFileSink {
    /// Starts a fresh result file at `path`. Nothing is written until the first append.
    pub fn create(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            records: Vec::new(),
        }
    }

    /// Opens `path`, keeping any records already stored there.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SinkError> {
        let path = path.into();
        let records = match fs::read_to_string(&path) {
            Ok(data) if data.trim().is_empty() => Vec::new(),
            Ok(data) => serde_json::from_str(&data).map_err(|source| SinkError::Json {
                path: path.clone(),
                source,
            })?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(source) => return Err(SinkError::Io { path, source }),
        };
        info!(path = %path.display(), existing = records.len(), "opened result file");
        Ok(Self { path, records })
    }

    /// Returns the file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Drops every stored record and writes an empty array.
    pub fn clear(&mut self) -> Result<(), SinkError> {
        self.records.clear();
        self.flush()
    }

    fn flush(&self) -> Result<(), SinkError> {
        let json = serde_json::to_string_pretty(&self.records).map_err(|source| SinkError::Json {
            path: self.path.clone(),
            source,
        })?;
        fs::write(&self.path, json).map_err(|source| SinkError::Io {
            path: self.path.clone(),
            source,
        })?;
        debug!(path = %self.path.display(), records = self.records.len(), "result file written");
        Ok(())
    }
}

impl ResultSink for JsonFileSink {
    fn append(&mut self, record: &FoundRecord) -> Result<(), SinkError> {
        self.records.push(record.clone());
        self.flush()
    }

    fn records(&self) -> &[FoundRecord] {
        &self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Keypair;

    fn record(attempt: u64) -> FoundRecord {
        let mut secret = [0u8; 32];
        secret[31] = attempt as u8;
        let keypair = Keypair::from_secret_key(secret).unwrap();
        FoundRecord::from_keypair(&keypair, attempt, 0)
    }

    #[test]
    fn test_memory_sink_keeps_order() {
        let mut sink = MemorySink::new();
        sink.append(&record(1)).unwrap();
        sink.append(&record(2)).unwrap();
        let attempts: Vec<u64> = sink.records().iter().map(|r| r.found_at_attempt).collect();
        assert_eq!(attempts, vec![1, 2]);
    }

    #[test]
    fn test_json_sink_round_trips_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("found.json");

        let mut sink = JsonFileSink::create(&path);
        sink.append(&record(1)).unwrap();
        sink.append(&record(2)).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"privateKey\""));
        assert!(text.contains("\"foundAtAttempt\": 2"));

        let reopened = JsonFileSink::open(&path).unwrap();
        assert_eq!(reopened.records(), sink.records());
    }

    #[test]
    fn test_json_sink_open_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let sink = JsonFileSink::open(dir.path().join("missing.json")).unwrap();
        assert!(sink.records().is_empty());
    }

    #[test]
    fn test_json_sink_open_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(JsonFileSink::open(&path), Err(SinkError::Json { .. })));
    }

    #[test]
    fn test_json_sink_clear() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("found.json");
        let mut sink = JsonFileSink::create(&path);
        sink.append(&record(3)).unwrap();
        sink.clear().unwrap();
        assert!(sink.records().is_empty());
        assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
    }

    #[test]
    fn test_json_sink_keeps_record_when_write_fails() {
        let dir = tempfile::tempdir().unwrap();
        // A directory cannot be written as a file.
        let mut sink = JsonFileSink::create(dir.path());
        assert!(matches!(sink.append(&record(4)), Err(SinkError::Io { .. })));
        assert_eq!(sink.records().len(), 1);
        assert_eq!(sink.path(), dir.path());
    }
}
