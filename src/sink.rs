//! Destinations for extracted log records.
//!
//! The pipeline never logs records through a global handle: the caller passes
//! a [`RecordSink`] in, and owns its lifecycle.

use std::sync::Mutex;

use crate::model::{EventKind, LogRecord};

/// Receives one record per successfully extracted event.
///
/// Implementations must tolerate concurrent calls from independent requests.
pub trait RecordSink: Send + Sync {
    fn emit(&self, kind: EventKind, record: &LogRecord);
}

/// Emits each record as an INFO `tracing` event.
///
/// The event is recorded in whatever span is current, so request-scoped
/// fields (method, path, repo, delivery id) travel with it. With OTLP export
/// enabled the record reaches the logs pipeline through the tracing bridge.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl RecordSink for TracingSink {
    fn emit(&self, kind: EventKind, record: &LogRecord) {
        match record.to_json() {
            Ok(json) => tracing::info!(
                kind = %kind,
                fields = record.len(),
                record = %json,
                "{}",
                kind.log_message()
            ),
            Err(e) => tracing::error!(
                kind = %kind,
                fields = record.len(),
                error = %e,
                "failed to serialize record"
            ),
        }
    }
}

/// Keeps records in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<(EventKind, LogRecord)>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything emitted so far, in emission order.
    pub fn records(&self) -> Vec<(EventKind, LogRecord)> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    pub fn len(&self) -> usize {
        self.records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RecordSink for MemorySink {
    fn emit(&self, kind: EventKind, record: &LogRecord) {
        let mut records = self
            .records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        records.push((kind, record.clone()));
    }
}
