//! # Audit Sink Adapters
//!
//! - [`InMemoryAuditSink`]: collects published records, for tests and tooling
//! - [`TracingAuditSink`]: writes each record as a structured log line

use crate::domain::entities::AuditRecord;
use crate::errors::AuditSinkError;
use crate::ports::outbound::AuditSink;
use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::info;

/// Collects every published record in memory.
#[derive(Debug, Default)]
pub struct InMemoryAuditSink {
    records: Mutex<Vec<AuditRecord>>,
}

impl InMemoryAuditSink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything published so far, oldest first.
    #[must_use]
    pub fn records(&self) -> Vec<AuditRecord> {
        self.records.lock().clone()
    }

    /// Number of records published.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// True when nothing has been published.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

#[async_trait]
impl AuditSink for InMemoryAuditSink {
    async fn publish(&self, record: &AuditRecord) -> Result<(), AuditSinkError> {
        self.records.lock().push(record.clone());
        Ok(())
    }
}

/// Emits each record as an `info` event, serialized as JSON.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditSink;

#[async_trait]
impl AuditSink for TracingAuditSink {
    async fn publish(&self, record: &AuditRecord) -> Result<(), AuditSinkError> {
        let json = serde_json::to_string(record)
            .map_err(|e| AuditSinkError::Serialization(e.to_string()))?;
        info!(target: "selector_proxy::audit", record = %json, "Audit record");
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
