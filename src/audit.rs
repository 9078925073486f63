//! # Audit Log
//!
//! One entry is recorded for every outbound attempt that got an answer from the
//! remote party, acknowledged or not. Attempts that never produced a response are
//! not audited.

use crate::state_machine::OutboundStatus;
use crate::workflow::WorkflowType;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditLogEntry {
    pub workflow: WorkflowType,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// ACKD or NACKD
    pub acknowledgement: OutboundStatus,
}

impl AuditLogEntry {
    pub fn duration_ms(&self) -> i64 {
        (self.end_time - self.start_time).num_milliseconds()
    }
}

/// Destination for audit entries
pub trait AuditSink: Send + Sync {
    fn record(&self, entry: &AuditLogEntry);
}

/// Writes audit entries as structured events on the `mhs_workflow::audit` target
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, entry: &AuditLogEntry) {
        info!(
            target: "mhs_workflow::audit",
            workflow = %entry.workflow,
            start_time = %entry.start_time.to_rfc3339(),
            end_time = %entry.end_time.to_rfc3339(),
            duration_ms = entry.duration_ms(),
            acknowledgement = %entry.acknowledgement,
            "Outbound message transmitted"
        );
    }
}

/// Keeps entries in memory, for inspection in tests and diagnostics
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    entries: Mutex<Vec<AuditLogEntry>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<AuditLogEntry> {
        self.entries.lock().clone()
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&self, entry: &AuditLogEntry) {
        self.entries.lock().push(entry.clone());
    }
}
