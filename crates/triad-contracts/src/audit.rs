//! Audit log record and entry types.
//!
//! A `LogEntry` is one line of the append-only log: the `record` and the
//! HMAC over the record's canonical bytes. Entries are never modified after
//! they are written.

use serde::{Deserialize, Serialize};

/// The signed content of one log entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogRecord {
    /// RFC 3339 UTC timestamp with a `Z` suffix.
    ///
    /// Kept as the exact string that was signed so re-verification does not
    /// depend on timestamp re-formatting.
    pub timestamp: String,
    /// The decision (or other action) being recorded.
    pub payload: serde_json::Value,
    /// Correlation context, e.g. the plan seed.
    pub extra: serde_json::Value,
}

/// One persisted line of the audit log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub record: LogRecord,
    /// Lowercase hex HMAC-SHA256 of the canonical record bytes.
    pub hmac: String,
}

impl LogEntry {
    /// The payload's string field `name`, if present.
    pub fn payload_str(&self, name: &str) -> Option<&str> {
        self.record.payload.get(name).and_then(|v| v.as_str())
    }
}
