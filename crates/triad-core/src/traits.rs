//! Trait seams of the triad pipeline.
//!
//! - `DataSource` is the external ERP (untrusted, may be slow or drift)
//! - `RuleSource` supplies the versioned tolerance policy
//! - `AuditSink` is the append-only signed decision log
//!
//! The executor only talks to a `DataSource`; the auditor only talks to a
//! `RuleSource` and an `AuditSink`.

use triad_contracts::{
    audit::LogEntry,
    error::TriadResult,
    rules::RuleSet,
    tool::{OperationDescriptor, ToolRequest},
};

/// A read-only ERP exposing purchase orders, invoices and inventory.
pub trait DataSource: Send + Sync {
    /// List every operation the source currently advertises.
    ///
    /// The executor calls this once per execution and validates the plan
    /// against the result before making any other call.
    fn operations(&self) -> TriadResult<Vec<OperationDescriptor>>;

    /// Perform one tool call and return its JSON body.
    ///
    /// Implementations map a missing record to `TriadError::NotFound` and an
    /// exceeded bounded wait to `TriadError::Timeout`.
    fn fetch(&self, request: &ToolRequest) -> TriadResult<serde_json::Value>;
}

/// Supplier of the rule set for one audit.
///
/// The auditor calls `load()` exactly once per audit so the rule set is
/// consistent for the whole decision.
pub trait RuleSource: Send + Sync {
    fn load(&self) -> TriadResult<RuleSet>;
}

impl RuleSource for RuleSet {
    fn load(&self) -> TriadResult<RuleSet> {
        Ok(self.clone())
    }
}

/// The append-only audit log.
///
/// Appends from concurrent callers must be serialized so entries never
/// interleave. Entries are never modified or removed.
pub trait AuditSink: Send + Sync {
    /// Sign and durably append one record. Returns the stored entry.
    ///
    /// Must not return `Ok` until the entry is persisted.
    fn append(&self, payload: &serde_json::Value, extra: &serde_json::Value) -> TriadResult<LogEntry>;

    /// Every entry, in append order.
    fn read_all(&self) -> TriadResult<Vec<LogEntry>>;
}
