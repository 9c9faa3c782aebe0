//! In-memory implementation of `AuditSink`.
//!
//! `InMemoryAuditLog` signs entries exactly like the file-backed log but
//! keeps them in a `Vec` behind a `Mutex`. Used by tests and by offline
//! scenario runs where nothing should touch disk.

use std::sync::{Mutex, PoisonError};

use serde_json::Value;
use tracing::info;

use triad_contracts::{
    audit::LogEntry,
    error::{TriadError, TriadResult},
};
use triad_core::traits::AuditSink;

use crate::signer::{verify_entries, HmacSigner};

#[derive(Debug)]
pub struct InMemoryAuditLog {
    signer: HmacSigner,
    entries: Mutex<Vec<LogEntry>>,
}

impl InMemoryAuditLog {
    pub fn new(signer: HmacSigner) -> Self {
        Self {
            signer,
            entries: Mutex::new(Vec::new()),
        }
    }

    /// Number of entries held. A poisoned lock still reports the entries
    /// appended before the panic.
    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn verify_all(&self) -> TriadResult<usize> {
        let entries = self.read_all()?;
        verify_entries(&self.signer, &entries)?;
        Ok(entries.len())
    }
}

impl AuditSink for InMemoryAuditLog {
    fn append(&self, payload: &Value, extra: &Value) -> TriadResult<LogEntry> {
        let entry = self.signer.seal(payload, extra)?;

        let mut entries = self.entries.lock().map_err(|e| TriadError::AuditWriteFailed {
            reason: format!("audit state lock poisoned: {}", e),
        })?;
        entries.push(entry.clone());

        info!(count = entries.len(), hmac = %entry.hmac, "audit entry appended");
        Ok(entry)
    }

    fn read_all(&self) -> TriadResult<Vec<LogEntry>> {
        let entries = self.entries.lock().map_err(|e| TriadError::AuditReadFailed {
            reason: format!("audit state lock poisoned: {}", e),
        })?;
        Ok(entries.clone())
    }
}
