//! File-backed audit log: one signed JSON entry per line.
//!
//! The file is opened in append mode and owned by one `JsonlAuditLog`.
//! Each append serializes the whole entry first, then writes it and syncs
//! it to disk while holding the writer lock. Concurrent appends never
//! interleave within a line, and `append` returns only after the data is
//! durable.

use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use serde_json::Value;
use tracing::{debug, info, warn};

use triad_contracts::{
    audit::LogEntry,
    error::{TriadError, TriadResult},
};
use triad_core::traits::AuditSink;

use crate::signer::{verify_entries, HmacSigner};

pub struct JsonlAuditLog {
    path: PathBuf,
    signer: HmacSigner,
    writer: Mutex<File>,
}

impl JsonlAuditLog {
    /// Open (or create) the log at `path`, creating parent directories.
    pub fn open(path: impl Into<PathBuf>, signer: HmacSigner) -> TriadResult<Self> {
        let path = path.into();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| TriadError::AuditWriteFailed {
                reason: format!("failed to create log directory '{}': {}", parent.display(), e),
            })?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| TriadError::AuditWriteFailed {
                reason: format!("failed to open audit log '{}': {}", path.display(), e),
            })?;

        debug!(path = %path.display(), "audit log opened");
        Ok(Self {
            path,
            signer,
            writer: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-verify every entry in file order.
    pub fn verify_all(&self) -> TriadResult<usize> {
        let entries = self.read_all()?;
        verify_entries(&self.signer, &entries).inspect_err(|e| {
            warn!(path = %self.path.display(), error = %e, "audit log verification failed");
        })?;
        Ok(entries.len())
    }

    fn lock(&self, on_poison: fn(String) -> TriadError) -> TriadResult<MutexGuard<'_, File>> {
        self.writer
            .lock()
            .map_err(|e| on_poison(format!("audit log lock poisoned: {}", e)))
    }
}

impl AuditSink for JsonlAuditLog {
    fn append(&self, payload: &Value, extra: &Value) -> TriadResult<LogEntry> {
        let entry = self.signer.seal(payload, extra)?;

        let mut line = serde_json::to_string(&entry).map_err(|e| TriadError::AuditWriteFailed {
            reason: format!("failed to encode log entry: {}", e),
        })?;
        line.push('\n');

        let mut file = self.lock(|reason| TriadError::AuditWriteFailed { reason })?;
        file.write_all(line.as_bytes())
            .and_then(|_| file.sync_data())
            .map_err(|e| TriadError::AuditWriteFailed {
                reason: format!("failed to write audit log '{}': {}", self.path.display(), e),
            })?;
        drop(file);

        info!(path = %self.path.display(), hmac = %entry.hmac, "audit entry appended");
        Ok(entry)
    }

    /// All entries in append order. A missing file reads as empty.
    fn read_all(&self) -> TriadResult<Vec<LogEntry>> {
        // Block writers so the scan never sees a half-written line.
        let _guard = self.lock(|reason| TriadError::AuditReadFailed { reason })?;
        read_log(&self.path)
    }
}

/// Parse every entry of the log at `path` without verifying signatures.
///
/// A missing file reads as empty. A line that is not a log entry is a
/// `TriadError::AuditReadFailed` naming its 1-based line number.
pub fn read_log(path: &Path) -> TriadResult<Vec<LogEntry>> {
    let contents = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => {
            return Err(TriadError::AuditReadFailed {
                reason: format!("failed to read audit log '{}': {}", path.display(), e),
            })
        }
    };

    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str::<LogEntry>(line).map_err(|e| TriadError::AuditReadFailed {
                reason: format!("line {} of '{}' is not a log entry: {}", i + 1, path.display(), e),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn poisoned(dir: &tempfile::TempDir) -> JsonlAuditLog {
        let log = JsonlAuditLog::open(dir.path().join("audit.jsonl"), HmacSigner::new("s").unwrap()).unwrap();
        std::thread::scope(|s| {
            let _ = s
                .spawn(|| {
                    let _guard = log.writer.lock().unwrap();
                    panic!("writer died holding the lock");
                })
                .join();
        });
        log
    }

    #[test]
    fn appended_entry_is_on_disk_when_append_returns() {
        let dir = tempfile::tempdir().unwrap();
        let log = JsonlAuditLog::open(dir.path().join("audit.jsonl"), HmacSigner::new("s").unwrap()).unwrap();
        let entry = log.append(&json!({"decision": "APPROVE"}), &json!({})).unwrap();

        assert_eq!(read_log(log.path()).unwrap(), vec![entry]);
    }

    #[test]
    fn poisoned_lock_reports_read_failure_on_read() {
        let dir = tempfile::tempdir().unwrap();
        let log = poisoned(&dir);
        assert_eq!(log.read_all().unwrap_err().kind(), "audit_read_failed");
    }

    #[test]
    fn poisoned_lock_reports_write_failure_on_append() {
        let dir = tempfile::tempdir().unwrap();
        let log = poisoned(&dir);
        let err = log.append(&json!({"decision": "APPROVE"}), &json!({})).unwrap_err();
        assert_eq!(err.kind(), "audit_write_failed");
    }
}
