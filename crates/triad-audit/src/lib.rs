//! # triad-audit
//!
//! Append-only, HMAC-signed audit log for triad decisions.
//!
//! ## Overview
//!
//! Every decision is wrapped in a `LogRecord` (timestamp, payload, extra)
//! and signed with HMAC-SHA256 over the record's canonical JSON. Each entry
//! carries its own signature, so any entry can be verified on its own and
//! regardless of where it sits in the file. Editing even one byte of a
//! record is detected by `verify_all`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use triad_audit::{HmacSigner, JsonlAuditLog};
//! use triad_core::traits::AuditSink;
//!
//! let log = JsonlAuditLog::open("audit/decisions.jsonl", HmacSigner::new(secret)?)?;
//! log.append(&payload, &extra)?;
//! log.verify_all()?;
//! ```

pub mod canonical;
pub mod export;
pub mod jsonl;
pub mod memory;
pub mod signer;

pub use canonical::{canonical_json, canonical_record};
pub use export::{export_csv, export_json, CSV_HEADER};
pub use jsonl::{read_log, JsonlAuditLog};
pub use memory::InMemoryAuditLog;
pub use signer::{verify_entries, HmacSigner};

// ── Tests ─────────────────────────────────────────────────────────────────────
