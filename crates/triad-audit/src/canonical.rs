//! Canonical JSON encoding of log records.
//!
//! Output layout:
//!   - compact, no whitespace between tokens
//!   - object keys in byte-wise lexicographic order at every depth
//!   - strings and numbers exactly as `serde_json` prints them
//!
//! The walk sorts keys itself, so the bytes do not depend on which map
//! type `serde_json` was built with.

use std::fmt::Write;

use serde_json::Value;

use triad_contracts::{
    audit::LogRecord,
    error::{TriadError, TriadResult},
};

/// Canonical bytes of an arbitrary JSON value.
pub fn canonical_json(value: &Value) -> String {
    let mut out = String::new();
    write_value(&mut out, value);
    out
}

/// Canonical bytes of a log record: the exact input to the HMAC.
pub fn canonical_record(record: &LogRecord) -> TriadResult<Vec<u8>> {
    let value = serde_json::to_value(record).map_err(|e| TriadError::AuditWriteFailed {
        reason: format!("failed to encode log record: {}", e),
    })?;
    Ok(canonical_json(&value).into_bytes())
}

fn write_value(out: &mut String, value: &Value) {
    match value {
        Value::Null | Value::Bool(_) | Value::Number(_) => {
            let _ = write!(out, "{}", value);
        }
        Value::String(s) => write_str(out, s),
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_value(out, item);
            }
            out.push(']');
        }
        Value::Object(map) => {
            let mut fields: Vec<(&String, &Value)> = map.iter().collect();
            fields.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));

            out.push('{');
            for (i, (key, item)) in fields.into_iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_str(out, key);
                out.push(':');
                write_value(out, item);
            }
            out.push('}');
        }
    }
}

fn write_str(out: &mut String, s: &str) {
    let _ = write!(out, "{}", Value::from(s));
}
