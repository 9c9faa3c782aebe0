//! Read-only projections of the audit log for reviewers.

use std::io::Write;

use triad_contracts::{
    audit::LogEntry,
    error::{TriadError, TriadResult},
};

/// Column order of the CSV projection.
pub const CSV_HEADER: [&str; 6] = ["timestamp", "decision", "reasons", "po_id", "invoice_id", "hmac"];

/// Write `entries` as a pretty-printed JSON array.
pub fn export_json<W: Write>(entries: &[LogEntry], mut out: W) -> TriadResult<()> {
    serde_json::to_writer_pretty(&mut out, entries).map_err(export_failed)?;
    writeln!(out).map_err(export_failed)
}

/// Write one CSV row per entry. Reasons are joined with `|`.
pub fn export_csv<W: Write>(entries: &[LogEntry], out: W) -> TriadResult<()> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(CSV_HEADER).map_err(export_failed)?;

    for entry in entries {
        let reasons = entry
            .record
            .payload
            .get("reasons")
            .and_then(|r| r.as_array())
            .map(|items| items.iter().filter_map(|r| r.as_str()).collect::<Vec<_>>().join("|"))
            .unwrap_or_default();

        writer
            .write_record([
                entry.record.timestamp.as_str(),
                entry.payload_str("decision").unwrap_or_default(),
                reasons.as_str(),
                entry.payload_str("po_id").unwrap_or_default(),
                entry.payload_str("invoice_id").unwrap_or_default(),
                entry.hmac.as_str(),
            ])
            .map_err(export_failed)?;
    }

    writer.flush().map_err(export_failed)
}

fn export_failed(e: impl std::fmt::Display) -> TriadError {
    TriadError::AuditWriteFailed {
        reason: format!("failed to write audit export: {}", e),
    }
}
