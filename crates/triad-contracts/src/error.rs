//! Error taxonomy for the triad matching pipeline.
//!
//! All fallible operations return `TriadResult<T>`. Every variant carries
//! enough context to be surfaced to a caller as a structured `(kind, message)`
//! pair via [`TriadError::kind`] and `Display`.

use thiserror::Error;

/// The unified error type for the triad pipeline.
#[derive(Debug, Error)]
pub enum TriadError {
    /// A rule set, secret or client setting is missing or invalid.
    #[error("configuration error: {reason}")]
    Configuration { reason: String },

    /// A caller-supplied identifier is empty or otherwise malformed.
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    /// The data source has no record for the requested identifier.
    ///
    /// Fatal for purchase order and invoice fetches; recorded in the trace
    /// for inventory lookups.
    #[error("{resource} '{id}' not found")]
    NotFound { resource: String, id: String },

    /// The plan references a tool the data source does not advertise.
    #[error("tool '{tool}' is not allowed: {reason}")]
    ToolNotAllowed { tool: String, reason: String },

    /// A fetch did not complete within its bounded wait.
    #[error("tool '{tool}' timed out requesting '{target}'")]
    Timeout { tool: String, target: String },

    /// The data source failed for a reason other than not-found or timeout.
    #[error("tool '{tool}' upstream failure: {reason}")]
    Upstream { tool: String, reason: String },

    /// A response body did not have the expected shape.
    #[error("tool '{tool}' returned a malformed response: {reason}")]
    MalformedResponse { tool: String, reason: String },

    /// An audit log entry failed signature verification.
    ///
    /// Signals tampering. Never ignored by readers that verify.
    #[error("signature verification failed for audit entry {index}")]
    Signature { index: usize },

    /// The audit log could not persist a decision.
    ///
    /// A decision that is not durably logged is not final.
    #[error("audit write failed: {reason}")]
    AuditWriteFailed { reason: String },

    /// The audit log could not be read back.
    #[error("audit read failed: {reason}")]
    AuditReadFailed { reason: String },
}

impl TriadError {
    /// Stable machine-readable tag for this error's category.
    pub fn kind(&self) -> &'static str {
        match self {
            TriadError::Configuration { .. } => "configuration",
            TriadError::InvalidInput { .. } => "invalid_input",
            TriadError::NotFound { .. } => "not_found",
            TriadError::ToolNotAllowed { .. } => "tool_not_allowed",
            TriadError::Timeout { .. } => "timeout",
            TriadError::Upstream { .. } => "upstream",
            TriadError::MalformedResponse { .. } => "malformed_response",
            TriadError::Signature { .. } => "signature",
            TriadError::AuditWriteFailed { .. } => "audit_write_failed",
            TriadError::AuditReadFailed { .. } => "audit_read_failed",
        }
    }
}

/// Convenience alias used throughout the triad crates.
pub type TriadResult<T> = Result<T, TriadError>;
