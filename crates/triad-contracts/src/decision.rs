//! Audit decisions and reason codes.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The outcome of auditing one invoice against its purchase order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Decision {
    /// No reason codes: the invoice may be paid.
    Approve,
    /// At least one reason code: a human must review.
    Escalate,
}

impl Decision {
    pub fn as_str(self) -> &'static str {
        match self {
            Decision::Approve => "APPROVE",
            Decision::Escalate => "ESCALATE",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A machine-readable mismatch category.
///
/// Ordering is lexicographic on the wire token, so a sorted collection of
/// reason codes serializes as a sorted list of strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonCode {
    /// A line key exists on only one side.
    MissingPoLines,
    PriceMismatch,
    QuantityMismatch,
    TotalMismatch,
    VendorMismatch,
}

impl ReasonCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ReasonCode::MissingPoLines => "missing_po_lines",
            ReasonCode::PriceMismatch => "price_mismatch",
            ReasonCode::QuantityMismatch => "quantity_mismatch",
            ReasonCode::TotalMismatch => "total_mismatch",
            ReasonCode::VendorMismatch => "vendor_mismatch",
        }
    }
}

impl Ord for ReasonCode {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl PartialOrd for ReasonCode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The auditor's verdict for one (invoice, PO) pair.
///
/// `reasons` is always sorted and duplicate-free, and `decision` is
/// `Approve` exactly when `reasons` is empty. Build through
/// [`AuditDecision::from_reasons`] to keep both invariants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditDecision {
    pub decision: Decision,
    pub reasons: Vec<ReasonCode>,
    pub po_id: String,
    pub invoice_id: String,
    pub policy_version: String,
}

impl AuditDecision {
    /// Collapse `reasons` into a sorted set and derive the decision from it.
    pub fn from_reasons(
        reasons: impl IntoIterator<Item = ReasonCode>,
        po_id: impl Into<String>,
        invoice_id: impl Into<String>,
        policy_version: impl Into<String>,
    ) -> Self {
        let reasons: Vec<ReasonCode> = reasons.into_iter().collect::<BTreeSet<_>>().into_iter().collect();
        let decision = if reasons.is_empty() { Decision::Approve } else { Decision::Escalate };
        Self {
            decision,
            reasons,
            po_id: po_id.into(),
            invoice_id: invoice_id.into(),
            policy_version: policy_version.into(),
        }
    }

    pub fn is_approved(&self) -> bool {
        self.decision == Decision::Approve
    }

    pub fn has_reason(&self, reason: ReasonCode) -> bool {
        self.reasons.contains(&reason)
    }
}
