//! Executor output: the tool-call trace and line comparisons.
//!
//! `ExecutionResult` is everything the auditor needs. It is plain data;
//! the auditor never calls back into the data source.

use serde::{Deserialize, Serialize};

use crate::document::{Header, LineItem, LineKey};

/// The method and target of one tool call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestTarget {
    pub method: String,
    pub target: String,
}

/// Why a traced tool call failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallFailure {
    /// The `TriadError::kind` of the failure.
    pub kind: String,
    pub message: String,
}

/// The result half of a trace entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ToolOutcome {
    Ok { response: serde_json::Value },
    Failed { error: CallFailure },
}

/// One entry in the execution trace. Successful and failed calls alike are
/// recorded, in the order they were made.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRecord {
    pub tool: String,
    pub request: RequestTarget,
    #[serde(flatten)]
    pub outcome: ToolOutcome,
}

impl ToolCallRecord {
    pub fn is_ok(&self) -> bool {
        matches!(self.outcome, ToolOutcome::Ok { .. })
    }
}

/// Inventory state attached to a comparison.
///
/// Gathered for every PO line but not consulted by the auditor's decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum InventorySignal {
    /// No PO line on this key, so nothing was looked up.
    NotChecked,
    OnHand { quantity: f64 },
    /// The lookup failed; the trace holds the detail.
    Unavailable { kind: String },
}

/// The join of one line key across both documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub key: LineKey,
    pub po_line: Option<LineItem>,
    pub invoice_line: Option<LineItem>,
    /// Always false when either line is absent.
    pub quantity_match: bool,
    /// Always false when either line is absent.
    pub unit_price_match: bool,
    pub inventory: InventorySignal,
}

impl Comparison {
    /// True when the key exists on only one side.
    pub fn is_structural_mismatch(&self) -> bool {
        self.po_line.is_none() || self.invoice_line.is_none()
    }
}

/// The full output of executing one plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Random id of this execution, distinct across re-runs of one plan.
    pub run_id: String,
    pub plan_seed: u64,
    pub trace: Vec<ToolCallRecord>,
    /// In ascending `LineKey` order.
    pub comparisons: Vec<Comparison>,
    pub po: Header,
    pub invoice: Header,
}
