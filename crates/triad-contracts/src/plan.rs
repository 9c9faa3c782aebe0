//! The deterministic comparison plan produced by the planner.
//!
//! A `Plan` is a pure value: it names the tools the executor will call, the
//! fields each response must carry, and the tolerances the executor applies
//! to its own line comparisons. The same `(invoice_id, po_id)` pair always
//! yields the same plan.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::decision::Decision;

/// The plan format version emitted by the planner.
pub const PLAN_VERSION: &str = "1.0";

/// A complete plan for matching one invoice against one purchase order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub invoice_id: String,
    pub po_id: String,
    /// Deterministic correlation value derived from the two ids.
    pub seed: u64,
    pub steps: Vec<PlanStep>,
    pub required_tool_calls: Vec<ToolCallSpec>,
    pub validation_rules: ValidationRules,
    /// Response type name → fields that response must contain.
    pub expected_fields: BTreeMap<String, Vec<String>>,
    pub deterministic: bool,
    pub version: String,
}

impl Plan {
    /// The expected field set for a response type, if the plan declares one.
    pub fn expected_fields_for(&self, response_type: &str) -> Option<&[String]> {
        self.expected_fields.get(response_type).map(Vec::as_slice)
    }
}

/// One step of the fixed plan skeleton.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanStep {
    pub id: u32,
    pub name: String,
    /// The tool this step calls. `None` for in-process steps.
    pub tool: Option<String>,
    pub args: BTreeMap<String, String>,
    pub description: String,
}

/// A tool call the plan requires, as the planner describes it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCallSpec {
    pub tool_name: String,
    pub path: String,
    pub method: String,
    pub expected_response: String,
}

/// Tolerances and constraints the executor applies to line comparisons.
///
/// These are the executor's working tolerances. The auditor re-checks every
/// line against the rule set and is the authority on the final decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationRules {
    pub currency_match: bool,
    /// Absolute quantity deviation allowed per line.
    pub line_quantity_tolerance: f64,
    /// Unit price deviation allowed, as a percentage of the PO unit price.
    pub price_tolerance_pct: f64,
    pub allowed_decision_values: Vec<Decision>,
}

impl Default for ValidationRules {
    /// Exact matching: zero tolerance on quantity and price.
    fn default() -> Self {
        Self {
            currency_match: true,
            line_quantity_tolerance: 0.0,
            price_tolerance_pct: 0.0,
            allowed_decision_values: vec![Decision::Approve, Decision::Escalate],
        }
    }
}
