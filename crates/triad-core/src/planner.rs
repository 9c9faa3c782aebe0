//! The planner: a pure function from `(invoice_id, po_id)` to a `Plan`.
//!
//! The planner performs no I/O and calls no tools. Its only inputs are the
//! two identifiers and the caller's validation overrides, so identical inputs
//! always yield identical plans, seeds included.

use std::collections::BTreeMap;

use sha2::{Digest, Sha256};
use tracing::debug;

use triad_contracts::{
    error::{TriadError, TriadResult},
    plan::{Plan, PlanStep, ToolCallSpec, ValidationRules, PLAN_VERSION},
    tool::Tool,
};

/// Derive the plan seed for an id pair.
///
/// The seed is the first four bytes of `SHA-256("{invoice_id}:{po_id}")`
/// read big-endian, stable across processes and releases.
pub fn plan_seed(invoice_id: &str, po_id: &str) -> u64 {
    let digest = Sha256::digest(format!("{invoice_id}:{po_id}").as_bytes());
    u64::from(u32::from_be_bytes([digest[0], digest[1], digest[2], digest[3]]))
}

/// Builds plans with a fixed validation configuration.
#[derive(Debug, Clone, Default)]
pub struct Planner {
    validation: ValidationRules,
}

impl Planner {
    /// A planner whose plans use exact-match tolerances.
    pub fn new() -> Self {
        Self::default()
    }

    /// A planner whose plans carry caller-supplied validation rules.
    pub fn with_validation(validation: ValidationRules) -> Self {
        Self { validation }
    }

    /// Produce the plan for matching `invoice_id` against `po_id`.
    ///
    /// # Errors
    ///
    /// `TriadError::InvalidInput` when either id is empty or whitespace.
    pub fn generate_plan(&self, invoice_id: &str, po_id: &str) -> TriadResult<Plan> {
        require_id("invoice_id", invoice_id)?;
        require_id("po_id", po_id)?;

        let seed = plan_seed(invoice_id, po_id);
        debug!(invoice_id, po_id, seed, "generating plan");

        let steps = vec![
            step(1, "fetch_po", Some(Tool::GetPurchaseOrder), &[("po_id", po_id)], "Retrieve PO header and lines"),
            step(
                2,
                "fetch_invoice",
                Some(Tool::GetInvoice),
                &[("invoice_id", invoice_id)],
                "Retrieve Invoice header and lines",
            ),
            step(3, "line_level_match", None, &[], "Compare PO and invoice lines for qty/price/item"),
            step(
                4,
                "inventory_check",
                Some(Tool::CheckInventory),
                &[("item_ids", "from_po_lines")],
                "Check on-hand inventory for each item",
            ),
            step(5, "audit_decision", None, &[], "Apply audit rules to produce decision"),
        ];

        let required_tool_calls = Tool::ALL
            .into_iter()
            .map(|tool| {
                let descriptor = tool.descriptor();
                ToolCallSpec {
                    tool_name: tool.name().to_string(),
                    path: descriptor.path,
                    method: descriptor.method,
                    expected_response: tool.response_type().to_string(),
                }
            })
            .collect();

        Ok(Plan {
            invoice_id: invoice_id.to_string(),
            po_id: po_id.to_string(),
            seed,
            steps,
            required_tool_calls,
            validation_rules: self.validation.clone(),
            expected_fields: expected_fields(),
            deterministic: true,
            version: PLAN_VERSION.to_string(),
        })
    }
}

/// Plan with exact-match tolerances. Shorthand for `Planner::new().generate_plan(..)`.
pub fn generate_plan(invoice_id: &str, po_id: &str) -> TriadResult<Plan> {
    Planner::new().generate_plan(invoice_id, po_id)
}

fn require_id(name: &str, value: &str) -> TriadResult<()> {
    if value.trim().is_empty() {
        return Err(TriadError::InvalidInput {
            reason: format!("{name} must not be empty"),
        });
    }
    Ok(())
}

fn step(id: u32, name: &str, tool: Option<Tool>, args: &[(&str, &str)], description: &str) -> PlanStep {
    PlanStep {
        id,
        name: name.to_string(),
        tool: tool.map(|t| t.name().to_string()),
        args: args.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
        description: description.to_string(),
    }
}

fn expected_fields() -> BTreeMap<String, Vec<String>> {
    let fields = |names: &[&str]| names.iter().map(|n| n.to_string()).collect::<Vec<_>>();
    BTreeMap::from([
        (
            Tool::GetPurchaseOrder.response_type().to_string(),
            fields(&["po_id", "vendor_id", "currency", "total_amount", "lines"]),
        ),
        (
            Tool::GetInvoice.response_type().to_string(),
            fields(&["invoice_id", "vendor_id", "currency", "total_amount", "lines"]),
        ),
        (Tool::CheckInventory.response_type().to_string(), fields(&["item_id", "on_hand"])),
    ])
}
