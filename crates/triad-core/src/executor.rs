//! The executor: resolves a plan into data and line comparisons.
//!
//! Execution order is fixed:
//!
//!   Schema → Validate plan → PO → Invoice → Compare lines → Inventory
//!
//! The invariant is that no fetch happens before every tool the plan names
//! has been checked against the data source's live schema. PO and invoice
//! failures abort the execution with no result; inventory failures are
//! recorded in the trace and execution continues.

use std::collections::{BTreeMap, BTreeSet};

use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};
use uuid::Uuid;

use triad_contracts::{
    document::{Header, InventoryRecord},
    error::TriadResult,
    execution::{CallFailure, ExecutionResult, InventorySignal, RequestTarget, ToolCallRecord, ToolOutcome},
    plan::Plan,
    tool::{Tool, ToolRequest},
};

use crate::{catalog::ToolCatalog, compare::compare_lines, shape::decode_response, traits::DataSource};

/// Runs plans against one data source.
///
/// The executor holds no per-execution state; one instance may serve any
/// number of sequential or concurrent executions.
pub struct Executor {
    source: Box<dyn DataSource>,
}

impl Executor {
    pub fn new(source: Box<dyn DataSource>) -> Self {
        Self { source }
    }

    /// Execute `plan` and return its trace and comparisons.
    ///
    /// # Errors
    ///
    /// - `ToolNotAllowed` if any planned tool is not advertised (no fetch is made)
    /// - `NotFound`, `Timeout`, `Upstream` or `MalformedResponse` from the PO
    ///   or invoice fetch
    /// - any error from schema discovery
    pub fn execute(&self, plan: &Plan) -> TriadResult<ExecutionResult> {
        let run_id = Uuid::new_v4().to_string();

        debug!(
            run_id = %run_id,
            seed = plan.seed,
            invoice_id = %plan.invoice_id,
            po_id = %plan.po_id,
            "execution starting"
        );

        // ── Step 0: Validate the plan against the live schema ────────────────
        let catalog = ToolCatalog::discover(self.source.as_ref())?;
        catalog.validate_plan(plan)?;

        let mut trace = Vec::new();

        // ── Steps 1 & 2: Headers (fatal on failure) ──────────────────────────
        let po: Header = self
            .call(&catalog, plan, Tool::GetPurchaseOrder.request(&plan.po_id), &mut trace)
            .inspect_err(|e| warn!(run_id = %run_id, po_id = %plan.po_id, error = %e, "purchase order fetch failed"))?;

        let invoice: Header = self
            .call(&catalog, plan, Tool::GetInvoice.request(&plan.invoice_id), &mut trace)
            .inspect_err(|e| {
                warn!(run_id = %run_id, invoice_id = %plan.invoice_id, error = %e, "invoice fetch failed")
            })?;

        // ── Step 3: Line-level comparison ────────────────────────────────────
        let mut comparisons = compare_lines(&po.lines, &invoice.lines, &plan.validation_rules);

        // ── Step 4: Inventory lookups (non-fatal) ────────────────────────────
        let signals = self.check_inventory(&catalog, plan, &po, &mut trace);
        for comparison in comparisons.iter_mut().filter(|c| c.po_line.is_some()) {
            if let Some(signal) = signals.get(&comparison.key.item_id) {
                comparison.inventory = signal.clone();
            }
        }

        info!(
            run_id = %run_id,
            seed = plan.seed,
            comparisons = comparisons.len(),
            calls = trace.len(),
            "execution complete"
        );

        Ok(ExecutionResult {
            run_id,
            plan_seed: plan.seed,
            trace,
            comparisons,
            po,
            invoice,
        })
    }

    /// One inventory call per unique PO item id, in ascending id order.
    fn check_inventory(
        &self,
        catalog: &ToolCatalog,
        plan: &Plan,
        po: &Header,
        trace: &mut Vec<ToolCallRecord>,
    ) -> BTreeMap<String, InventorySignal> {
        let items: BTreeSet<&str> = po.lines.iter().map(|l| l.item_id.as_str()).collect();

        items
            .into_iter()
            .map(|item_id| {
                let signal = match self.call::<InventoryRecord>(catalog, plan, Tool::CheckInventory.request(item_id), trace)
                {
                    Ok(record) => InventorySignal::OnHand { quantity: record.on_hand },
                    Err(e) => {
                        warn!(item_id, error = %e, "inventory lookup failed; continuing");
                        InventorySignal::Unavailable { kind: e.kind().to_string() }
                    }
                };
                (item_id.to_string(), signal)
            })
            .collect()
    }

    /// Make one traced call and decode its body.
    ///
    /// The call is recorded as `ok` only when both the fetch and the
    /// expected-field check succeed.
    fn call<T: DeserializeOwned>(
        &self,
        catalog: &ToolCatalog,
        plan: &Plan,
        request: ToolRequest,
        trace: &mut Vec<ToolCallRecord>,
    ) -> TriadResult<T> {
        catalog.ensure(request.tool)?;

        let method = catalog
            .operation(request.tool)
            .map(|op| op.method.to_ascii_uppercase())
            .unwrap_or_else(|| request.tool.descriptor().method);

        debug!(tool = %request.tool, path = %request.target, "tool call");

        let result = self
            .source
            .fetch(&request)
            .and_then(|body| decode_response::<T>(plan, request.tool, &body).map(|decoded| (body, decoded)));

        let (outcome, result) = match result {
            Ok((body, decoded)) => (ToolOutcome::Ok { response: body }, Ok(decoded)),
            Err(e) => (
                ToolOutcome::Failed {
                    error: CallFailure {
                        kind: e.kind().to_string(),
                        message: e.to_string(),
                    },
                },
                Err(e),
            ),
        };

        trace.push(ToolCallRecord {
            tool: request.tool.name().to_string(),
            request: RequestTarget {
                method,
                target: request.target,
            },
            outcome,
        });

        result
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────
