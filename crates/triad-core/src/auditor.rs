//! The auditor: applies the rule set to an execution result.
//!
//! Split into two steps the caller composes:
//!
//! - [`decide`] is pure: execution result + rule set → decision
//! - [`record`] appends a decision to the audit log
//!
//! [`Auditor::audit`] composes both and only returns a decision once it is
//! durably logged. A decision whose append fails is an error, never a result.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info, warn};

use triad_contracts::{
    audit::LogEntry,
    decision::{AuditDecision, ReasonCode},
    error::{TriadError, TriadResult},
    execution::ExecutionResult,
    rules::RuleSet,
};

use crate::{
    tolerance::{within_absolute, within_pct_of_po},
    traits::{AuditSink, RuleSource},
};

/// Decide APPROVE or ESCALATE for `result` under `rules`.
///
/// Line checks are recomputed from the rule set's tolerances; the
/// executor's own match flags are not consulted. Inventory signals do not
/// influence the decision.
pub fn decide(result: &ExecutionResult, rules: &RuleSet) -> AuditDecision {
    let po = &result.po;
    let invoice = &result.invoice;
    let mut reasons = Vec::new();

    if po.vendor_id != invoice.vendor_id {
        reasons.push(ReasonCode::VendorMismatch);
    }

    if !within_absolute(po.total_amount, invoice.total_amount, rules.total_mismatch.tolerance) {
        reasons.push(ReasonCode::TotalMismatch);
    }

    for comparison in &result.comparisons {
        let (Some(po_line), Some(invoice_line)) = (&comparison.po_line, &comparison.invoice_line) else {
            reasons.push(ReasonCode::MissingPoLines);
            continue;
        };

        if !within_absolute(po_line.quantity, invoice_line.quantity, rules.quantity_mismatch.tolerance) {
            reasons.push(ReasonCode::QuantityMismatch);
        }
        if !within_pct_of_po(po_line.unit_price, invoice_line.unit_price, rules.price_mismatch.tolerance_pct) {
            reasons.push(ReasonCode::PriceMismatch);
        }
    }

    AuditDecision::from_reasons(reasons, &po.id, &invoice.id, &rules.version)
}

/// The correlation context logged alongside a decision.
pub fn correlation(result: &ExecutionResult) -> serde_json::Value {
    json!({
        "execution_seed": result.plan_seed,
        "run_id": result.run_id,
    })
}

/// Append `decision` to `sink` with `extra` as context.
pub fn record(decision: &AuditDecision, extra: &serde_json::Value, sink: &dyn AuditSink) -> TriadResult<LogEntry> {
    let payload = serde_json::to_value(decision).map_err(|e| TriadError::AuditWriteFailed {
        reason: format!("cannot serialize decision: {e}"),
    })?;
    sink.append(&payload, extra)
}

/// A decision together with the log entry that made it final.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedDecision {
    pub decision: AuditDecision,
    pub entry: LogEntry,
}

/// Decides and records in one call.
///
/// Holds the rule source and the shared audit log. Safe to share across
/// threads; concurrent audits serialize only inside the log's append.
pub struct Auditor {
    rules: Arc<dyn RuleSource>,
    sink: Arc<dyn AuditSink>,
}

impl Auditor {
    pub fn new(rules: Arc<dyn RuleSource>, sink: Arc<dyn AuditSink>) -> Self {
        Self { rules, sink }
    }

    /// Load the rule set once, decide, and record.
    ///
    /// # Errors
    ///
    /// `Configuration` if the rule set cannot be loaded (nothing is logged);
    /// any error from the append, in which case the decision is discarded.
    pub fn audit(&self, result: &ExecutionResult) -> TriadResult<RecordedDecision> {
        let rules = self.rules.load()?;

        debug!(
            run_id = %result.run_id,
            policy_version = %rules.version,
            comparisons = result.comparisons.len(),
            "auditing execution result"
        );

        let decision = decide(result, &rules);

        let entry = record(&decision, &correlation(result), self.sink.as_ref()).inspect_err(|e| {
            warn!(
                run_id = %result.run_id,
                po_id = %decision.po_id,
                invoice_id = %decision.invoice_id,
                error = %e,
                "decision could not be logged; discarding"
            )
        })?;

        info!(
            decision = %decision.decision,
            reasons = ?decision.reasons,
            po_id = %decision.po_id,
            invoice_id = %decision.invoice_id,
            seed = result.plan_seed,
            "audit decision recorded"
        );

        Ok(RecordedDecision { decision, entry })
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use proptest::prelude::*;
    use serde_json::Value;

    use triad_contracts::{
        audit::{LogEntry, LogRecord},
        decision::{Decision, ReasonCode},
        document::{Header, LineItem},
        error::{TriadError, TriadResult},
        execution::ExecutionResult,
        plan::ValidationRules,
        rules::{AbsoluteTolerance, PercentTolerance, RuleSet},
    };

    use crate::compare::compare_lines;
    use crate::traits::AuditSink;

    use super::{decide, Auditor};

    // ── Mock helpers ─────────────────────────────────────────────────────────

    /// An audit sink that keeps entries in a vector, signing nothing.
    struct RecordingSink {
        entries: Arc<Mutex<Vec<LogEntry>>>,
    }

    impl AuditSink for RecordingSink {
        fn append(&self, payload: &Value, extra: &Value) -> TriadResult<LogEntry> {
            let entry = LogEntry {
                record: LogRecord {
                    timestamp: "2024-01-01T00:00:00.000000Z".to_string(),
                    payload: payload.clone(),
                    extra: extra.clone(),
                },
                hmac: "unsigned".to_string(),
            };
            self.entries.lock().unwrap().push(entry.clone());
            Ok(entry)
        }

        fn read_all(&self) -> TriadResult<Vec<LogEntry>> {
            Ok(self.entries.lock().unwrap().clone())
        }
    }

    /// An audit sink whose storage is unavailable.
    struct FailingSink;

    impl AuditSink for FailingSink {
        fn append(&self, _payload: &Value, _extra: &Value) -> TriadResult<LogEntry> {
            Err(TriadError::AuditWriteFailed { reason: "disk full".to_string() })
        }

        fn read_all(&self) -> TriadResult<Vec<LogEntry>> {
            Ok(vec![])
        }
    }

    fn line(line_id: u32, item: &str, qty: f64, price: f64) -> LineItem {
        LineItem {
            line_id,
            item_id: item.to_string(),
            description: None,
            quantity: qty,
            unit_price: price,
            currency: "USD".to_string(),
        }
    }

    fn doc(id: &str, vendor: &str, total: f64, lines: Vec<LineItem>) -> Header {
        Header {
            id: id.to_string(),
            vendor_id: vendor.to_string(),
            vendor_name: None,
            currency: "USD".to_string(),
            total_amount: total,
            lines,
        }
    }

    /// Build a result the way the executor would, with exact-match flags.
    fn result(po: Header, invoice: Header) -> ExecutionResult {
        let comparisons = compare_lines(&po.lines, &invoice.lines, &ValidationRules::default());
        ExecutionResult {
            run_id: "run-1".to_string(),
            plan_seed: 42,
            trace: vec![],
            comparisons,
            po,
            invoice,
        }
    }

    fn rules() -> RuleSet {
        RuleSet::exact("2024.06")
    }

    fn scenario_a_lines() -> Vec<LineItem> {
        vec![line(1, "ITEM-01", 10.0, 50.0), line(2, "ITEM-02", 5.0, 100.0)]
    }

    // ── Scenarios ────────────────────────────────────────────────────────────

    #[test]
    fn identical_documents_approve() {
        let r = result(
            doc("PO-1001", "V1", 1000.0, scenario_a_lines()),
            doc("INV-5001", "V1", 1000.0, scenario_a_lines()),
        );
        let d = decide(&r, &rules());
        assert_eq!(d.decision, Decision::Approve);
        assert!(d.reasons.is_empty());
        assert_eq!(d.po_id, "PO-1001");
        assert_eq!(d.invoice_id, "INV-5001");
        assert_eq!(d.policy_version, "2024.06");
    }

    #[test]
    fn raised_unit_price_escalates() {
        let po_lines = vec![line(1, "ITEM-03", 10.0, 50.0)];
        let inv_lines = vec![line(1, "ITEM-03", 10.0, 55.0)];
        let r = result(doc("PO-1002", "V1", 500.0, po_lines), doc("INV-5002", "V1", 500.0, inv_lines));
        let d = decide(&r, &rules());
        assert_eq!(d.decision, Decision::Escalate);
        assert_eq!(d.reasons, vec![ReasonCode::PriceMismatch]);
    }

    #[test]
    fn missing_invoice_line_escalates() {
        let inv_lines = vec![line(1, "ITEM-01", 10.0, 50.0)];
        let r = result(
            doc("PO-1003", "V1", 1000.0, scenario_a_lines()),
            doc("INV-5003", "V1", 1000.0, inv_lines),
        );
        let d = decide(&r, &rules());
        assert_eq!(d.decision, Decision::Escalate);
        assert!(d.has_reason(ReasonCode::MissingPoLines));
    }

    #[test]
    fn missing_lines_collapse_to_one_reason() {
        let r = result(
            doc("PO-1", "V1", 0.0, vec![line(1, "A", 1.0, 1.0), line(2, "B", 1.0, 1.0)]),
            doc("INV-1", "V1", 0.0, vec![line(3, "C", 1.0, 1.0)]),
        );
        let d = decide(&r, &rules());
        assert_eq!(d.reasons, vec![ReasonCode::MissingPoLines]);
    }

    #[test]
    fn vendor_and_total_mismatch() {
        let r = result(
            doc("PO-1", "V1", 1000.0, scenario_a_lines()),
            doc("INV-1", "V2", 1000.5, scenario_a_lines()),
        );
        let d = decide(&r, &rules());
        assert_eq!(d.reasons, vec![ReasonCode::TotalMismatch, ReasonCode::VendorMismatch]);

        let lenient = RuleSet {
            total_mismatch: AbsoluteTolerance { tolerance: 1.0 },
            ..rules()
        };
        assert_eq!(decide(&r, &lenient).reasons, vec![ReasonCode::VendorMismatch]);
    }

    /// The rule set, not the executor's flags, decides line outcomes.
    #[test]
    fn rule_set_tolerances_override_executor_flags() {
        let po_lines = vec![line(1, "ITEM-01", 10.0, 100.0)];
        let inv_lines = vec![line(1, "ITEM-01", 11.0, 104.0)];
        let mut r = result(doc("PO-1", "V1", 0.0, po_lines), doc("INV-1", "V1", 0.0, inv_lines));

        // Executor flags say everything matched.
        r.comparisons[0].quantity_match = true;
        r.comparisons[0].unit_price_match = true;
        let strict = decide(&r, &rules());
        assert_eq!(strict.reasons, vec![ReasonCode::PriceMismatch, ReasonCode::QuantityMismatch]);

        // Executor flags say nothing matched, but the rule set is lenient.
        r.comparisons[0].quantity_match = false;
        r.comparisons[0].unit_price_match = false;
        let lenient = RuleSet {
            quantity_mismatch: AbsoluteTolerance { tolerance: 1.0 },
            price_mismatch: PercentTolerance { tolerance_pct: 5.0 },
            ..rules()
        };
        assert!(decide(&r, &lenient).is_approved());
    }

    #[test]
    fn price_tolerance_is_relative_to_po_price() {
        // 10% of the PO price 100 is 10: an invoice price of 110 passes.
        let r = result(
            doc("PO-1", "V1", 0.0, vec![line(1, "A", 1.0, 100.0)]),
            doc("INV-1", "V1", 0.0, vec![line(1, "A", 1.0, 110.0)]),
        );
        let ten_pct = RuleSet {
            price_mismatch: PercentTolerance { tolerance_pct: 10.0 },
            ..rules()
        };
        assert!(decide(&r, &ten_pct).is_approved());

        // Relative to the invoice price (110) a 9.5% band would also admit
        // 100 → 110, but against the PO price it does not.
        let nine_and_a_half = RuleSet {
            price_mismatch: PercentTolerance { tolerance_pct: 9.5 },
            ..rules()
        };
        assert!(!decide(&r, &nine_and_a_half).is_approved());
    }

    // ── Auditor wrapper ──────────────────────────────────────────────────────

    #[test]
    fn audit_records_decision_with_seed() {
        let entries = Arc::new(Mutex::new(vec![]));
        let auditor = Auditor::new(
            Arc::new(rules()),
            Arc::new(RecordingSink { entries: entries.clone() }),
        );
        let r = result(
            doc("PO-1001", "V1", 1000.0, scenario_a_lines()),
            doc("INV-5001", "V1", 1000.0, scenario_a_lines()),
        );

        let recorded = auditor.audit(&r).unwrap();
        assert!(recorded.decision.is_approved());

        let stored = entries.lock().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].record.extra["execution_seed"], 42);
        assert_eq!(stored[0].record.extra["run_id"], "run-1");
        assert_eq!(stored[0].record.payload["decision"], "APPROVE");
        assert_eq!(stored[0].record.payload["reasons"], serde_json::json!([]));
        assert_eq!(recorded.entry, stored[0]);
    }

    /// A decision that cannot be logged is not returned.
    #[test]
    fn audit_surfaces_append_failure() {
        let auditor = Auditor::new(Arc::new(rules()), Arc::new(FailingSink));
        let r = result(
            doc("PO-1", "V1", 1000.0, scenario_a_lines()),
            doc("INV-1", "V1", 1000.0, scenario_a_lines()),
        );

        match auditor.audit(&r) {
            Err(TriadError::AuditWriteFailed { reason }) => assert!(reason.contains("disk full")),
            other => panic!("expected AuditWriteFailed, got {:?}", other),
        }
    }

    // ── Properties ───────────────────────────────────────────────────────────

    fn arb_lines() -> impl Strategy<Value = Vec<LineItem>> {
        prop::collection::vec((1u32..5, 0usize..3, 0u8..4, 1u8..4), 0..6).prop_map(|rows| {
            rows.into_iter()
                .map(|(line_id, item, qty, price)| {
                    line(line_id, ["A", "B", "C"][item], f64::from(qty), f64::from(price) * 10.0)
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn reasons_are_sorted_and_distinct(
            po_lines in arb_lines(),
            inv_lines in arb_lines(),
            same_vendor in any::<bool>(),
            total_delta in 0u8..3,
        ) {
            let r = result(
                doc("PO-P", "V1", 100.0, po_lines),
                doc("INV-P", if same_vendor { "V1" } else { "V2" }, 100.0 + f64::from(total_delta), inv_lines),
            );
            let d = decide(&r, &rules());

            let mut canonical = d.reasons.clone();
            canonical.sort();
            canonical.dedup();
            prop_assert_eq!(&d.reasons, &canonical);

            prop_assert_eq!(d.decision == Decision::Approve, d.reasons.is_empty());

            let one_sided = r.comparisons.iter().any(|c| c.is_structural_mismatch());
            prop_assert_eq!(one_sided, d.has_reason(ReasonCode::MissingPoLines));
        }
    }
}
