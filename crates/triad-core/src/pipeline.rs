//! End-to-end composition: Planner → Executor → Auditor.
//!
//! One `run` handles one `(invoice_id, po_id)` request synchronously. A
//! failure at any stage before the append leaves the audit log untouched.

use serde::Serialize;
use tracing::info;

use triad_contracts::{error::TriadResult, execution::ExecutionResult, plan::Plan};

use crate::{
    auditor::{Auditor, RecordedDecision},
    executor::Executor,
    planner::Planner,
};

/// Everything one pipeline run produced.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutcome {
    pub plan: Plan,
    pub execution: ExecutionResult,
    pub recorded: RecordedDecision,
}

pub struct Pipeline {
    planner: Planner,
    executor: Executor,
    auditor: Auditor,
}

impl Pipeline {
    pub fn new(planner: Planner, executor: Executor, auditor: Auditor) -> Self {
        Self { planner, executor, auditor }
    }

    /// Plan, execute and audit one invoice against one purchase order.
    pub fn run(&self, invoice_id: &str, po_id: &str) -> TriadResult<PipelineOutcome> {
        let plan = self.planner.generate_plan(invoice_id, po_id)?;
        let execution = self.executor.execute(&plan)?;
        let recorded = self.auditor.audit(&execution)?;

        info!(
            invoice_id,
            po_id,
            seed = plan.seed,
            decision = %recorded.decision.decision,
            "pipeline complete"
        );

        Ok(PipelineOutcome { plan, execution, recorded })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use serde_json::Value;

    use triad_contracts::{
        audit::{LogEntry, LogRecord},
        decision::{Decision, ReasonCode},
        error::{TriadError, TriadResult},
        rules::RuleSet,
    };

    use crate::auditor::Auditor;
    use crate::executor::tests::{header, lines, matching_erp};
    use crate::executor::Executor;
    use crate::planner::Planner;
    use crate::traits::AuditSink;

    use super::Pipeline;

    #[derive(Default)]
    struct VecSink {
        entries: Mutex<Vec<LogEntry>>,
    }

    impl AuditSink for VecSink {
        fn append(&self, payload: &Value, extra: &Value) -> TriadResult<LogEntry> {
            let entry = LogEntry {
                record: LogRecord {
                    timestamp: "2024-01-01T00:00:00.000000Z".to_string(),
                    payload: payload.clone(),
                    extra: extra.clone(),
                },
                hmac: String::new(),
            };
            self.entries.lock().unwrap().push(entry.clone());
            Ok(entry)
        }

        fn read_all(&self) -> TriadResult<Vec<LogEntry>> {
            Ok(self.entries.lock().unwrap().clone())
        }
    }

    fn pipeline(sink: Arc<VecSink>) -> Pipeline {
        let erp = matching_erp().with_body(
            "/get_invoice/INV-2",
            header(
                "invoice_id",
                "INV-2",
                "V1",
                1000.0,
                lines(&[(1, "ITEM-01", 10.0, 55.0), (2, "ITEM-02", 5.0, 100.0)]),
            ),
        );
        Pipeline::new(
            Planner::new(),
            Executor::new(Box::new(erp)),
            Auditor::new(Arc::new(RuleSet::exact("test")), sink),
        )
    }

    #[test]
    fn run_approves_and_logs_seed() {
        let sink = Arc::new(VecSink::default());
        let outcome = pipeline(sink.clone()).run("INV-1", "PO-1").unwrap();

        assert_eq!(outcome.recorded.decision.decision, Decision::Approve);
        let entries = sink.read_all().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].record.extra["execution_seed"], outcome.plan.seed);
    }

    #[test]
    fn run_escalates_price_change() {
        let sink = Arc::new(VecSink::default());
        let outcome = pipeline(sink).run("INV-2", "PO-1").unwrap();
        assert_eq!(outcome.recorded.decision.decision, Decision::Escalate);
        assert!(outcome.recorded.decision.has_reason(ReasonCode::PriceMismatch));
    }

    /// An unknown PO aborts before anything is logged.
    #[test]
    fn run_without_po_writes_nothing() {
        let sink = Arc::new(VecSink::default());
        let result = pipeline(sink.clone()).run("INV-1", "PO-404");

        assert!(matches!(result, Err(TriadError::NotFound { .. })));
        assert!(sink.read_all().unwrap().is_empty());
    }

    #[test]
    fn run_rejects_blank_ids() {
        let sink = Arc::new(VecSink::default());
        assert!(matches!(
            pipeline(sink.clone()).run("", "PO-1"),
            Err(TriadError::InvalidInput { .. })
        ));
        assert!(sink.read_all().unwrap().is_empty());
    }
}
