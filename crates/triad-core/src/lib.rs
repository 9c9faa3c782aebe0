//! # triad-core
//!
//! The deterministic matching-and-audit pipeline for 3-way purchase order
//! matching.
//!
//! This crate provides:
//! - The three seam traits (`DataSource`, `RuleSource`, `AuditSink`)
//! - The `Planner`, `Executor` and `Auditor`, and the `Pipeline` that wires
//!   them together in order
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use triad_core::{Auditor, Executor, Pipeline, Planner};
//!
//! let pipeline = Pipeline::new(
//!     Planner::new(),
//!     Executor::new(Box::new(erp)),
//!     Auditor::new(Arc::new(rules), Arc::new(log)),
//! );
//! let outcome = pipeline.run("INV-5001", "PO-1001")?;
//! ```

pub mod auditor;
pub mod catalog;
pub mod compare;
pub mod executor;
pub mod pipeline;
pub mod planner;
pub mod shape;
pub mod tolerance;
pub mod traits;

pub use auditor::{decide, record, Auditor, RecordedDecision};
pub use executor::Executor;
pub use pipeline::{Pipeline, PipelineOutcome};
pub use planner::{generate_plan, Planner};
