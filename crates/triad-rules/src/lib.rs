//! # triad-rules
//!
//! Versioned tolerance rule sets for the triad auditor.
//!
//! ## Overview
//!
//! A rule set is a small TOML (or JSON) document giving the policy
//! `version` and three tolerances. [`RuleSetLoader`] parses and validates a
//! document; [`FileRuleSource`] implements
//! [`RuleSource`](triad_core::traits::RuleSource) by reloading its file for
//! every audit.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use triad_rules::FileRuleSource;
//!
//! let rules = Arc::new(FileRuleSource::new("rules/default.toml"));
//! // Pass `rules` to `triad_core::Auditor::new(...)`.
//! ```
//!
//! Validation never fills in a default. A missing table or tolerance is a
//! configuration error naming the dotted key.

pub mod loader;
pub mod schema;

pub use loader::{FileRuleSource, RuleSetLoader};
pub use schema::{RuleSetDocument, RulesTable, ToleranceEntry};

// ── Tests ─────────────────────────────────────────────────────────────────────
