//! # triad-erp
//!
//! ERP data sources and reference scenarios for the triad pipeline.
//!
//! Two implementations of [`DataSource`](triad_core::traits::DataSource):
//!
//! 1. [`InMemoryErp`] serves the seeded, fictional documents in
//!    [`fixtures`] and never touches the network.
//! 2. [`HttpErp`] talks to a remote ERP service over blocking HTTP with a
//!    per-request timeout, discovering operations from `/openapi.json`.
//!
//! [`scenarios`] runs the four reference cases end to end against the
//! in-memory ERP.

pub mod fixtures;
pub mod http;
pub mod memory;
pub mod scenarios;

pub use http::{HttpErp, DEFAULT_TIMEOUT};
pub use memory::InMemoryErp;
pub use scenarios::{run_all, Expectation, Scenario, ScenarioHarness, ScenarioOutcome, REFERENCE_RULES, SCENARIOS};
