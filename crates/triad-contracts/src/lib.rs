//! # triad-contracts
//!
//! Shared types, the rule-set shape, and the error taxonomy for the triad
//! 3-way match pipeline.
//!
//! All crates in the workspace import from here. No business logic lives in
//! this crate, only data definitions and error types.

pub mod audit;
pub mod decision;
pub mod document;
pub mod error;
pub mod execution;
pub mod plan;
pub mod rules;
pub mod tool;
