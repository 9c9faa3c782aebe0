//! The validated tolerance rule set the auditor decides against.
//!
//! A `RuleSet` only exists in validated form: every tolerance is present,
//! finite and non-negative. Loading and validation live in `triad-rules`.

use serde::{Deserialize, Serialize};

/// A tolerance expressed in the same unit as the compared values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AbsoluteTolerance {
    pub tolerance: f64,
}

/// A tolerance expressed as a percentage of the purchase order unit price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PercentTolerance {
    pub tolerance_pct: f64,
}

/// Versioned matching policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSet {
    /// Policy version written into every decision.
    pub version: String,
    /// Header total deviation allowed.
    pub total_mismatch: AbsoluteTolerance,
    /// Per-line quantity deviation allowed.
    pub quantity_mismatch: AbsoluteTolerance,
    /// Per-line unit price deviation allowed, relative to the PO price.
    pub price_mismatch: PercentTolerance,
}

impl RuleSet {
    /// A zero-tolerance rule set with the given version.
    pub fn exact(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            total_mismatch: AbsoluteTolerance { tolerance: 0.0 },
            quantity_mismatch: AbsoluteTolerance { tolerance: 0.0 },
            price_mismatch: PercentTolerance { tolerance_pct: 0.0 },
        }
    }
}
