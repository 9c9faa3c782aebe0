//! Rule set document schema and validation.
//!
//! A `RuleSetDocument` is deserialized from TOML or JSON with every field
//! optional, then validated into a `RuleSet`. Validation names the dotted
//! key at fault so an operator can find it in the file.
//!
//! Example:
//! ```toml
//! version = "2024.06"
//!
//! [rules.total_mismatch]
//! description = "Header totals must agree to the cent"
//! tolerance = 0.01
//!
//! [rules.quantity_mismatch]
//! tolerance = 0.0
//!
//! [rules.price_mismatch]
//! tolerance_pct = 2.5
//! ```

use serde::{Deserialize, Serialize};

use triad_contracts::{
    error::{TriadError, TriadResult},
    rules::{AbsoluteTolerance, PercentTolerance, RuleSet},
};

/// One `[rules.<name>]` table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToleranceEntry {
    /// Free text for humans; ignored by the auditor.
    #[serde(default)]
    pub description: Option<String>,

    /// Absolute tolerance. Used by `total_mismatch` and `quantity_mismatch`.
    #[serde(default)]
    pub tolerance: Option<f64>,

    /// Percentage of the PO unit price. Used by `price_mismatch`.
    #[serde(default)]
    pub tolerance_pct: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RulesTable {
    #[serde(default)]
    pub total_mismatch: Option<ToleranceEntry>,
    #[serde(default)]
    pub quantity_mismatch: Option<ToleranceEntry>,
    #[serde(default)]
    pub price_mismatch: Option<ToleranceEntry>,
}

/// The top-level structure of a rule set file, before validation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuleSetDocument {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub rules: Option<RulesTable>,
}

impl RuleSetDocument {
    /// Validate into a `RuleSet`. Nothing is defaulted.
    pub fn validate(self) -> TriadResult<RuleSet> {
        let version = self.version.ok_or_else(|| missing("version"))?;
        if version.trim().is_empty() {
            return Err(config("'version' must not be empty"));
        }

        let rules = self.rules.ok_or_else(|| missing("rules"))?;

        let total = table(rules.total_mismatch, "total_mismatch")?;
        let quantity = table(rules.quantity_mismatch, "quantity_mismatch")?;
        let price = table(rules.price_mismatch, "price_mismatch")?;

        Ok(RuleSet {
            version,
            total_mismatch: AbsoluteTolerance {
                tolerance: value(total.tolerance, "rules.total_mismatch.tolerance")?,
            },
            quantity_mismatch: AbsoluteTolerance {
                tolerance: value(quantity.tolerance, "rules.quantity_mismatch.tolerance")?,
            },
            price_mismatch: PercentTolerance {
                tolerance_pct: value(price.tolerance_pct, "rules.price_mismatch.tolerance_pct")?,
            },
        })
    }
}

fn table(entry: Option<ToleranceEntry>, name: &str) -> TriadResult<ToleranceEntry> {
    entry.ok_or_else(|| missing(&format!("rules.{name}")))
}

fn value(v: Option<f64>, key: &str) -> TriadResult<f64> {
    let v = v.ok_or_else(|| missing(key))?;
    if !v.is_finite() {
        return Err(config(&format!("'{key}' must be a finite number")));
    }
    if v < 0.0 {
        return Err(config(&format!("'{key}' must not be negative, got {v}")));
    }
    Ok(v)
}

fn missing(key: &str) -> TriadError {
    config(&format!("missing required key '{key}'"))
}

fn config(reason: &str) -> TriadError {
    TriadError::Configuration {
        reason: format!("invalid rule set: {reason}"),
    }
}
