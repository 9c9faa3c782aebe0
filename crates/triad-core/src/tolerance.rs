//! Tolerance arithmetic shared by the executor and the auditor.
//!
//! Price tolerance is always a percentage of the purchase order unit price,
//! never of the invoice price.

/// True when `|po - invoice| <= tolerance`.
pub fn within_absolute(po: f64, invoice: f64, tolerance: f64) -> bool {
    (po - invoice).abs() <= tolerance
}

/// True when `|po_price - invoice_price| <= po_price * pct / 100`.
pub fn within_pct_of_po(po_price: f64, invoice_price: f64, pct: f64) -> bool {
    (po_price - invoice_price).abs() <= po_price * pct / 100.0
}
