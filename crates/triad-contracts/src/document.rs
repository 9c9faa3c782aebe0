//! Purchase order and invoice documents as returned by the data source.
//!
//! Both sides of a match share one shape: a `Header` carrying an ordered
//! list of `LineItem`s. On the wire the header id is named `po_id` or
//! `invoice_id`; both deserialize into `Header::id`.

use serde::{Deserialize, Serialize};

/// The composite join key for line comparisons.
///
/// Ordering is by `line_id` first, then `item_id`. Comparisons are emitted in
/// this order so repeated runs produce identical output.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LineKey {
    pub line_id: u32,
    pub item_id: String,
}

/// One line of a purchase order or invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    pub line_id: u32,
    pub item_id: String,
    #[serde(default)]
    pub description: Option<String>,
    pub quantity: f64,
    pub unit_price: f64,
    pub currency: String,
}

impl LineItem {
    /// The `(line_id, item_id)` key this line joins on.
    pub fn key(&self) -> LineKey {
        LineKey {
            line_id: self.line_id,
            item_id: self.item_id.clone(),
        }
    }
}

/// A purchase order or invoice header with its lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Header {
    /// The PO or invoice identifier.
    #[serde(alias = "po_id", alias = "invoice_id")]
    pub id: String,
    pub vendor_id: String,
    #[serde(default)]
    pub vendor_name: Option<String>,
    pub currency: String,
    pub total_amount: f64,
    pub lines: Vec<LineItem>,
}

/// On-hand stock for one item, as returned by the inventory lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryRecord {
    pub item_id: String,
    pub on_hand: f64,
}
