//! Seeded reference ERP data.
//!
//! All data in this module is hardcoded and fictional. It backs the
//! in-memory ERP used by the reference scenarios and by offline CLI runs.
//!
//! | PO      | Invoice  | Situation                                   |
//! |---------|----------|---------------------------------------------|
//! | PO-1001 | INV-5001 | identical documents                         |
//! | PO-1002 | INV-5002 | ITEM-03 invoiced at 55 against a PO price of 50 |
//! | PO-1003 | INV-5003 | invoice omits PO line 2                     |
//! | (none)  | INV-5004 | references PO-9999, which does not exist    |

use triad_contracts::document::{Header, LineItem};

fn line(line_id: u32, item_id: &str, description: &str, quantity: f64, unit_price: f64) -> LineItem {
    LineItem {
        line_id,
        item_id: item_id.to_string(),
        description: Some(description.to_string()),
        quantity,
        unit_price,
        currency: "USD".to_string(),
    }
}

fn header(id: &str, vendor_id: &str, vendor_name: &str, lines: Vec<LineItem>) -> Header {
    let total_amount = lines.iter().map(|l| l.quantity * l.unit_price).sum();
    Header {
        id: id.to_string(),
        vendor_id: vendor_id.to_string(),
        vendor_name: Some(vendor_name.to_string()),
        currency: "USD".to_string(),
        total_amount,
        lines,
    }
}

// ── Purchase orders ───────────────────────────────────────────────────────────

pub fn purchase_orders() -> Vec<Header> {
    vec![
        header(
            "PO-1001",
            "V1",
            "Acme Industrial Supply",
            vec![
                line(1, "ITEM-01", "Hex bolts, M8 (box)", 10.0, 50.0),
                line(2, "ITEM-02", "Bearing assembly", 5.0, 100.0),
            ],
        ),
        header(
            "PO-1002",
            "V2",
            "Northwind Components",
            vec![
                line(1, "ITEM-03", "Hydraulic hose, 2m", 4.0, 50.0),
                line(2, "ITEM-04", "Pressure gauge", 2.0, 75.0),
            ],
        ),
        header(
            "PO-1003",
            "V3",
            "Globex Fasteners",
            vec![
                line(1, "ITEM-05", "Anchor plate", 3.0, 20.0),
                line(2, "ITEM-06", "Mounting bracket kit", 1.0, 200.0),
            ],
        ),
    ]
}

// ── Invoices ──────────────────────────────────────────────────────────────────

pub fn invoices() -> Vec<Header> {
    vec![
        header(
            "INV-5001",
            "V1",
            "Acme Industrial Supply",
            vec![
                line(1, "ITEM-01", "Hex bolts, M8 (box)", 10.0, 50.0),
                line(2, "ITEM-02", "Bearing assembly", 5.0, 100.0),
            ],
        ),
        header(
            "INV-5002",
            "V2",
            "Northwind Components",
            vec![
                line(1, "ITEM-03", "Hydraulic hose, 2m", 4.0, 55.0),
                line(2, "ITEM-04", "Pressure gauge", 2.0, 75.0),
            ],
        ),
        header(
            "INV-5003",
            "V3",
            "Globex Fasteners",
            vec![line(1, "ITEM-05", "Anchor plate", 3.0, 20.0)],
        ),
        header(
            "INV-5004",
            "V1",
            "Acme Industrial Supply",
            vec![line(1, "ITEM-01", "Hex bolts, M8 (box)", 2.0, 50.0)],
        ),
    ]
}

// ── Inventory ─────────────────────────────────────────────────────────────────

/// On-hand stock. ITEM-06 is deliberately absent.
pub fn inventory() -> Vec<(&'static str, f64)> {
    vec![
        ("ITEM-01", 120.0),
        ("ITEM-02", 8.0),
        ("ITEM-03", 40.0),
        ("ITEM-04", 0.0),
        ("ITEM-05", 15.0),
    ]
}
