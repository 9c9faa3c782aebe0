//! Line-level comparison of a purchase order against an invoice.
//!
//! Pure arithmetic: no I/O, no failure modes. Keys are joined on
//! `(line_id, item_id)` and emitted in ascending key order.

use std::collections::{BTreeMap, BTreeSet};

use tracing::warn;

use triad_contracts::{
    document::{LineItem, LineKey},
    execution::{Comparison, InventorySignal},
    plan::ValidationRules,
};

use crate::tolerance::{within_absolute, within_pct_of_po};

/// Compare every line key present on either side.
///
/// A key present on only one side yields a structural mismatch with both
/// match flags false. Otherwise quantity is checked against the absolute
/// tolerance and unit price against a percentage of the PO unit price.
pub fn compare_lines(po_lines: &[LineItem], invoice_lines: &[LineItem], rules: &ValidationRules) -> Vec<Comparison> {
    let po_map = index_lines("purchase order", po_lines);
    let invoice_map = index_lines("invoice", invoice_lines);

    let keys: BTreeSet<&LineKey> = po_map.keys().chain(invoice_map.keys()).collect();

    keys.into_iter()
        .map(|key| {
            let po_line = po_map.get(key).copied();
            let invoice_line = invoice_map.get(key).copied();

            let (quantity_match, unit_price_match) = match (po_line, invoice_line) {
                (Some(po), Some(inv)) => (
                    within_absolute(po.quantity, inv.quantity, rules.line_quantity_tolerance),
                    within_pct_of_po(po.unit_price, inv.unit_price, rules.price_tolerance_pct),
                ),
                _ => (false, false),
            };

            Comparison {
                key: key.clone(),
                po_line: po_line.cloned(),
                invoice_line: invoice_line.cloned(),
                quantity_match,
                unit_price_match,
                inventory: InventorySignal::NotChecked,
            }
        })
        .collect()
}

/// Key lines by `(line_id, item_id)`. On a duplicate key the later line wins.
fn index_lines<'a>(side: &str, lines: &'a [LineItem]) -> BTreeMap<LineKey, &'a LineItem> {
    let mut map = BTreeMap::new();
    for line in lines {
        if map.insert(line.key(), line).is_some() {
            warn!(
                side,
                line_id = line.line_id,
                item_id = %line.item_id,
                "duplicate line key; keeping the later line"
            );
        }
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(line_id: u32, item: &str, qty: f64, price: f64) -> LineItem {
        LineItem {
            line_id,
            item_id: item.to_string(),
            description: None,
            quantity: qty,
            unit_price: price,
            currency: "USD".to_string(),
        }
    }

    #[test]
    fn identical_lines_match() {
        let lines = vec![line(1, "ITEM-01", 10.0, 50.0), line(2, "ITEM-02", 5.0, 100.0)];
        let comps = compare_lines(&lines, &lines, &ValidationRules::default());
        assert_eq!(comps.len(), 2);
        assert!(comps.iter().all(|c| c.quantity_match && c.unit_price_match));
        assert!(comps.iter().all(|c| !c.is_structural_mismatch()));
    }

    #[test]
    fn one_sided_keys_have_false_flags() {
        let po = vec![line(1, "ITEM-01", 10.0, 50.0), line(2, "ITEM-02", 5.0, 100.0)];
        let inv = vec![line(1, "ITEM-01", 10.0, 50.0), line(3, "ITEM-09", 1.0, 1.0)];
        let comps = compare_lines(&po, &inv, &ValidationRules::default());

        assert_eq!(comps.len(), 3);
        for c in comps.iter().filter(|c| c.is_structural_mismatch()) {
            assert!(!c.quantity_match);
            assert!(!c.unit_price_match);
        }
        assert!(comps[1].invoice_line.is_none());
        assert!(comps[2].po_line.is_none());
    }

    #[test]
    fn output_is_sorted_by_key() {
        let po = vec![line(3, "C", 1.0, 1.0), line(1, "B", 1.0, 1.0), line(1, "A", 1.0, 1.0)];
        let inv = vec![line(2, "Z", 1.0, 1.0)];
        let comps = compare_lines(&po, &inv, &ValidationRules::default());
        let keys: Vec<(u32, &str)> = comps.iter().map(|c| (c.key.line_id, c.key.item_id.as_str())).collect();
        assert_eq!(keys, [(1, "A"), (1, "B"), (2, "Z"), (3, "C")]);
    }

    #[test]
    fn same_item_on_different_lines_is_not_joined() {
        let po = vec![line(1, "ITEM-01", 10.0, 50.0)];
        let inv = vec![line(2, "ITEM-01", 10.0, 50.0)];
        let comps = compare_lines(&po, &inv, &ValidationRules::default());
        assert_eq!(comps.len(), 2);
        assert!(comps.iter().all(Comparison::is_structural_mismatch));
    }

    #[test]
    fn tolerances_come_from_rules() {
        let po = vec![line(1, "ITEM-01", 10.0, 100.0)];
        let inv = vec![line(1, "ITEM-01", 11.0, 104.0)];

        let exact = compare_lines(&po, &inv, &ValidationRules::default());
        assert!(!exact[0].quantity_match);
        assert!(!exact[0].unit_price_match);

        let loose = ValidationRules {
            line_quantity_tolerance: 1.0,
            price_tolerance_pct: 5.0,
            ..ValidationRules::default()
        };
        let loose = compare_lines(&po, &inv, &loose);
        assert!(loose[0].quantity_match);
        assert!(loose[0].unit_price_match);
    }

    #[test]
    fn duplicate_key_keeps_later_line() {
        let po = vec![line(1, "ITEM-01", 10.0, 50.0), line(1, "ITEM-01", 20.0, 50.0)];
        let inv = vec![line(1, "ITEM-01", 20.0, 50.0)];
        let comps = compare_lines(&po, &inv, &ValidationRules::default());
        assert_eq!(comps.len(), 1);
        assert!(comps[0].quantity_match);
    }
}
