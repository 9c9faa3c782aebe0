//! In-memory implementation of `DataSource`.
//!
//! `InMemoryErp` answers the three ERP operations from maps held in memory
//! and advertises exactly those operations. Bodies are produced in the same
//! wire shape the HTTP service returns, with the header id under `po_id` or
//! `invoice_id`.

use std::collections::BTreeMap;

use serde_json::{json, Value};
use tracing::debug;

use triad_contracts::{
    document::Header,
    error::{TriadError, TriadResult},
    tool::{OperationDescriptor, Tool, ToolRequest},
};
use triad_core::traits::DataSource;

use crate::fixtures;

#[derive(Debug, Clone, Default)]
pub struct InMemoryErp {
    purchase_orders: BTreeMap<String, Header>,
    invoices: BTreeMap<String, Header>,
    inventory: BTreeMap<String, f64>,
}

impl InMemoryErp {
    /// An empty ERP. Every lookup is NotFound.
    pub fn new() -> Self {
        Self::default()
    }

    /// The seeded reference data from [`fixtures`].
    pub fn reference() -> Self {
        let mut erp = Self::new();
        for po in fixtures::purchase_orders() {
            erp = erp.with_purchase_order(po);
        }
        for invoice in fixtures::invoices() {
            erp = erp.with_invoice(invoice);
        }
        for (item, on_hand) in fixtures::inventory() {
            erp = erp.with_stock(item, on_hand);
        }
        erp
    }

    pub fn with_purchase_order(mut self, po: Header) -> Self {
        self.purchase_orders.insert(po.id.clone(), po);
        self
    }

    pub fn with_invoice(mut self, invoice: Header) -> Self {
        self.invoices.insert(invoice.id.clone(), invoice);
        self
    }

    pub fn with_stock(mut self, item_id: impl Into<String>, on_hand: f64) -> Self {
        self.inventory.insert(item_id.into(), on_hand);
        self
    }

    fn not_found(request: &ToolRequest) -> TriadError {
        TriadError::NotFound {
            resource: request.tool.resource_name().to_string(),
            id: request.argument.clone(),
        }
    }
}

/// Serialize `header` with its id renamed to `id_field`.
fn wire_header(tool: Tool, id_field: &str, header: &Header) -> TriadResult<Value> {
    let mut body = serde_json::to_value(header).map_err(|e| TriadError::Upstream {
        tool: tool.name().to_string(),
        reason: format!("failed to encode document: {}", e),
    })?;
    if let Some(fields) = body.as_object_mut() {
        if let Some(id) = fields.remove("id") {
            fields.insert(id_field.to_string(), id);
        }
    }
    Ok(body)
}

impl DataSource for InMemoryErp {
    fn operations(&self) -> TriadResult<Vec<OperationDescriptor>> {
        Ok(Tool::ALL
            .iter()
            .map(|tool| OperationDescriptor {
                operation_id: Some(tool.name().to_string()),
                ..tool.descriptor()
            })
            .collect())
    }

    fn fetch(&self, request: &ToolRequest) -> TriadResult<Value> {
        debug!(path = %request.target, "in-memory fetch");
        let key = request.argument.as_str();

        match request.tool {
            Tool::GetPurchaseOrder => {
                let po = self.purchase_orders.get(key).ok_or_else(|| Self::not_found(request))?;
                wire_header(request.tool, "po_id", po)
            }
            Tool::GetInvoice => {
                let invoice = self.invoices.get(key).ok_or_else(|| Self::not_found(request))?;
                wire_header(request.tool, "invoice_id", invoice)
            }
            Tool::CheckInventory => {
                let on_hand = self.inventory.get(key).ok_or_else(|| Self::not_found(request))?;
                Ok(json!({ "item_id": key, "on_hand": on_hand }))
            }
        }
    }
}
