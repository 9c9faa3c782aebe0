//! The restricted tool surface the executor may call.
//!
//! Every logical tool maps to exactly one concrete operation descriptor
//! (HTTP method and path template). Plans name tools; the executor resolves
//! them through this mapping and never through string matching on the
//! data source's operation ids.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A logical data-source tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tool {
    GetPurchaseOrder,
    GetInvoice,
    CheckInventory,
}

impl Tool {
    /// All tools, in plan order.
    pub const ALL: [Tool; 3] = [Tool::GetPurchaseOrder, Tool::GetInvoice, Tool::CheckInventory];

    /// The tool name used in plans and traces.
    pub fn name(self) -> &'static str {
        match self {
            Tool::GetPurchaseOrder => "get_purchase_order",
            Tool::GetInvoice => "get_invoice",
            Tool::CheckInventory => "check_inventory",
        }
    }

    /// Resolve a plan tool name. Returns `None` for anything outside the
    /// enumerated surface.
    pub fn from_name(name: &str) -> Option<Tool> {
        Tool::ALL.into_iter().find(|t| t.name() == name)
    }

    /// The path parameter the tool takes.
    pub fn parameter(self) -> &'static str {
        match self {
            Tool::GetPurchaseOrder => "po_id",
            Tool::GetInvoice => "invoice_id",
            Tool::CheckInventory => "item_id",
        }
    }

    /// The concrete operation this tool is bound to.
    pub fn descriptor(self) -> OperationDescriptor {
        OperationDescriptor {
            method: "GET".to_string(),
            path: format!("/{}/{{{}}}", self.name(), self.parameter()),
            operation_id: None,
        }
    }

    /// The response type name used as a key into a plan's expected fields.
    pub fn response_type(self) -> &'static str {
        match self {
            Tool::GetPurchaseOrder => "POHeader",
            Tool::GetInvoice => "InvoiceHeader",
            Tool::CheckInventory => "inventory",
        }
    }

    /// Human-readable name of the record this tool looks up.
    pub fn resource_name(self) -> &'static str {
        match self {
            Tool::GetPurchaseOrder => "purchase order",
            Tool::GetInvoice => "invoice",
            Tool::CheckInventory => "inventory item",
        }
    }

    /// Build the request for one call of this tool.
    pub fn request(self, argument: impl Into<String>) -> ToolRequest {
        let argument = argument.into();
        let target = format!("/{}/{}", self.name(), argument);
        ToolRequest { tool: self, argument, target }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An operation as advertised by the data source's schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OperationDescriptor {
    /// Upper-case HTTP method.
    pub method: String,
    /// Path template, e.g. `/get_invoice/{invoice_id}`.
    pub path: String,
    /// Operation id, when the schema provides one. Informational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
}

impl OperationDescriptor {
    /// True when `other` names the same method and path template.
    pub fn same_operation(&self, other: &OperationDescriptor) -> bool {
        self.method.eq_ignore_ascii_case(&other.method) && self.path == other.path
    }
}

/// One concrete call of a tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolRequest {
    pub tool: Tool,
    /// The value bound to the tool's path parameter.
    pub argument: String,
    /// The resolved request path, e.g. `/get_invoice/INV-5001`.
    pub target: String,
}
