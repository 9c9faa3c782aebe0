//! Validation of plan tools against the data source's live schema.
//!
//! The catalog is built once per execution from `DataSource::operations()`.
//! A tool is callable only when its bound descriptor (method and path
//! template) is advertised verbatim; operation ids are never pattern-matched.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use triad_contracts::{
    error::{TriadError, TriadResult},
    plan::Plan,
    tool::{OperationDescriptor, Tool},
};

use crate::traits::DataSource;

/// The set of tools the data source advertises for this execution.
#[derive(Debug, Clone)]
pub struct ToolCatalog {
    advertised: BTreeMap<Tool, OperationDescriptor>,
}

impl ToolCatalog {
    /// Fetch the live schema and bind each known tool to its advertised
    /// operation.
    pub fn discover(source: &dyn DataSource) -> TriadResult<Self> {
        let operations = source.operations()?;
        Ok(Self::from_operations(&operations))
    }

    /// Bind tools against an already-fetched operation list.
    pub fn from_operations(operations: &[OperationDescriptor]) -> Self {
        let mut advertised = BTreeMap::new();
        for tool in Tool::ALL {
            let bound = tool.descriptor();
            if let Some(op) = operations.iter().find(|op| op.same_operation(&bound)) {
                advertised.insert(tool, op.clone());
            }
        }
        debug!(
            advertised = advertised.len(),
            operations = operations.len(),
            "tool catalog built"
        );
        Self { advertised }
    }

    /// The advertised operation for `tool`, if any.
    pub fn operation(&self, tool: Tool) -> Option<&OperationDescriptor> {
        self.advertised.get(&tool)
    }

    /// Fail unless `tool` is advertised.
    pub fn ensure(&self, tool: Tool) -> TriadResult<()> {
        if self.advertised.contains_key(&tool) {
            Ok(())
        } else {
            Err(TriadError::ToolNotAllowed {
                tool: tool.name().to_string(),
                reason: format!(
                    "{} {} is not advertised by the data source",
                    tool.descriptor().method,
                    tool.descriptor().path
                ),
            })
        }
    }

    /// Check every tool the plan references, in plan order.
    ///
    /// Fails on the first tool that is outside the enumerated surface, whose
    /// plan descriptor disagrees with its binding, or that is not advertised.
    pub fn validate_plan(&self, plan: &Plan) -> TriadResult<()> {
        for step in &plan.steps {
            if let Some(name) = &step.tool {
                self.ensure(resolve(name)?)?;
            }
        }

        for call in &plan.required_tool_calls {
            let tool = resolve(&call.tool_name)?;
            let bound = tool.descriptor();
            let planned = OperationDescriptor {
                method: call.method.clone(),
                path: call.path.clone(),
                operation_id: None,
            };
            if !planned.same_operation(&bound) {
                warn!(
                    tool = %tool,
                    method = %call.method,
                    path = %call.path,
                    "plan descriptor drifted from tool binding"
                );
                return Err(TriadError::ToolNotAllowed {
                    tool: tool.name().to_string(),
                    reason: format!(
                        "plan requests {} {} but the tool is bound to {} {}",
                        call.method, call.path, bound.method, bound.path
                    ),
                });
            }
            self.ensure(tool)?;
        }

        Ok(())
    }
}

fn resolve(name: &str) -> TriadResult<Tool> {
    Tool::from_name(name).ok_or_else(|| TriadError::ToolNotAllowed {
        tool: name.to_string(),
        reason: "not part of the executor's tool surface".to_string(),
    })
}
