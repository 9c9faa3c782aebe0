//! Response shape checks against a plan's expected field sets.
//!
//! Each response is validated as a JSON object carrying every field the plan
//! expects for its response type, then decoded into its typed form. All
//! missing fields are reported together.

use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::warn;

use triad_contracts::{
    error::{TriadError, TriadResult},
    plan::Plan,
    tool::Tool,
};

/// Validate `body` against the plan's expected fields for `tool`'s response
/// type, then decode it.
pub fn decode_response<T: DeserializeOwned>(plan: &Plan, tool: Tool, body: &Value) -> TriadResult<T> {
    if let Some(fields) = plan.expected_fields_for(tool.response_type()) {
        check_fields(tool, fields, body)?;
    }
    serde_json::from_value(body.clone()).map_err(|e| TriadError::MalformedResponse {
        tool: tool.name().to_string(),
        reason: format!("cannot decode {}: {e}", tool.response_type()),
    })
}

/// Fail with `MalformedResponse` unless `body` is an object with `fields`.
pub fn check_fields(tool: Tool, fields: &[String], body: &Value) -> TriadResult<()> {
    let schema = json!({ "type": "object", "required": fields });

    let validator = jsonschema::validator_for(&schema).map_err(|e| TriadError::MalformedResponse {
        tool: tool.name().to_string(),
        reason: format!("invalid expected-field schema: {e}"),
    })?;

    let problems: Vec<String> = validator
        .iter_errors(body)
        .map(|error| format!("{} at '{}'", error, error.instance_path))
        .collect();

    if problems.is_empty() {
        return Ok(());
    }

    let reason = problems.join("; ");
    warn!(tool = %tool, %reason, "response failed expected-field check");
    Err(TriadError::MalformedResponse {
        tool: tool.name().to_string(),
        reason,
    })
}
