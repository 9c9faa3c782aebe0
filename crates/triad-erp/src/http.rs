//! Blocking HTTP client for a remote ERP service.
//!
//! Operations are discovered from the service's `/openapi.json` document.
//! Every request carries the client-wide timeout; an expired wait becomes
//! `TriadError::Timeout` rather than blocking the pipeline.

use std::time::Duration;

use reqwest::{blocking::Client, StatusCode, Url};
use serde_json::Value;
use tracing::{debug, warn};

use triad_contracts::{
    error::{TriadError, TriadResult},
    tool::{OperationDescriptor, ToolRequest},
};
use triad_core::traits::DataSource;

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const HTTP_METHODS: [&str; 7] = ["get", "put", "post", "delete", "patch", "head", "options"];

pub struct HttpErp {
    base: Url,
    http: Client,
}

impl HttpErp {
    /// Build a client for the service rooted at `base_url`.
    ///
    /// Returns `TriadError::Configuration` for an unparseable URL or a
    /// client that cannot be constructed.
    pub fn new(base_url: &str, timeout: Duration) -> TriadResult<Self> {
        let base = Url::parse(base_url).map_err(|e| TriadError::Configuration {
            reason: format!("invalid ERP URL '{}': {}", base_url, e),
        })?;
        if base.cannot_be_a_base() {
            return Err(TriadError::Configuration {
                reason: format!("ERP URL '{}' cannot carry a path", base_url),
            });
        }

        let http = Client::builder()
            .user_agent(format!("triad/{}", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| TriadError::Configuration {
                reason: format!("failed to build HTTP client: {}", e),
            })?;

        Ok(Self { base, http })
    }

    /// `base` with `segments` appended, each percent-encoded.
    fn url(&self, segments: &[&str]) -> TriadResult<Url> {
        let mut url = self.base.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| TriadError::Configuration {
                reason: format!("ERP URL '{}' cannot carry a path", self.base),
            })?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }
}

/// Flatten an OpenAPI `paths` map into operation descriptors.
pub fn operations_from_openapi(doc: &Value) -> TriadResult<Vec<OperationDescriptor>> {
    let paths = doc
        .get("paths")
        .and_then(Value::as_object)
        .ok_or_else(|| TriadError::MalformedResponse {
            tool: "openapi".to_string(),
            reason: "schema has no 'paths' object".to_string(),
        })?;

    let mut ops = Vec::new();
    for (path, item) in paths {
        let Some(methods) = item.as_object() else {
            continue;
        };
        for (method, op) in methods {
            if !HTTP_METHODS.contains(&method.to_ascii_lowercase().as_str()) {
                continue;
            }
            ops.push(OperationDescriptor {
                method: method.to_ascii_uppercase(),
                path: path.clone(),
                operation_id: op.get("operationId").and_then(Value::as_str).map(str::to_string),
            });
        }
    }
    Ok(ops)
}

/// Map a transport error, keeping an expired wait distinct from other failures.
fn transport_error(
    tool: &str,
    target: &str,
    e: reqwest::Error,
    otherwise: impl FnOnce(String) -> TriadError,
) -> TriadError {
    if e.is_timeout() {
        TriadError::Timeout {
            tool: tool.to_string(),
            target: target.to_string(),
        }
    } else {
        otherwise(e.to_string())
    }
}

impl DataSource for HttpErp {
    fn operations(&self) -> TriadResult<Vec<OperationDescriptor>> {
        let url = self.url(&["openapi.json"])?;
        debug!(url = %url, "fetching ERP schema");

        let tool = "openapi";
        let target = url.path().to_string();
        let upstream = |reason: String| TriadError::Upstream {
            tool: tool.to_string(),
            reason,
        };

        let resp = self
            .http
            .get(url)
            .send()
            .map_err(|e| transport_error(tool, &target, e, upstream))?;
        if !resp.status().is_success() {
            return Err(upstream(format!("schema request returned HTTP {}", resp.status())));
        }
        let doc: Value = resp.json().map_err(|e| {
            transport_error(tool, &target, e, |reason| TriadError::MalformedResponse {
                tool: tool.to_string(),
                reason,
            })
        })?;

        operations_from_openapi(&doc)
    }

    fn fetch(&self, request: &ToolRequest) -> TriadResult<Value> {
        let tool = request.tool.name();
        let url = self.url(&[tool, request.argument.as_str()])?;
        debug!(tool, url = %url, "GET");

        let resp = self.http.get(url).send().map_err(|e| {
            transport_error(tool, &request.target, e, |reason| TriadError::Upstream {
                tool: tool.to_string(),
                reason,
            })
        })?;

        let status = resp.status();
        if status == StatusCode::NOT_FOUND {
            return Err(TriadError::NotFound {
                resource: request.tool.resource_name().to_string(),
                id: request.argument.clone(),
            });
        }
        if !status.is_success() {
            warn!(tool, status = %status, "ERP request failed");
            return Err(TriadError::Upstream {
                tool: tool.to_string(),
                reason: format!("HTTP {}", status),
            });
        }

        resp.json::<Value>().map_err(|e| {
            transport_error(tool, &request.target, e, |reason| TriadError::MalformedResponse {
                tool: tool.to_string(),
                reason: format!("body is not JSON: {}", reason),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use serde_json::json;

    use triad_contracts::tool::Tool;

    use super::*;

    fn client(server: &MockServer) -> HttpErp {
        HttpErp::new(&server.base_url(), Duration::from_secs(2)).unwrap()
    }

    #[test]
    fn test_fetch_ok() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/check_inventory/ITEM-01");
            then.status(200).json_body(json!({"item_id": "ITEM-01", "on_hand": 5}));
        });

        let body = client(&server).fetch(&Tool::CheckInventory.request("ITEM-01")).unwrap();
        assert_eq!(body["on_hand"], 5);
    }

    #[test]
    fn test_404_is_not_found() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/get_purchase_order/PO-404");
            then.status(404).json_body(json!({"detail": "PO not found"}));
        });

        let err = client(&server).fetch(&Tool::GetPurchaseOrder.request("PO-404")).unwrap_err();
        match err {
            TriadError::NotFound { id, .. } => assert_eq!(id, "PO-404"),
            other => panic!("expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_server_error_is_upstream() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/get_invoice/INV-1");
            then.status(500);
        });

        let err = client(&server).fetch(&Tool::GetInvoice.request("INV-1")).unwrap_err();
        assert_eq!(err.kind(), "upstream");
    }

    #[test]
    fn test_slow_response_times_out() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/get_invoice/INV-1");
            then.status(200)
                .delay(Duration::from_millis(1500))
                .json_body(json!({}));
        });

        let erp = HttpErp::new(&server.base_url(), Duration::from_millis(200)).unwrap();
        let err = erp.fetch(&Tool::GetInvoice.request("INV-1")).unwrap_err();
        assert_eq!(err.kind(), "timeout");
    }

    #[test]
    fn test_slow_schema_times_out() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/openapi.json");
            then.status(200)
                .delay(Duration::from_millis(1500))
                .json_body(json!({"paths": {}}));
        });

        let erp = HttpErp::new(&server.base_url(), Duration::from_millis(200)).unwrap();
        match erp.operations().unwrap_err() {
            TriadError::Timeout { tool, target } => {
                assert_eq!(tool, "openapi");
                assert_eq!(target, "/openapi.json");
            }
            other => panic!("expected Timeout, got {:?}", other),
        }
    }

    #[test]
    fn test_404_names_the_resource() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/get_invoice/INV-404");
            then.status(404);
        });

        let err = client(&server).fetch(&Tool::GetInvoice.request("INV-404")).unwrap_err();
        assert_eq!(err.to_string(), "invoice 'INV-404' not found");
    }

    #[test]
    fn test_non_json_body_is_malformed() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/get_invoice/INV-1");
            then.status(200).body("<html>");
        });

        let err = client(&server).fetch(&Tool::GetInvoice.request("INV-1")).unwrap_err();
        assert_eq!(err.kind(), "malformed_response");
    }

    /// Identifiers are sent as single, percent-encoded path segments.
    #[test]
    fn test_argument_is_path_encoded() {
        let erp = HttpErp::new("http://erp.local/api/", DEFAULT_TIMEOUT).unwrap();
        let url = erp.url(&["get_purchase_order", "PO/1 A"]).unwrap();
        assert_eq!(url.path(), "/api/get_purchase_order/PO%2F1%20A");
    }

    #[test]
    fn test_operations_from_schema() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/openapi.json");
            then.status(200).json_body(json!({
                "openapi": "3.1.0",
                "paths": {
                    "/get_purchase_order/{po_id}": {
                        "get": {"operationId": "get_purchase_order"},
                        "parameters": []
                    },
                    "/check_inventory/{item_id}": {"get": {}}
                }
            }));
        });

        let mut ops = client(&server).operations().unwrap();
        ops.sort_by(|a, b| a.path.cmp(&b.path));

        assert_eq!(ops.len(), 2);
        assert!(ops[0].same_operation(&Tool::CheckInventory.descriptor()));
        assert_eq!(ops[0].operation_id, None);
        assert!(ops[1].same_operation(&Tool::GetPurchaseOrder.descriptor()));
        assert_eq!(ops[1].operation_id.as_deref(), Some("get_purchase_order"));
    }

    #[test]
    fn test_schema_without_paths_is_malformed() {
        let err = operations_from_openapi(&json!({"openapi": "3.1.0"})).unwrap_err();
        assert_eq!(err.kind(), "malformed_response");
    }

    #[test]
    fn test_bad_base_url_is_configuration() {
        let err = HttpErp::new("not a url", DEFAULT_TIMEOUT).err().unwrap();
        assert_eq!(err.kind(), "configuration");
    }
}
