use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::Config;
use crate::tools::{ToolContext, ToolRegistry, ToolResult};

pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// JSON-RPC 2.0 Request format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: Value,
    #[serde(default)]
    pub id: Value,
}

/// JSON-RPC 2.0 Response format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
    pub id: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    fn new(code: i32, message: String) -> Self {
        JsonRpcError {
            code,
            message,
            data: None,
        }
    }
}

impl JsonRpcResponse {
    pub fn parse_error(detail: String) -> Self {
        JsonRpcResponse {
            jsonrpc: "2.0".to_string(),
            result: None,
            error: Some(JsonRpcError {
                code: -32700,
                message: "Parse error".to_string(),
                data: Some(Value::String(detail)),
            }),
            id: Value::Null,
        }
    }
}

/// MCP server exposing the Neo N3 tools
pub struct McpServer {
    registry: ToolRegistry,
}

impl McpServer {
    pub fn new(config: Config) -> crate::error::Result<Self> {
        info!(
            "Initializing MCP server (default network: {}, networks: {})",
            config.default_network,
            config.networks.names().join(", ")
        );

        let ctx = Arc::new(ToolContext::new(config)?);
        Ok(Self::with_registry(ToolRegistry::with_default_tools(ctx)))
    }

    pub fn with_registry(registry: ToolRegistry) -> Self {
        McpServer { registry }
    }

    pub fn tool_names(&self) -> Vec<&'static str> {
        self.registry.names()
    }

    /// Handle a JSON-RPC request
    pub async fn handle_request(&self, request: JsonRpcRequest) -> JsonRpcResponse {
        debug!(
            "Handling MCP request: {} with params: {:?}",
            request.method, request.params
        );

        let response = match request.method.as_str() {
            "initialize" => Ok(self.handle_initialize()),
            "tools/list" => self.handle_tools_list(),
            "tools/call" => self.handle_tool_call(&request.params).await,
            "ping" => Ok(json!({"status": "ok"})),
            _ => Err(JsonRpcError::new(
                -32601,
                format!("Method not found: {}", request.method),
            )),
        };

        match response {
            Ok(result) => JsonRpcResponse {
                jsonrpc: "2.0".to_string(),
                result: Some(result),
                error: None,
                id: request.id,
            },
            Err(err) => JsonRpcResponse {
                jsonrpc: "2.0".to_string(),
                result: None,
                error: Some(err),
                id: request.id,
            },
        }
    }

    fn handle_initialize(&self) -> Value {
        json!({
            "protocolVersion": PROTOCOL_VERSION,
            "serverInfo": {
                "name": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION")
            },
            "capabilities": {
                "tools": {}
            }
        })
    }

    fn handle_tools_list(&self) -> Result<Value, JsonRpcError> {
        let tools = serde_json::to_value(self.registry.definitions())
            .map_err(|e| JsonRpcError::new(-32603, format!("Internal error: {}", e)))?;
        Ok(json!({ "tools": tools }))
    }

    async fn handle_tool_call(&self, params: &Value) -> Result<Value, JsonRpcError> {
        let tool_name = params
            .get("name")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                JsonRpcError::new(-32602, "Missing or invalid 'name' parameter".to_string())
            })?;

        let arguments = params.get("arguments").cloned().unwrap_or(Value::Null);

        let result = self
            .registry
            .call(tool_name, arguments)
            .await
            .ok_or_else(|| JsonRpcError::new(-32601, format!("Tool not found: {}", tool_name)))?;

        Ok(tool_result_content(&result))
    }
}

/// MCP `tools/call` result body
fn tool_result_content(result: &ToolResult) -> Value {
    json!({
        "content": [{"type": "text", "text": result.output}],
        "isError": !result.success
    })
}
