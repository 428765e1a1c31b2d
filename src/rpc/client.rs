use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error};

use crate::error::{Neo3Error, Result};

/// JSON-RPC 2.0 request sent to a Neo node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcRequest {
    pub jsonrpc: String,
    pub method: String,
    pub params: Vec<Value>,
    pub id: u64,
}

/// JSON-RPC 2.0 response from a Neo node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcResponse {
    #[serde(default)]
    pub jsonrpc: Option<String>,
    #[serde(default)]
    pub result: Option<Value>,
    #[serde(default)]
    pub error: Option<RpcErrorObject>,
    #[serde(default)]
    pub id: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RpcErrorObject {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl RpcResponse {
    /// Unwraps `result`, mapping an `error` object to [`Neo3Error::Rpc`].
    pub fn into_result(self) -> Result<Value> {
        if let Some(err) = self.error {
            return Err(Neo3Error::Rpc {
                code: err.code,
                message: err.message,
            });
        }
        // `"result": null` deserializes to None as well; both are protocol errors here
        self.result
            .ok_or_else(|| Neo3Error::Transport("Empty response from Neo RPC".to_string()))
    }
}

/// HTTP JSON-RPC client bound to one Neo node endpoint
#[derive(Clone)]
pub struct RpcClient {
    inner: Arc<RpcClientInner>,
}

struct RpcClientInner {
    http: reqwest::Client,
    url: url::Url,
    next_id: AtomicU64,
}

impl RpcClient {
    /// Create a new RPC client with its own connection pool
    pub fn new(rpc_url: &str, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Neo3Error::Transport(format!("Failed to build HTTP client: {}", e)))?;
        Self::with_http_client(http, rpc_url)
    }

    /// Create a client sharing an existing connection pool
    pub fn with_http_client(http: reqwest::Client, rpc_url: &str) -> Result<Self> {
        let url = rpc_url
            .parse::<url::Url>()
            .map_err(|_| Neo3Error::Configuration(format!("Invalid RPC URL: {}", rpc_url)))?;

        debug!("RPC client bound to {}", url);

        Ok(RpcClient {
            inner: Arc::new(RpcClientInner {
                http,
                url,
                next_id: AtomicU64::new(1),
            }),
        })
    }

    fn build_request(&self, method: &str, params: Vec<Value>) -> RpcRequest {
        RpcRequest {
            jsonrpc: "2.0".to_string(),
            method: method.to_string(),
            params,
            id: self.inner.next_id.fetch_add(1, Ordering::Relaxed),
        }
    }

    /// Sends one request and returns the unwrapped `result`. Single attempt.
    pub async fn call(&self, method: &str, params: Vec<Value>) -> Result<Value> {
        let request = self.build_request(method, params);
        debug!(
            "RPC call {} (id: {}) params: {:?}",
            request.method, request.id, request.params
        );

        let response = self
            .inner
            .http
            .post(self.inner.url.clone())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!("RPC {} failed to send: {}", method, e);
                Neo3Error::Transport(format!("Error making RPC request {}: {}", method, e))
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            error!("RPC {} failed to read response: {}", method, e);
            Neo3Error::Transport(format!("Failed to read response for {}: {}", method, e))
        })?;

        // nodes may answer with a JSON-RPC error body under a non-2xx status
        let parsed: RpcResponse = serde_json::from_str(&body).map_err(|e| {
            error!("RPC {} returned unparseable body (HTTP {}): {}", method, status, e);
            Neo3Error::Transport(format!(
                "Invalid JSON-RPC response for {} (HTTP {}): {}",
                method, status, e
            ))
        })?;

        parsed.into_result().map_err(|e| {
            error!("RPC {} failed: {}", method, e);
            e
        })
    }

    /// Get RPC URL
    pub fn rpc_url(&self) -> &str {
        self.inner.url.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    #[test]
    fn test_rejects_invalid_url() {
        let err = RpcClient::new("not a url", Duration::from_secs(1)).err().unwrap();
        assert!(matches!(err, Neo3Error::Configuration(_)));
    }

    #[test]
    fn test_request_ids_increase() {
        let client = RpcClient::new("http://127.0.0.1:10332", Duration::from_secs(1)).unwrap();
        let first = client.build_request("getblockcount", vec![]);
        let second = client.build_request("getblockcount", vec![]);
        assert_eq!(first.jsonrpc, "2.0");
        assert!(second.id > first.id);
    }

    #[test]
    fn test_response_error_maps_to_rpc_error() {
        let response: RpcResponse = serde_json::from_value(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": {"code": -32602, "message": "Invalid params"}
        }))
        .unwrap();
        match response.into_result() {
            Err(Neo3Error::Rpc { code, message }) => {
                assert_eq!(code, -32602);
                assert_eq!(message, "Invalid params");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[test]
    fn test_response_without_result_is_error() {
        let response: RpcResponse =
            serde_json::from_value(json!({"jsonrpc": "2.0", "id": 1})).unwrap();
        assert!(matches!(response.into_result(), Err(Neo3Error::Transport(_))));
    }

    #[tokio::test]
    async fn test_call_posts_jsonrpc_body() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .match_body(Matcher::PartialJson(json!({
                "jsonrpc": "2.0",
                "method": "getblockhash",
                "params": [10]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"jsonrpc":"2.0","id":1,"result":"0xabc"}"#)
            .create_async()
            .await;

        let client = RpcClient::new(&server.url(), Duration::from_secs(5)).unwrap();
        let result = client.call("getblockhash", vec![json!(10)]).await.unwrap();
        assert_eq!(result, json!("0xabc"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_call_surfaces_http_error_body() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/")
            .with_status(500)
            .with_body("internal failure")
            .create_async()
            .await;

        let client = RpcClient::new(&server.url(), Duration::from_secs(5)).unwrap();
        let err = client.call("getversion", vec![]).await.unwrap_err();
        assert!(matches!(err, Neo3Error::Transport(_)));
        assert!(err.to_string().contains("HTTP 500"));
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        // port 9 (discard) is not expected to accept HTTP
        let client = RpcClient::new("http://127.0.0.1:9", Duration::from_secs(2)).unwrap();
        let err = client.call("getblockcount", vec![]).await.unwrap_err();
        assert!(matches!(err, Neo3Error::Transport(_)));
    }
}
