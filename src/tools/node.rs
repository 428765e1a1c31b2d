use async_trait::async_trait;

use super::schema::{ToolArgs, ToolSchema};
use super::{labeled, NeoTool};
use crate::error::Result;
use crate::provider::Neo3Provider;

pub struct GetConnectionCountTool;

#[async_trait]
impl NeoTool for GetConnectionCountTool {
    fn name(&self) -> &'static str {
        "get_connection_count"
    }

    fn description(&self) -> &'static str {
        "Get the number of peers the queried Neo N3 node is connected to."
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::default()
    }

    async fn run(&self, provider: &Neo3Provider, _args: &ToolArgs) -> Result<String> {
        let count = provider.get_connection_count().await?;
        Ok(format!("Connection count: {}", count))
    }
}

pub struct GetPeersTool;

#[async_trait]
impl NeoTool for GetPeersTool {
    fn name(&self) -> &'static str {
        "get_peers"
    }

    fn description(&self) -> &'static str {
        "List the connected, unconnected and bad peers known to the queried Neo N3 node."
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::default()
    }

    async fn run(&self, provider: &Neo3Provider, _args: &ToolArgs) -> Result<String> {
        let result = provider.get_peers().await?;
        Ok(labeled("Peers", &result))
    }
}

pub struct GetVersionTool;

#[async_trait]
impl NeoTool for GetVersionTool {
    fn name(&self) -> &'static str {
        "get_version"
    }

    fn description(&self) -> &'static str {
        "Get the version and protocol settings (network magic, address version, block time) of the queried Neo N3 node."
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::default()
    }

    async fn run(&self, provider: &Neo3Provider, _args: &ToolArgs) -> Result<String> {
        let result = provider.get_version().await?;
        Ok(labeled("Node version", &result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::*;
    use mockito::Server;
    use serde_json::json;

    #[tokio::test]
    async fn test_version_output() {
        let mut server = Server::new_async().await;
        let _m = mock_result(
            &mut server,
            "getversion",
            json!({"useragent": "/Neo:3.6.0/", "protocol": {"addressversion": 53, "network": 860833102}}),
        )
        .await;
        let ctx = context_for(&server);

        let result = GetVersionTool.execute(&ctx, json!({})).await;
        assert!(result.success);
        assert!(result.output.contains("/Neo:3.6.0/"));
        assert!(result.output.contains("860833102"));
    }

    #[tokio::test]
    async fn test_connection_count_output() {
        let mut server = Server::new_async().await;
        let _m = mock_result(&mut server, "getconnectioncount", json!(9)).await;
        let ctx = context_for(&server);

        let result = GetConnectionCountTool.execute(&ctx, json!({})).await;
        assert_eq!(result.output, "Connection count: 9");
    }

    #[tokio::test]
    async fn test_peers_output() {
        let mut server = Server::new_async().await;
        let peers = json!({"unconnected": [], "bad": [], "connected": [{"address": "10.0.0.1", "port": 10333}]});
        let _m = mock_result(&mut server, "getpeers", peers.clone()).await;
        let ctx = context_for(&server);

        let result = GetPeersTool.execute(&ctx, json!({})).await;
        assert_eq!(result.output, format!("Peers: {}", peers));
    }
}
