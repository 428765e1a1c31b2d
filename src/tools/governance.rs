use async_trait::async_trait;

use super::schema::{ToolArgs, ToolSchema};
use super::{labeled, NeoTool};
use crate::error::Result;
use crate::provider::Neo3Provider;

pub struct GetCommitteeTool;

#[async_trait]
impl NeoTool for GetCommitteeTool {
    fn name(&self) -> &'static str {
        "get_committee"
    }

    fn description(&self) -> &'static str {
        "Get the public keys of the current Neo N3 committee members. Useful to understand the governance structure."
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::default()
    }

    async fn run(&self, provider: &Neo3Provider, _args: &ToolArgs) -> Result<String> {
        let result = provider.get_committee().await?;
        Ok(labeled("Committee members", &result))
    }
}

pub struct GetNextBlockValidatorsTool;

#[async_trait]
impl NeoTool for GetNextBlockValidatorsTool {
    fn name(&self) -> &'static str {
        "get_next_block_validators"
    }

    fn description(&self) -> &'static str {
        "Get the consensus validators for the next Neo N3 block with their public keys and votes."
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::default()
    }

    async fn run(&self, provider: &Neo3Provider, _args: &ToolArgs) -> Result<String> {
        let result = provider.get_next_block_validators().await?;
        Ok(labeled("Next block validators", &result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::*;
    use mockito::Server;
    use serde_json::json;

    const KEY: &str = "03b209fd4f53a7170ea4444e0cb0a6bb6a53c2bd016926989cf85f9b0fba17a70c";

    #[tokio::test]
    async fn test_committee() {
        let mut server = Server::new_async().await;
        let _m = mock_result(&mut server, "getcommittee", json!([KEY])).await;
        let ctx = context_for(&server);

        let result = GetCommitteeTool.execute(&ctx, json!({})).await;
        assert!(result.success);
        assert_eq!(result.output, format!("Committee members: [\"{}\"]", KEY));
    }

    #[tokio::test]
    async fn test_next_block_validators_transport_failure() {
        let mut server = Server::new_async().await;
        let _m = server
            .mock("POST", "/")
            .with_status(502)
            .with_body("bad gateway")
            .create_async()
            .await;
        let ctx = context_for(&server);

        let result = GetNextBlockValidatorsTool.execute(&ctx, json!({})).await;
        assert!(!result.success);
        assert!(result.output.contains("Transport error"));
    }
}
