pub mod block;
pub mod contract;
pub mod governance;
pub mod nep;
pub mod node;
pub mod schema;
pub mod state;
pub mod transaction;
pub mod utility;

pub use block::{
    GetBestBlockHashTool, GetBlockByHashTool, GetBlockByHeightTool, GetBlockCountTool,
    GetBlockHashTool, GetBlockHeaderTool,
};
pub use contract::{GetContractStateTool, GetNativeContractsTool, GetStorageTool, InvokeFunctionTool};
pub use governance::{GetCommitteeTool, GetNextBlockValidatorsTool};
pub use nep::{
    GetNep11BalancesTool, GetNep11PropertiesTool, GetNep11TransfersTool, GetNep17BalancesTool,
    GetNep17TransfersTool,
};
pub use node::{GetConnectionCountTool, GetPeersTool, GetVersionTool};
pub use schema::{ParamKind, ParamSpec, ToolArgs, ToolSchema};
pub use state::{GetStateHeightTool, GetStateRootTool};
pub use transaction::{
    GetApplicationLogTool, GetRawMempoolTool, GetRawTransactionTool, GetTransactionHeightTool,
};
pub use utility::{GetUnclaimedGasTool, ValidateAddressTool};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::{Neo3Error, Result};
use crate::provider::Neo3Provider;
use crate::rpc::RpcClient;

/// Standard tool result format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResult {
    pub output: String,
    pub success: bool,
}

impl ToolResult {
    pub fn success(output: String) -> Self {
        ToolResult {
            output,
            success: true,
        }
    }

    pub fn error(message: String) -> Self {
        ToolResult {
            output: message,
            success: false,
        }
    }
}

/// Shared configuration and connection pool handed to every tool call
pub struct ToolContext {
    config: Config,
    http: reqwest::Client,
}

impl ToolContext {
    pub fn new(config: Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| Neo3Error::Transport(format!("Failed to build HTTP client: {}", e)))?;
        Ok(ToolContext { config, http })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Builds a provider for `network`, or the default network when `None`.
    pub fn provider(&self, network: Option<&str>) -> Result<Neo3Provider> {
        let network = network.unwrap_or(&self.config.default_network);
        let url = self.config.networks.resolve(network)?;
        let rpc = RpcClient::with_http_client(self.http.clone(), url)?;
        Ok(Neo3Provider::with_rpc(network, rpc))
    }
}

/// Uniform tool contract for agent runtimes
#[async_trait]
pub trait NeoTool: Send + Sync {
    fn name(&self) -> &'static str;
    fn description(&self) -> &'static str;
    fn schema(&self) -> ToolSchema;

    /// Performs the call once arguments are validated and the provider is built.
    async fn run(&self, provider: &Neo3Provider, args: &ToolArgs) -> Result<String>;

    /// Validates, builds the provider for the requested network and runs.
    async fn invoke(&self, ctx: &ToolContext, args: &Value) -> Result<String> {
        let args = self.schema().validate(args)?;
        let provider = ctx.provider(args.opt_str(schema::NETWORK_PARAM))?;
        let output = self.run(&provider, &args).await;
        provider.close();
        output
    }

    /// Never fails: every error is folded into an unsuccessful [`ToolResult`].
    async fn execute(&self, ctx: &ToolContext, args: Value) -> ToolResult {
        match self.invoke(ctx, &args).await {
            Ok(output) => ToolResult::success(output),
            Err(e) => {
                warn!("Tool {} failed: {}", self.name(), e);
                ToolResult::error(e.to_string())
            }
        }
    }
}

/// MCP Tool Definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// All tools keyed by name, in registration order
pub struct ToolRegistry {
    ctx: Arc<ToolContext>,
    tools: Vec<Arc<dyn NeoTool>>,
    index: HashMap<&'static str, usize>,
}

impl ToolRegistry {
    pub fn new(ctx: Arc<ToolContext>) -> Self {
        ToolRegistry {
            ctx,
            tools: vec![],
            index: HashMap::new(),
        }
    }

    /// Registry with every Neo N3 tool.
    pub fn with_default_tools(ctx: Arc<ToolContext>) -> Self {
        let mut registry = Self::new(ctx);
        let tools: Vec<Arc<dyn NeoTool>> = vec![
            // block
            Arc::new(GetBlockCountTool),
            Arc::new(GetBestBlockHashTool),
            Arc::new(GetBlockByHashTool),
            Arc::new(GetBlockByHeightTool),
            Arc::new(GetBlockHashTool),
            Arc::new(GetBlockHeaderTool),
            // transaction
            Arc::new(GetRawTransactionTool),
            Arc::new(GetRawMempoolTool),
            Arc::new(GetTransactionHeightTool),
            Arc::new(GetApplicationLogTool),
            // contract
            Arc::new(GetContractStateTool),
            Arc::new(GetStorageTool),
            Arc::new(InvokeFunctionTool),
            Arc::new(GetNativeContractsTool),
            // governance
            Arc::new(GetCommitteeTool),
            Arc::new(GetNextBlockValidatorsTool),
            // NEP-17 / NEP-11
            Arc::new(GetNep17BalancesTool),
            Arc::new(GetNep17TransfersTool),
            Arc::new(GetNep11BalancesTool),
            Arc::new(GetNep11PropertiesTool),
            Arc::new(GetNep11TransfersTool),
            // utility
            Arc::new(ValidateAddressTool),
            Arc::new(GetUnclaimedGasTool),
            // node
            Arc::new(GetConnectionCountTool),
            Arc::new(GetPeersTool),
            Arc::new(GetVersionTool),
            // state service
            Arc::new(GetStateRootTool),
            Arc::new(GetStateHeightTool),
        ];
        for tool in tools {
            registry.register(tool);
        }
        registry
    }

    /// Adds a tool; a tool with the same name is replaced.
    pub fn register(&mut self, tool: Arc<dyn NeoTool>) {
        match self.index.get(tool.name()) {
            Some(&i) => self.tools[i] = tool,
            None => {
                self.index.insert(tool.name(), self.tools.len());
                self.tools.push(tool);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn NeoTool>> {
        self.index.get(name).map(|&i| Arc::clone(&self.tools[i]))
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let config = self.ctx.config();
        let networks = config.networks.names();
        self.tools
            .iter()
            .map(|tool| ToolDefinition {
                name: tool.name().to_string(),
                description: tool.description().to_string(),
                input_schema: tool
                    .schema()
                    .to_json_schema(&networks, &config.default_network),
            })
            .collect()
    }

    /// Runs a tool by name. `None` when no such tool is registered.
    pub async fn call(&self, name: &str, args: Value) -> Option<ToolResult> {
        let tool = self.get(name)?;
        info!("Calling tool {}", name);
        Some(tool.execute(&self.ctx, args).await)
    }
}

/// `"<label>: <compact json>"`
pub(crate) fn labeled(label: &str, value: &Value) -> String {
    match value {
        Value::String(s) => format!("{}: {}", label, s),
        other => format!("{}: {}", label, other),
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use mockito::Server;
    use serde_json::json;

    #[test]
    fn test_registry_has_every_tool_once() {
        let ctx = Arc::new(ToolContext::new(Config::default()).unwrap());
        let registry = ToolRegistry::with_default_tools(ctx);
        assert_eq!(registry.len(), 28);

        let mut names = registry.names();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), 28);
        assert!(registry.get("get_block_count").is_some());
        assert!(registry.get("transfer_neo").is_none());
    }

    #[test]
    fn test_definitions_include_network_enum() {
        let ctx = Arc::new(ToolContext::new(Config::default()).unwrap());
        let registry = ToolRegistry::with_default_tools(ctx);
        let defs = registry.definitions();
        let nep17 = defs.iter().find(|d| d.name == "get_nep17_balances").unwrap();
        assert_eq!(nep17.input_schema["required"], json!(["address"]));
        assert_eq!(
            nep17.input_schema["properties"]["network"]["enum"],
            json!(["mainnet", "testnet"])
        );
        let serialized = serde_json::to_value(nep17).unwrap();
        assert!(serialized.get("inputSchema").is_some());
    }

    #[test]
    fn test_unknown_network_is_configuration_error() {
        let ctx = ToolContext::new(Config::default()).unwrap();
        assert!(matches!(
            ctx.provider(Some("devnet")),
            Err(Neo3Error::Configuration(_))
        ));
        assert_eq!(ctx.provider(None).unwrap().network(), "testnet");
    }

    #[tokio::test]
    async fn test_unknown_network_becomes_failed_result() {
        let server = Server::new_async().await;
        let ctx = context_for(&server);
        let result = GetBlockCountTool
            .execute(&ctx, json!({"network": "devnet"}))
            .await;
        assert!(!result.success);
        assert!(result.output.contains("devnet"));
    }

    #[tokio::test]
    async fn test_concurrent_tool_calls_are_independent() {
        let mut server = Server::new_async().await;
        let _count = mock_result(&mut server, "getblockcount", json!(777)).await;
        let _peers = mock_result(&mut server, "getconnectioncount", json!(12)).await;

        let ctx = Arc::new(context_for(&server));
        let registry = ToolRegistry::with_default_tools(ctx);

        let calls = (0..8).map(|i| {
            let name = if i % 2 == 0 {
                "get_block_count"
            } else {
                "get_connection_count"
            };
            registry.call(name, json!({"network": "mainnet"}))
        });
        let results = futures::future::join_all(calls).await;

        for (i, result) in results.into_iter().enumerate() {
            let result = result.unwrap();
            assert!(result.success, "{}", result.output);
            let expected = if i % 2 == 0 { "777" } else { "12" };
            assert!(result.output.contains(expected));
        }
    }

    #[tokio::test]
    async fn test_registry_call_unknown_tool() {
        let ctx = Arc::new(ToolContext::new(Config::default()).unwrap());
        let registry = ToolRegistry::with_default_tools(ctx);
        assert!(registry.call("nope", json!({})).await.is_none());
    }
}
