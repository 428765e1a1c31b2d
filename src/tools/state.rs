use async_trait::async_trait;

use super::schema::{ParamKind, ParamSpec, ToolArgs, ToolSchema};
use super::{labeled, NeoTool};
use crate::error::Result;
use crate::provider::Neo3Provider;

// Both tools need the StateService plugin on the node.

pub struct GetStateRootTool;

#[async_trait]
impl NeoTool for GetStateRootTool {
    fn name(&self) -> &'static str {
        "get_state_root"
    }

    fn description(&self) -> &'static str {
        "Get the state root recorded at a block height on the Neo N3 blockchain. The root is returned as reported by the node, not verified."
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::new(vec![ParamSpec::required(
            "index",
            ParamKind::Integer,
            "Block height",
        )])
    }

    async fn run(&self, provider: &Neo3Provider, args: &ToolArgs) -> Result<String> {
        let result = provider.get_state_root(args.u32("index")?).await?;
        Ok(labeled("State root", &result))
    }
}

pub struct GetStateHeightTool;

#[async_trait]
impl NeoTool for GetStateHeightTool {
    fn name(&self) -> &'static str {
        "get_state_height"
    }

    fn description(&self) -> &'static str {
        "Get the local and validated state root heights of the queried Neo N3 node."
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::default()
    }

    async fn run(&self, provider: &Neo3Provider, _args: &ToolArgs) -> Result<String> {
        let result = provider.get_state_height().await?;
        Ok(labeled("State height", &result))
    }
}
