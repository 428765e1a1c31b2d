use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use super::schema::{ParamKind, ParamSpec, ToolArgs, ToolSchema};
use super::{labeled, NeoTool};
use crate::error::{Neo3Error, Result};
use crate::provider::{BlockId, Neo3Provider};

fn verbose_param() -> ParamSpec {
    ParamSpec::optional(
        "verbose",
        ParamKind::Flag,
        "Return JSON (1/true) instead of the Base64 serialized form (0/false)",
    )
    .default_value(json!(0))
}

pub struct GetBlockCountTool;

#[async_trait]
impl NeoTool for GetBlockCountTool {
    fn name(&self) -> &'static str {
        "get_block_count"
    }

    fn description(&self) -> &'static str {
        "Get the total number of blocks on the Neo N3 blockchain. Useful to check chain growth or the current height. Returns an integer block count."
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::default()
    }

    async fn run(&self, provider: &Neo3Provider, _args: &ToolArgs) -> Result<String> {
        let count = provider.get_block_count().await?;
        Ok(format!("Block count: {}", count))
    }
}

pub struct GetBestBlockHashTool;

#[async_trait]
impl NeoTool for GetBestBlockHashTool {
    fn name(&self) -> &'static str {
        "get_best_block_hash"
    }

    fn description(&self) -> &'static str {
        "Get the hash of the latest block on the Neo N3 blockchain. Returns the best block hash."
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::default()
    }

    async fn run(&self, provider: &Neo3Provider, _args: &ToolArgs) -> Result<String> {
        let hash = provider.get_best_block_hash().await?;
        Ok(format!("Best block hash: {}", hash))
    }
}

pub struct GetBlockByHashTool;

#[async_trait]
impl NeoTool for GetBlockByHashTool {
    fn name(&self) -> &'static str {
        "get_block_by_hash"
    }

    fn description(&self) -> &'static str {
        "Get block details by block hash on the Neo N3 blockchain. Useful to inspect a specific block. Returns block information."
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::new(vec![
            ParamSpec::required(
                "block_hash",
                ParamKind::String,
                "Block hash, 64 hex characters with optional 0x prefix",
            ),
            verbose_param(),
        ])
    }

    async fn run(&self, provider: &Neo3Provider, args: &ToolArgs) -> Result<String> {
        let raw = args.str("block_hash")?;
        // a hash tool must not silently accept a height
        let block = match raw.parse::<BlockId>()? {
            BlockId::Hash(hash) => BlockId::Hash(hash),
            BlockId::Index(_) => {
                return Err(Neo3Error::validation(format!(
                    "Invalid block hash: {}",
                    raw
                )))
            }
        };
        let result = provider.get_block(block, args.flag("verbose")).await?;
        Ok(labeled("Block info", &result))
    }
}

pub struct GetBlockByHeightTool;

#[async_trait]
impl NeoTool for GetBlockByHeightTool {
    fn name(&self) -> &'static str {
        "get_block_by_height"
    }

    fn description(&self) -> &'static str {
        "Get block details by block height on the Neo N3 blockchain. Useful to read historical blocks by position. Returns block information."
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::new(vec![
            ParamSpec::required("block_height", ParamKind::Integer, "Block height (index)"),
            verbose_param(),
        ])
    }

    async fn run(&self, provider: &Neo3Provider, args: &ToolArgs) -> Result<String> {
        let height = args.u32("block_height")?;
        debug!("Fetching block at height {}", height);
        let result = provider
            .get_block(BlockId::Index(height), args.flag("verbose"))
            .await?;
        Ok(labeled("Block info", &result))
    }
}

pub struct GetBlockHashTool;

#[async_trait]
impl NeoTool for GetBlockHashTool {
    fn name(&self) -> &'static str {
        "get_block_hash"
    }

    fn description(&self) -> &'static str {
        "Get the block hash at a given block index on the Neo N3 blockchain. Returns the block hash."
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::new(vec![ParamSpec::required(
            "index",
            ParamKind::Integer,
            "Block index",
        )])
    }

    async fn run(&self, provider: &Neo3Provider, args: &ToolArgs) -> Result<String> {
        let hash = provider.get_block_hash(args.u32("index")?).await?;
        Ok(format!("Block hash: {}", hash))
    }
}

pub struct GetBlockHeaderTool;

#[async_trait]
impl NeoTool for GetBlockHeaderTool {
    fn name(&self) -> &'static str {
        "get_block_header"
    }

    fn description(&self) -> &'static str {
        "Get a block header by block hash or height on the Neo N3 blockchain, without the transactions. Returns block header information."
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::new(vec![
            ParamSpec::required(
                "hash_or_index",
                ParamKind::String,
                "Block hash (hex) or block height as a decimal string",
            ),
            verbose_param(),
        ])
    }

    async fn run(&self, provider: &Neo3Provider, args: &ToolArgs) -> Result<String> {
        let block = args.str("hash_or_index")?.parse::<BlockId>()?;
        let result = provider
            .get_block_header(block, args.flag("verbose"))
            .await?;
        Ok(labeled("Block header", &result))
    }
}
