use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::schema::{ParamKind, ParamSpec, ToolArgs, ToolSchema};
use super::{labeled, NeoTool};
use crate::error::Result;
use crate::precision;
use crate::provider::{Neo3Provider, TransferRange};

fn address_param() -> ParamSpec {
    ParamSpec::required(
        "address",
        ParamKind::String,
        "Neo N3 address (e.g. NUqLhf1p1vQyP2KJjMcEwmdEBPnbCGouVp) or account script hash",
    )
}

fn range_params() -> [ParamSpec; 2] {
    [
        ParamSpec::optional(
            "timestamp",
            ParamKind::Integer,
            "Start of the window, Unix time in milliseconds",
        ),
        ParamSpec::optional(
            "end_timestamp",
            ParamKind::Integer,
            "End of the window, Unix time in milliseconds (requires timestamp)",
        ),
    ]
}

fn transfer_range(args: &ToolArgs) -> Result<TransferRange> {
    Ok(TransferRange {
        start: args.opt_u64("timestamp")?,
        end: args.opt_u64("end_timestamp")?,
    })
}

/// Adds a human-readable `formatted_amount` to each entry of a
/// `getnep17balances` result that reports its decimals.
fn annotate_balances(mut result: Value) -> Value {
    if let Some(balances) = result.get_mut("balance").and_then(Value::as_array_mut) {
        for entry in balances.iter_mut() {
            let amount = entry
                .get("amount")
                .and_then(Value::as_str)
                .map(str::to_owned);
            let decimals = entry.get("decimals").and_then(|d| match d {
                Value::String(s) => s.parse::<u8>().ok(),
                other => other.as_u64().and_then(|n| u8::try_from(n).ok()),
            });

            if let (Some(amount), Some(decimals)) = (amount, decimals) {
                match precision::format_amount(&amount, decimals) {
                    Ok(formatted) => {
                        entry["formatted_amount"] = Value::String(formatted);
                    }
                    Err(e) => debug!("Leaving balance unformatted: {}", e),
                }
            }
        }
    }
    result
}

pub struct GetNep17BalancesTool;

#[async_trait]
impl NeoTool for GetNep17BalancesTool {
    fn name(&self) -> &'static str {
        "get_nep17_balances"
    }

    fn description(&self) -> &'static str {
        "Get all NEP-17 (fungible token) balances of an address on the Neo N3 blockchain. Raw amounts are kept; entries with known decimals also carry formatted_amount."
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::new(vec![address_param()])
    }

    async fn run(&self, provider: &Neo3Provider, args: &ToolArgs) -> Result<String> {
        let result = provider.get_nep17_balances(args.str("address")?).await?;
        Ok(labeled("NEP-17 balances", &annotate_balances(result)))
    }
}

pub struct GetNep17TransfersTool;

#[async_trait]
impl NeoTool for GetNep17TransfersTool {
    fn name(&self) -> &'static str {
        "get_nep17_transfers"
    }

    fn description(&self) -> &'static str {
        "Get the NEP-17 (fungible token) transfer history of an address on the Neo N3 blockchain, optionally within a time window. Returns sent and received transfers."
    }

    fn schema(&self) -> ToolSchema {
        let mut params = vec![address_param()];
        params.extend(range_params());
        ToolSchema::new(params)
    }

    async fn run(&self, provider: &Neo3Provider, args: &ToolArgs) -> Result<String> {
        let result = provider
            .get_nep17_transfers(args.str("address")?, transfer_range(args)?)
            .await?;
        Ok(labeled("NEP-17 transfers", &result))
    }
}

pub struct GetNep11BalancesTool;

#[async_trait]
impl NeoTool for GetNep11BalancesTool {
    fn name(&self) -> &'static str {
        "get_nep11_balances"
    }

    fn description(&self) -> &'static str {
        "Get all NEP-11 (NFT) balances of an address on the Neo N3 blockchain, grouped by contract with token ids."
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::new(vec![address_param()])
    }

    async fn run(&self, provider: &Neo3Provider, args: &ToolArgs) -> Result<String> {
        let result = provider.get_nep11_balances(args.str("address")?).await?;
        Ok(labeled("NEP-11 balances", &result))
    }
}

pub struct GetNep11PropertiesTool;

#[async_trait]
impl NeoTool for GetNep11PropertiesTool {
    fn name(&self) -> &'static str {
        "get_nep11_properties"
    }

    fn description(&self) -> &'static str {
        "Get the properties (metadata) of a NEP-11 token (NFT) on the Neo N3 blockchain."
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::new(vec![
            ParamSpec::required(
                "contract_hash",
                ParamKind::String,
                "NEP-11 contract script hash in hex",
            ),
            ParamSpec::required("token_id", ParamKind::String, "Token id as hex string"),
        ])
    }

    async fn run(&self, provider: &Neo3Provider, args: &ToolArgs) -> Result<String> {
        let result = provider
            .get_nep11_properties(args.str("contract_hash")?, args.str("token_id")?)
            .await?;
        Ok(labeled("NEP-11 properties", &result))
    }
}

pub struct GetNep11TransfersTool;

#[async_trait]
impl NeoTool for GetNep11TransfersTool {
    fn name(&self) -> &'static str {
        "get_nep11_transfers"
    }

    fn description(&self) -> &'static str {
        "Get the NEP-11 (NFT) transfer history of an address on the Neo N3 blockchain, optionally within a time window."
    }

    fn schema(&self) -> ToolSchema {
        let mut params = vec![address_param()];
        params.extend(range_params());
        ToolSchema::new(params)
    }

    async fn run(&self, provider: &Neo3Provider, args: &ToolArgs) -> Result<String> {
        let result = provider
            .get_nep11_transfers(args.str("address")?, transfer_range(args)?)
            .await?;
        Ok(labeled("NEP-11 transfers", &result))
    }
}
