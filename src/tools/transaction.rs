use async_trait::async_trait;
use serde_json::json;

use super::schema::{ParamKind, ParamSpec, ToolArgs, ToolSchema};
use super::{labeled, NeoTool};
use crate::error::Result;
use crate::provider::Neo3Provider;

fn txid_param() -> ParamSpec {
    ParamSpec::required(
        "txid",
        ParamKind::String,
        "Transaction hash, 64 hex characters with optional 0x prefix",
    )
}

pub struct GetRawTransactionTool;

#[async_trait]
impl NeoTool for GetRawTransactionTool {
    fn name(&self) -> &'static str {
        "get_raw_transaction"
    }

    fn description(&self) -> &'static str {
        "Get transaction details by transaction hash on the Neo N3 blockchain, including signers, scripts, fees and confirmations. Returns transaction information."
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::new(vec![
            txid_param(),
            ParamSpec::optional(
                "verbose",
                ParamKind::Flag,
                "Return JSON (1/true) instead of the Base64 serialized transaction (0/false)",
            )
            .default_value(json!(0)),
        ])
    }

    async fn run(&self, provider: &Neo3Provider, args: &ToolArgs) -> Result<String> {
        let result = provider
            .get_raw_transaction(args.str("txid")?, args.flag("verbose"))
            .await?;
        Ok(labeled("Transaction info", &result))
    }
}

pub struct GetRawMempoolTool;

#[async_trait]
impl NeoTool for GetRawMempoolTool {
    fn name(&self) -> &'static str {
        "get_raw_mempool"
    }

    fn description(&self) -> &'static str {
        "List transactions currently in the Neo N3 memory pool. Useful to see pending, unconfirmed transactions. Returns transaction hashes."
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::new(vec![ParamSpec::optional(
            "should_get_unverified",
            ParamKind::Flag,
            "Also return unverified transactions (1/true), grouped with the verified ones and the pool height",
        )
        .default_value(json!(0))])
    }

    async fn run(&self, provider: &Neo3Provider, args: &ToolArgs) -> Result<String> {
        let result = provider
            .get_raw_mempool(args.flag("should_get_unverified"))
            .await?;
        Ok(labeled("Mempool transactions", &result))
    }
}

pub struct GetTransactionHeightTool;

#[async_trait]
impl NeoTool for GetTransactionHeightTool {
    fn name(&self) -> &'static str {
        "get_transaction_height"
    }

    fn description(&self) -> &'static str {
        "Get the height of the block that included a transaction on the Neo N3 blockchain. Returns the block height as an integer."
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::new(vec![txid_param()])
    }

    async fn run(&self, provider: &Neo3Provider, args: &ToolArgs) -> Result<String> {
        let height = provider.get_transaction_height(args.str("txid")?).await?;
        Ok(format!("Transaction height: {}", height))
    }
}

pub struct GetApplicationLogTool;

#[async_trait]
impl NeoTool for GetApplicationLogTool {
    fn name(&self) -> &'static str {
        "get_application_log"
    }

    fn description(&self) -> &'static str {
        "Get the application log of a transaction on the Neo N3 blockchain: VM state, gas consumed, notifications and stack. Requires the ApplicationLogs plugin on the node."
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::new(vec![txid_param()])
    }

    async fn run(&self, provider: &Neo3Provider, args: &ToolArgs) -> Result<String> {
        let result = provider.get_application_log(args.str("txid")?).await?;
        Ok(labeled("Application log", &result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::*;
    use mockito::{Matcher, Server};

    const TXID: &str = "0x4b3a4c1b0e26b1f5b4a4e5a8e5e6b0a7b0c6d2e1f3a4b5c6d7e8f9a0b1c2d3e4";

    #[tokio::test]
    async fn test_mempool_rpc_error_becomes_failed_result() {
        let mut server = Server::new_async().await;
        let _m = mock_error(&mut server, "getrawmempool", -32602, "Invalid params").await;
        let ctx = context_for(&server);

        let result = GetRawMempoolTool
            .execute(&ctx, json!({"should_get_unverified": 0, "network": "mainnet"}))
            .await;
        assert!(!result.success);
        assert!(result.output.contains("-32602"));
        assert!(result.output.contains("Invalid params"));
    }

    #[tokio::test]
    async fn test_mempool_unverified_flag() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .match_body(Matcher::PartialJson(
                json!({"method": "getrawmempool", "params": [true]}),
            ))
            .with_status(200)
            .with_body(
                json!({
                    "jsonrpc": "2.0",
                    "id": 1,
                    "result": {"height": 10, "verified": [TXID], "unverified": []}
                })
                .to_string(),
            )
            .create_async()
            .await;
        let ctx = context_for(&server);

        let result = GetRawMempoolTool
            .execute(&ctx, json!({"should_get_unverified": true}))
            .await;
        assert!(result.success, "{}", result.output);
        assert!(result.output.contains(TXID));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_transaction_height() {
        let mut server = Server::new_async().await;
        let _m = mock_result(&mut server, "gettransactionheight", json!(5000)).await;
        let ctx = context_for(&server);

        let result = GetTransactionHeightTool
            .execute(&ctx, json!({"txid": TXID}))
            .await;
        assert_eq!(result.output, "Transaction height: 5000");
    }

    #[tokio::test]
    async fn test_raw_transaction_payload_in_output() {
        let mut server = Server::new_async().await;
        let payload = json!({"hash": TXID, "sysfee": "100", "netfee": "200"});
        let _m = mock_result(&mut server, "getrawtransaction", payload.clone()).await;
        let ctx = context_for(&server);

        let result = GetRawTransactionTool
            .execute(&ctx, json!({"txid": TXID, "verbose": 1}))
            .await;
        assert!(result.success);
        assert_eq!(result.output, format!("Transaction info: {}", payload));
    }

    #[tokio::test]
    async fn test_application_log_rejects_bad_hash() {
        let mut server = Server::new_async().await;
        let mock = server.mock("POST", "/").expect(0).create_async().await;
        let ctx = context_for(&server);

        let result = GetApplicationLogTool
            .execute(&ctx, json!({"txid": "0xdeadbeef"}))
            .await;
        assert!(!result.success);
        assert!(result.output.contains("Invalid transaction hash"));
        mock.assert_async().await;
    }
}
