use async_trait::async_trait;
use base64::{engine::general_purpose, Engine as _};
use serde_json::{json, Value};
use tracing::info;

use super::schema::{ParamKind, ParamSpec, ToolArgs, ToolSchema};
use super::{labeled, NeoTool};
use crate::error::{Neo3Error, Result};
use crate::provider::Neo3Provider;

fn contract_param() -> ParamSpec {
    ParamSpec::required(
        "script_hash",
        ParamKind::String,
        "Contract script hash in hex (e.g. 0xef4073a0f2b305a38ec4050e4d3d28bc40ea63f5) or a native contract name (NEO, GAS, PolicyContract, ...)",
    )
}

pub struct GetContractStateTool;

#[async_trait]
impl NeoTool for GetContractStateTool {
    fn name(&self) -> &'static str {
        "get_contract_state"
    }

    fn description(&self) -> &'static str {
        "Get deployed contract state by script hash on the Neo N3 blockchain: id, update counter, NEF and manifest. Returns contract state information."
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::new(vec![contract_param()])
    }

    async fn run(&self, provider: &Neo3Provider, args: &ToolArgs) -> Result<String> {
        let result = provider
            .get_contract_state(args.str("script_hash")?)
            .await?;
        Ok(labeled("Contract state", &result))
    }
}

pub struct GetStorageTool;

/// 解码存储键
fn decode_key(key: &str, encoding: &str) -> Result<Vec<u8>> {
    match encoding {
        "hex" => {
            let digits = key.strip_prefix("0x").unwrap_or(key);
            hex::decode(digits)
                .map_err(|e| Neo3Error::validation(format!("Invalid hex storage key: {}", e)))
        }
        "base64" => general_purpose::STANDARD
            .decode(key)
            .map_err(|e| Neo3Error::validation(format!("Invalid Base64 storage key: {}", e))),
        _ => Ok(key.as_bytes().to_vec()),
    }
}

#[async_trait]
impl NeoTool for GetStorageTool {
    fn name(&self) -> &'static str {
        "get_storage"
    }

    fn description(&self) -> &'static str {
        "Read a contract storage value by script hash and key on the Neo N3 blockchain. Returns the stored value Base64-encoded."
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::new(vec![
            contract_param(),
            ParamSpec::required("key", ParamKind::String, "Storage key"),
            ParamSpec::optional(
                "key_encoding",
                ParamKind::String,
                "How `key` is written: utf8 text, hex bytes or Base64",
            )
            .one_of(vec![json!("utf8"), json!("hex"), json!("base64")])
            .default_value(json!("utf8")),
        ])
    }

    async fn run(&self, provider: &Neo3Provider, args: &ToolArgs) -> Result<String> {
        let key = decode_key(
            args.str("key")?,
            args.opt_str("key_encoding").unwrap_or("utf8"),
        )?;
        let result = provider
            .get_storage(args.str("script_hash")?, &key)
            .await?;
        Ok(labeled("Storage value", &result))
    }
}

pub struct InvokeFunctionTool;

/// Wraps bare JSON scalars as typed contract parameters.
fn to_contract_param(value: &Value) -> Value {
    match value {
        Value::String(s) => json!({"type": "String", "value": s}),
        Value::Bool(b) => json!({"type": "Boolean", "value": b}),
        Value::Number(n) => json!({"type": "Integer", "value": n.to_string()}),
        Value::Array(items) => json!({
            "type": "Array",
            "value": items.iter().map(to_contract_param).collect::<Vec<_>>()
        }),
        other => other.clone(),
    }
}

#[async_trait]
impl NeoTool for InvokeFunctionTool {
    fn name(&self) -> &'static str {
        "invoke_function"
    }

    fn description(&self) -> &'static str {
        "Test-invoke a smart contract method on the Neo N3 blockchain. The node executes it read-only; nothing is signed or broadcast. Returns the VM state, gas consumed and result stack."
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::new(vec![
            contract_param(),
            ParamSpec::required("operation", ParamKind::String, "Method name to invoke"),
            ParamSpec::optional(
                "params",
                ParamKind::Array,
                "Method arguments: {type, value} objects, or plain strings/numbers/booleans",
            ),
            ParamSpec::optional(
                "sender",
                ParamKind::String,
                "Address added as a CalledByEntry signer so witness checks can pass",
            ),
        ])
    }

    async fn run(&self, provider: &Neo3Provider, args: &ToolArgs) -> Result<String> {
        let contract = args.str("script_hash")?;
        let operation = args.str("operation")?;
        let params: Vec<Value> = args.array("params").iter().map(to_contract_param).collect();

        info!(
            "Test-invoking {}.{} with {} params on {}",
            contract,
            operation,
            params.len(),
            provider.network()
        );

        let result = provider
            .invoke_function(contract, operation, &params, args.opt_str("sender"))
            .await?;
        Ok(labeled("Invocation result", &result))
    }
}

pub struct GetNativeContractsTool;

#[async_trait]
impl NeoTool for GetNativeContractsTool {
    fn name(&self) -> &'static str {
        "get_native_contracts"
    }

    fn description(&self) -> &'static str {
        "List the native contracts of the Neo N3 blockchain with their ids, hashes and manifests."
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::default()
    }

    async fn run(&self, provider: &Neo3Provider, _args: &ToolArgs) -> Result<String> {
        let result = provider.get_native_contracts().await?;
        Ok(labeled("Native contracts", &result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::*;
    use mockito::{Matcher, Server};

    #[test]
    fn test_decode_key() {
        assert_eq!(decode_key("abc", "utf8").unwrap(), b"abc".to_vec());
        assert_eq!(decode_key("0x0b01", "hex").unwrap(), vec![0x0b, 0x01]);
        assert_eq!(decode_key("CwE=", "base64").unwrap(), vec![0x0b, 0x01]);
        assert!(decode_key("xyz", "hex").is_err());
        assert!(decode_key("***", "base64").is_err());
    }

    #[test]
    fn test_to_contract_param() {
        assert_eq!(
            to_contract_param(&json!("hello")),
            json!({"type": "String", "value": "hello"})
        );
        assert_eq!(
            to_contract_param(&json!(5)),
            json!({"type": "Integer", "value": "5"})
        );
        assert_eq!(
            to_contract_param(&json!([true])),
            json!({"type": "Array", "value": [{"type": "Boolean", "value": true}]})
        );
        let typed = json!({"type": "Hash160", "value": "0xef4073a0f2b305a38ec4050e4d3d28bc40ea63f5"});
        assert_eq!(to_contract_param(&typed), typed);
    }

    #[tokio::test]
    async fn test_invoke_function_symbol() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .match_body(Matcher::PartialJson(json!({
                "method": "invokefunction",
                "params": ["0xd2a4cff31913016155e38e474a2c06d08be276cf", "symbol", []]
            })))
            .with_status(200)
            .with_body(
                json!({
                    "jsonrpc": "2.0",
                    "id": 1,
                    "result": {"state": "HALT", "gasconsumed": "984060", "stack": [{"type": "ByteString", "value": "R0FT"}]}
                })
                .to_string(),
            )
            .create_async()
            .await;
        let ctx = context_for(&server);

        let result = InvokeFunctionTool
            .execute(&ctx, json!({"script_hash": "GAS", "operation": "symbol"}))
            .await;
        assert!(result.success, "{}", result.output);
        assert!(result.output.starts_with("Invocation result: "));
        assert!(result.output.contains("HALT"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_invoke_function_bad_sender() {
        let mut server = Server::new_async().await;
        let mock = server.mock("POST", "/").expect(0).create_async().await;
        let ctx = context_for(&server);

        let result = InvokeFunctionTool
            .execute(
                &ctx,
                json!({"script_hash": "NEO", "operation": "symbol", "sender": "nobody"}),
            )
            .await;
        assert!(!result.success);
        assert!(result.output.contains("Invalid Neo address"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_contract_state_missing_hash() {
        let server = Server::new_async().await;
        let ctx = context_for(&server);

        let result = GetContractStateTool.execute(&ctx, json!({})).await;
        assert!(!result.success);
        assert!(result.output.contains("script_hash"));
    }

    #[tokio::test]
    async fn test_storage_hex_key() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/")
            .match_body(Matcher::PartialJson(json!({
                "method": "getstorage",
                "params": ["0xef4073a0f2b305a38ec4050e4d3d28bc40ea63f5", "CwE="]
            })))
            .with_status(200)
            .with_body(json!({"jsonrpc": "2.0", "id": 1, "result": "AQ=="}).to_string())
            .create_async()
            .await;
        let ctx = context_for(&server);

        let result = GetStorageTool
            .execute(
                &ctx,
                json!({"script_hash": "NeoToken", "key": "0b01", "key_encoding": "hex"}),
            )
            .await;
        assert_eq!(result.output, "Storage value: AQ==");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_native_contracts_output() {
        let mut server = Server::new_async().await;
        let payload = json!([{"id": -1, "hash": "0xfffdc93764dbaddd97c48f252a53ea4643faa3fd"}]);
        let _m = mock_result(&mut server, "getnativecontracts", payload.clone()).await;
        let ctx = context_for(&server);

        let result = GetNativeContractsTool.execute(&ctx, json!(null)).await;
        assert!(result.success);
        assert_eq!(result.output, format!("Native contracts: {}", payload));
    }
}
