use async_trait::async_trait;
use serde_json::{json, Value};

use super::schema::{ParamKind, ParamSpec, ToolArgs, ToolSchema};
use super::{labeled, NeoTool};
use crate::error::Result;
use crate::precision;
use crate::provider::Neo3Provider;
use crate::tokens::GAS_DECIMALS;

pub struct ValidateAddressTool;

#[async_trait]
impl NeoTool for ValidateAddressTool {
    fn name(&self) -> &'static str {
        "validate_address"
    }

    fn description(&self) -> &'static str {
        "Check locally whether a string is a well-formed Neo N3 address or script hash, without querying a node. Returns true or false."
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::new(vec![ParamSpec::required(
            "address",
            ParamKind::String,
            "Neo N3 address (e.g. NUqLhf1p1vQyP2KJjMcEwmdEBPnbCGouVp) to check",
        )])
    }

    async fn run(&self, provider: &Neo3Provider, args: &ToolArgs) -> Result<String> {
        let is_valid = provider.validate_address(args.str("address")?);
        Ok(format!("Address validation result: {}", is_valid))
    }
}

pub struct GetUnclaimedGasTool;

/// Adds the GAS-denominated value next to the raw `unclaimed` integer.
fn with_gas_amount(result: Value) -> Value {
    let formatted = result
        .get("unclaimed")
        .and_then(Value::as_str)
        .and_then(|raw| precision::format_amount(raw, GAS_DECIMALS).ok());

    match (formatted, result) {
        (Some(gas), Value::Object(mut map)) => {
            map.insert("unclaimed_gas".to_string(), json!(gas));
            Value::Object(map)
        }
        (_, other) => other,
    }
}

#[async_trait]
impl NeoTool for GetUnclaimedGasTool {
    fn name(&self) -> &'static str {
        "get_unclaimed_gas"
    }

    fn description(&self) -> &'static str {
        "Get the unclaimed GAS of an address on the Neo N3 blockchain, as the raw integer and in GAS."
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema::new(vec![ParamSpec::required(
            "address",
            ParamKind::String,
            "Neo N3 address",
        )])
    }

    async fn run(&self, provider: &Neo3Provider, args: &ToolArgs) -> Result<String> {
        let result = provider.get_unclaimed_gas(args.str("address")?).await?;
        Ok(labeled("Unclaimed gas", &with_gas_amount(result)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::*;
    use mockito::Server;

    const ADDRESS: &str = "NUqLhf1p1vQyP2KJjMcEwmdEBPnbCGouVp";

    #[tokio::test]
    async fn test_validate_address_true() {
        let mut server = Server::new_async().await;
        let mock = server.mock("POST", "/").expect(0).create_async().await;
        let ctx = context_for(&server);

        let result = ValidateAddressTool
            .execute(&ctx, json!({"address": ADDRESS, "network": "mainnet"}))
            .await;
        assert!(result.success);
        assert_eq!(result.output, "Address validation result: true");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_validate_address_false() {
        let server = Server::new_async().await;
        let ctx = context_for(&server);

        let result = ValidateAddressTool
            .execute(&ctx, json!({"address": "invalid_address_123"}))
            .await;
        assert!(result.success);
        assert_eq!(result.output, "Address validation result: false");
    }

    #[test]
    fn test_with_gas_amount() {
        let value = with_gas_amount(json!({"unclaimed": "123456789", "address": ADDRESS}));
        assert_eq!(value["unclaimed_gas"], "1.23456789");
        assert_eq!(value["unclaimed"], "123456789");

        let untouched = with_gas_amount(json!({"unclaimed": "n/a"}));
        assert!(untouched.get("unclaimed_gas").is_none());
    }

    #[tokio::test]
    async fn test_unclaimed_gas_output() {
        let mut server = Server::new_async().await;
        let _m = mock_result(
            &mut server,
            "getunclaimedgas",
            json!({"unclaimed": "50000000", "address": ADDRESS}),
        )
        .await;
        let ctx = context_for(&server);

        let result = GetUnclaimedGasTool
            .execute(&ctx, json!({"address": ADDRESS}))
            .await;
        assert!(result.success, "{}", result.output);
        assert!(result.output.contains("\"unclaimed\":\"50000000\""));
        assert!(result.output.contains("\"unclaimed_gas\":\"0.5\""));
    }
}
