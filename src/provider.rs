//! Neo N3 data provider.
//!
//! One async method per supported node RPC. Arguments are checked locally
//! before anything is sent; each method makes exactly one request.

use base64::{engine::general_purpose, Engine as _};
use serde_json::{json, Value};
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

use crate::address::{self, Hash256, ScriptHash};
use crate::config::NetworkConfig;
use crate::error::{Neo3Error, Result};
use crate::rpc::RpcClient;
use crate::tokens::NativeContracts;

/// A block reference: height or hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockId {
    Index(u32),
    Hash(Hash256),
}

impl FromStr for BlockId {
    type Err = Neo3Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return trimmed
                .parse::<u32>()
                .map(BlockId::Index)
                .map_err(|_| Neo3Error::validation(format!("Block index out of range: {}", s)));
        }
        trimmed
            .parse::<Hash256>()
            .map(BlockId::Hash)
            .map_err(|_| Neo3Error::validation(format!("Invalid block hash or index: {}", s)))
    }
}

impl BlockId {
    fn to_param(self) -> Value {
        match self {
            BlockId::Index(index) => json!(index),
            BlockId::Hash(hash) => json!(hash.to_string()),
        }
    }
}

/// Optional time window for NEP-11/NEP-17 transfer history, in Unix milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransferRange {
    pub start: Option<u64>,
    pub end: Option<u64>,
}

impl TransferRange {
    pub fn since(start: u64) -> Self {
        TransferRange {
            start: Some(start),
            end: None,
        }
    }

    fn append_params(&self, params: &mut Vec<Value>) -> Result<()> {
        match (self.start, self.end) {
            (None, None) => {}
            (Some(start), None) => params.push(json!(start)),
            (Some(start), Some(end)) => {
                if end < start {
                    return Err(Neo3Error::validation(format!(
                        "End time {} is before start time {}",
                        end, start
                    )));
                }
                params.push(json!(start));
                params.push(json!(end));
            }
            (None, Some(_)) => {
                return Err(Neo3Error::validation(
                    "An end time requires a start time",
                ))
            }
        }
        Ok(())
    }
}

pub struct Neo3Provider {
    network: String,
    rpc: RpcClient,
    natives: NativeContracts,
}

impl Neo3Provider {
    /// Resolves `network` against the configured endpoints.
    pub fn new(networks: &NetworkConfig, network: &str, timeout: Duration) -> Result<Self> {
        let url = networks.resolve(network)?;
        Self::from_url(network, url, timeout)
    }

    pub fn from_url(network: &str, url: &str, timeout: Duration) -> Result<Self> {
        Ok(Self::with_rpc(network, RpcClient::new(url, timeout)?))
    }

    /// Builds a provider over an existing transport (shared connection pool).
    pub fn with_rpc(network: &str, rpc: RpcClient) -> Self {
        Neo3Provider {
            network: network.trim().to_lowercase(),
            rpc,
            natives: NativeContracts::new(),
        }
    }

    pub fn network(&self) -> &str {
        &self.network
    }

    pub fn rpc_url(&self) -> &str {
        self.rpc.rpc_url()
    }

    /// Releases this handle on the connection pool.
    pub fn close(self) {
        debug!("Closing Neo provider for {}", self.network);
    }

    async fn request(&self, method: &str, params: Vec<Value>) -> Result<Value> {
        self.rpc.call(method, params).await
    }

    fn address_param(&self, address: &str) -> Result<Value> {
        if !address::validate_address(address) {
            return Err(Neo3Error::validation(format!(
                "Invalid Neo address: {}",
                address
            )));
        }
        Ok(json!(address.trim()))
    }

    fn contract_hash(&self, identifier: &str) -> Result<ScriptHash> {
        self.natives.resolve(identifier)
    }

    // Blockchain

    pub async fn get_block_count(&self) -> Result<u64> {
        let result = self.request("getblockcount", vec![]).await?;
        as_u64(&result, "getblockcount")
    }

    pub async fn get_best_block_hash(&self) -> Result<String> {
        let result = self.request("getbestblockhash", vec![]).await?;
        as_string(result, "getbestblockhash")
    }

    pub async fn get_block(&self, block: BlockId, verbose: bool) -> Result<Value> {
        self.request("getblock", vec![block.to_param(), json!(verbose)])
            .await
    }

    pub async fn get_block_header(&self, block: BlockId, verbose: bool) -> Result<Value> {
        self.request("getblockheader", vec![block.to_param(), json!(verbose)])
            .await
    }

    pub async fn get_block_hash(&self, index: u32) -> Result<String> {
        let result = self.request("getblockhash", vec![json!(index)]).await?;
        as_string(result, "getblockhash")
    }

    pub async fn get_raw_transaction(&self, txid: &str, verbose: bool) -> Result<Value> {
        let hash = parse_txid(txid)?;
        self.request(
            "getrawtransaction",
            vec![json!(hash.to_string()), json!(verbose)],
        )
        .await
    }

    /// Verified mempool hashes, or `{height, verified, unverified}` when
    /// `include_unverified` is set.
    pub async fn get_raw_mempool(&self, include_unverified: bool) -> Result<Value> {
        let params = if include_unverified {
            vec![json!(true)]
        } else {
            vec![]
        };
        self.request("getrawmempool", params).await
    }

    pub async fn get_transaction_height(&self, txid: &str) -> Result<u64> {
        let hash = parse_txid(txid)?;
        let result = self
            .request("gettransactionheight", vec![json!(hash.to_string())])
            .await?;
        as_u64(&result, "gettransactionheight")
    }

    pub async fn get_application_log(&self, txid: &str) -> Result<Value> {
        let hash = parse_txid(txid)?;
        self.request("getapplicationlog", vec![json!(hash.to_string())])
            .await
    }

    // Smart contracts

    pub async fn get_contract_state(&self, contract: &str) -> Result<Value> {
        let hash = self.contract_hash(contract)?;
        self.request("getcontractstate", vec![json!(hash.to_string())])
            .await
    }

    /// Reads one storage entry. `key` is the raw key; it is sent Base64-encoded.
    pub async fn get_storage(&self, contract: &str, key: &[u8]) -> Result<Value> {
        let hash = self.contract_hash(contract)?;
        if key.is_empty() {
            return Err(Neo3Error::validation("Storage key must not be empty"));
        }
        let encoded = general_purpose::STANDARD.encode(key);
        self.request(
            "getstorage",
            vec![json!(hash.to_string()), json!(encoded)],
        )
        .await
    }

    /// Test-invokes a contract method on the node. Nothing is signed or relayed.
    pub async fn invoke_function(
        &self,
        contract: &str,
        operation: &str,
        params: &[Value],
        sender: Option<&str>,
    ) -> Result<Value> {
        let hash = self.contract_hash(contract)?;

        let operation = operation.trim();
        if operation.is_empty() {
            return Err(Neo3Error::validation("Operation name must not be empty"));
        }

        for (i, param) in params.iter().enumerate() {
            let has_type = param
                .as_object()
                .and_then(|obj| obj.get("type"))
                .and_then(Value::as_str)
                .is_some();
            if !has_type {
                return Err(Neo3Error::validation(format!(
                    "Contract parameter {} must be an object with a 'type' field, got {}",
                    i, param
                )));
            }
        }

        let mut rpc_params = vec![
            json!(hash.to_string()),
            json!(operation),
            Value::Array(params.to_vec()),
        ];

        if let Some(sender) = sender {
            let account = address::parse_account(sender)?;
            rpc_params.push(json!([{
                "account": account.to_string(),
                "scopes": "CalledByEntry"
            }]));
        }

        self.request("invokefunction", rpc_params).await
    }

    pub async fn get_native_contracts(&self) -> Result<Value> {
        self.request("getnativecontracts", vec![]).await
    }

    pub async fn get_unclaimed_gas(&self, address: &str) -> Result<Value> {
        let param = self.address_param(address)?;
        self.request("getunclaimedgas", vec![param]).await
    }

    // Governance

    pub async fn get_committee(&self) -> Result<Value> {
        self.request("getcommittee", vec![]).await
    }

    pub async fn get_next_block_validators(&self) -> Result<Value> {
        self.request("getnextblockvalidators", vec![]).await
    }

    // Node

    pub async fn get_connection_count(&self) -> Result<u64> {
        let result = self.request("getconnectioncount", vec![]).await?;
        as_u64(&result, "getconnectioncount")
    }

    pub async fn get_peers(&self) -> Result<Value> {
        self.request("getpeers", vec![]).await
    }

    pub async fn get_version(&self) -> Result<Value> {
        self.request("getversion", vec![]).await
    }

    // TokensTracker plugin

    pub async fn get_nep17_balances(&self, address: &str) -> Result<Value> {
        let param = self.address_param(address)?;
        self.request("getnep17balances", vec![param]).await
    }

    pub async fn get_nep17_transfers(&self, address: &str, range: TransferRange) -> Result<Value> {
        let mut params = vec![self.address_param(address)?];
        range.append_params(&mut params)?;
        self.request("getnep17transfers", params).await
    }

    pub async fn get_nep11_balances(&self, address: &str) -> Result<Value> {
        let param = self.address_param(address)?;
        self.request("getnep11balances", vec![param]).await
    }

    /// TokensTracker expects the contract hash without the `0x` prefix.
    pub async fn get_nep11_properties(&self, contract: &str, token_id: &str) -> Result<Value> {
        let hash = self.contract_hash(contract)?;
        let token_id = token_id.trim();
        if token_id.is_empty() {
            return Err(Neo3Error::validation("Token id must not be empty"));
        }
        self.request(
            "getnep11properties",
            vec![json!(hash.to_plain_hex()), json!(token_id)],
        )
        .await
    }

    pub async fn get_nep11_transfers(&self, address: &str, range: TransferRange) -> Result<Value> {
        let mut params = vec![self.address_param(address)?];
        range.append_params(&mut params)?;
        self.request("getnep11transfers", params).await
    }

    // StateService plugin

    pub async fn get_state_root(&self, index: u32) -> Result<Value> {
        self.request("getstateroot", vec![json!(index)]).await
    }

    pub async fn get_state_height(&self) -> Result<Value> {
        self.request("getstateheight", vec![]).await
    }

    // Local

    pub fn validate_address(&self, address: &str) -> bool {
        address::validate_address(address)
    }
}

fn parse_txid(txid: &str) -> Result<Hash256> {
    txid.parse::<Hash256>()
        .map_err(|_| Neo3Error::validation(format!("Invalid transaction hash: {}", txid)))
}

fn as_u64(value: &Value, method: &str) -> Result<u64> {
    value.as_u64().ok_or_else(|| {
        Neo3Error::Serialization(format!("{} returned a non-integer result: {}", method, value))
    })
}

fn as_string(value: Value, method: &str) -> Result<String> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(Neo3Error::Serialization(format!(
            "{} returned a non-string result: {}",
            method, other
        ))),
    }
}
