use crate::error::{Neo3Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::time::Duration;

pub const MAINNET_RPC: &str = "https://mainnet1.neo.coz.io:443";
pub const TESTNET_RPC: &str = "https://testnet2.neo.coz.io:443";
pub const DEFAULT_NETWORK: &str = "testnet";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:8080";

/// Network name to RPC endpoint mapping. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkConfig {
    endpoints: BTreeMap<String, String>,
}

impl NetworkConfig {
    /// The public COZ endpoints for mainnet and testnet.
    pub fn standard() -> Self {
        let mut endpoints = BTreeMap::new();
        endpoints.insert("mainnet".to_string(), MAINNET_RPC.to_string());
        endpoints.insert("testnet".to_string(), TESTNET_RPC.to_string());
        NetworkConfig { endpoints }
    }

    pub fn empty() -> Self {
        NetworkConfig {
            endpoints: BTreeMap::new(),
        }
    }

    /// Adds or replaces a network. The URL must parse as http(s).
    pub fn with_network(mut self, name: &str, url: &str) -> Result<Self> {
        let name = name.trim().to_lowercase();
        if name.is_empty() {
            return Err(Neo3Error::Configuration(
                "Network name must not be empty".to_string(),
            ));
        }

        let parsed = url.trim().parse::<url::Url>().map_err(|e| {
            Neo3Error::Configuration(format!("Invalid RPC URL for {}: {}", name, e))
        })?;
        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(Neo3Error::Configuration(format!(
                "Unsupported RPC URL scheme for {}: {}",
                name,
                parsed.scheme()
            )));
        }

        self.endpoints.insert(name, url.trim().to_string());
        Ok(self)
    }

    /// Resolves a network name to its endpoint URL.
    pub fn resolve(&self, network: &str) -> Result<&str> {
        self.endpoints
            .get(&network.trim().to_lowercase())
            .map(String::as_str)
            .ok_or_else(|| {
                Neo3Error::Configuration(format!(
                    "Unknown network '{}', expected one of: {}",
                    network,
                    self.names().join(", ")
                ))
            })
    }

    pub fn names(&self) -> Vec<&str> {
        self.endpoints.keys().map(String::as_str).collect()
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self::standard()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub networks: NetworkConfig,
    pub default_network: String,
    pub timeout_secs: u64,
    pub listen_addr: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let mut networks = NetworkConfig::standard();

        if let Ok(url) = env::var("NEO_MAINNET_RPC") {
            networks = networks.with_network("mainnet", &url)?;
        }
        if let Ok(url) = env::var("NEO_TESTNET_RPC") {
            networks = networks.with_network("testnet", &url)?;
        }
        if let Ok(custom) = env::var("NEO_RPC_NETWORKS") {
            networks = parse_network_list(networks, &custom)?;
        }

        let default_network =
            env::var("NEO_DEFAULT_NETWORK").unwrap_or_else(|_| DEFAULT_NETWORK.to_string());
        networks.resolve(&default_network)?;

        let timeout_secs = env::var("NEO_RPC_TIMEOUT_SECS")
            .unwrap_or_else(|_| DEFAULT_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .map_err(|e| {
                Neo3Error::Configuration(format!("Invalid NEO_RPC_TIMEOUT_SECS: {}", e))
            })?;

        let listen_addr =
            env::var("MCP_LISTEN_ADDR").unwrap_or_else(|_| DEFAULT_LISTEN_ADDR.to_string());

        Ok(Config {
            networks,
            default_network: default_network.to_lowercase(),
            timeout_secs,
            listen_addr,
        })
    }

    pub fn from_networks(networks: NetworkConfig) -> Self {
        Config {
            networks,
            default_network: DEFAULT_NETWORK.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            listen_addr: DEFAULT_LISTEN_ADDR.to_string(),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_networks(NetworkConfig::standard())
    }
}

/// Parses `name=url,name=url` into the given network map.
fn parse_network_list(mut networks: NetworkConfig, list: &str) -> Result<NetworkConfig> {
    for entry in list.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (name, url) = entry.split_once('=').ok_or_else(|| {
            Neo3Error::Configuration(format!(
                "Invalid NEO_RPC_NETWORKS entry '{}', expected name=url",
                entry
            ))
        })?;
        networks = networks.with_network(name, url)?;
    }
    Ok(networks)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_networks_resolve() {
        let networks = NetworkConfig::standard();
        assert_eq!(networks.resolve("mainnet").unwrap(), MAINNET_RPC);
        assert_eq!(networks.resolve("testnet").unwrap(), TESTNET_RPC);
        assert_eq!(networks.resolve("MainNet").unwrap(), MAINNET_RPC);
    }

    #[test]
    fn test_unknown_network_is_configuration_error() {
        let networks = NetworkConfig::standard();
        let err = networks.resolve("privnet").unwrap_err();
        assert!(matches!(err, Neo3Error::Configuration(_)));
        assert!(err.to_string().contains("privnet"));
    }

    #[test]
    fn test_custom_network() {
        let networks = NetworkConfig::standard()
            .with_network("local", "http://127.0.0.1:10332")
            .unwrap();
        assert_eq!(networks.resolve("local").unwrap(), "http://127.0.0.1:10332");
        assert_eq!(networks.names(), vec!["local", "mainnet", "testnet"]);
    }

    #[test]
    fn test_rejects_bad_urls() {
        assert!(NetworkConfig::empty().with_network("x", "not a url").is_err());
        assert!(NetworkConfig::empty()
            .with_network("x", "ftp://example.com")
            .is_err());
        assert!(NetworkConfig::empty()
            .with_network("", "http://example.com")
            .is_err());
    }

    #[test]
    fn test_parse_network_list() {
        let networks = parse_network_list(
            NetworkConfig::empty(),
            "local=http://127.0.0.1:10332, private=https://neo.example.org",
        )
        .unwrap();
        assert_eq!(networks.resolve("private").unwrap(), "https://neo.example.org");
        assert!(parse_network_list(NetworkConfig::empty(), "missing-separator").is_err());
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.default_network, "testnet");
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.listen_addr, "127.0.0.1:8080");
    }
}
