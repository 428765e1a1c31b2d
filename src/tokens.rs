use std::collections::HashMap;

use crate::address::ScriptHash;
use crate::error::{Neo3Error, Result};

pub const NEO_DECIMALS: u8 = 0;
pub const GAS_DECIMALS: u8 = 8;

/// Native contract names and their fixed script hashes
pub struct NativeContracts {
    by_alias: HashMap<String, ScriptHash>,
    names: HashMap<ScriptHash, &'static str>,
}

impl NativeContracts {
    pub fn new() -> Self {
        let mut by_alias = HashMap::new();
        let mut names = HashMap::new();

        // (canonical name, extra aliases, hash)
        let contracts: [(&'static str, &[&str], &str); 9] = [
            (
                "ContractManagement",
                &[],
                "0xfffdc93764dbaddd97c48f252a53ea4643faa3fd",
            ),
            ("StdLib", &[], "0xacce6fd80d44e1796aa0c2c625e9e4e0ce39efc0"),
            ("CryptoLib", &[], "0x726cb6e0cd8628a1350a611384688911ab75f51b"),
            (
                "LedgerContract",
                &["Ledger"],
                "0xda65b600f7124ce6c79950c1772a36403104f2be",
            ),
            (
                "NeoToken",
                &["NEO"],
                "0xef4073a0f2b305a38ec4050e4d3d28bc40ea63f5",
            ),
            (
                "GasToken",
                &["GAS"],
                "0xd2a4cff31913016155e38e474a2c06d08be276cf",
            ),
            (
                "PolicyContract",
                &["Policy"],
                "0xcc5e4edd9f5f8dba8bb65734541df7a1c081c67b",
            ),
            (
                "RoleManagement",
                &[],
                "0x49cf4e5378ffcd4dec034fd98a174c5491e395e2",
            ),
            (
                "OracleContract",
                &["Oracle"],
                "0xfe924b7cfe89ddd271abaf7210a80a7e11178758",
            ),
        ];

        for (name, aliases, hash_str) in contracts {
            if let Ok(hash) = hash_str.parse::<ScriptHash>() {
                by_alias.insert(name.to_lowercase(), hash);
                for alias in aliases {
                    by_alias.insert(alias.to_lowercase(), hash);
                }
                names.insert(hash, name);
            }
        }

        NativeContracts { by_alias, names }
    }

    pub fn hash_of(&self, name: &str) -> Option<ScriptHash> {
        self.by_alias.get(&name.trim().to_lowercase()).copied()
    }

    pub fn name_of(&self, hash: &ScriptHash) -> Option<&'static str> {
        self.names.get(hash).copied()
    }

    /// Resolves a script hash in hex or a native contract name.
    pub fn resolve(&self, identifier: &str) -> Result<ScriptHash> {
        if let Ok(hash) = identifier.parse::<ScriptHash>() {
            return Ok(hash);
        }

        self.hash_of(identifier).ok_or_else(|| {
            Neo3Error::validation(format!(
                "Invalid contract script hash or native contract name: {}",
                identifier
            ))
        })
    }
}

impl Default for NativeContracts {
    fn default() -> Self {
        Self::new()
    }
}
