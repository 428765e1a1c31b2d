//! Neo N3 addresses, script hashes and 256-bit hashes.
//!
//! Everything here is local syntax checking; nothing talks to a node.

use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

use crate::error::{Neo3Error, Result};

/// Address version byte for Neo N3 (mainnet and testnet share it).
pub const ADDRESS_VERSION: u8 = 0x35;

const ADDRESS_PAYLOAD_LEN: usize = 21;
const CHECKSUM_LEN: usize = 4;

/// A 20-byte script hash (UInt160).
///
/// Bytes are stored in serialization order (little-endian); the textual form
/// is the reversed bytes as `0x`-prefixed lowercase hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScriptHash([u8; 20]);

impl ScriptHash {
    pub fn from_le_bytes(bytes: [u8; 20]) -> Self {
        ScriptHash(bytes)
    }

    pub fn as_le_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Hex form without the `0x` prefix, as some plugin RPCs expect it.
    pub fn to_plain_hex(&self) -> String {
        let mut be = self.0;
        be.reverse();
        hex::encode(be)
    }

    pub fn to_address(&self) -> String {
        let mut payload = Vec::with_capacity(ADDRESS_PAYLOAD_LEN + CHECKSUM_LEN);
        payload.push(ADDRESS_VERSION);
        payload.extend_from_slice(&self.0);
        let checksum = hash256(&payload);
        payload.extend_from_slice(&checksum[..CHECKSUM_LEN]);
        bs58::encode(payload).into_string()
    }
}

impl FromStr for ScriptHash {
    type Err = Neo3Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut bytes: [u8; 20] = decode_fixed_hex(s, "script hash")?;
        bytes.reverse();
        Ok(ScriptHash(bytes))
    }
}

impl fmt::Display for ScriptHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_plain_hex())
    }
}

/// A 32-byte block or transaction hash (UInt256), textual form `0x` + hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hash256([u8; 32]);

impl FromStr for Hash256 {
    type Err = Neo3Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(Hash256(decode_fixed_hex(s, "hash")?))
    }
}

impl fmt::Display for Hash256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

fn decode_fixed_hex<const N: usize>(s: &str, what: &str) -> Result<[u8; N]> {
    let trimmed = s.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    if digits.len() != N * 2 {
        return Err(Neo3Error::validation(format!(
            "Invalid {}: expected {} hex characters, got {} in '{}'",
            what,
            N * 2,
            digits.len(),
            s
        )));
    }

    let mut out = [0u8; N];
    hex::decode_to_slice(digits, &mut out)
        .map_err(|e| Neo3Error::validation(format!("Invalid {} '{}': {}", what, s, e)))?;
    Ok(out)
}

fn hash256(data: &[u8]) -> [u8; 32] {
    let first = Sha256::digest(data);
    Sha256::digest(first).into()
}

/// Decodes a Base58Check Neo N3 address into its script hash.
pub fn address_to_script_hash(address: &str) -> Result<ScriptHash> {
    let bytes = bs58::decode(address.trim())
        .into_vec()
        .map_err(|e| Neo3Error::validation(format!("Invalid Neo address '{}': {}", address, e)))?;

    if bytes.len() != ADDRESS_PAYLOAD_LEN + CHECKSUM_LEN {
        return Err(Neo3Error::validation(format!(
            "Invalid Neo address '{}': expected {} bytes after Base58 decoding, got {}",
            address,
            ADDRESS_PAYLOAD_LEN + CHECKSUM_LEN,
            bytes.len()
        )));
    }

    let (payload, checksum) = bytes.split_at(ADDRESS_PAYLOAD_LEN);
    if checksum != &hash256(payload)[..CHECKSUM_LEN] {
        return Err(Neo3Error::validation(format!(
            "Invalid Neo address '{}': checksum mismatch",
            address
        )));
    }
    if payload[0] != ADDRESS_VERSION {
        return Err(Neo3Error::validation(format!(
            "Invalid Neo address '{}': version {} is not a Neo N3 address",
            address, payload[0]
        )));
    }

    let mut hash = [0u8; 20];
    hash.copy_from_slice(&payload[1..]);
    Ok(ScriptHash(hash))
}

/// Accepts either a Neo N3 address or a script hash in hex.
pub fn parse_account(input: &str) -> Result<ScriptHash> {
    if let Ok(hash) = input.parse::<ScriptHash>() {
        return Ok(hash);
    }
    address_to_script_hash(input)
        .map_err(|_| Neo3Error::validation(format!("Invalid Neo address: {}", input)))
}

pub fn validate_address(input: &str) -> bool {
    parse_account(input).is_ok()
}
