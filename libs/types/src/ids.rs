//! Identity and identifier types for settlement entities
//!
//! `Address` is a 20-byte account identity derived from a secp256k1 public key.
//! The all-zero address is the null identity and is never a valid participant.
//! `TradeId` is supplied by the caller (inside the signed payload), so its
//! uniqueness is enforced by the contract rather than by construction.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::digest::keccak256;

/// Length of an address in bytes
pub const ADDRESS_LEN: usize = 20;

/// Account identity (user, signer, treasury, token contract, ...)
///
/// Serializes as a `0x`-prefixed hex string in human-readable formats (JSON
/// config, event export) and as 20 raw bytes in binary formats (signed payloads).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address([u8; ADDRESS_LEN]);

impl Address {
    /// The null identity
    pub const ZERO: Address = Address([0u8; ADDRESS_LEN]);

    pub const fn new(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }

    /// Address with every byte set to `byte`. Handy for fixed test identities.
    pub const fn repeat_byte(byte: u8) -> Self {
        Self([byte; ADDRESS_LEN])
    }

    /// Derive an address from an uncompressed public key (64 bytes, without
    /// the `0x04` tag): the last 20 bytes of its Keccak-256 hash.
    pub fn from_public_key(uncompressed: &[u8; 64]) -> Self {
        let hash = keccak256(uncompressed);
        let mut bytes = [0u8; ADDRESS_LEN];
        bytes.copy_from_slice(&hash[12..]);
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; ADDRESS_LEN] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; ADDRESS_LEN]
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// Failure to parse an address from text
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressParseError {
    #[error("Invalid hex in address: {0}")]
    InvalidHex(String),

    #[error("Invalid address length: expected {ADDRESS_LEN} bytes, got {0}")]
    InvalidLength(usize),
}

impl FromStr for Address {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let raw = hex::decode(digits).map_err(|e| AddressParseError::InvalidHex(e.to_string()))?;
        let bytes: [u8; ADDRESS_LEN] = raw
            .try_into()
            .map_err(|raw: Vec<u8>| AddressParseError::InvalidLength(raw.len()))?;
        Ok(Self(bytes))
    }
}

impl From<[u8; ADDRESS_LEN]> for Address {
    fn from(bytes: [u8; ADDRESS_LEN]) -> Self {
        Self(bytes)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.collect_str(self)
        } else {
            self.0.serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let text = String::deserialize(deserializer)?;
            text.parse().map_err(serde::de::Error::custom)
        } else {
            <[u8; ADDRESS_LEN]>::deserialize(deserializer).map(Self)
        }
    }
}

/// Unique identifier for a trade
///
/// Chosen by the off-chain signer and embedded in the signed creation payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TradeId(u64);

impl TradeId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl From<u64> for TradeId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for TradeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
