//! Signed payload formats
//!
//! The signer attests to the exact encoded bytes, so the encoding must be
//! deterministic: bincode with fixed-width big-endian integers, a size cap,
//! and trailing bytes rejected. Decoding is kept apart from signature
//! verification; the verifier only ever sees opaque bytes.

use bincode::Options;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ids::{Address, TradeId};
use crate::trade::Trade;

/// Payload schema version (frozen).
pub const PAYLOAD_SCHEMA_VERSION: &str = "1.0.0";

/// Upper bound on an encoded payload, enforced while decoding.
pub const MAX_PAYLOAD_BYTES: u64 = 64 * 1024;

/// Payload codec errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PayloadError {
    #[error("Payload encoding failed: {0}")]
    Encode(String),

    #[error("Payload decoding failed: {0}")]
    Decode(String),
}

fn codec() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .with_big_endian()
        .with_limit(MAX_PAYLOAD_BYTES)
        .reject_trailing_bytes()
}

/// A payload that travels as signed bytes.
pub trait SignedPayload: Serialize + DeserializeOwned {
    /// Last unix second at which the authorization is valid.
    fn expiry(&self) -> i64;

    fn encode(&self) -> Result<Vec<u8>, PayloadError> {
        codec()
            .serialize(self)
            .map_err(|e| PayloadError::Encode(e.to_string()))
    }

    fn decode(bytes: &[u8]) -> Result<Self, PayloadError> {
        codec()
            .deserialize(bytes)
            .map_err(|e| PayloadError::Decode(e.to_string()))
    }
}

/// Terms of a new trade, as attested by a signer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTradePayload {
    pub trade_id: TradeId,
    pub trader: Address,
    pub start_time: i64,
    pub end_time: i64,
    pub settlement_asset: Address,
    pub amount: u128,
    pub admin_fee: u128,
    pub reward: u128,
    pub expiry: i64,
}

impl CreateTradePayload {
    /// The trade record these terms open.
    pub fn to_trade(&self) -> Trade {
        Trade::open(
            self.trader,
            self.start_time,
            self.end_time,
            self.settlement_asset,
            self.amount,
            self.admin_fee,
            self.reward,
        )
    }
}

impl SignedPayload for CreateTradePayload {
    fn expiry(&self) -> i64 {
        self.expiry
    }
}

/// A batch of trades the signer agrees may be claimed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimPayload {
    pub trade_ids: Vec<TradeId>,
    pub expiry: i64,
}

impl SignedPayload for ClaimPayload {
    fn expiry(&self) -> i64 {
        self.expiry
    }
}
