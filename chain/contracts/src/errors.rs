//! Contract-specific error types
//!
//! Every failure is a precondition violation: the call aborts with no partial
//! effect and the caller must resubmit a corrected request. Nothing here is
//! retried internally.

use thiserror::Error;
use trade_types::ids::{Address, TradeId};
use trade_types::payload::PayloadError;
use trade_types::trade::TradeStatus;

use crate::roles::Role;

/// Signature recovery errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignatureError {
    #[error("Invalid signature length: expected 65 bytes, got {len}")]
    InvalidSignatureLength { len: usize },

    #[error("Invalid recovery id: {v}")]
    InvalidRecoveryId { v: u8 },

    #[error("Malformed signature: r or s outside the curve order")]
    MalformedSignature,

    #[error("Malleable signature: s in the upper half of the curve order")]
    MalleableSignature,

    #[error("Public key recovery failed")]
    RecoveryFailed,
}

/// Ownership registry errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OwnershipError {
    #[error("Token {trade_id} already minted")]
    AlreadyMinted { trade_id: TradeId },

    #[error("Token {trade_id} does not exist")]
    NonexistentToken { trade_id: TradeId },

    #[error("Cannot mint to the zero address")]
    MintToZeroAddress,

    #[error("{caller} does not own token {trade_id}")]
    NotOwner { caller: Address, trade_id: TradeId },

    #[error("Token {trade_id} is soulbound and cannot be transferred")]
    SoulboundTransfer { trade_id: TradeId },
}

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Configuration field {field} must not be the zero address")]
    ZeroAddress { field: &'static str },

    #[error("Configuration parse error: {0}")]
    Parse(String),
}

/// Trade engine errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TradeError {
    // ── authorization ──
    #[error("Contract is paused")]
    ContractPaused,

    #[error("Contract is not paused")]
    ContractNotPaused,

    #[error("Reentrancy detected")]
    Reentrancy,

    #[error("Unauthorized: {caller} lacks role {role}")]
    Unauthorized { caller: Address, role: Role },

    #[error("Invalid signer: recovered {recovered} does not hold the signer role")]
    InvalidSigner { recovered: Address },

    #[error("Identity mismatch: expected {expected}, caller is {caller}")]
    IdentityMismatch { expected: Address, caller: Address },

    #[error("Signature expired at {expiry}, now {now}")]
    SignatureExpired { expiry: i64, now: i64 },

    #[error("Signature error: {0}")]
    Signature(#[from] SignatureError),

    // ── state ──
    #[error("Trade already exists: {trade_id}")]
    TradeAlreadyExists { trade_id: TradeId },

    #[error("Trade not found: {trade_id}")]
    TradeNotFound { trade_id: TradeId },

    #[error("Trade {trade_id} not expired: ends at {end_time}")]
    TradeNotExpired { trade_id: TradeId, end_time: i64 },

    #[error("Trade {trade_id} not in CREATED state: {status}")]
    TradeNotInCreatedState { trade_id: TradeId, status: TradeStatus },

    #[error("Trade already claimed: {trade_id}")]
    TradeAlreadyClaimed { trade_id: TradeId },

    #[error("Ownership error: {0}")]
    Ownership(#[from] OwnershipError),

    // ── input ──
    #[error("Invalid payload: {0}")]
    InvalidPayload(#[from] PayloadError),

    #[error("Empty batch: no trade ids supplied")]
    EmptyBatch,

    #[error("Empty string")]
    EmptyString,

    #[error("Zero address")]
    ZeroAddress,

    #[error("Same value as previous")]
    SameValueAsPrevious,

    #[error("{account} already has role {role}")]
    AlreadyHasRole { account: Address, role: Role },

    #[error("{account} does not have role {role}")]
    DoesNotHaveRole { account: Address, role: Role },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Arithmetic overflow in reward total")]
    Overflow,

    // ── external dependency ──
    #[error("Transfer of {amount} {asset} from {from} to {to} failed")]
    TransferFailed {
        asset: Address,
        from: Address,
        to: Address,
        amount: u128,
    },
}
