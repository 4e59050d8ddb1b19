//! Trade Signer: off-chain authorization toolkit
//!
//! Used by the trusted signer service (and by tests) to produce the
//! authorizations the settlement contract accepts:
//! - Key handling for secp256k1 signer keys
//! - Deterministic payload encoding via `trade-types`
//! - Recoverable 65-byte signatures over the signed-message digest
//!
//! # Determinism
//! Signing uses RFC 6979 nonces: the same key and payload always yield the
//! same signature bytes.

pub mod signing;

pub use signing::{SignedAuthorization, SignerKey, SigningError};

/// Crate version constant
pub const SIGNER_VERSION: &str = "1.0.0";
