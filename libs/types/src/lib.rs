//! Types library for signed prediction-trade settlement
//!
//! Shared definitions used by the contract layer and by the off-chain signer,
//! so both sides agree byte-for-byte on what gets signed.
//!
//! # Version
//! v1.0.0 - Frozen payload schema
//!
//! # Modules
//! - `ids`: Identities and identifiers (Address, TradeId)
//! - `trade`: Trade record and lifecycle status
//! - `payload`: Signed payload formats and their binary codec
//! - `digest`: Keccak-256 and signed-message hashing

// Public modules
pub mod ids;
pub mod trade;
pub mod payload;
pub mod digest;

// Library version constant
pub const LIB_VERSION: &str = "1.0.0";

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::ids::*;
    pub use crate::trade::*;
    pub use crate::payload::*;
    pub use crate::digest::*;
}
