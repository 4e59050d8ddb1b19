//! Smart Contract Logic for Signed Prediction-Trade Settlement
//!
//! A trader escrows a fee against terms a trusted signer has attested to;
//! after the trade's window closes, either an admin resolves it or the trader
//! claims the reward with a fresh signer attestation.
//!
//! # Modules
//! - `errors`: Contract error taxonomy
//! - `events`: Emitted records (the observability boundary)
//! - `security`: Reentrancy guard and pause gate
//! - `signature`: Signer recovery from 65-byte recoverable signatures
//! - `roles`: Capability store (super-admin, admin, signer)
//! - `token`: Fungible token ledger collaborator
//! - `ownership`: Soulbound ownership registry collaborator
//! - `config`: Engine configuration (threshold, treasury, admin-fee account)
//! - `ledger`: Trade records, counter, metadata; all trade state transitions
//! - `engine`: Trade lifecycle engine (atomic, non-reentrant entry points)
//!
//! # Version
//! v0.1.0: Initial implementation

pub mod errors;
pub mod events;
pub mod security;
pub mod signature;
pub mod roles;
pub mod token;
pub mod ownership;
pub mod config;
pub mod ledger;
pub mod engine;
mod lifecycle;
mod admin;

pub use engine::{MemoryTradeEngine, TradeEngine};

/// Contract ABI version, frozen after release
pub const CONTRACT_ABI_VERSION: &str = "1.0.0";
