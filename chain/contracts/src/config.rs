//! Engine configuration
//!
//! The three admin-writable settings that drive fund routing. Hosts load the
//! initial values from JSON; afterwards they change only through the admin
//! setters on the engine.

use serde::{Deserialize, Serialize};
use trade_types::ids::Address;

use crate::errors::ConfigError;

/// Configuration for the trade engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Custody cutoff: above it, incoming trade amounts bypass the contract
    /// and go straight to the treasury.
    pub threshold_amount: u128,
    /// Receives trade amounts once custody exceeds the threshold.
    pub treasury_account: Address,
    /// Receives every admin fee.
    pub admin_fee_account: Address,
}

impl EngineConfig {
    pub fn new(threshold_amount: u128, treasury_account: Address, admin_fee_account: Address) -> Self {
        Self {
            threshold_amount,
            treasury_account,
            admin_fee_account,
        }
    }

    /// Parse and validate a JSON document.
    ///
    /// ```json
    /// { "threshold_amount": 1000,
    ///   "treasury_account": "0x…",
    ///   "admin_fee_account": "0x…" }
    /// ```
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject null accounts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.treasury_account.is_zero() {
            return Err(ConfigError::ZeroAddress {
                field: "treasury_account",
            });
        }
        if self.admin_fee_account.is_zero() {
            return Err(ConfigError::ZeroAddress {
                field: "admin_fee_account",
            });
        }
        Ok(())
    }
}
