//! Trade record and lifecycle status
//!
//! A trade is created once, then settled at most once, either by an admin
//! resolution or by the trader's signer-authorized claim.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::ids::Address;

/// Trade lifecycle status
///
/// `Created` is the only non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TradeStatus {
    /// Fee escrowed, awaiting expiry and settlement
    Created,
    /// Settled in the trader's favor (terminal)
    Won,
    /// Settled against the trader (terminal)
    Lost,
}

impl fmt::Display for TradeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TradeStatus::Created => "CREATED",
            TradeStatus::Won => "WON",
            TradeStatus::Lost => "LOST",
        };
        f.write_str(label)
    }
}

/// Outcome an admin may assign when resolving trades
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Resolution {
    Won,
    Lost,
}

impl From<Resolution> for TradeStatus {
    fn from(resolution: Resolution) -> Self {
        match resolution {
            Resolution::Won => TradeStatus::Won,
            Resolution::Lost => TradeStatus::Lost,
        }
    }
}

/// A single escrow-and-settle unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trade {
    pub trader: Address,
    pub start_time: i64, // Unix seconds
    pub end_time: i64,
    pub settlement_asset: Address,
    pub amount: u128,
    pub admin_fee: u128,
    pub reward: u128,
    pub claimed: bool,
    pub status: TradeStatus,
}

impl Trade {
    /// A freshly created trade: `Created`, unclaimed.
    pub fn open(
        trader: Address,
        start_time: i64,
        end_time: i64,
        settlement_asset: Address,
        amount: u128,
        admin_fee: u128,
        reward: u128,
    ) -> Self {
        Self {
            trader,
            start_time,
            end_time,
            settlement_asset,
            amount,
            admin_fee,
            reward,
            claimed: false,
            status: TradeStatus::Created,
        }
    }

    /// Strictly past `end_time`; settlement is only possible once this holds.
    pub fn is_expired(&self, now: i64) -> bool {
        now > self.end_time
    }

    pub fn is_open(&self) -> bool {
        self.status == TradeStatus::Created
    }

    /// Move to a terminal status and mark as claimed.
    pub fn settle(&mut self, status: TradeStatus) {
        self.status = status;
        self.claimed = true;
    }
}
