//! Contract events
//!
//! Events are immutable records appended by successful contract operations.
//! A reverted call leaves no events behind.

use serde::{Deserialize, Serialize};
use trade_types::ids::{Address, TradeId};
use trade_types::trade::TradeStatus;

/// A trade was opened and its token minted to the trader
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeCreated {
    pub trade_id: TradeId,
    pub trader: Address,
}

/// An admin settled a batch of trades
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeResolved {
    pub trade_ids: Vec<TradeId>,
    pub status: TradeStatus,
}

/// A trader claimed rewards for a batch of trades
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardClaimed {
    pub trade_ids: Vec<TradeId>,
}

/// Enum wrapper for all contract events, enabling uniform handling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractEvent {
    TradeCreated(TradeCreated),
    TradeResolved(TradeResolved),
    RewardClaimed(RewardClaimed),
    AdminAdded { account: Address },
    AdminRemoved { account: Address },
    SignerAdded { account: Address },
    SignerRemoved { account: Address },
    ThresholdUpdated { new_value: u128 },
    TreasuryUpdated { new_value: Address },
    AdminFeeAccountUpdated { new_value: Address },
    Paused { account: Address },
    Unpaused { account: Address },
}

impl ContractEvent {
    /// Stable label for logs and exports.
    pub fn name(&self) -> &'static str {
        match self {
            ContractEvent::TradeCreated(_) => "TradeCreated",
            ContractEvent::TradeResolved(_) => "TradeResolved",
            ContractEvent::RewardClaimed(_) => "RewardClaimed",
            ContractEvent::AdminAdded { .. } => "AdminAdded",
            ContractEvent::AdminRemoved { .. } => "AdminRemoved",
            ContractEvent::SignerAdded { .. } => "SignerAdded",
            ContractEvent::SignerRemoved { .. } => "SignerRemoved",
            ContractEvent::ThresholdUpdated { .. } => "ThresholdUpdated",
            ContractEvent::TreasuryUpdated { .. } => "TreasuryUpdated",
            ContractEvent::AdminFeeAccountUpdated { .. } => "AdminFeeAccountUpdated",
            ContractEvent::Paused { .. } => "Paused",
            ContractEvent::Unpaused { .. } => "Unpaused",
        }
    }
}
