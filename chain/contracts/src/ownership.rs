//! Soulbound ownership registry collaborator
//!
//! Each created trade mints a token with the trade's identifier to the
//! trader. Tokens are soulbound: minting (from the null identity) and
//! burning (to the null identity) pass the transfer hook, but any
//! holder-to-holder transfer is rejected.

use std::collections::HashMap;
use trade_types::ids::{Address, TradeId};

use crate::errors::OwnershipError;

/// Ownership registry interface.
pub trait OwnershipRegistry {
    fn mint(&mut self, owner: &Address, trade_id: TradeId) -> Result<(), OwnershipError>;

    fn owner_of(&self, trade_id: TradeId) -> Option<Address>;

    fn transfer(
        &mut self,
        from: &Address,
        to: &Address,
        trade_id: TradeId,
    ) -> Result<(), OwnershipError>;
}

/// Transfer hook shared by every movement of a token.
///
/// Rejects only transfers where both ends are real holders.
pub fn check_transfer(
    from: &Address,
    to: &Address,
    trade_id: TradeId,
) -> Result<(), OwnershipError> {
    if !from.is_zero() && !to.is_zero() {
        return Err(OwnershipError::SoulboundTransfer { trade_id });
    }
    Ok(())
}

/// In-memory soulbound registry.
#[derive(Debug, Clone, Default)]
pub struct SoulboundRegistry {
    owners: HashMap<TradeId, Address>,
    holdings: HashMap<Address, u64>,
}

impl SoulboundRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tokens held by `owner`.
    pub fn balance_of(&self, owner: &Address) -> u64 {
        self.holdings.get(owner).copied().unwrap_or(0)
    }

    pub fn total_supply(&self) -> usize {
        self.owners.len()
    }
}

impl OwnershipRegistry for SoulboundRegistry {
    fn mint(&mut self, owner: &Address, trade_id: TradeId) -> Result<(), OwnershipError> {
        if owner.is_zero() {
            return Err(OwnershipError::MintToZeroAddress);
        }
        if self.owners.contains_key(&trade_id) {
            return Err(OwnershipError::AlreadyMinted { trade_id });
        }
        check_transfer(&Address::ZERO, owner, trade_id)?;
        self.owners.insert(trade_id, *owner);
        *self.holdings.entry(*owner).or_insert(0) += 1;
        Ok(())
    }

    fn owner_of(&self, trade_id: TradeId) -> Option<Address> {
        self.owners.get(&trade_id).copied()
    }

    fn transfer(
        &mut self,
        from: &Address,
        to: &Address,
        trade_id: TradeId,
    ) -> Result<(), OwnershipError> {
        check_transfer(from, to, trade_id)?;
        let owner = self
            .owners
            .get(&trade_id)
            .copied()
            .ok_or(OwnershipError::NonexistentToken { trade_id })?;
        if owner != *from {
            return Err(OwnershipError::NotOwner {
                caller: *from,
                trade_id,
            });
        }

        // Only burns reach this point
        self.owners.remove(&trade_id);
        if let Some(count) = self.holdings.get_mut(from) {
            *count = count.saturating_sub(1);
        }
        Ok(())
    }
}
