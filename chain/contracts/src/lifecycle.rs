//! Trade lifecycle operations: create, resolve, claim.
//!
//! Each operation follows checks → effects → interactions. Checks run in a
//! fixed order so the first violated precondition decides the error. Every
//! effect is logged for undo as soon as it lands.

use tracing::{debug, info};
use trade_types::ids::{Address, TradeId};
use trade_types::payload::{ClaimPayload, CreateTradePayload, SignedPayload};
use trade_types::trade::{Resolution, TradeStatus};

use crate::engine::{ContractState, Undo};
use crate::errors::TradeError;
use crate::events::{ContractEvent, RewardClaimed, TradeCreated, TradeResolved};
use crate::ownership::OwnershipRegistry;
use crate::roles::{Role, RoleStore};
use crate::signature;
use crate::token::{TokenLedger, TokenTransfer};

/// An authorization is usable up to and including its expiry second.
fn ensure_fresh(expiry: i64, now: i64) -> Result<(), TradeError> {
    if now > expiry {
        return Err(TradeError::SignatureExpired { expiry, now });
    }
    Ok(())
}

impl<R, L, O> ContractState<R, L, O>
where
    R: RoleStore,
    L: TokenLedger,
    O: OwnershipRegistry,
{
    /// Recover the identity behind `signature` and require the signer role.
    fn ensure_signed_by_signer(&self, data: &[u8], signature: &[u8]) -> Result<Address, TradeError> {
        let recovered = signature::verify(data, signature)?;
        if !self.roles.has_role(&recovered, Role::Signer) {
            return Err(TradeError::InvalidSigner { recovered });
        }
        debug!(signer = %recovered, "authorization verified");
        Ok(recovered)
    }

    pub(crate) fn create_trade(
        &mut self,
        caller: Address,
        data: &[u8],
        signature: &[u8],
        metadata: &str,
        now: i64,
    ) -> Result<ContractEvent, TradeError> {
        // Checks
        self.ensure_not_paused()?;
        if metadata.is_empty() {
            return Err(TradeError::EmptyString);
        }
        let payload = CreateTradePayload::decode(data)?;
        ensure_fresh(payload.expiry(), now)?;
        if caller != payload.trader {
            return Err(TradeError::IdentityMismatch {
                expected: payload.trader,
                caller,
            });
        }
        if self.ledger.contains(payload.trade_id) {
            return Err(TradeError::TradeAlreadyExists {
                trade_id: payload.trade_id,
            });
        }
        self.ensure_signed_by_signer(data, signature)?;

        // Effects
        let trade_id = payload.trade_id;
        let trade_count = self
            .ledger
            .insert(trade_id, payload.to_trade(), metadata.to_string())?;
        self.undo.push(Undo::Insert(trade_id));
        self.ownership.mint(&caller, trade_id)?;
        self.undo.push(Undo::Mint {
            owner: caller,
            trade_id,
        });

        // Interactions
        let asset = payload.settlement_asset;
        let custody = self.tokens.balance_of(&asset, &self.address);
        let destination = if custody > self.config.threshold_amount {
            self.config.treasury_account
        } else {
            self.address
        };
        debug!(
            trade_id = %trade_id,
            custody,
            threshold_amount = self.config.threshold_amount,
            destination = %destination,
            "routing trade amount"
        );
        let fee_account = self.config.admin_fee_account;
        self.pull(
            &caller,
            &[
                TokenTransfer {
                    asset,
                    to: destination,
                    amount: payload.amount,
                },
                TokenTransfer {
                    asset,
                    to: fee_account,
                    amount: payload.admin_fee,
                },
            ],
        )?;

        info!(
            trade_id = %trade_id,
            trader = %caller,
            amount = payload.amount,
            admin_fee = payload.admin_fee,
            trade_count,
            "Trade created"
        );
        Ok(self.emit(ContractEvent::TradeCreated(TradeCreated {
            trade_id,
            trader: caller,
        })))
    }

    pub(crate) fn resolve_trades(
        &mut self,
        caller: Address,
        trade_ids: &[TradeId],
        outcome: Resolution,
        now: i64,
    ) -> Result<ContractEvent, TradeError> {
        self.ensure_not_paused()?;
        self.ensure_role(&caller, Role::Admin)?;

        let status = TradeStatus::from(outcome);
        let staged = self.ledger.stage_resolution(trade_ids, status, now)?;
        let trade_ids = self.ledger.commit_resolution(staged);

        info!(admin = %caller, count = trade_ids.len(), status = %status, "Trades resolved");
        Ok(self.emit(ContractEvent::TradeResolved(TradeResolved { trade_ids, status })))
    }

    pub(crate) fn claim_trades(
        &mut self,
        caller: Address,
        data: &[u8],
        signature: &[u8],
        now: i64,
    ) -> Result<ContractEvent, TradeError> {
        // Checks
        self.ensure_not_paused()?;
        let payload = ClaimPayload::decode(data)?;
        ensure_fresh(payload.expiry(), now)?;
        self.ensure_signed_by_signer(data, signature)?;

        let ownership = &self.ownership;
        let staged = self.ledger.stage_claim(
            &payload.trade_ids,
            &caller,
            |trade_id| ownership.owner_of(trade_id),
            now,
        )?;

        // Effects
        let (trade_ids, payouts) = self.ledger.commit_claim(staged);
        self.undo.push(Undo::Claim(trade_ids.clone()));

        // Interactions
        let legs: Vec<TokenTransfer> = payouts
            .iter()
            .map(|payout| TokenTransfer {
                asset: payout.asset,
                to: caller,
                amount: payout.amount,
            })
            .collect();
        debug!(to = %caller, assets = legs.len(), "paying rewards");
        self.send(&legs)?;

        info!(trader = %caller, count = trade_ids.len(), assets = payouts.len(), "Rewards claimed");
        Ok(self.emit(ContractEvent::RewardClaimed(RewardClaimed { trade_ids })))
    }

    pub(crate) fn transfer_trade(
        &mut self,
        caller: Address,
        to: Address,
        trade_id: TradeId,
    ) -> Result<(), TradeError> {
        self.ensure_not_paused()?;
        self.ownership.transfer(&caller, &to, trade_id)?;
        info!(trade_id = %trade_id, owner = %caller, "Trade token burned");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_through_expiry_second() {
        assert!(ensure_fresh(100, 99).is_ok());
        assert!(ensure_fresh(100, 100).is_ok());
        assert_eq!(
            ensure_fresh(100, 101),
            Err(TradeError::SignatureExpired { expiry: 100, now: 101 })
        );
    }
}
