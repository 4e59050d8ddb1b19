//! Trade Ledger: records, counter, and metadata
//!
//! Owns every trade state transition. Batch operations are two-phase:
//! `stage_*` validates the whole batch against current state without
//! mutating anything and returns a staged token; `commit_*` consumes the
//! token and applies it. A batch that fails staging leaves no trace.

use std::collections::{HashMap, HashSet};
use trade_types::ids::{Address, TradeId};
use trade_types::trade::{Trade, TradeStatus};

use crate::errors::TradeError;

/// Amount owed in one settlement asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Payout {
    pub asset: Address,
    pub amount: u128,
}

/// A resolution batch that passed validation.
#[derive(Debug)]
pub struct StagedResolution {
    trade_ids: Vec<TradeId>,
    status: TradeStatus,
}

/// A claim batch that passed validation, with rewards summed per asset
/// in first-seen order.
#[derive(Debug)]
pub struct StagedClaim {
    trade_ids: Vec<TradeId>,
    payouts: Vec<Payout>,
}

impl StagedClaim {
    pub fn payouts(&self) -> &[Payout] {
        &self.payouts
    }
}

/// Trade records keyed by caller-supplied identifier.
#[derive(Debug, Clone, Default)]
pub struct TradeLedger {
    trades: HashMap<TradeId, Trade>,
    /// Per-trade metadata string (token URI)
    metadata: HashMap<TradeId, String>,
    /// Trades ever created; informational only
    trade_count: u64,
}

impl TradeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, trade_id: TradeId) -> bool {
        self.trades.contains_key(&trade_id)
    }

    pub fn get(&self, trade_id: TradeId) -> Option<&Trade> {
        self.trades.get(&trade_id)
    }

    pub fn metadata(&self, trade_id: TradeId) -> Option<&str> {
        self.metadata.get(&trade_id).map(String::as_str)
    }

    pub fn trade_count(&self) -> u64 {
        self.trade_count
    }

    /// Record a new trade. Identifiers are never reassigned.
    ///
    /// Returns the updated trade count.
    pub fn insert(
        &mut self,
        trade_id: TradeId,
        trade: Trade,
        metadata: String,
    ) -> Result<u64, TradeError> {
        if trade.trader.is_zero() {
            return Err(TradeError::ZeroAddress);
        }
        if self.trades.contains_key(&trade_id) {
            return Err(TradeError::TradeAlreadyExists { trade_id });
        }
        self.trades.insert(trade_id, trade);
        self.metadata.insert(trade_id, metadata);
        self.trade_count += 1;
        Ok(self.trade_count)
    }

    // ───────────────────────── Resolution ─────────────────────────

    /// Validate an admin resolution batch.
    ///
    /// Each trade must exist, be past `end_time`, and still be `Created`.
    /// A repeated identifier fails on its second occurrence, as if the first
    /// had already been applied.
    pub fn stage_resolution(
        &self,
        trade_ids: &[TradeId],
        status: TradeStatus,
        now: i64,
    ) -> Result<StagedResolution, TradeError> {
        if trade_ids.is_empty() {
            return Err(TradeError::EmptyBatch);
        }

        let mut seen = HashSet::with_capacity(trade_ids.len());
        for &trade_id in trade_ids {
            let trade = self
                .trades
                .get(&trade_id)
                .ok_or(TradeError::TradeNotFound { trade_id })?;
            if !trade.is_expired(now) {
                return Err(TradeError::TradeNotExpired {
                    trade_id,
                    end_time: trade.end_time,
                });
            }
            if !trade.is_open() {
                return Err(TradeError::TradeNotInCreatedState {
                    trade_id,
                    status: trade.status,
                });
            }
            if !seen.insert(trade_id) {
                return Err(TradeError::TradeNotInCreatedState { trade_id, status });
            }
        }

        Ok(StagedResolution {
            trade_ids: trade_ids.to_vec(),
            status,
        })
    }

    /// Apply a staged resolution: status set, trade marked claimed.
    pub fn commit_resolution(&mut self, staged: StagedResolution) -> Vec<TradeId> {
        for trade_id in &staged.trade_ids {
            if let Some(trade) = self.trades.get_mut(trade_id) {
                trade.settle(staged.status);
            }
        }
        staged.trade_ids
    }

    // ───────────────────────── Claim ─────────────────────────

    /// Validate a claim batch for `caller`.
    ///
    /// Each trade must exist, be owned by `caller` per `owner_of`, be past
    /// `end_time`, and be unclaimed (including earlier in the same batch).
    pub fn stage_claim<F>(
        &self,
        trade_ids: &[TradeId],
        caller: &Address,
        owner_of: F,
        now: i64,
    ) -> Result<StagedClaim, TradeError>
    where
        F: Fn(TradeId) -> Option<Address>,
    {
        if trade_ids.is_empty() {
            return Err(TradeError::EmptyBatch);
        }

        let mut seen = HashSet::with_capacity(trade_ids.len());
        let mut payouts: Vec<Payout> = Vec::new();
        for &trade_id in trade_ids {
            let trade = self
                .trades
                .get(&trade_id)
                .ok_or(TradeError::TradeNotFound { trade_id })?;
            let owner = owner_of(trade_id).unwrap_or(Address::ZERO);
            if owner != *caller {
                return Err(TradeError::IdentityMismatch {
                    expected: owner,
                    caller: *caller,
                });
            }
            if !trade.is_expired(now) {
                return Err(TradeError::TradeNotExpired {
                    trade_id,
                    end_time: trade.end_time,
                });
            }
            if trade.claimed || !seen.insert(trade_id) {
                return Err(TradeError::TradeAlreadyClaimed { trade_id });
            }

            match payouts
                .iter_mut()
                .find(|p| p.asset == trade.settlement_asset)
            {
                Some(payout) => {
                    payout.amount = payout
                        .amount
                        .checked_add(trade.reward)
                        .ok_or(TradeError::Overflow)?;
                }
                None => payouts.push(Payout {
                    asset: trade.settlement_asset,
                    amount: trade.reward,
                }),
            }
        }

        Ok(StagedClaim {
            trade_ids: trade_ids.to_vec(),
            payouts,
        })
    }

    /// Apply a staged claim: every trade marked claimed and `Won`.
    ///
    /// Returns the settled identifiers and the payouts still to be made.
    pub fn commit_claim(&mut self, staged: StagedClaim) -> (Vec<TradeId>, Vec<Payout>) {
        for trade_id in &staged.trade_ids {
            if let Some(trade) = self.trades.get_mut(trade_id) {
                trade.settle(TradeStatus::Won);
            }
        }
        (staged.trade_ids, staged.payouts)
    }

    // ───────────────────────── Undo ─────────────────────────

    /// Take back an `insert` made by the current call.
    pub(crate) fn revert_insert(&mut self, trade_id: TradeId) {
        if self.trades.remove(&trade_id).is_some() {
            self.metadata.remove(&trade_id);
            self.trade_count -= 1;
        }
    }

    /// Take back a `commit_claim` made by the current call. Only unclaimed
    /// trades are claimable, and those are always `Created`.
    pub(crate) fn reopen(&mut self, trade_ids: &[TradeId]) {
        for trade_id in trade_ids {
            if let Some(trade) = self.trades.get_mut(trade_id) {
                trade.status = TradeStatus::Created;
                trade.claimed = false;
            }
        }
    }
}
