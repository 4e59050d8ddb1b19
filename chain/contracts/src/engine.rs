//! Trade Lifecycle Engine
//!
//! Public entry points of the settlement contract. Every mutating call:
//! 1. Acquires the reentrancy guard (released on every exit path)
//! 2. Runs the operation (pause gate, access control, validation, effects,
//!    then external transfers), logging an undo entry for each effect
//! 3. On error, replays the undo log backwards, so a failed call has no effect
//!
//! The undo log holds only what the current call touched, so the cost of a
//! revert does not depend on how many trades exist. Token movements are
//! batched and the token ledger applies a batch all or nothing, so funds
//! never need undoing here. Configuration and role calls mutate once, after
//! their last check, and log nothing.
//!
//! Every entry point takes `&mut self`, so the borrow checker already keeps
//! a collaborator from calling back into the engine mid-call. The guard
//! marks the call boundary and still answers `Reentrancy` if it is ever
//! found held.

use tracing::{error, info, warn};
use trade_types::ids::{Address, TradeId};
use trade_types::trade::{Resolution, Trade};

use crate::config::EngineConfig;
use crate::errors::TradeError;
use crate::events::ContractEvent;
use crate::ledger::TradeLedger;
use crate::ownership::{OwnershipRegistry, SoulboundRegistry};
use crate::roles::{MemoryRoleStore, Role, RoleStore};
use crate::security::{PauseGuard, ReentrancyGuard};
use crate::token::{MemoryTokenLedger, TokenLedger, TokenTransfer};

/// An effect applied by the running call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Undo {
    /// Trade record and metadata inserted
    Insert(TradeId),
    /// Trade token minted to `owner`
    Mint { owner: Address, trade_id: TradeId },
    /// Trades marked claimed and `Won`
    Claim(Vec<TradeId>),
}

/// Everything a call may mutate.
#[derive(Debug)]
pub(crate) struct ContractState<R, L, O> {
    /// The contract's own identity (custody holder, transfer spender)
    pub(crate) address: Address,
    pub(crate) config: EngineConfig,
    pub(crate) ledger: TradeLedger,
    pub(crate) roles: R,
    pub(crate) tokens: L,
    pub(crate) ownership: O,
    pub(crate) pause: PauseGuard,
    /// Emitted events log (append-only)
    pub(crate) events: Vec<ContractEvent>,
    /// Effects of the running call; empty between calls
    pub(crate) undo: Vec<Undo>,
}

/// The settlement contract.
#[derive(Debug)]
pub struct TradeEngine<R, L, O> {
    state: ContractState<R, L, O>,
    guard: ReentrancyGuard,
}

/// Engine wired to the in-memory collaborators.
pub type MemoryTradeEngine = TradeEngine<MemoryRoleStore, MemoryTokenLedger, SoulboundRegistry>;

impl MemoryTradeEngine {
    /// Engine with fresh in-memory collaborators.
    pub fn in_memory(
        address: Address,
        super_admin: Address,
        config: EngineConfig,
    ) -> Result<Self, TradeError> {
        Self::new(
            address,
            super_admin,
            config,
            MemoryRoleStore::new(),
            MemoryTokenLedger::new(),
            SoulboundRegistry::new(),
        )
    }
}

impl<R, L, O> TradeEngine<R, L, O>
where
    R: RoleStore,
    L: TokenLedger,
    O: OwnershipRegistry,
{
    /// Deploy the contract at `address`. `super_admin` receives both the
    /// super-admin and admin roles.
    pub fn new(
        address: Address,
        super_admin: Address,
        config: EngineConfig,
        mut roles: R,
        tokens: L,
        ownership: O,
    ) -> Result<Self, TradeError> {
        if address.is_zero() || super_admin.is_zero() {
            return Err(TradeError::ZeroAddress);
        }
        config.validate()?;

        roles.grant(Role::SuperAdmin, super_admin);
        roles.grant(Role::Admin, super_admin);

        info!(
            contract = %address,
            super_admin = %super_admin,
            threshold_amount = config.threshold_amount,
            treasury = %config.treasury_account,
            admin_fee_account = %config.admin_fee_account,
            "TradeEngine initialized"
        );

        Ok(Self {
            state: ContractState {
                address,
                config,
                ledger: TradeLedger::new(),
                roles,
                tokens,
                ownership,
                pause: PauseGuard::new(),
                events: Vec::new(),
                undo: Vec::new(),
            },
            guard: ReentrancyGuard::new(),
        })
    }

    // ───────────────────────── Queries ─────────────────────────

    pub fn address(&self) -> Address {
        self.state.address
    }

    pub fn trade(&self, trade_id: TradeId) -> Option<&Trade> {
        self.state.ledger.get(trade_id)
    }

    /// Number of trades ever created.
    pub fn trade_count(&self) -> u64 {
        self.state.ledger.trade_count()
    }

    /// Metadata string recorded for a trade at creation.
    pub fn token_uri(&self, trade_id: TradeId) -> Option<&str> {
        self.state.ledger.metadata(trade_id)
    }

    pub fn owner_of(&self, trade_id: TradeId) -> Option<Address> {
        self.state.ownership.owner_of(trade_id)
    }

    pub fn config(&self) -> &EngineConfig {
        &self.state.config
    }

    pub fn threshold_amount(&self) -> u128 {
        self.state.config.threshold_amount
    }

    pub fn treasury_account(&self) -> Address {
        self.state.config.treasury_account
    }

    pub fn admin_fee_account(&self) -> Address {
        self.state.config.admin_fee_account
    }

    pub fn has_role(&self, account: &Address, role: Role) -> bool {
        self.state.roles.has_role(account, role)
    }

    pub fn is_super_admin(&self, account: &Address) -> bool {
        self.has_role(account, Role::SuperAdmin)
    }

    pub fn is_admin(&self, account: &Address) -> bool {
        self.has_role(account, Role::Admin)
    }

    pub fn is_signer(&self, account: &Address) -> bool {
        self.has_role(account, Role::Signer)
    }

    pub fn is_paused(&self) -> bool {
        self.state.pause.is_paused()
    }

    pub fn roles(&self) -> &R {
        &self.state.roles
    }

    pub fn tokens(&self) -> &L {
        &self.state.tokens
    }

    /// Direct access to the token ledger, for funding accounts and setting
    /// allowances in test setups.
    #[cfg(any(test, feature = "test-utils"))]
    pub fn tokens_mut(&mut self) -> &mut L {
        &mut self.state.tokens
    }

    pub fn ownership(&self) -> &O {
        &self.state.ownership
    }

    // ───────────────────────── Events ─────────────────────────

    /// Get all emitted events.
    pub fn events(&self) -> &[ContractEvent] {
        &self.state.events
    }

    /// Drain all events (consume and clear).
    pub fn drain_events(&mut self) -> Vec<ContractEvent> {
        std::mem::take(&mut self.state.events)
    }

    // ───────────────────────── Trade lifecycle ─────────────────────────

    /// Open a trade from signer-attested terms.
    ///
    /// `data` is an encoded `CreateTradePayload`; `signature` must recover to
    /// a signer over exactly those bytes. Escrows `amount` (to custody or
    /// treasury depending on the threshold) and `admin_fee` from `caller`.
    /// Emits `TradeCreated`.
    pub fn create_trade(
        &mut self,
        caller: Address,
        data: &[u8],
        signature: &[u8],
        metadata: &str,
        now: i64,
    ) -> Result<ContractEvent, TradeError> {
        self.execute("create_trade", |state| {
            state.create_trade(caller, data, signature, metadata, now)
        })
    }

    /// Admin-only: settle a batch of expired trades with `outcome`.
    ///
    /// All-or-nothing. Resolved trades are marked claimed, so they can no
    /// longer go through the claim path. Emits `TradeResolved`.
    pub fn resolve_trades(
        &mut self,
        caller: Address,
        trade_ids: &[TradeId],
        outcome: Resolution,
        now: i64,
    ) -> Result<ContractEvent, TradeError> {
        self.execute("resolve_trades", |state| {
            state.resolve_trades(caller, trade_ids, outcome, now)
        })
    }

    /// Claim rewards for a signer-attested batch of the caller's trades.
    ///
    /// `data` is an encoded `ClaimPayload`. Rewards are paid once per
    /// settlement asset. Emits `RewardClaimed`.
    pub fn claim_trades(
        &mut self,
        caller: Address,
        data: &[u8],
        signature: &[u8],
        now: i64,
    ) -> Result<ContractEvent, TradeError> {
        self.execute("claim_trades", |state| {
            state.claim_trades(caller, data, signature, now)
        })
    }

    /// Move a trade token. Only burns (to the null identity) pass the
    /// soulbound hook.
    pub fn transfer_trade(
        &mut self,
        caller: Address,
        to: Address,
        trade_id: TradeId,
    ) -> Result<(), TradeError> {
        self.execute("transfer_trade", |state| state.transfer_trade(caller, to, trade_id))
    }

    // ───────────────────────── Role administration ─────────────────────────

    /// Super-admin only.
    pub fn add_admin(&mut self, caller: Address, account: Address) -> Result<ContractEvent, TradeError> {
        self.execute("add_admin", |state| {
            state.grant_role(caller, Role::Admin, account, |account| {
                ContractEvent::AdminAdded { account }
            })
        })
    }

    /// Super-admin only.
    pub fn remove_admin(&mut self, caller: Address, account: Address) -> Result<ContractEvent, TradeError> {
        self.execute("remove_admin", |state| {
            state.revoke_role(caller, Role::Admin, account, |account| {
                ContractEvent::AdminRemoved { account }
            })
        })
    }

    pub fn add_signer(&mut self, caller: Address, account: Address) -> Result<ContractEvent, TradeError> {
        self.execute("add_signer", |state| {
            state.grant_role(caller, Role::Signer, account, |account| {
                ContractEvent::SignerAdded { account }
            })
        })
    }

    pub fn remove_signer(&mut self, caller: Address, account: Address) -> Result<ContractEvent, TradeError> {
        self.execute("remove_signer", |state| {
            state.revoke_role(caller, Role::Signer, account, |account| {
                ContractEvent::SignerRemoved { account }
            })
        })
    }

    // ───────────────────────── Configuration ─────────────────────────

    pub fn set_threshold_amount(
        &mut self,
        caller: Address,
        amount: u128,
    ) -> Result<ContractEvent, TradeError> {
        self.execute("set_threshold_amount", |state| {
            state.set_threshold_amount(caller, amount)
        })
    }

    pub fn set_treasury_account(
        &mut self,
        caller: Address,
        account: Address,
    ) -> Result<ContractEvent, TradeError> {
        self.execute("set_treasury_account", |state| {
            state.set_treasury_account(caller, account)
        })
    }

    pub fn set_admin_fee_account(
        &mut self,
        caller: Address,
        account: Address,
    ) -> Result<ContractEvent, TradeError> {
        self.execute("set_admin_fee_account", |state| {
            state.set_admin_fee_account(caller, account)
        })
    }

    // ───────────────────────── Pause ─────────────────────────

    pub fn pause(&mut self, caller: Address) -> Result<ContractEvent, TradeError> {
        self.execute("pause", |state| state.pause(caller))
    }

    /// The only entry point that runs while paused.
    pub fn unpause(&mut self, caller: Address) -> Result<ContractEvent, TradeError> {
        self.execute("unpause", |state| state.unpause(caller))
    }

    // ───────────────────────── Execution ─────────────────────────

    /// Run `call` non-reentrantly and atomically.
    fn execute<T>(
        &mut self,
        operation: &'static str,
        call: impl FnOnce(&mut ContractState<R, L, O>) -> Result<T, TradeError>,
    ) -> Result<T, TradeError> {
        let Some(_lock) = self.guard.enter() else {
            warn!(operation, "reentrant call rejected");
            return Err(TradeError::Reentrancy);
        };

        self.state.undo.clear();
        let result = call(&mut self.state);
        if let Err(err) = &result {
            warn!(operation, error = %err, undo = self.state.undo.len(), "call reverted");
            self.state.rollback();
        }
        self.state.undo.clear();
        result
    }
}

impl<R, L, O> ContractState<R, L, O>
where
    O: OwnershipRegistry,
{
    /// Undo the running call's effects, newest first.
    fn rollback(&mut self) {
        while let Some(entry) = self.undo.pop() {
            match entry {
                Undo::Insert(trade_id) => self.ledger.revert_insert(trade_id),
                Undo::Mint { owner, trade_id } => {
                    if let Err(err) = self.ownership.transfer(&owner, &Address::ZERO, trade_id) {
                        error!(trade_id = %trade_id, owner = %owner, error = %err, "minted token not burned on revert");
                    }
                }
                Undo::Claim(trade_ids) => self.ledger.reopen(&trade_ids),
            }
        }
    }
}

impl<R, L, O> ContractState<R, L, O>
where
    R: RoleStore,
    L: TokenLedger,
{
    // ───────────────────────── Internal Guards ─────────────────────────

    pub(crate) fn ensure_not_paused(&self) -> Result<(), TradeError> {
        if self.pause.is_paused() {
            return Err(TradeError::ContractPaused);
        }
        Ok(())
    }

    pub(crate) fn ensure_role(&self, caller: &Address, role: Role) -> Result<(), TradeError> {
        if !self.roles.has_role(caller, role) {
            return Err(TradeError::Unauthorized {
                caller: *caller,
                role,
            });
        }
        Ok(())
    }

    pub(crate) fn emit(&mut self, event: ContractEvent) -> ContractEvent {
        self.events.push(event.clone());
        event
    }

    // ───────────────────────── Fund movement ─────────────────────────

    /// Pull every leg out of `from`, spending the contract's allowance.
    pub(crate) fn pull(&mut self, from: &Address, legs: &[TokenTransfer]) -> Result<(), TradeError> {
        let spender = self.address;
        self.tokens
            .transfer_from_batch(&spender, from, legs)
            .map_err(|leg| TradeError::TransferFailed {
                asset: leg.asset,
                from: *from,
                to: leg.to,
                amount: leg.amount,
            })
    }

    /// Send every leg out of contract custody.
    pub(crate) fn send(&mut self, legs: &[TokenTransfer]) -> Result<(), TradeError> {
        let from = self.address;
        self.tokens
            .transfer_batch(&from, legs)
            .map_err(|leg| TradeError::TransferFailed {
                asset: leg.asset,
                from,
                to: leg.to,
                amount: leg.amount,
            })
    }
}
