//! Administrative operations: role membership, configuration, pause.

use tracing::info;
use trade_types::ids::Address;

use crate::engine::ContractState;
use crate::errors::TradeError;
use crate::events::ContractEvent;
use crate::roles::{Role, RoleStore};
use crate::token::TokenLedger;

impl<R, L, O> ContractState<R, L, O>
where
    R: RoleStore,
    L: TokenLedger,
{
    // ───────────────────────── Roles ─────────────────────────

    /// Grant `role` to `account`; the caller must hold the managing role.
    pub(crate) fn grant_role(
        &mut self,
        caller: Address,
        role: Role,
        account: Address,
        event: fn(Address) -> ContractEvent,
    ) -> Result<ContractEvent, TradeError> {
        self.ensure_not_paused()?;
        self.ensure_role(&caller, role.managed_by())?;
        if account.is_zero() {
            return Err(TradeError::ZeroAddress);
        }
        if !self.roles.grant(role, account) {
            return Err(TradeError::AlreadyHasRole { account, role });
        }

        info!(role = %role, account = %account, by = %caller, "Role granted");
        Ok(self.emit(event(account)))
    }

    pub(crate) fn revoke_role(
        &mut self,
        caller: Address,
        role: Role,
        account: Address,
        event: fn(Address) -> ContractEvent,
    ) -> Result<ContractEvent, TradeError> {
        self.ensure_not_paused()?;
        self.ensure_role(&caller, role.managed_by())?;
        if account.is_zero() {
            return Err(TradeError::ZeroAddress);
        }
        if !self.roles.revoke(role, &account) {
            return Err(TradeError::DoesNotHaveRole { account, role });
        }

        info!(role = %role, account = %account, by = %caller, "Role revoked");
        Ok(self.emit(event(account)))
    }

    // ───────────────────────── Configuration ─────────────────────────

    pub(crate) fn set_threshold_amount(
        &mut self,
        caller: Address,
        amount: u128,
    ) -> Result<ContractEvent, TradeError> {
        self.ensure_not_paused()?;
        self.ensure_role(&caller, Role::Admin)?;
        if amount == self.config.threshold_amount {
            return Err(TradeError::SameValueAsPrevious);
        }

        let previous = self.config.threshold_amount;
        self.config.threshold_amount = amount;
        info!(previous, new_value = amount, by = %caller, "Threshold amount updated");
        Ok(self.emit(ContractEvent::ThresholdUpdated { new_value: amount }))
    }

    pub(crate) fn set_treasury_account(
        &mut self,
        caller: Address,
        account: Address,
    ) -> Result<ContractEvent, TradeError> {
        self.ensure_not_paused()?;
        self.ensure_role(&caller, Role::Admin)?;
        if account.is_zero() {
            return Err(TradeError::ZeroAddress);
        }
        if account == self.config.treasury_account {
            return Err(TradeError::SameValueAsPrevious);
        }

        self.config.treasury_account = account;
        info!(new_value = %account, by = %caller, "Treasury account updated");
        Ok(self.emit(ContractEvent::TreasuryUpdated { new_value: account }))
    }

    pub(crate) fn set_admin_fee_account(
        &mut self,
        caller: Address,
        account: Address,
    ) -> Result<ContractEvent, TradeError> {
        self.ensure_not_paused()?;
        self.ensure_role(&caller, Role::Admin)?;
        if account.is_zero() {
            return Err(TradeError::ZeroAddress);
        }
        if account == self.config.admin_fee_account {
            return Err(TradeError::SameValueAsPrevious);
        }

        self.config.admin_fee_account = account;
        info!(new_value = %account, by = %caller, "Admin fee account updated");
        Ok(self.emit(ContractEvent::AdminFeeAccountUpdated { new_value: account }))
    }

    // ───────────────────────── Pause ─────────────────────────

    pub(crate) fn pause(&mut self, caller: Address) -> Result<ContractEvent, TradeError> {
        self.ensure_not_paused()?;
        self.ensure_role(&caller, Role::Admin)?;

        self.pause.pause();
        info!(by = %caller, "Contract paused");
        Ok(self.emit(ContractEvent::Paused { account: caller }))
    }

    pub(crate) fn unpause(&mut self, caller: Address) -> Result<ContractEvent, TradeError> {
        self.ensure_role(&caller, Role::Admin)?;
        if !self.pause.is_paused() {
            return Err(TradeError::ContractNotPaused);
        }

        self.pause.unpause();
        info!(by = %caller, "Contract unpaused");
        Ok(self.emit(ContractEvent::Unpaused { account: caller }))
    }
}
