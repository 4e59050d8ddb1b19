//! Fungible token ledger collaborator
//!
//! The engine never keeps balances itself; it asks the token ledger and
//! moves funds through it. The engine only moves funds in batches, and a
//! batch is all-or-nothing inside the ledger: if one leg fails, the legs
//! before it are undone and the failing leg is reported back.

use std::collections::HashMap;
use trade_types::ids::Address;

/// One leg of a batched movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenTransfer {
    pub asset: Address,
    pub to: Address,
    pub amount: u128,
}

/// Token ledger interface, keyed by the token's own address (`asset`).
pub trait TokenLedger {
    fn balance_of(&self, asset: &Address, holder: &Address) -> u128;

    /// Move `amount` out of `from`'s own balance (the caller is `from`).
    fn transfer(&mut self, asset: &Address, from: &Address, to: &Address, amount: u128) -> bool;

    /// Move `amount` from `from` to `to` using `spender`'s allowance.
    fn transfer_from(
        &mut self,
        asset: &Address,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> bool;

    /// Apply every leg as a `transfer` out of `from`, all or nothing.
    fn transfer_batch(&mut self, from: &Address, legs: &[TokenTransfer]) -> Result<(), TokenTransfer>;

    /// Apply every leg as a `transfer_from` of `from`'s tokens by `spender`,
    /// all or nothing.
    fn transfer_from_batch(
        &mut self,
        spender: &Address,
        from: &Address,
        legs: &[TokenTransfer],
    ) -> Result<(), TokenTransfer>;
}

/// Prior values of the entries a batch has touched.
#[derive(Default)]
struct Journal {
    balances: Vec<((Address, Address), Option<u128>)>,
    allowances: Vec<((Address, Address, Address), Option<u128>)>,
}

/// In-memory multi-asset ledger with allowances.
#[derive(Debug, Clone, Default)]
pub struct MemoryTokenLedger {
    /// (asset, holder) -> balance
    balances: HashMap<(Address, Address), u128>,
    /// (asset, owner, spender) -> remaining allowance
    allowances: HashMap<(Address, Address, Address), u128>,
}

impl MemoryTokenLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit new tokens to `to`. Returns `false` on overflow.
    pub fn mint(&mut self, asset: Address, to: Address, amount: u128) -> bool {
        let balance = self.balances.entry((asset, to)).or_insert(0);
        match balance.checked_add(amount) {
            Some(next) => {
                *balance = next;
                true
            }
            None => false,
        }
    }

    /// Set `spender`'s allowance over `owner`'s tokens. `u128::MAX` never decreases.
    pub fn approve(&mut self, asset: Address, owner: Address, spender: Address, amount: u128) {
        self.allowances.insert((asset, owner, spender), amount);
    }

    pub fn allowance(&self, asset: &Address, owner: &Address, spender: &Address) -> u128 {
        self.allowances
            .get(&(*asset, *owner, *spender))
            .copied()
            .unwrap_or(0)
    }

    fn record(&self, journal: &mut Journal, asset: &Address, from: &Address, to: &Address) {
        for holder in [from, to] {
            let key = (*asset, *holder);
            journal.balances.push((key, self.balances.get(&key).copied()));
        }
    }

    fn record_allowance(&self, journal: &mut Journal, asset: &Address, owner: &Address, spender: &Address) {
        let key = (*asset, *owner, *spender);
        journal.allowances.push((key, self.allowances.get(&key).copied()));
    }

    /// Put back every journaled entry; the earliest record of a key wins.
    fn restore(&mut self, journal: Journal) {
        for (key, previous) in journal.balances.into_iter().rev() {
            match previous {
                Some(value) => self.balances.insert(key, value),
                None => self.balances.remove(&key),
            };
        }
        for (key, previous) in journal.allowances.into_iter().rev() {
            match previous {
                Some(value) => self.allowances.insert(key, value),
                None => self.allowances.remove(&key),
            };
        }
    }

    fn move_balance(&mut self, asset: &Address, from: &Address, to: &Address, amount: u128) -> bool {
        let from_balance = self.balance_of(asset, from);
        if from_balance < amount {
            return false;
        }
        if from == to {
            return true;
        }
        let Some(to_balance) = self.balance_of(asset, to).checked_add(amount) else {
            return false;
        };
        self.balances.insert((*asset, *from), from_balance - amount);
        self.balances.insert((*asset, *to), to_balance);
        true
    }
}

impl TokenLedger for MemoryTokenLedger {
    fn balance_of(&self, asset: &Address, holder: &Address) -> u128 {
        self.balances.get(&(*asset, *holder)).copied().unwrap_or(0)
    }

    fn transfer(&mut self, asset: &Address, from: &Address, to: &Address, amount: u128) -> bool {
        if to.is_zero() {
            return false;
        }
        self.move_balance(asset, from, to, amount)
    }

    fn transfer_from(
        &mut self,
        asset: &Address,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> bool {
        if to.is_zero() {
            return false;
        }
        let allowance = self.allowance(asset, from, spender);
        if allowance < amount {
            return false;
        }
        if !self.move_balance(asset, from, to, amount) {
            return false;
        }
        if allowance != u128::MAX {
            self.allowances
                .insert((*asset, *from, *spender), allowance - amount);
        }
        true
    }

    fn transfer_batch(&mut self, from: &Address, legs: &[TokenTransfer]) -> Result<(), TokenTransfer> {
        let mut journal = Journal::default();
        for leg in legs {
            self.record(&mut journal, &leg.asset, from, &leg.to);
            if !self.transfer(&leg.asset, from, &leg.to, leg.amount) {
                self.restore(journal);
                return Err(*leg);
            }
        }
        Ok(())
    }

    fn transfer_from_batch(
        &mut self,
        spender: &Address,
        from: &Address,
        legs: &[TokenTransfer],
    ) -> Result<(), TokenTransfer> {
        let mut journal = Journal::default();
        for leg in legs {
            self.record(&mut journal, &leg.asset, from, &leg.to);
            self.record_allowance(&mut journal, &leg.asset, from, spender);
            if !self.transfer_from(&leg.asset, spender, from, &leg.to, leg.amount) {
                self.restore(journal);
                return Err(*leg);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const USDT: Address = Address::repeat_byte(0x70);
    const ALICE: Address = Address::repeat_byte(0x01);
    const BOB: Address = Address::repeat_byte(0x02);
    const VAULT: Address = Address::repeat_byte(0xcc);

    #[test]
    fn test_mint_and_balance() {
        let mut ledger = MemoryTokenLedger::new();
        assert!(ledger.mint(USDT, ALICE, 100));
        assert_eq!(ledger.balance_of(&USDT, &ALICE), 100);
        assert_eq!(ledger.balance_of(&USDT, &BOB), 0);
    }

    #[test]
    fn test_mint_overflow_rejected() {
        let mut ledger = MemoryTokenLedger::new();
        assert!(ledger.mint(USDT, ALICE, u128::MAX));
        assert!(!ledger.mint(USDT, ALICE, 1));
        assert_eq!(ledger.balance_of(&USDT, &ALICE), u128::MAX);
    }

    #[test]
    fn test_transfer_moves_funds() {
        let mut ledger = MemoryTokenLedger::new();
        ledger.mint(USDT, ALICE, 100);
        assert!(ledger.transfer(&USDT, &ALICE, &BOB, 30));
        assert_eq!(ledger.balance_of(&USDT, &ALICE), 70);
        assert_eq!(ledger.balance_of(&USDT, &BOB), 30);
    }

    #[test]
    fn test_transfer_insufficient_balance_fails() {
        let mut ledger = MemoryTokenLedger::new();
        ledger.mint(USDT, ALICE, 10);
        assert!(!ledger.transfer(&USDT, &ALICE, &BOB, 11));
        assert_eq!(ledger.balance_of(&USDT, &ALICE), 10);
    }

    #[test]
    fn test_transfer_to_zero_address_fails() {
        let mut ledger = MemoryTokenLedger::new();
        ledger.mint(USDT, ALICE, 10);
        assert!(!ledger.transfer(&USDT, &ALICE, &Address::ZERO, 1));
    }

    #[test]
    fn test_self_transfer_keeps_balance() {
        let mut ledger = MemoryTokenLedger::new();
        ledger.mint(USDT, ALICE, 10);
        assert!(ledger.transfer(&USDT, &ALICE, &ALICE, 10));
        assert_eq!(ledger.balance_of(&USDT, &ALICE), 10);
    }

    #[test]
    fn test_transfer_from_spends_allowance() {
        let mut ledger = MemoryTokenLedger::new();
        ledger.mint(USDT, ALICE, 100);
        ledger.approve(USDT, ALICE, VAULT, 60);
        assert!(ledger.transfer_from(&USDT, &VAULT, &ALICE, &BOB, 40));
        assert_eq!(ledger.allowance(&USDT, &ALICE, &VAULT), 20);
        assert_eq!(ledger.balance_of(&USDT, &BOB), 40);
        assert!(!ledger.transfer_from(&USDT, &VAULT, &ALICE, &BOB, 21));
    }

    #[test]
    fn test_transfer_from_unlimited_allowance() {
        let mut ledger = MemoryTokenLedger::new();
        ledger.mint(USDT, ALICE, 100);
        ledger.approve(USDT, ALICE, VAULT, u128::MAX);
        assert!(ledger.transfer_from(&USDT, &VAULT, &ALICE, &BOB, 40));
        assert_eq!(ledger.allowance(&USDT, &ALICE, &VAULT), u128::MAX);
    }

    #[test]
    fn test_transfer_from_without_allowance_fails() {
        let mut ledger = MemoryTokenLedger::new();
        ledger.mint(USDT, ALICE, 100);
        assert!(!ledger.transfer_from(&USDT, &VAULT, &ALICE, &BOB, 1));
        assert_eq!(ledger.balance_of(&USDT, &ALICE), 100);
    }

    #[test]
    fn test_batch_applies_every_leg() {
        let mut ledger = MemoryTokenLedger::new();
        ledger.mint(USDT, VAULT, 100);
        let legs = [
            TokenTransfer { asset: USDT, to: ALICE, amount: 30 },
            TokenTransfer { asset: USDT, to: BOB, amount: 70 },
        ];
        assert_eq!(ledger.transfer_batch(&VAULT, &legs), Ok(()));
        assert_eq!(ledger.balance_of(&USDT, &VAULT), 0);
        assert_eq!(ledger.balance_of(&USDT, &ALICE), 30);
        assert_eq!(ledger.balance_of(&USDT, &BOB), 70);
    }

    #[test]
    fn test_batch_failure_undoes_earlier_legs() {
        let mut ledger = MemoryTokenLedger::new();
        ledger.mint(USDT, VAULT, 50);
        let short = TokenTransfer { asset: USDT, to: BOB, amount: 21 };
        let legs = [TokenTransfer { asset: USDT, to: ALICE, amount: 30 }, short];

        assert_eq!(ledger.transfer_batch(&VAULT, &legs), Err(short));
        assert_eq!(ledger.balance_of(&USDT, &VAULT), 50);
        assert_eq!(ledger.balance_of(&USDT, &ALICE), 0);
        assert_eq!(ledger.balance_of(&USDT, &BOB), 0);
    }

    #[test]
    fn test_batch_from_failure_restores_allowance() {
        let mut ledger = MemoryTokenLedger::new();
        ledger.mint(USDT, ALICE, 100);
        ledger.approve(USDT, ALICE, VAULT, 50);
        let fee = TokenTransfer { asset: USDT, to: BOB, amount: 1 };
        let legs = [TokenTransfer { asset: USDT, to: VAULT, amount: 50 }, fee];

        assert_eq!(ledger.transfer_from_batch(&VAULT, &ALICE, &legs), Err(fee));
        assert_eq!(ledger.balance_of(&USDT, &ALICE), 100);
        assert_eq!(ledger.balance_of(&USDT, &VAULT), 0);
        assert_eq!(ledger.allowance(&USDT, &ALICE, &VAULT), 50);

        ledger.approve(USDT, ALICE, VAULT, 51);
        assert_eq!(ledger.transfer_from_batch(&VAULT, &ALICE, &legs), Ok(()));
        assert_eq!(ledger.allowance(&USDT, &ALICE, &VAULT), 0);
        assert_eq!(ledger.balance_of(&USDT, &BOB), 1);
    }

    #[test]
    fn test_assets_isolated() {
        let other = Address::repeat_byte(0x71);
        let mut ledger = MemoryTokenLedger::new();
        ledger.mint(USDT, ALICE, 5);
        assert_eq!(ledger.balance_of(&other, &ALICE), 0);
        assert!(!ledger.transfer(&other, &ALICE, &BOB, 1));
    }
}
