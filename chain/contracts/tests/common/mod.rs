//! Shared fixture for contract integration tests.

#![allow(dead_code)]

use trade_contracts::config::EngineConfig;
use trade_contracts::errors::TradeError;
use trade_contracts::events::ContractEvent;
use trade_contracts::token::TokenLedger;
use trade_contracts::MemoryTradeEngine;
use trade_signer::{SignedAuthorization, SignerKey};
use trade_types::ids::{Address, TradeId};
use trade_types::payload::{ClaimPayload, CreateTradePayload};

pub const CONTRACT: Address = Address::repeat_byte(0xc0);
pub const SUPER_ADMIN: Address = Address::repeat_byte(0x5a);
pub const ADMIN: Address = Address::repeat_byte(0xad);
pub const STRANGER: Address = Address::repeat_byte(0x99);
pub const TREASURY: Address = Address::repeat_byte(0x7e);
pub const FEE_ACCOUNT: Address = Address::repeat_byte(0xfe);
pub const TRADER: Address = Address::repeat_byte(0x0a);
pub const OTHER_TRADER: Address = Address::repeat_byte(0x0b);
pub const USDT: Address = Address::repeat_byte(0x70);
pub const DAI: Address = Address::repeat_byte(0xda);

pub const THRESHOLD: u128 = 1_000;
pub const NOW: i64 = 1_700_000_000;
pub const DURATION: i64 = 3_600;
/// First second at which a trade opened at `NOW` may settle.
pub const AFTER_END: i64 = NOW + DURATION + 1;

pub const AMOUNT: u128 = 50;
pub const ADMIN_FEE: u128 = 1;
pub const REWARD: u128 = 90;
pub const TRADER_FUNDS: u128 = 1_000_000;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

pub struct Fixture {
    pub engine: MemoryTradeEngine,
    pub signer: SignerKey,
}

impl Fixture {
    /// Engine with an admin, one registered signer, and two funded traders
    /// who have approved the contract for both assets.
    pub fn new() -> Self {
        init_tracing();
        let signer = SignerKey::from_seed("trade-signer").unwrap();
        let config = EngineConfig::new(THRESHOLD, TREASURY, FEE_ACCOUNT);
        let mut engine = MemoryTradeEngine::in_memory(CONTRACT, SUPER_ADMIN, config).unwrap();

        engine.add_admin(SUPER_ADMIN, ADMIN).unwrap();
        engine.add_signer(ADMIN, signer.address()).unwrap();
        engine.drain_events();

        let tokens = engine.tokens_mut();
        for trader in [TRADER, OTHER_TRADER] {
            for asset in [USDT, DAI] {
                tokens.mint(asset, trader, TRADER_FUNDS);
                tokens.approve(asset, trader, CONTRACT, u128::MAX);
            }
        }

        Self { engine, signer }
    }

    /// Terms for a trade opened at `NOW` by `TRADER` in USDT.
    pub fn terms(&self, trade_id: u64) -> CreateTradePayload {
        CreateTradePayload {
            trade_id: TradeId::new(trade_id),
            trader: TRADER,
            start_time: NOW,
            end_time: NOW + DURATION,
            settlement_asset: USDT,
            amount: AMOUNT,
            admin_fee: ADMIN_FEE,
            reward: REWARD,
            expiry: NOW + 60,
        }
    }

    pub fn create_with(&mut self, terms: &CreateTradePayload) -> Result<ContractEvent, TradeError> {
        let auth = self.signer.sign_create(terms).unwrap();
        self.engine.create_trade(
            terms.trader,
            &auth.data,
            &auth.signature,
            &format!("ipfs://trades/{}", terms.trade_id),
            NOW,
        )
    }

    pub fn create(&mut self, trade_id: u64) -> Result<ContractEvent, TradeError> {
        let terms = self.terms(trade_id);
        self.create_with(&terms)
    }

    pub fn claim_authorization(&self, trade_ids: &[u64], now: i64) -> SignedAuthorization {
        let payload = ClaimPayload {
            trade_ids: trade_ids.iter().copied().map(TradeId::new).collect(),
            expiry: now + 60,
        };
        self.signer.sign_claim(&payload).unwrap()
    }

    pub fn claim_as(
        &mut self,
        caller: Address,
        trade_ids: &[u64],
        now: i64,
    ) -> Result<ContractEvent, TradeError> {
        let auth = self.claim_authorization(trade_ids, now);
        self.engine
            .claim_trades(caller, &auth.data, &auth.signature, now)
    }

    pub fn claim(&mut self, trade_ids: &[u64], now: i64) -> Result<ContractEvent, TradeError> {
        self.claim_as(TRADER, trade_ids, now)
    }

    /// Credit contract custody directly.
    pub fn fund_contract(&mut self, asset: Address, amount: u128) {
        self.engine.tokens_mut().mint(asset, CONTRACT, amount);
    }

    pub fn balance(&self, asset: Address, holder: Address) -> u128 {
        self.engine.tokens().balance_of(&asset, &holder)
    }
}

pub fn ids(raw: &[u64]) -> Vec<TradeId> {
    raw.iter().copied().map(TradeId::new).collect()
}
