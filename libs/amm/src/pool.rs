//! In-memory pool applying quotes atomically
//!
//! A `Pool` owns the reserves of one asset/collateral/maturity market. Every
//! mutating call prices against the current state, and only commits once the
//! quote and all of its projections have succeeded.

use crate::borrow_math::BorrowMath;
use crate::claims::{
    get_bond_interest, get_bond_principal, get_collateral, get_debt, get_insurance_interest,
    get_insurance_principal,
};
use crate::lend_math::LendMath;
use crate::liquidity_math::LiquidityMath;
use serde::{Deserialize, Serialize};
use tenor_types::{
    Due, FeeParams, MathError, PoolError, PoolKey, PoolState, StateDelta, TimeContext, TradeQuote,
};
use tracing::{info, warn};

/// Result of a liquidity deposit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidityReceipt {
    pub delta: StateDelta,
    pub liquidity_out: u128,
    /// Debt and collateral the liquidity provider is bound to
    pub due: Due,
}

/// Result of a lend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LendReceipt {
    pub quote: TradeQuote,
    pub bond_principal: u128,
    pub bond_interest: u128,
    pub insurance_principal: u128,
    pub insurance_interest: u128,
}

impl LendReceipt {
    pub fn bond(&self) -> u128 {
        self.bond_principal.saturating_add(self.bond_interest)
    }

    pub fn insurance(&self) -> u128 {
        self.insurance_principal.saturating_add(self.insurance_interest)
    }
}

/// Result of a borrow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorrowReceipt {
    pub quote: TradeQuote,
    pub due: Due,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pool {
    key: PoolKey,
    fees: FeeParams,
    state: PoolState,
    total_liquidity: u128,
    protocol_fee_stored: u128,
}

impl Pool {
    pub fn new(key: PoolKey, fees: FeeParams) -> Self {
        Self {
            key,
            fees,
            state: PoolState::EMPTY,
            total_liquidity: 0,
            protocol_fee_stored: 0,
        }
    }

    pub fn key(&self) -> &PoolKey {
        &self.key
    }

    pub fn fees(&self) -> FeeParams {
        self.fees
    }

    pub fn state(&self) -> PoolState {
        self.state
    }

    pub fn total_liquidity(&self) -> u128 {
        self.total_liquidity
    }

    pub fn protocol_fee_stored(&self) -> u128 {
        self.protocol_fee_stored
    }

    /// Time window for a call at `now`
    pub fn context(&self, now: u64) -> TimeContext {
        TimeContext::new(self.key.maturity, now)
    }

    /// Seed an empty pool
    pub fn new_liquidity(
        &mut self,
        now: u64,
        asset_in: u128,
        debt_in: u128,
        collateral_in: u128,
    ) -> Result<LiquidityReceipt, PoolError> {
        if self.total_liquidity != 0 {
            warn!(pool = %self.key, "new liquidity rejected: pool already seeded");
            return Err(PoolError::AlreadyInitialized);
        }
        let ctx = self.context(now);
        let receipt = self
            .seed(&ctx, asset_in, debt_in, collateral_in)
            .map_err(|err| self.rejected("new_liquidity", err))?;
        self.commit_liquidity(&receipt)?;

        info!(
            pool = %self.key,
            liquidity = receipt.liquidity_out,
            debt = receipt.due.debt,
            collateral = receipt.due.collateral,
            "pool seeded"
        );
        Ok(receipt)
    }

    /// Deposit proportionally into a seeded pool
    pub fn add_liquidity(&mut self, now: u64, asset_in: u128) -> Result<LiquidityReceipt, PoolError> {
        if self.total_liquidity == 0 {
            warn!(pool = %self.key, "add liquidity rejected: pool not seeded");
            return Err(PoolError::NotInitialized);
        }
        let ctx = self.context(now);
        let receipt = self
            .deposit(&ctx, asset_in)
            .map_err(|err| self.rejected("add_liquidity", err))?;
        self.commit_liquidity(&receipt)?;

        info!(
            pool = %self.key,
            liquidity = receipt.liquidity_out,
            total_liquidity = self.total_liquidity,
            "liquidity added"
        );
        Ok(receipt)
    }

    pub fn lend_given_bond(
        &mut self,
        now: u64,
        asset_in: u128,
        bond_out: u128,
    ) -> Result<LendReceipt, PoolError> {
        let ctx = self.context(now);
        let quote = LendMath::given_bond(&self.state, &ctx, &self.fees, asset_in, bond_out)
            .map_err(|err| self.rejected("lend_given_bond", err))?;
        self.commit_lend(&ctx, quote)
    }

    pub fn lend_given_insurance(
        &mut self,
        now: u64,
        asset_in: u128,
        insurance_out: u128,
    ) -> Result<LendReceipt, PoolError> {
        let ctx = self.context(now);
        let quote =
            LendMath::given_insurance(&self.state, &ctx, &self.fees, asset_in, insurance_out)
                .map_err(|err| self.rejected("lend_given_insurance", err))?;
        self.commit_lend(&ctx, quote)
    }

    pub fn lend_given_percent(
        &mut self,
        now: u64,
        asset_in: u128,
        percent: u64,
    ) -> Result<LendReceipt, PoolError> {
        let ctx = self.context(now);
        let quote = LendMath::given_percent(&self.state, &ctx, &self.fees, asset_in, percent)
            .map_err(|err| self.rejected("lend_given_percent", err))?;
        self.commit_lend(&ctx, quote)
    }

    pub fn borrow_given_debt(
        &mut self,
        now: u64,
        asset_out: u128,
        debt_in: u128,
    ) -> Result<BorrowReceipt, PoolError> {
        let ctx = self.context(now);
        let quote = BorrowMath::given_debt(&self.state, &ctx, &self.fees, asset_out, debt_in)
            .map_err(|err| self.rejected("borrow_given_debt", err))?;
        self.commit_borrow(&ctx, quote)
    }

    pub fn borrow_given_collateral(
        &mut self,
        now: u64,
        asset_out: u128,
        collateral_in: u128,
    ) -> Result<BorrowReceipt, PoolError> {
        let ctx = self.context(now);
        let quote =
            BorrowMath::given_collateral(&self.state, &ctx, &self.fees, asset_out, collateral_in)
                .map_err(|err| self.rejected("borrow_given_collateral", err))?;
        self.commit_borrow(&ctx, quote)
    }

    pub fn borrow_given_percent(
        &mut self,
        now: u64,
        asset_out: u128,
        percent: u64,
    ) -> Result<BorrowReceipt, PoolError> {
        let ctx = self.context(now);
        let quote = BorrowMath::given_percent(&self.state, &ctx, &self.fees, asset_out, percent)
            .map_err(|err| self.rejected("borrow_given_percent", err))?;
        self.commit_borrow(&ctx, quote)
    }

    /// Withdraw the accumulated protocol fee
    pub fn collect_protocol_fee(&mut self) -> u128 {
        let collected = std::mem::take(&mut self.protocol_fee_stored);
        if collected > 0 {
            info!(pool = %self.key, collected, "protocol fee collected");
        }
        collected
    }

    fn seed(
        &self,
        ctx: &TimeContext,
        asset_in: u128,
        debt_in: u128,
        collateral_in: u128,
    ) -> Result<LiquidityReceipt, MathError> {
        let delta = LiquidityMath::given_new(ctx, asset_in, debt_in, collateral_in)?;
        Ok(LiquidityReceipt {
            delta,
            liquidity_out: LiquidityMath::liquidity_total_new(delta.x)?,
            due: Due {
                debt: LiquidityMath::mint_debt(&delta, ctx)?,
                collateral: LiquidityMath::mint_collateral(&delta, ctx)?,
            },
        })
    }

    fn deposit(&self, ctx: &TimeContext, asset_in: u128) -> Result<LiquidityReceipt, MathError> {
        ctx.duration()?;
        let delta = LiquidityMath::given_add(&self.state, asset_in)?;
        Ok(LiquidityReceipt {
            delta,
            liquidity_out: LiquidityMath::liquidity_total_add(
                &self.state,
                self.total_liquidity,
                &delta,
            )?,
            due: Due {
                debt: LiquidityMath::mint_debt(&delta, ctx)?,
                collateral: LiquidityMath::mint_collateral(&delta, ctx)?,
            },
        })
    }

    fn commit_liquidity(&mut self, receipt: &LiquidityReceipt) -> Result<(), PoolError> {
        let state = self.state.apply_liquidity(&receipt.delta)?;
        let total = self
            .total_liquidity
            .checked_add(receipt.liquidity_out)
            .ok_or_else(|| MathError::overflow("total_liquidity", 128))?;
        self.state = state;
        self.total_liquidity = total;
        Ok(())
    }

    fn commit_lend(&mut self, ctx: &TimeContext, quote: TradeQuote) -> Result<LendReceipt, PoolError> {
        let delta = quote.delta;
        let receipt = self
            .lend_receipt(ctx, quote)
            .map_err(|err| self.rejected("lend", err))?;
        let state = self.state.apply_lend(&delta, quote.fees.lp_fee)?;
        let stored = self.stored_after(quote.fees.protocol_fee)?;

        self.state = state;
        self.protocol_fee_stored = stored;
        info!(
            pool = %self.key,
            x_increase = delta.x,
            y_decrease = delta.y,
            z_decrease = delta.z,
            bond = receipt.bond(),
            insurance = receipt.insurance(),
            "lend committed"
        );
        Ok(receipt)
    }

    fn commit_borrow(
        &mut self,
        ctx: &TimeContext,
        quote: TradeQuote,
    ) -> Result<BorrowReceipt, PoolError> {
        let delta = quote.delta;
        let due = self
            .borrow_due(ctx, &delta)
            .map_err(|err| self.rejected("borrow", err))?;
        let state = self.state.apply_borrow(&delta, quote.fees.lp_fee)?;
        let stored = self.stored_after(quote.fees.protocol_fee)?;

        self.state = state;
        self.protocol_fee_stored = stored;
        info!(
            pool = %self.key,
            x_decrease = delta.x,
            y_increase = delta.y,
            z_increase = delta.z,
            debt = due.debt,
            collateral = due.collateral,
            "borrow committed"
        );
        Ok(BorrowReceipt { quote, due })
    }

    fn lend_receipt(&self, ctx: &TimeContext, quote: TradeQuote) -> Result<LendReceipt, MathError> {
        Ok(LendReceipt {
            quote,
            bond_principal: get_bond_principal(&quote.delta),
            bond_interest: get_bond_interest(&quote.delta, ctx)?,
            insurance_principal: get_insurance_principal(&self.state, &quote.delta)?,
            insurance_interest: get_insurance_interest(&quote.delta, ctx)?,
        })
    }

    fn borrow_due(&self, ctx: &TimeContext, delta: &StateDelta) -> Result<Due, MathError> {
        Ok(Due {
            debt: get_debt(delta, ctx)?,
            collateral: get_collateral(&self.state, delta, ctx)?,
        })
    }

    fn stored_after(&self, protocol_fee: u128) -> Result<u128, MathError> {
        self.protocol_fee_stored
            .checked_add(protocol_fee)
            .ok_or_else(|| MathError::overflow("protocol_fee_stored", 128))
    }

    fn rejected(&self, operation: &'static str, err: MathError) -> PoolError {
        warn!(pool = %self.key, operation, error = %err, "pool operation rejected");
        PoolError::Math(err)
    }
}
