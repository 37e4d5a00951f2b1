//! Claim projections
//!
//! Turn a solved `StateDelta` into what the user actually receives or owes:
//! bond and insurance claims for lenders, debt and collateral for borrowers.
//! Lender-side values round down, borrower-side values round up.

use crate::time_weight::{accrue_down, accrue_up, BOND_SHIFT, INSURANCE_SHIFT};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tenor_types::fixed_point::{checked_add, mul_div, mul_div_up, to_u112, to_u128, u256};
use tenor_types::{MathError, PoolState, StateDelta, TimeContext};

const SECONDS_PER_YEAR: Decimal = dec!(31536000);

/// Bond principal: the asset that reached the curve
pub fn get_bond_principal(delta: &StateDelta) -> u128 {
    delta.x
}

/// Bond interest: `floor(y_decrease * duration / 2^32)`
pub fn get_bond_interest(delta: &StateDelta, ctx: &TimeContext) -> Result<u128, MathError> {
    to_u128(
        accrue_down(delta.y, ctx.duration()?, BOND_SHIFT),
        "bond_interest",
    )
}

/// Total bond claim of a lend
pub fn get_bond(delta: &StateDelta, ctx: &TimeContext) -> Result<u128, MathError> {
    let interest = get_bond_interest(delta, ctx)?;
    delta
        .x
        .checked_add(interest)
        .ok_or_else(|| MathError::overflow("bond", 128))
}

/// Insurance principal for an asset increase: `floor(z * x_increase / (x + x_increase))`
pub fn insurance_principal(state: &PoolState, x_increase: u128) -> Result<u128, MathError> {
    let x_reserve = u256(state.x()) + u256(x_increase);
    to_u112(
        mul_div(u256(state.z()), u256(x_increase), x_reserve)?,
        "insurance_principal",
    )
}

pub fn get_insurance_principal(state: &PoolState, delta: &StateDelta) -> Result<u128, MathError> {
    insurance_principal(state, delta.x)
}

/// Insurance interest: `floor(z_decrease * duration / 2^25)`
pub fn get_insurance_interest(delta: &StateDelta, ctx: &TimeContext) -> Result<u128, MathError> {
    to_u128(
        accrue_down(delta.z, ctx.duration()?, INSURANCE_SHIFT),
        "insurance_interest",
    )
}

/// Total insurance claim of a lend
pub fn get_insurance(
    state: &PoolState,
    delta: &StateDelta,
    ctx: &TimeContext,
) -> Result<u128, MathError> {
    let interest = get_insurance_interest(delta, ctx)?;
    get_insurance_principal(state, delta)?
        .checked_add(interest)
        .ok_or_else(|| MathError::overflow("insurance", 128))
}

/// Collateral locked against an asset decrease: `ceil(z * x_decrease / (x - x_decrease))`
pub fn collateral_principal(state: &PoolState, x_decrease: u128) -> Result<u128, MathError> {
    if x_decrease >= state.x() {
        return Err(MathError::InsufficientLiquidity {
            operation: "collateral_principal",
            reason: "asset out drains the pool",
        });
    }
    let x_reserve = u256(state.x() - x_decrease);
    to_u112(
        mul_div_up(u256(state.z()), u256(x_decrease), x_reserve)?,
        "collateral_principal",
    )
}

/// Debt owed at maturity: `x_decrease + ceil(y_increase * duration / 2^32)`
pub fn get_debt(delta: &StateDelta, ctx: &TimeContext) -> Result<u128, MathError> {
    let interest = accrue_up(delta.y, ctx.duration()?, BOND_SHIFT);
    to_u112(checked_add(u256(delta.x), interest, "debt")?, "debt")
}

/// Collateral locked by a borrow
pub fn get_collateral(
    state: &PoolState,
    delta: &StateDelta,
    ctx: &TimeContext,
) -> Result<u128, MathError> {
    let interest = accrue_up(delta.z, ctx.duration()?, INSURANCE_SHIFT);
    let principal = collateral_principal(state, delta.x)?;
    to_u112(checked_add(interest, u256(principal), "collateral")?, "collateral")
}

/// Annualized simple rate a lender earns on the bond
pub fn get_lend_rate(delta: &StateDelta, ctx: &TimeContext) -> Result<Decimal, MathError> {
    let interest = get_bond_interest(delta, ctx)?;
    annualize(interest, delta.x, ctx.duration()?)
}

/// Annualized simple rate a borrower pays on the debt
pub fn get_borrow_rate(delta: &StateDelta, ctx: &TimeContext) -> Result<Decimal, MathError> {
    let duration = ctx.duration()?;
    let interest = to_u128(accrue_up(delta.y, duration, BOND_SHIFT), "borrow_rate")?;
    annualize(interest, delta.x, duration)
}

fn annualize(interest: u128, principal: u128, duration: u64) -> Result<Decimal, MathError> {
    const OP: &str = "annualize";
    if principal == 0 {
        return Err(MathError::DivisionByZero { operation: OP });
    }
    let interest = Decimal::from_u128(interest).ok_or_else(|| MathError::overflow(OP, 96))?;
    let principal = Decimal::from_u128(principal).ok_or_else(|| MathError::overflow(OP, 96))?;
    interest
        .checked_div(principal)
        .and_then(|rate| rate.checked_mul(SECONDS_PER_YEAR))
        .and_then(|rate| rate.checked_div(Decimal::from(duration)))
        .ok_or_else(|| MathError::overflow(OP, 96))
}
