//! Trade fees
//!
//! The fee is taken on the asset side of every lend and borrow. Lending pays
//! the fee out of the deposited asset, borrowing pays it on top of the asset
//! withdrawn. The total always rounds up so the pool never undercharges.

use tenor_types::fixed_point::{ensure_u112, mul_div, mul_div_up, to_u128, u256};
use tenor_types::{FeeParams, FeeSplit, MathError, FEE_BASE};

/// Split `amount`'s fee into LP and protocol shares
pub fn split_fee(amount: u128, fees: &FeeParams) -> Result<FeeSplit, MathError> {
    let base = u256(FEE_BASE);
    let total = mul_div_up(u256(amount), u256(fees.fee as u128), base)?;
    let protocol = mul_div(total, u256(fees.protocol_fee as u128), base)?;
    let total = to_u128(total, "fee_total")?;
    let protocol_fee = to_u128(protocol, "fee_protocol")?;
    Ok(FeeSplit {
        lp_fee: total - protocol_fee,
        protocol_fee,
    })
}

/// Asset that reaches the curve when lending `asset_in`
///
/// Returns `(x_increase, fee)` with `x_increase = asset_in - fee.total()`.
pub fn lend_fees(asset_in: u128, fees: &FeeParams) -> Result<(u128, FeeSplit), MathError> {
    let split = split_fee(asset_in, fees)?;
    let x_increase = asset_in
        .checked_sub(split.total())
        .filter(|increase| *increase > 0)
        .ok_or(MathError::ZeroInput {
            field: "x_increase",
        })?;
    Ok((x_increase, split))
}

/// Asset removed from the curve when borrowing `asset_out`
///
/// Returns `(x_decrease, fee)` with `x_decrease = asset_out + fee.total()`.
pub fn borrow_fees(asset_out: u128, fees: &FeeParams) -> Result<(u128, FeeSplit), MathError> {
    let split = split_fee(asset_out, fees)?;
    let x_decrease = asset_out
        .checked_add(split.total())
        .ok_or_else(|| MathError::overflow("borrow_fees", 112))?;
    Ok((ensure_u112(x_decrease, "borrow_fees")?, split))
}
