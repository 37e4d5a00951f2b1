//! Lend math: asset in, bond and insurance claims out
//!
//! A lend grows `x` by the asset net of fees and shrinks `y` and `z`. The
//! caller pins one quantity (bond, insurance or a position in the feasible
//! `y` range) and the other reserve is solved from the invariant, rounding
//! in the pool's favor.

use crate::claims::insurance_principal;
use crate::constant_product::{check_constant_product, residual_reserve};
use crate::fee::lend_fees;
use crate::time_weight::{discount_up, BOND_SHIFT, INSURANCE_SHIFT};
use crate::MAX_PERCENT;
use tenor_types::fixed_point::{ensure_u112, mul_div, to_u112, u256};
use tenor_types::{FeeParams, FeeSplit, MathError, PoolState, StateDelta, TimeContext, TradeQuote};
use tracing::debug;

/// Feasible `y_decrease` range for a given asset increase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LendBounds {
    pub x_reserve: u128,
    pub y_min: u128,
    pub y_max: u128,
}

impl LendBounds {
    fn check(&self, y_decrease: u128, operation: &'static str) -> Result<(), MathError> {
        if y_decrease < self.y_min {
            return Err(MathError::InfeasibleTrade {
                operation,
                reason: "y decrease below minimum",
            });
        }
        if y_decrease > self.y_max {
            return Err(MathError::InfeasibleTrade {
                operation,
                reason: "y decrease above maximum",
            });
        }
        Ok(())
    }

    /// `y_min + floor((y_max - y_min) * percent / 2^32)`
    fn interpolate(&self, percent: u64) -> Result<u128, MathError> {
        let span = mul_div(
            u256(self.y_max - self.y_min),
            u256(percent as u128),
            u256(MAX_PERCENT as u128),
        )?;
        to_u112(u256(self.y_min) + span, "lend_interpolate")
    }
}

/// Lend pricing
pub struct LendMath;

impl LendMath {
    /// Bounds on `y_decrease` once `x_increase` has entered the pool
    ///
    /// `y_max = floor(x_increase * y / (x + x_increase))` and `y_min = y_max / 16`.
    pub fn bounds(state: &PoolState, x_increase: u128) -> Result<LendBounds, MathError> {
        let x_reserve = to_u112(u256(state.x()) + u256(x_increase), "lend_x_reserve")?;
        let y_max = to_u112(
            mul_div(u256(x_increase), u256(state.y()), u256(x_reserve))?,
            "lend_y_max",
        )?;
        Ok(LendBounds {
            x_reserve,
            y_min: y_max >> 4,
            y_max,
        })
    }

    /// Lend `asset_in` for exactly `bond_out` at maturity
    pub fn given_bond(
        state: &PoolState,
        ctx: &TimeContext,
        fees: &FeeParams,
        asset_in: u128,
        bond_out: u128,
    ) -> Result<TradeQuote, MathError> {
        const OP: &str = "lend_given_bond";
        let duration = ctx.duration()?;
        let (x_increase, fee) = prepare(state, fees, asset_in)?;
        if bond_out < x_increase {
            return Err(MathError::InfeasibleTrade {
                operation: OP,
                reason: "bond out below asset lent",
            });
        }
        let bounds = Self::bounds(state, x_increase)?;

        let y_decrease = to_u112(
            discount_up(bond_out - x_increase, duration, BOND_SHIFT)?,
            OP,
        )?;
        bounds.check(y_decrease, OP)?;
        let z_decrease = solve_z_decrease(state, bounds.x_reserve, y_decrease, OP)?;

        let quote = finish(state, bounds.x_reserve, x_increase, y_decrease, z_decrease, fee, OP)?;
        debug!(
            x_increase,
            y_decrease,
            z_decrease,
            bond_out,
            "lend given bond"
        );
        Ok(quote)
    }

    /// Lend `asset_in` for exactly `insurance_out` of collateral protection
    pub fn given_insurance(
        state: &PoolState,
        ctx: &TimeContext,
        fees: &FeeParams,
        asset_in: u128,
        insurance_out: u128,
    ) -> Result<TradeQuote, MathError> {
        const OP: &str = "lend_given_insurance";
        let duration = ctx.duration()?;
        let (x_increase, fee) = prepare(state, fees, asset_in)?;
        let bounds = Self::bounds(state, x_increase)?;

        let principal = insurance_principal(state, x_increase)?;
        if insurance_out < principal {
            return Err(MathError::InfeasibleTrade {
                operation: OP,
                reason: "insurance out below insurance principal",
            });
        }
        let z_decrease = to_u112(
            discount_up(insurance_out - principal, duration, INSURANCE_SHIFT)?,
            OP,
        )?;
        if z_decrease >= state.z() {
            return Err(MathError::InsufficientLiquidity {
                operation: OP,
                reason: "insurance out exceeds z reserve",
            });
        }
        let y_decrease = solve_y_decrease(state, bounds.x_reserve, z_decrease, OP)?;
        bounds.check(y_decrease, OP)?;

        let quote = finish(state, bounds.x_reserve, x_increase, y_decrease, z_decrease, fee, OP)?;
        debug!(
            x_increase,
            y_decrease,
            z_decrease,
            insurance_out,
            "lend given insurance"
        );
        Ok(quote)
    }

    /// Lend `asset_in` at a position in the feasible range
    ///
    /// `percent` is over `2^32`: zero takes the least bond interest, `2^32` the most.
    pub fn given_percent(
        state: &PoolState,
        ctx: &TimeContext,
        fees: &FeeParams,
        asset_in: u128,
        percent: u64,
    ) -> Result<TradeQuote, MathError> {
        const OP: &str = "lend_given_percent";
        if percent > MAX_PERCENT {
            return Err(MathError::InvalidPercent { percent });
        }
        ctx.duration()?;
        let (x_increase, fee) = prepare(state, fees, asset_in)?;
        let bounds = Self::bounds(state, x_increase)?;

        let y_decrease = bounds.interpolate(percent)?;
        let z_decrease = solve_z_decrease(state, bounds.x_reserve, y_decrease, OP)?;

        let quote = finish(state, bounds.x_reserve, x_increase, y_decrease, z_decrease, fee, OP)?;
        debug!(x_increase, y_decrease, z_decrease, percent, "lend given percent");
        Ok(quote)
    }
}

fn prepare(
    state: &PoolState,
    fees: &FeeParams,
    asset_in: u128,
) -> Result<(u128, FeeSplit), MathError> {
    if !state.is_initialized() {
        return Err(MathError::InsufficientLiquidity {
            operation: "lend",
            reason: "pool has no liquidity",
        });
    }
    if asset_in == 0 {
        return Err(MathError::ZeroInput { field: "asset_in" });
    }
    lend_fees(ensure_u112(asset_in, "lend_asset_in")?, fees)
}

/// `z - ceil(xyz / (x_reserve * (y - y_decrease)))`
fn solve_z_decrease(
    state: &PoolState,
    x_reserve: u128,
    y_decrease: u128,
    operation: &'static str,
) -> Result<u128, MathError> {
    let y_reserve = state
        .y()
        .checked_sub(y_decrease)
        .filter(|reserve| *reserve > 0)
        .ok_or(MathError::InsufficientLiquidity {
            operation,
            reason: "bond out exceeds y reserve",
        })?;
    let z_reserve = residual_reserve(state, x_reserve, y_reserve)?;
    if z_reserve > u256(state.z()) {
        return Err(MathError::InfeasibleTrade {
            operation,
            reason: "z reserve would have to grow",
        });
    }
    Ok(state.z() - z_reserve.low_u128())
}

/// `y - ceil(xyz / (x_reserve * (z - z_decrease)))`
fn solve_y_decrease(
    state: &PoolState,
    x_reserve: u128,
    z_decrease: u128,
    operation: &'static str,
) -> Result<u128, MathError> {
    let z_reserve = state.z() - z_decrease;
    let y_reserve = residual_reserve(state, x_reserve, z_reserve)?;
    if y_reserve > u256(state.y()) {
        return Err(MathError::InfeasibleTrade {
            operation,
            reason: "insurance out too large for asset in",
        });
    }
    Ok(state.y() - y_reserve.low_u128())
}

fn finish(
    state: &PoolState,
    x_reserve: u128,
    x_increase: u128,
    y_decrease: u128,
    z_decrease: u128,
    fees: FeeSplit,
    operation: &'static str,
) -> Result<TradeQuote, MathError> {
    check_constant_product(
        state,
        x_reserve,
        state.y() - y_decrease,
        state.z() - z_decrease,
        operation,
    )?;
    Ok(TradeQuote {
        delta: StateDelta::new(x_increase, y_decrease, z_decrease),
        fees,
    })
}
