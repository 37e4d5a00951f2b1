//! Borrow math: asset out against debt and locked collateral
//!
//! A borrow shrinks `x` by the asset plus fee and grows `y` and `z`. The
//! caller pins debt, collateral or a position in the feasible `y` range and
//! the remaining reserve is solved from the invariant, rounding so the
//! borrower never owes less than the curve requires.

use crate::claims::collateral_principal;
use crate::constant_product::{check_constant_product, residual_reserve};
use crate::fee::borrow_fees;
use crate::time_weight::{discount_down, BOND_SHIFT, INSURANCE_SHIFT};
use crate::MAX_PERCENT;
use tenor_types::fixed_point::{ensure_u112, mul_div, mul_div_up, shift_right_up, to_u112, u256};
use tenor_types::{
    Due, FeeParams, FeeSplit, MathError, PoolState, StateDelta, TimeContext, TradeQuote,
};
use tracing::debug;

/// Feasible `y_increase` range and `z_increase` ceiling for a given asset decrease
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorrowBounds {
    pub x_reserve: u128,
    pub y_min: u128,
    pub y_max: u128,
    pub z_max: u128,
}

impl BorrowBounds {
    fn check_y(&self, y_increase: u128, operation: &'static str) -> Result<(), MathError> {
        if y_increase < self.y_min {
            return Err(MathError::InfeasibleTrade {
                operation,
                reason: "y increase below minimum",
            });
        }
        if y_increase > self.y_max {
            return Err(MathError::InfeasibleTrade {
                operation,
                reason: "y increase above maximum",
            });
        }
        Ok(())
    }

    fn check_z(&self, z_increase: u128, operation: &'static str) -> Result<(), MathError> {
        if z_increase > self.z_max {
            return Err(MathError::InfeasibleTrade {
                operation,
                reason: "z increase above maximum",
            });
        }
        Ok(())
    }

    fn interpolate(&self, percent: u64) -> Result<u128, MathError> {
        let span = mul_div(
            u256(self.y_max - self.y_min),
            u256(percent as u128),
            u256(MAX_PERCENT as u128),
        )?;
        to_u112(u256(self.y_min) + span, "borrow_interpolate")
    }
}

/// Borrow pricing
pub struct BorrowMath;

impl BorrowMath {
    /// Bounds once `x_decrease` has left the pool
    ///
    /// `y_max = ceil(x_decrease * y / (x - x_decrease))`, `y_min = ceil(y_max / 16)`
    /// and `z_max = ceil(x_decrease * z / (x - x_decrease))`.
    pub fn bounds(state: &PoolState, x_decrease: u128) -> Result<BorrowBounds, MathError> {
        if x_decrease >= state.x() {
            return Err(MathError::InsufficientLiquidity {
                operation: "borrow",
                reason: "asset out drains the pool",
            });
        }
        let x_reserve = state.x() - x_decrease;
        let y_max = mul_div_up(u256(x_decrease), u256(state.y()), u256(x_reserve))?;
        let z_max = mul_div_up(u256(x_decrease), u256(state.z()), u256(x_reserve))?;
        Ok(BorrowBounds {
            x_reserve,
            y_min: to_u112(shift_right_up(y_max, 4), "borrow_y_min")?,
            y_max: to_u112(y_max, "borrow_y_max")?,
            z_max: to_u112(z_max, "borrow_z_max")?,
        })
    }

    /// Borrow `asset_out` owing exactly `debt_in` at maturity
    pub fn given_debt(
        state: &PoolState,
        ctx: &TimeContext,
        fees: &FeeParams,
        asset_out: u128,
        debt_in: u128,
    ) -> Result<TradeQuote, MathError> {
        const OP: &str = "borrow_given_debt";
        let duration = ctx.duration()?;
        let (x_decrease, fee) = prepare(state, fees, asset_out)?;
        let bounds = Self::bounds(state, x_decrease)?;
        if debt_in < x_decrease {
            return Err(MathError::InfeasibleTrade {
                operation: OP,
                reason: "debt in below asset borrowed",
            });
        }

        let y_increase = to_u112(
            discount_down(debt_in - x_decrease, duration, BOND_SHIFT)?,
            OP,
        )?;
        bounds.check_y(y_increase, OP)?;
        let z_increase = solve_z_increase(state, bounds.x_reserve, y_increase)?;
        bounds.check_z(z_increase, OP)?;

        let quote = finish(state, bounds.x_reserve, x_decrease, y_increase, z_increase, fee, OP)?;
        debug!(
            x_decrease,
            y_increase,
            z_increase,
            debt_in,
            "borrow given debt"
        );
        Ok(quote)
    }

    /// Borrow `asset_out` locking exactly `collateral_in`
    pub fn given_collateral(
        state: &PoolState,
        ctx: &TimeContext,
        fees: &FeeParams,
        asset_out: u128,
        collateral_in: u128,
    ) -> Result<TradeQuote, MathError> {
        const OP: &str = "borrow_given_collateral";
        let duration = ctx.duration()?;
        let (x_decrease, fee) = prepare(state, fees, asset_out)?;
        let bounds = Self::bounds(state, x_decrease)?;

        let principal = collateral_principal(state, x_decrease)?;
        if collateral_in < principal {
            return Err(MathError::InfeasibleTrade {
                operation: OP,
                reason: "collateral in below collateral principal",
            });
        }
        let z_increase = to_u112(
            discount_down(collateral_in - principal, duration, INSURANCE_SHIFT)?,
            OP,
        )?;
        bounds.check_z(z_increase, OP)?;
        let y_increase = solve_y_increase(state, bounds.x_reserve, z_increase)?;
        bounds.check_y(y_increase, OP)?;

        let quote = finish(state, bounds.x_reserve, x_decrease, y_increase, z_increase, fee, OP)?;
        debug!(
            x_decrease,
            y_increase,
            z_increase,
            collateral_in,
            "borrow given collateral"
        );
        Ok(quote)
    }

    /// Borrow `asset_out` at a position in the feasible range
    ///
    /// `percent` is over `2^32`: zero takes the least debt interest, `2^32` the most.
    pub fn given_percent(
        state: &PoolState,
        ctx: &TimeContext,
        fees: &FeeParams,
        asset_out: u128,
        percent: u64,
    ) -> Result<TradeQuote, MathError> {
        const OP: &str = "borrow_given_percent";
        if percent > MAX_PERCENT {
            return Err(MathError::InvalidPercent { percent });
        }
        ctx.duration()?;
        let (x_decrease, fee) = prepare(state, fees, asset_out)?;
        let bounds = Self::bounds(state, x_decrease)?;

        let y_increase = bounds.interpolate(percent)?;
        let z_increase = solve_z_increase(state, bounds.x_reserve, y_increase)?;
        bounds.check_z(z_increase, OP)?;

        let quote = finish(state, bounds.x_reserve, x_decrease, y_increase, z_increase, fee, OP)?;
        debug!(x_decrease, y_increase, z_increase, percent, "borrow given percent");
        Ok(quote)
    }

    /// Collateral released when repaying `asset_in` of a position
    ///
    /// `floor(due.collateral * asset_in / due.debt)`
    pub fn repay_collateral_out(due: &Due, asset_in: u128) -> Result<u128, MathError> {
        const OP: &str = "repay";
        if asset_in == 0 {
            return Err(MathError::ZeroInput { field: "asset_in" });
        }
        if asset_in > due.debt {
            return Err(MathError::InfeasibleTrade {
                operation: OP,
                reason: "repayment exceeds debt",
            });
        }
        to_u112(
            mul_div(u256(due.collateral), u256(asset_in), u256(due.debt))?,
            OP,
        )
    }
}

fn prepare(
    state: &PoolState,
    fees: &FeeParams,
    asset_out: u128,
) -> Result<(u128, FeeSplit), MathError> {
    if !state.is_initialized() {
        return Err(MathError::InsufficientLiquidity {
            operation: "borrow",
            reason: "pool has no liquidity",
        });
    }
    if asset_out == 0 {
        return Err(MathError::ZeroInput { field: "asset_out" });
    }
    borrow_fees(ensure_u112(asset_out, "borrow_asset_out")?, fees)
}

/// `max(ceil(xyz / (x_reserve * (y + y_increase))) - z, 0)`
fn solve_z_increase(
    state: &PoolState,
    x_reserve: u128,
    y_increase: u128,
) -> Result<u128, MathError> {
    let y_reserve = to_u112(u256(state.y()) + u256(y_increase), "borrow_y_reserve")?;
    let z_reserve = to_u112(residual_reserve(state, x_reserve, y_reserve)?, "borrow_z_reserve")?;
    Ok(z_reserve.saturating_sub(state.z()))
}

/// `max(ceil(xyz / (x_reserve * (z + z_increase))) - y, 0)`
fn solve_y_increase(
    state: &PoolState,
    x_reserve: u128,
    z_increase: u128,
) -> Result<u128, MathError> {
    let z_reserve = to_u112(u256(state.z()) + u256(z_increase), "borrow_z_reserve")?;
    let y_reserve = to_u112(residual_reserve(state, x_reserve, z_reserve)?, "borrow_y_reserve")?;
    Ok(y_reserve.saturating_sub(state.y()))
}

fn finish(
    state: &PoolState,
    x_reserve: u128,
    x_decrease: u128,
    y_increase: u128,
    z_increase: u128,
    fees: FeeSplit,
    operation: &'static str,
) -> Result<TradeQuote, MathError> {
    let y_reserve = to_u112(u256(state.y()) + u256(y_increase), operation)?;
    let z_reserve = to_u112(u256(state.z()) + u256(z_increase), operation)?;
    check_constant_product(state, x_reserve, y_reserve, z_reserve, operation)?;
    Ok(TradeQuote {
        delta: StateDelta::new(x_decrease, y_increase, z_increase),
        fees,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claims::{get_collateral, get_debt};

    const FEES: FeeParams = FeeParams::new(100, 6554);

    fn state() -> PoolState {
        PoolState::from_reserves(10_000, 272_428, 515).unwrap()
    }

    fn ctx() -> TimeContext {
        TimeContext::new(31_536_000, 10_000)
    }

    #[test]
    fn test_bounds() {
        let bounds = BorrowMath::bounds(&state(), 1_002).unwrap();
        assert_eq!(
            bounds,
            BorrowBounds {
                x_reserve: 8_998,
                y_min: 1_897,
                y_max: 30_338,
                z_max: 58
            }
        );
    }

    #[test]
    fn test_given_percent_range() {
        let cases = [
            (0u64, StateDelta::new(1_002, 1_897, 54), 1_016, 109),
            (1 << 31, StateDelta::new(1_002, 16_117, 26), 1_121, 83),
            (MAX_PERCENT, StateDelta::new(1_002, 30_338, 0), 1_225, 58),
        ];
        for (percent, delta, debt, collateral) in cases {
            let quote =
                BorrowMath::given_percent(&state(), &ctx(), &FEES, 1_000, percent).unwrap();
            assert_eq!(quote.delta, delta, "percent {percent}");
            assert_eq!(quote.fees.lp_fee, 2);
            assert_eq!(get_debt(&quote.delta, &ctx()).unwrap(), debt);
            assert_eq!(get_collateral(&state(), &quote.delta, &ctx()).unwrap(), collateral);
        }
    }

    #[test]
    fn test_given_debt() {
        let quote = BorrowMath::given_debt(&state(), &ctx(), &FEES, 1_000, 1_121).unwrap();
        assert_eq!(quote.delta, StateDelta::new(1_002, 16_212, 26));
        assert_eq!(get_debt(&quote.delta, &ctx()).unwrap(), 1_121);
    }

    #[test]
    fn test_given_debt_outside_range() {
        assert!(matches!(
            BorrowMath::given_debt(&state(), &ctx(), &FEES, 1_000, 1_000),
            Err(MathError::InfeasibleTrade {
                reason: "debt in below asset borrowed",
                ..
            })
        ));
        assert!(matches!(
            BorrowMath::given_debt(&state(), &ctx(), &FEES, 1_000, 1_002),
            Err(MathError::InfeasibleTrade {
                reason: "y increase below minimum",
                ..
            })
        ));
    }

    #[test]
    fn test_given_collateral() {
        let quote = BorrowMath::given_collateral(&state(), &ctx(), &FEES, 1_000, 100).unwrap();
        assert_eq!(quote.delta, StateDelta::new(1_002, 6_506, 44));
        assert_eq!(get_collateral(&state(), &quote.delta, &ctx()).unwrap(), 100);
    }

    #[test]
    fn test_given_collateral_outside_range() {
        // 1010 collateral would need z to grow by 1013, far past z_max 58
        assert!(matches!(
            BorrowMath::given_collateral(&state(), &ctx(), &FEES, 1_000, 1_010),
            Err(MathError::InfeasibleTrade {
                reason: "z increase above maximum",
                ..
            })
        ));
        assert!(matches!(
            BorrowMath::given_collateral(&state(), &ctx(), &FEES, 1_000, 50),
            Err(MathError::InfeasibleTrade {
                reason: "collateral in below collateral principal",
                ..
            })
        ));
    }

    #[test]
    fn test_borrow_cannot_drain_pool() {
        assert!(matches!(
            BorrowMath::given_percent(&state(), &ctx(), &FEES, 10_000, 0),
            Err(MathError::InsufficientLiquidity { .. })
        ));
        assert_eq!(
            BorrowMath::given_percent(&state(), &ctx(), &FEES, 0, 0),
            Err(MathError::ZeroInput { field: "asset_out" })
        );
    }

    #[test]
    fn test_repay_collateral_out() {
        let due = Due {
            debt: 1_121,
            collateral: 83,
        };
        assert_eq!(BorrowMath::repay_collateral_out(&due, 500).unwrap(), 37);
        assert_eq!(BorrowMath::repay_collateral_out(&due, 1_121).unwrap(), 83);
        assert!(matches!(
            BorrowMath::repay_collateral_out(&due, 1_122),
            Err(MathError::InfeasibleTrade { .. })
        ));
        assert_eq!(
            BorrowMath::repay_collateral_out(&due, 0),
            Err(MathError::ZeroInput { field: "asset_in" })
        );
    }
}
