//! Liquidity provisioning math
//!
//! The first deposit prices the pool: the spread between debt and asset sets
//! the bond rate `y`, the collateral sets the insurance rate `z`. Later
//! deposits scale all three reserves by the asset ratio.

use crate::time_weight::{accrue_up, BOND_SHIFT, INSURANCE_SHIFT};
use tenor_types::fixed_point::{checked_add, ensure_u112, mul_div, to_u112, to_u128, u256};
use tenor_types::{MathError, PoolState, StateDelta, TimeContext, U256};
use tracing::debug;

/// Shift from asset units to liquidity units on the first deposit
pub const LIQUIDITY_SHIFT: u32 = 16;

/// Liquidity provisioning calculations
pub struct LiquidityMath;

impl LiquidityMath {
    /// Reserves seeded by the first deposit
    ///
    /// - `x = asset_in`
    /// - `y = ((debt_in - asset_in) << 32) / duration`
    /// - `z = (collateral_in << 25) / (duration + 2^25)`
    pub fn given_new(
        ctx: &TimeContext,
        asset_in: u128,
        debt_in: u128,
        collateral_in: u128,
    ) -> Result<StateDelta, MathError> {
        let duration = ctx.duration()?;
        if asset_in == 0 {
            return Err(MathError::ZeroInput { field: "asset_in" });
        }
        if collateral_in == 0 {
            return Err(MathError::ZeroInput {
                field: "collateral_in",
            });
        }
        if debt_in <= asset_in {
            return Err(MathError::NonPositiveInterest { asset_in, debt_in });
        }
        let x = ensure_u112(asset_in, "new_liquidity_x")?;
        ensure_u112(debt_in, "new_liquidity_debt")?;
        ensure_u112(collateral_in, "new_liquidity_collateral")?;

        let y = (u256(debt_in - asset_in) << BOND_SHIFT) / U256::from(duration);
        let z = (u256(collateral_in) << INSURANCE_SHIFT)
            / (U256::from(duration) + (U256::one() << INSURANCE_SHIFT));
        let y = to_u112(y, "new_liquidity_y")?;
        let z = to_u112(z, "new_liquidity_z")?;
        if y == 0 {
            return Err(MathError::ZeroInput { field: "y_increase" });
        }
        if z == 0 {
            return Err(MathError::ZeroInput { field: "z_increase" });
        }

        debug!(x, y, z, duration, "new liquidity delta");
        Ok(StateDelta::new(x, y, z))
    }

    /// Proportional reserves for a deposit into an initialized pool
    pub fn given_add(state: &PoolState, asset_in: u128) -> Result<StateDelta, MathError> {
        if !state.is_initialized() {
            return Err(MathError::InsufficientLiquidity {
                operation: "add_liquidity",
                reason: "pool has no liquidity",
            });
        }
        if asset_in == 0 {
            return Err(MathError::ZeroInput { field: "asset_in" });
        }
        let x = ensure_u112(asset_in, "add_liquidity_x")?;
        let y = to_u112(
            mul_div(u256(state.y()), u256(asset_in), u256(state.x()))?,
            "add_liquidity_y",
        )?;
        let z = to_u112(
            mul_div(u256(state.z()), u256(asset_in), u256(state.x()))?,
            "add_liquidity_z",
        )?;
        if y == 0 {
            return Err(MathError::ZeroInput { field: "y_increase" });
        }
        if z == 0 {
            return Err(MathError::ZeroInput { field: "z_increase" });
        }

        debug!(x, y, z, "add liquidity delta");
        Ok(StateDelta::new(x, y, z))
    }

    /// Liquidity minted by the first deposit: `x_increase << 16`
    pub fn liquidity_total_new(x_increase: u128) -> Result<u128, MathError> {
        to_u128(u256(x_increase) << LIQUIDITY_SHIFT, "liquidity_total_new")
    }

    /// Liquidity minted by a later deposit
    ///
    /// Smallest of `total * increase / reserve` across the three reserves.
    pub fn liquidity_total_add(
        state: &PoolState,
        total_liquidity: u128,
        delta: &StateDelta,
    ) -> Result<u128, MathError> {
        let total = u256(total_liquidity);
        let by_x = mul_div(total, u256(delta.x), u256(state.x()))?;
        let by_y = mul_div(total, u256(delta.y), u256(state.y()))?;
        let by_z = mul_div(total, u256(delta.z), u256(state.z()))?;
        to_u128(by_x.min(by_y).min(by_z), "liquidity_total_add")
    }

    /// Debt the liquidity provider owes: `x + ceil(y * duration / 2^32)`
    pub fn mint_debt(delta: &StateDelta, ctx: &TimeContext) -> Result<u128, MathError> {
        let interest = accrue_up(delta.y, ctx.duration()?, BOND_SHIFT);
        to_u112(checked_add(u256(delta.x), interest, "mint_debt")?, "mint_debt")
    }

    /// Collateral the liquidity provider locks: `ceil(z * duration / 2^25) + z`
    pub fn mint_collateral(delta: &StateDelta, ctx: &TimeContext) -> Result<u128, MathError> {
        let interest = accrue_up(delta.z, ctx.duration()?, INSURANCE_SHIFT);
        to_u112(checked_add(interest, u256(delta.z), "mint_collateral")?, "mint_collateral")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed_ctx() -> TimeContext {
        TimeContext::new(31_536_000, 5_000)
    }

    #[test]
    fn test_given_new() {
        let delta = LiquidityMath::given_new(&seed_ctx(), 10_000, 12_000, 1_000).unwrap();
        assert_eq!(delta, StateDelta::new(10_000, 272_428, 515));
        assert_eq!(LiquidityMath::mint_debt(&delta, &seed_ctx()).unwrap(), 12_000);
        assert_eq!(LiquidityMath::mint_collateral(&delta, &seed_ctx()).unwrap(), 999);
        assert_eq!(
            LiquidityMath::liquidity_total_new(delta.x).unwrap(),
            655_360_000
        );
    }

    #[test]
    fn test_given_new_rejections() {
        let ctx = seed_ctx();
        assert_eq!(
            LiquidityMath::given_new(&ctx, 0, 12_000, 1_000),
            Err(MathError::ZeroInput { field: "asset_in" })
        );
        assert_eq!(
            LiquidityMath::given_new(&ctx, 10_000, 12_000, 0),
            Err(MathError::ZeroInput {
                field: "collateral_in"
            })
        );
        assert_eq!(
            LiquidityMath::given_new(&ctx, 10_000, 10_000, 1_000),
            Err(MathError::NonPositiveInterest {
                asset_in: 10_000,
                debt_in: 10_000
            })
        );
        assert!(matches!(
            LiquidityMath::given_new(&TimeContext::new(5_000, 5_000), 10_000, 12_000, 1_000),
            Err(MathError::InvalidMaturity { .. })
        ));
    }

    #[test]
    fn test_given_new_tiny_spread_rounds_to_zero() {
        // 1 << 32 over a duration longer than 2^32 seconds
        let ctx = TimeContext::new(u64::MAX, 0);
        assert_eq!(
            LiquidityMath::given_new(&ctx, 10, 11, 1_000),
            Err(MathError::ZeroInput { field: "y_increase" })
        );
    }

    #[test]
    fn test_given_add() {
        let state = PoolState::from_reserves(10_000, 272_428, 515).unwrap();
        let delta = LiquidityMath::given_add(&state, 1_000).unwrap();
        assert_eq!(delta, StateDelta::new(1_000, 27_242, 51));

        let minted = LiquidityMath::liquidity_total_add(&state, 655_360_000, &delta).unwrap();
        // bound by z: 655_360_000 * 51 / 515
        assert_eq!(minted, 64_899_728);
    }

    #[test]
    fn test_given_add_requires_liquidity() {
        assert!(matches!(
            LiquidityMath::given_add(&PoolState::EMPTY, 1_000),
            Err(MathError::InsufficientLiquidity { .. })
        ));
    }
}
