//! Three-reserve constant-product invariant
//!
//! Every trade must leave `x * y * z` no smaller than before. Products are
//! taken in 512 bits so the comparison is exact for any pair of u112 states.

use tenor_types::fixed_point::{checked_mul, mul_div_up, u256};
use tenor_types::{MathError, PoolState, U256, U512};

/// `x * y * z` of arbitrary reserves
pub fn product(x: u128, y: u128, z: u128) -> U512 {
    U512::from(u256(x) * u256(y)) * U512::from(u256(z))
}

/// Reject a trade that would shrink the invariant
pub fn check_constant_product(
    state: &PoolState,
    x_reserve: u128,
    y_reserve: u128,
    z_reserve: u128,
    operation: &'static str,
) -> Result<(), MathError> {
    if product(x_reserve, y_reserve, z_reserve) < state.invariant() {
        return Err(MathError::InfeasibleTrade {
            operation,
            reason: "constant product decreased",
        });
    }
    Ok(())
}

/// Smallest third reserve keeping the invariant given the other two
///
/// `ceil(x * y * z / (first * second))`
pub fn residual_reserve(state: &PoolState, first: u128, second: u128) -> Result<U256, MathError> {
    let denominator = checked_mul(u256(first), u256(second), "residual_reserve")?;
    if denominator.is_zero() {
        return Err(MathError::InsufficientLiquidity {
            operation: "residual_reserve",
            reason: "reserve would be emptied",
        });
    }
    mul_div_up(u256(state.x()) * u256(state.y()), u256(state.z()), denominator)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state() -> PoolState {
        PoolState::from_reserves(10_000, 272_428, 515).unwrap()
    }

    #[test]
    fn test_product_matches_invariant() {
        assert_eq!(product(10_000, 272_428, 515), state().invariant());
    }

    #[test]
    fn test_check_constant_product() {
        let state = state();
        assert!(check_constant_product(&state, 10_000, 272_428, 515, "test").is_ok());
        assert!(check_constant_product(&state, 11_000, 259_295, 492, "test").is_ok());
        assert_eq!(
            check_constant_product(&state, 10_000, 272_428, 514, "test"),
            Err(MathError::InfeasibleTrade {
                operation: "test",
                reason: "constant product decreased"
            })
        );
    }

    #[test]
    fn test_residual_reserve_rounds_up() {
        let state = state();
        let z = residual_reserve(&state, 10_998, 259_295).unwrap();
        // 10000 * 272428 * 515 / (10998 * 259295) = 491.99..
        assert_eq!(z, u256(492));
        assert!(product(10_998, 259_295, z.low_u128()) >= state.invariant());
    }

    #[test]
    fn test_residual_reserve_rejects_empty_side() {
        assert!(matches!(
            residual_reserve(&state(), 0, 1),
            Err(MathError::InsufficientLiquidity { .. })
        ));
    }
}
