//! Wide-integer fixed-point helpers for reserve math
//!
//! All reserve math runs on `U256` operands. Products of two 256-bit values are
//! formed in `U512` so `mul_div` never loses the high word; only the final
//! quotient is narrowed, and narrowing that does not fit is an `Overflow`.
//!
//! ## Rounding
//!
//! - `mul_div` / `>>`: floor, for amounts owed TO a user
//! - `mul_div_up` / `div_up` / `shift_right_up`: ceiling, for amounts owed BY a
//!   user or retained by the pool

use crate::common::errors::MathError;
use primitive_types::{U256, U512};

/// Largest value a reserve or amount may hold
pub const MAX_U112: u128 = (1u128 << 112) - 1;

/// `floor(a * b / denominator)` with a 512-bit intermediate product
pub fn mul_div(a: U256, b: U256, denominator: U256) -> Result<U256, MathError> {
    let (quotient, _) = mul_div_rem(a, b, denominator)?;
    narrow_u256(quotient, "mul_div")
}

/// `ceil(a * b / denominator)` with a 512-bit intermediate product
pub fn mul_div_up(a: U256, b: U256, denominator: U256) -> Result<U256, MathError> {
    let (quotient, remainder) = mul_div_rem(a, b, denominator)?;
    let quotient = if remainder.is_zero() {
        quotient
    } else {
        quotient + U512::one()
    };
    narrow_u256(quotient, "mul_div_up")
}

fn mul_div_rem(a: U256, b: U256, denominator: U256) -> Result<(U512, U512), MathError> {
    if denominator.is_zero() {
        return Err(MathError::DivisionByZero {
            operation: "mul_div",
        });
    }
    let product = U512::from(a) * U512::from(b);
    let denominator = U512::from(denominator);
    Ok((product / denominator, product % denominator))
}

fn narrow_u256(value: U512, operation: &'static str) -> Result<U256, MathError> {
    U256::try_from(value).map_err(|_| MathError::overflow(operation, 256))
}

/// `ceil(a / denominator)`
pub fn div_up(a: U256, denominator: U256) -> Result<U256, MathError> {
    if denominator.is_zero() {
        return Err(MathError::DivisionByZero { operation: "div_up" });
    }
    let quotient = a / denominator;
    if (a % denominator).is_zero() {
        Ok(quotient)
    } else {
        Ok(quotient + U256::one())
    }
}

/// Ceiling right shift: `ceil(a / 2^bits)`
pub fn shift_right_up(a: U256, bits: u32) -> U256 {
    let shifted = a >> bits;
    if shifted << bits == a {
        shifted
    } else {
        shifted + U256::one()
    }
}

/// Multiplication that reports wrap-around as `Overflow`
pub fn checked_mul(a: U256, b: U256, operation: &'static str) -> Result<U256, MathError> {
    a.checked_mul(b)
        .ok_or_else(|| MathError::overflow(operation, 256))
}

/// Addition that reports wrap-around as `Overflow`
pub fn checked_add(a: U256, b: U256, operation: &'static str) -> Result<U256, MathError> {
    a.checked_add(b)
        .ok_or_else(|| MathError::overflow(operation, 256))
}

/// Narrow to a reserve-sized amount (112 bits)
pub fn to_u112(value: U256, operation: &'static str) -> Result<u128, MathError> {
    if value.bits() > 112 {
        return Err(MathError::overflow(operation, 112));
    }
    Ok(value.low_u128())
}

/// Narrow to a claim-sized amount (128 bits)
pub fn to_u128(value: U256, operation: &'static str) -> Result<u128, MathError> {
    if value.bits() > 128 {
        return Err(MathError::overflow(operation, 128));
    }
    Ok(value.low_u128())
}

/// Check that a caller-supplied amount fits 112 bits
pub fn ensure_u112(value: u128, operation: &'static str) -> Result<u128, MathError> {
    if value > MAX_U112 {
        return Err(MathError::overflow(operation, 112));
    }
    Ok(value)
}

#[inline]
pub fn u256(value: u128) -> U256 {
    U256::from(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_mul_div_rounding_directions() {
        assert_eq!(mul_div(u256(10), u256(10), u256(3)).unwrap(), u256(33));
        assert_eq!(mul_div_up(u256(10), u256(10), u256(3)).unwrap(), u256(34));
        // Exact division never rounds up
        assert_eq!(mul_div_up(u256(10), u256(9), u256(3)).unwrap(), u256(30));
    }

    #[test]
    fn test_mul_div_uses_wide_intermediate() {
        // 2^400 / 2^150 = 2^250: the product alone needs 400 bits
        let a = U256::one() << 200;
        let d = U256::one() << 150;
        let expected = U256::one() << 250;
        assert_eq!(mul_div(a, a, d).unwrap(), expected);
    }

    #[test]
    fn test_mul_div_overflow_is_reported() {
        let a = U256::MAX;
        let err = mul_div(a, u256(2), u256(1)).unwrap_err();
        assert_eq!(
            err,
            MathError::Overflow {
                operation: "mul_div",
                bits: 256
            }
        );
        assert!(mul_div_up(a, a, u256(3)).is_err());
    }

    #[test]
    fn test_zero_denominator() {
        assert!(matches!(
            mul_div(u256(1), u256(1), U256::zero()),
            Err(MathError::DivisionByZero { .. })
        ));
        assert!(matches!(
            div_up(u256(1), U256::zero()),
            Err(MathError::DivisionByZero { .. })
        ));
    }

    #[test]
    fn test_shift_right_up() {
        assert_eq!(shift_right_up(u256(32), 4), u256(2));
        assert_eq!(shift_right_up(u256(33), 4), u256(3));
        assert_eq!(shift_right_up(U256::zero(), 4), U256::zero());
        assert_eq!(shift_right_up(u256(1), 32), u256(1));
    }

    #[test]
    fn test_narrowing_boundaries() {
        assert_eq!(to_u112(u256(MAX_U112), "t").unwrap(), MAX_U112);
        assert_eq!(
            to_u112(u256(MAX_U112 + 1), "t"),
            Err(MathError::Overflow {
                operation: "t",
                bits: 112
            })
        );
        assert_eq!(to_u128(u256(u128::MAX), "t").unwrap(), u128::MAX);
        assert!(to_u128(u256(u128::MAX) + U256::one(), "t").is_err());
        assert!(ensure_u112(MAX_U112 + 1, "t").is_err());
    }

    #[test]
    fn test_checked_ops_do_not_wrap() {
        assert!(checked_mul(U256::MAX, u256(2), "t").is_err());
        assert!(checked_add(U256::MAX, U256::one(), "t").is_err());
        assert_eq!(checked_add(u256(2), u256(3), "t").unwrap(), u256(5));
    }

    proptest! {
        #[test]
        fn mul_div_up_is_floor_or_floor_plus_one(a in any::<u128>(), b in any::<u128>(), d in 1u128..) {
            let down = mul_div(u256(a), u256(b), u256(d)).unwrap();
            let up = mul_div_up(u256(a), u256(b), u256(d)).unwrap();
            prop_assert!(up == down || up == down + U256::one());
            let exact = (U512::from(u256(a)) * U512::from(u256(b))) % U512::from(u256(d));
            prop_assert_eq!(up == down, exact.is_zero());
        }

        #[test]
        fn shift_right_up_matches_div_up(a in any::<u128>(), bits in 0u32..64) {
            let expected = div_up(u256(a), U256::one() << bits).unwrap();
            prop_assert_eq!(shift_right_up(u256(a), bits), expected);
        }
    }
}
