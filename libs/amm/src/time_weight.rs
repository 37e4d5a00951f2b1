//! Time-to-maturity weighting
//!
//! Interest accrues linearly in the time left until maturity. The `y` reserve
//! is scaled by `2^32` per second and the `z` reserve by `2^25` per second, so
//! `y * duration >> 32` is bond interest and `z * duration >> 25` is insurance
//! (or collateral) interest.

use tenor_types::fixed_point::{div_up, shift_right_up, u256};
use tenor_types::{MathError, TimeContext, U256};

/// Fixed-point shift of the bond-rate reserve
pub const BOND_SHIFT: u32 = 32;

/// Fixed-point shift of the insurance-rate reserve
pub const INSURANCE_SHIFT: u32 = 25;

/// `maturity - now`; `InvalidMaturity` once `now >= maturity`
pub fn duration(maturity: u64, now: u64) -> Result<u64, MathError> {
    TimeContext::new(maturity, now).duration()
}

/// `floor(rate * duration / 2^shift)`
pub fn accrue_down(rate: u128, duration: u64, shift: u32) -> U256 {
    (u256(rate) * U256::from(duration)) >> shift
}

/// `ceil(rate * duration / 2^shift)`
pub fn accrue_up(rate: u128, duration: u64, shift: u32) -> U256 {
    shift_right_up(u256(rate) * U256::from(duration), shift)
}

/// Rate needed to accrue at least `amount` by maturity: `ceil((amount << shift) / duration)`
pub fn discount_up(amount: u128, duration: u64, shift: u32) -> Result<U256, MathError> {
    div_up(u256(amount) << shift, U256::from(duration))
}

/// Largest rate accruing at most `amount` by maturity: `floor((amount << shift) / duration)`
pub fn discount_down(amount: u128, duration: u64, shift: u32) -> Result<U256, MathError> {
    if duration == 0 {
        return Err(MathError::DivisionByZero {
            operation: "discount_down",
        });
    }
    Ok((u256(amount) << shift) / U256::from(duration))
}
