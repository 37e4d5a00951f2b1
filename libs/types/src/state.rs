//! Pool reserve state and the deltas that move it
//!
//! `PoolState` is never assembled field by field by callers: it is loaded
//! through a validated constructor or derived from a prior state plus a delta
//! produced by the liquidity, lend or borrow math.

use crate::common::errors::MathError;
use crate::common::fixed_point::{ensure_u112, MAX_U112};
use primitive_types::{U256, U512};
use serde::{Deserialize, Serialize};

/// Reserve magnitudes moved by one operation
///
/// Always non-negative. Direction depends on the producing function:
/// liquidity adds to all three, lend adds `x` and removes `y`/`z`, borrow
/// removes `x` and adds `y`/`z`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct StateDelta {
    pub x: u128,
    pub y: u128,
    pub z: u128,
}

impl StateDelta {
    pub const fn new(x: u128, y: u128, z: u128) -> Self {
        Self { x, y, z }
    }
}

/// The three pool reserves
///
/// - `x`: asset reserve
/// - `y`: bond-rate reserve (interest curve)
/// - `z`: insurance-rate reserve (collateral curve)
///
/// Each value is bounded by `MAX_U112`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "StateDelta", into = "StateDelta")]
pub struct PoolState {
    x: u128,
    y: u128,
    z: u128,
}

impl PoolState {
    /// Pool before any liquidity has been supplied
    pub const EMPTY: Self = Self { x: 0, y: 0, z: 0 };

    /// Rebuild a state from persisted reserves
    pub fn from_reserves(x: u128, y: u128, z: u128) -> Result<Self, MathError> {
        Ok(Self {
            x: ensure_u112(x, "pool_state_x")?,
            y: ensure_u112(y, "pool_state_y")?,
            z: ensure_u112(z, "pool_state_z")?,
        })
    }

    pub fn x(&self) -> u128 {
        self.x
    }

    pub fn y(&self) -> u128 {
        self.y
    }

    pub fn z(&self) -> u128 {
        self.z
    }

    /// All three reserves are strictly positive
    pub fn is_initialized(&self) -> bool {
        self.x != 0 && self.y != 0 && self.z != 0
    }

    /// `x * y * z` without loss (at most 336 bits)
    pub fn invariant(&self) -> U512 {
        U512::from(U256::from(self.y) * U256::from(self.z)) * U512::from(U256::from(self.x))
    }

    /// State after a liquidity deposit of `delta`
    pub fn apply_liquidity(&self, delta: &StateDelta) -> Result<Self, MathError> {
        Ok(Self {
            x: add_reserve(self.x, delta.x, "liquidity_x")?,
            y: add_reserve(self.y, delta.y, "liquidity_y")?,
            z: add_reserve(self.z, delta.z, "liquidity_z")?,
        })
    }

    /// State after a lend; `retained_fee` is the LP fee share kept in `x`
    pub fn apply_lend(&self, delta: &StateDelta, retained_fee: u128) -> Result<Self, MathError> {
        let x_increase = delta
            .x
            .checked_add(retained_fee)
            .ok_or_else(|| MathError::overflow("lend_x", 112))?;
        Ok(Self {
            x: add_reserve(self.x, x_increase, "lend_x")?,
            y: sub_reserve(self.y, delta.y, "lend_y")?,
            z: sub_reserve(self.z, delta.z, "lend_z")?,
        })
    }

    /// State after a borrow; `retained_fee` is the LP fee share that stays in `x`
    pub fn apply_borrow(&self, delta: &StateDelta, retained_fee: u128) -> Result<Self, MathError> {
        let x_decrease = delta.x.saturating_sub(retained_fee);
        Ok(Self {
            x: sub_reserve(self.x, x_decrease, "borrow_x")?,
            y: add_reserve(self.y, delta.y, "borrow_y")?,
            z: add_reserve(self.z, delta.z, "borrow_z")?,
        })
    }
}

fn add_reserve(reserve: u128, increase: u128, operation: &'static str) -> Result<u128, MathError> {
    match reserve.checked_add(increase) {
        Some(value) if value <= MAX_U112 => Ok(value),
        _ => Err(MathError::overflow(operation, 112)),
    }
}

fn sub_reserve(reserve: u128, decrease: u128, operation: &'static str) -> Result<u128, MathError> {
    reserve
        .checked_sub(decrease)
        .ok_or(MathError::InsufficientLiquidity {
            operation,
            reason: "decrease exceeds reserve",
        })
}

impl TryFrom<StateDelta> for PoolState {
    type Error = MathError;

    fn try_from(raw: StateDelta) -> Result<Self, Self::Error> {
        Self::from_reserves(raw.x, raw.y, raw.z)
    }
}

impl From<PoolState> for StateDelta {
    fn from(state: PoolState) -> Self {
        StateDelta::new(state.x, state.y, state.z)
    }
}

/// A borrower's outstanding position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Due {
    pub debt: u128,
    pub collateral: u128,
}
