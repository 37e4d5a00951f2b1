//! Error types for fixed-maturity AMM math and pool bookkeeping
//!
//! Every math failure is a typed value. Nothing here is recoverable locally:
//! a caller receiving a `MathError` rejects the whole trade.

use thiserror::Error;

/// Errors produced by the pure pricing and invariant math
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MathError {
    /// Result does not fit the target bit width
    #[error("Overflow in {operation}: result exceeds {bits}-bit range")]
    Overflow { operation: &'static str, bits: u32 },

    /// Division by zero in fixed-point arithmetic
    #[error("Division by zero in {operation}")]
    DivisionByZero { operation: &'static str },

    /// Pool is matured (or the timestamps are reversed)
    #[error("Invalid maturity: now {now} is not before maturity {maturity}")]
    InvalidMaturity { maturity: u64, now: u64 },

    /// Reserves cannot cover the requested amount
    #[error("Insufficient liquidity in {operation}: {reason}")]
    InsufficientLiquidity {
        operation: &'static str,
        reason: &'static str,
    },

    /// Requested exact quantity cannot be met by non-negative deltas under the invariant
    #[error("Infeasible trade in {operation}: {reason}")]
    InfeasibleTrade {
        operation: &'static str,
        reason: &'static str,
    },

    /// Degenerate zero amount where the operation requires a positive one
    #[error("Zero input: {field} must be positive")]
    ZeroInput { field: &'static str },

    /// New liquidity must imply a strictly positive interest
    #[error("Debt {debt_in} must exceed asset {asset_in}")]
    NonPositiveInterest { asset_in: u128, debt_in: u128 },

    /// Percent outside `[0, 2^32]`
    #[error("Percent {percent} exceeds maximum 2^32")]
    InvalidPercent { percent: u64 },
}

impl MathError {
    pub fn overflow(operation: &'static str, bits: u32) -> Self {
        Self::Overflow { operation, bits }
    }
}

/// Errors raised by pool state management and registry lookups
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PoolError {
    #[error("Pool not found for asset {asset}, collateral {collateral}, maturity {maturity}")]
    PoolNotFound {
        asset: String,
        collateral: String,
        maturity: u64,
    },

    #[error("Pool already exists for asset {asset}, collateral {collateral}, maturity {maturity}")]
    PoolExists {
        asset: String,
        collateral: String,
        maturity: u64,
    },

    #[error("Pool already holds liquidity")]
    AlreadyInitialized,

    #[error("Pool holds no liquidity")]
    NotInitialized,

    #[error(transparent)]
    Math(#[from] MathError),
}
