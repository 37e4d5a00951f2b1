//! Per-call parameters: time window, fee constants, quotes and pool keys

use crate::common::errors::MathError;
use crate::state::StateDelta;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Denominator for `fee` and `protocol_fee`
pub const FEE_BASE: u128 = 0x10000;

/// Explicit time window of a computation
///
/// Math never reads a clock: `now` is supplied by the caller, which makes every
/// quote replayable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeContext {
    pub maturity: u64,
    pub now: u64,
}

impl TimeContext {
    pub const fn new(maturity: u64, now: u64) -> Self {
        Self { maturity, now }
    }

    /// Seconds left until maturity; fails once the pool has matured
    pub fn duration(&self) -> Result<u64, MathError> {
        if self.now >= self.maturity {
            return Err(MathError::InvalidMaturity {
                maturity: self.maturity,
                now: self.now,
            });
        }
        Ok(self.maturity - self.now)
    }

    /// Same maturity, later clock
    pub const fn at(&self, now: u64) -> Self {
        Self::new(self.maturity, now)
    }
}

/// Fee constants fixed at pool creation
///
/// `fee` is the share of each traded amount taken as fee, over `FEE_BASE`.
/// `protocol_fee` is the protocol's share of that fee, also over `FEE_BASE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FeeParams {
    pub fee: u16,
    pub protocol_fee: u16,
}

impl FeeParams {
    pub const fn new(fee: u16, protocol_fee: u16) -> Self {
        Self { fee, protocol_fee }
    }

    pub const ZERO: Self = Self::new(0, 0);
}

/// Fee charged on one trade, split between liquidity providers and protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FeeSplit {
    pub lp_fee: u128,
    pub protocol_fee: u128,
}

impl FeeSplit {
    pub fn total(&self) -> u128 {
        self.lp_fee + self.protocol_fee
    }
}

/// Reserve delta solved by lend/borrow math plus the fee it carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TradeQuote {
    pub delta: StateDelta,
    pub fees: FeeSplit,
}

/// Registry key: one pool per asset, collateral and maturity
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PoolKey {
    pub asset: String,
    pub collateral: String,
    pub maturity: u64,
}

impl PoolKey {
    pub fn new(asset: impl Into<String>, collateral: impl Into<String>, maturity: u64) -> Self {
        Self {
            asset: asset.into(),
            collateral: collateral.into(),
            maturity,
        }
    }
}

impl fmt::Display for PoolKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}@{}", self.asset, self.collateral, self.maturity)
    }
}
