//! # Tenor Types
//!
//! Shared type system for the Tenor fixed-maturity lending AMM.
//!
//! ## Design Philosophy
//!
//! - **Integer Only**: reserves and claims are unsigned integers bounded at 112
//!   (reserves, amounts) or 128 (claims) bits; intermediates use 256/512 bits
//! - **Typed Failures**: every math failure is a `MathError`, never a sentinel
//! - **Explicit Time**: `TimeContext` carries maturity and the caller's clock
//!
//! ## Quick Start
//!
//! ```rust
//! use tenor_types::{PoolState, TimeContext, FeeParams};
//!
//! let state = PoolState::from_reserves(10_000, 272_428, 515).unwrap();
//! let ctx = TimeContext::new(31_536_000, 10_000);
//! assert_eq!(ctx.duration().unwrap(), 31_526_000);
//! assert!(state.is_initialized());
//! let _fees = FeeParams::new(100, 6554);
//! ```

pub mod common;
pub mod params;
pub mod state;

pub use common::errors::{MathError, PoolError};
pub use common::fixed_point::{self, MAX_U112};
pub use params::{FeeParams, FeeSplit, PoolKey, TimeContext, TradeQuote, FEE_BASE};
pub use state::{Due, PoolState, StateDelta};

/// Wide integer types used by the math crates
pub use primitive_types::{U256, U512};
