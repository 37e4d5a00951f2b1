//! # Tenor AMM - Fixed-Maturity Lending Mathematics
//!
//! ## Purpose
//!
//! Pricing and invariant engine for a three-reserve lending pool. Lenders
//! deposit an asset for a bond (fixed payout at maturity) and insurance (a
//! claim on borrower collateral). Borrowers withdraw the asset against debt
//! and locked collateral. All prices follow from a single constant-product
//! invariant over the reserves `x`, `y` and `z`.
//!
//! ## Integration Points
//!
//! - **Input**: pool reserves, an explicit `TimeContext`, fee constants and the
//!   trade intent
//! - **Output**: a `TradeQuote` (reserve delta plus fees) and the claims it
//!   implies
//! - **Persistence**: none; `Pool` and `InMemoryRegistry` hold state for
//!   callers that want the quotes applied
//!
//! ## Precision
//!
//! - Reserves and amounts are u112 values carried in `u128`
//! - Intermediates are 256 bits, invariant products 512 bits
//! - Rounding always favors the pool: amounts paid out round down, amounts
//!   owed round up
//!
//! ## Example
//!
//! ```rust
//! use tenor_amm::{claims, LendMath};
//! use tenor_types::{FeeParams, PoolState, TimeContext};
//!
//! let state = PoolState::from_reserves(10_000, 272_428, 515).unwrap();
//! let ctx = TimeContext::new(31_536_000, 10_000);
//! let fees = FeeParams::new(100, 6554);
//!
//! let quote = LendMath::given_percent(&state, &ctx, &fees, 1_000, 1 << 31).unwrap();
//! assert_eq!(claims::get_bond(&quote.delta, &ctx).unwrap(), 1_094);
//! ```

pub mod borrow_math;
pub mod claims;
pub mod constant_product;
pub mod fee;
pub mod lend_math;
pub mod liquidity_math;
pub mod pool;
pub mod registry;
pub mod time_weight;

pub use borrow_math::{BorrowBounds, BorrowMath};
pub use lend_math::{LendBounds, LendMath};
pub use liquidity_math::LiquidityMath;
pub use pool::{BorrowReceipt, LendReceipt, LiquidityReceipt, Pool};
pub use registry::{InMemoryRegistry, PoolRegistry};

/// Display type for annualized rates
pub use rust_decimal::Decimal;

/// Upper end of the percent scale used by `given_percent` quotes
pub const MAX_PERCENT: u64 = 1 << 32;
