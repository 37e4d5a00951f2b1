//! # Tenor Configuration
//!
//! Pool fee constants and quote service settings, loaded from TOML with
//! `TENOR_`-prefixed environment overrides.
//!
//! ## Usage
//!
//! ```rust
//! use tenor_config::AmmConfig;
//!
//! let config = AmmConfig::from_toml_str("[pool]\nfee = 250\n").unwrap();
//! assert_eq!(config.fee_params().fee, 250);
//! assert_eq!(config.fee_params().protocol_fee, 6554);
//! ```

pub mod amm_config;

pub use amm_config::{load_config, AmmConfig, PoolSettings, QuoteSettings};
