//! # Tenor Quote
//!
//! Command-line quoting for Tenor pools. Reserves are passed explicitly, fee
//! constants come from `tenor-config`, and every result is printed as JSON.

pub mod cli;
pub mod commands;
pub mod logging;

pub use cli::{Cli, Command, PoolArgs};
pub use commands::execute;
pub use logging::init_logging;
