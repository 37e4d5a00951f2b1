//! Tenor quote binary
//!
//! Usage:
//!   tenor-quote lend-percent --x 10000 --y 272428 --z 515 \
//!       --maturity 31536000 --now 10000 --asset-in 1000 --percent 2147483648
//!   tenor-quote --config config/tenor.toml borrow-debt ...

use anyhow::Result;
use clap::Parser;
use tenor_config::AmmConfig;
use tenor_quote::{execute, init_logging, Cli};
use tracing::{error, info};

fn main() -> Result<()> {
    let args = Cli::parse();

    let config = args.apply_overrides(AmmConfig::load(args.config.as_deref())?)?;
    init_logging(&config.quote.log_level, config.quote.json_logs)?;

    info!(
        fee = config.pool.fee,
        protocol_fee = config.pool.protocol_fee,
        "Starting Tenor quote"
    );

    let output = execute(&args.command, &config).map_err(|e| {
        error!("Quote failed: {:#}", e);
        e
    })?;
    println!("{}", output);

    Ok(())
}
