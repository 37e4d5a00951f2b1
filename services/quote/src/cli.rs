//! Command-line surface

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tenor_config::AmmConfig;

#[derive(Parser, Debug)]
#[command(name = "tenor-quote")]
#[command(about = "Quote lends, borrows and liquidity against a Tenor pool")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); overrides the config file
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    /// Enable JSON logging format
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Layer the logging flags over the loaded configuration and re-validate
    pub fn apply_overrides(&self, mut config: AmmConfig) -> Result<AmmConfig> {
        if let Some(level) = &self.log_level {
            config.quote.log_level = level.clone();
        }
        config.quote.json_logs |= self.json_logs;
        config.validate()?;
        Ok(config)
    }
}

/// Reserves and time window of the pool being quoted
#[derive(Args, Debug, Clone, Copy)]
pub struct PoolArgs {
    /// Asset reserve
    #[arg(long)]
    pub x: u128,

    /// Bond-rate reserve
    #[arg(long)]
    pub y: u128,

    /// Insurance-rate reserve
    #[arg(long)]
    pub z: u128,

    /// Pool maturity, unix seconds
    #[arg(long)]
    pub maturity: u64,

    /// Quote time, unix seconds
    #[arg(long)]
    pub now: u64,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Seed an empty pool
    NewLiquidity {
        #[arg(long)]
        asset_in: u128,
        #[arg(long)]
        debt_in: u128,
        #[arg(long)]
        collateral_in: u128,
        #[arg(long)]
        maturity: u64,
        #[arg(long)]
        now: u64,
    },

    /// Lend for an exact bond payout
    LendBond {
        #[command(flatten)]
        pool: PoolArgs,
        #[arg(long)]
        asset_in: u128,
        #[arg(long)]
        bond_out: u128,
    },

    /// Lend for an exact insurance claim
    LendInsurance {
        #[command(flatten)]
        pool: PoolArgs,
        #[arg(long)]
        asset_in: u128,
        #[arg(long)]
        insurance_out: u128,
    },

    /// Lend at a position in the feasible range (0 ..= 2^32)
    LendPercent {
        #[command(flatten)]
        pool: PoolArgs,
        #[arg(long)]
        asset_in: u128,
        #[arg(long)]
        percent: u64,
    },

    /// Borrow owing an exact debt
    BorrowDebt {
        #[command(flatten)]
        pool: PoolArgs,
        #[arg(long)]
        asset_out: u128,
        #[arg(long)]
        debt_in: u128,
    },

    /// Borrow locking an exact collateral amount
    BorrowCollateral {
        #[command(flatten)]
        pool: PoolArgs,
        #[arg(long)]
        asset_out: u128,
        #[arg(long)]
        collateral_in: u128,
    },

    /// Borrow at a position in the feasible range (0 ..= 2^32)
    BorrowPercent {
        #[command(flatten)]
        pool: PoolArgs,
        #[arg(long)]
        asset_out: u128,
        #[arg(long)]
        percent: u64,
    },

    /// Collateral released by a partial repayment
    Repay {
        #[arg(long)]
        debt: u128,
        #[arg(long)]
        collateral: u128,
        #[arg(long)]
        asset_in: u128,
    },

    /// Print the effective configuration as TOML
    ShowConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lend_percent() {
        let cli = Cli::try_parse_from([
            "tenor-quote",
            "--log-level",
            "debug",
            "lend-percent",
            "--x",
            "10000",
            "--y",
            "272428",
            "--z",
            "515",
            "--maturity",
            "31536000",
            "--now",
            "10000",
            "--asset-in",
            "1000",
            "--percent",
            "2147483648",
        ])
        .unwrap();

        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        match cli.command {
            Command::LendPercent {
                pool,
                asset_in,
                percent,
            } => {
                assert_eq!((pool.x, pool.y, pool.z), (10_000, 272_428, 515));
                assert_eq!(asset_in, 1_000);
                assert_eq!(percent, 1 << 31);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_log_level_flag_overrides_config() {
        let cli = Cli::try_parse_from(["tenor-quote", "--log-level", "WARN", "--json-logs", "show-config"])
            .unwrap();
        let config = cli.apply_overrides(AmmConfig::default()).unwrap();
        assert_eq!(config.quote.log_level, "WARN");
        assert!(config.quote.json_logs);
    }

    #[test]
    fn test_unknown_log_level_flag_rejected() {
        let cli = Cli::try_parse_from(["tenor-quote", "--log-level", "verbose", "show-config"]).unwrap();
        assert!(cli.apply_overrides(AmmConfig::default()).is_err());

        let cli = Cli::try_parse_from(["tenor-quote", "show-config"]).unwrap();
        let config = cli.apply_overrides(AmmConfig::default()).unwrap();
        assert_eq!(config, AmmConfig::default());
    }

    #[test]
    fn test_missing_reserve_rejected() {
        let result = Cli::try_parse_from([
            "tenor-quote",
            "borrow-debt",
            "--x",
            "10000",
            "--y",
            "272428",
            "--maturity",
            "31536000",
            "--now",
            "10000",
            "--asset-out",
            "1000",
            "--debt-in",
            "1121",
        ]);
        assert!(result.is_err());
    }
}
