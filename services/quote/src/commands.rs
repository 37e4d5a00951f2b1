//! Command execution
//!
//! Each command prices against reserves given on the command line and
//! renders the result as pretty JSON.

use crate::cli::{Command, PoolArgs};
use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::Serialize;
use tenor_amm::claims;
use tenor_amm::{BorrowMath, LendMath, LiquidityMath};
use tenor_config::AmmConfig;
use tenor_types::{Due, FeeParams, PoolState, StateDelta, TimeContext, TradeQuote};
use tracing::info;

#[derive(Debug, Serialize)]
struct LiquidityOutput {
    delta: StateDelta,
    state_after: PoolState,
    liquidity_out: u128,
    debt: u128,
    collateral: u128,
}

#[derive(Debug, Serialize)]
struct LendOutput {
    quote: TradeQuote,
    state_after: PoolState,
    bond: u128,
    bond_principal: u128,
    bond_interest: u128,
    insurance: u128,
    insurance_principal: u128,
    insurance_interest: u128,
    lend_rate: Decimal,
}

#[derive(Debug, Serialize)]
struct BorrowOutput {
    quote: TradeQuote,
    state_after: PoolState,
    debt: u128,
    collateral: u128,
    borrow_rate: Decimal,
}

#[derive(Debug, Serialize)]
struct RepayOutput {
    collateral_out: u128,
}

impl PoolArgs {
    fn state(&self) -> Result<PoolState> {
        PoolState::from_reserves(self.x, self.y, self.z).context("Invalid pool reserves")
    }

    fn context(&self) -> TimeContext {
        TimeContext::new(self.maturity, self.now)
    }
}

/// Run `command` with fees from `config`, returning the rendered output
pub fn execute(command: &Command, config: &AmmConfig) -> Result<String> {
    let fees = config.fee_params();
    match command {
        Command::NewLiquidity {
            asset_in,
            debt_in,
            collateral_in,
            maturity,
            now,
        } => {
            let ctx = TimeContext::new(*maturity, *now);
            let delta = LiquidityMath::given_new(&ctx, *asset_in, *debt_in, *collateral_in)
                .context("New liquidity rejected")?;
            render(&LiquidityOutput {
                delta,
                state_after: PoolState::EMPTY.apply_liquidity(&delta)?,
                liquidity_out: LiquidityMath::liquidity_total_new(delta.x)?,
                debt: LiquidityMath::mint_debt(&delta, &ctx)?,
                collateral: LiquidityMath::mint_collateral(&delta, &ctx)?,
            })
        }
        Command::LendBond {
            pool,
            asset_in,
            bond_out,
        } => lend(pool, &fees, |state, ctx| {
            LendMath::given_bond(state, ctx, &fees, *asset_in, *bond_out)
        }),
        Command::LendInsurance {
            pool,
            asset_in,
            insurance_out,
        } => lend(pool, &fees, |state, ctx| {
            LendMath::given_insurance(state, ctx, &fees, *asset_in, *insurance_out)
        }),
        Command::LendPercent {
            pool,
            asset_in,
            percent,
        } => lend(pool, &fees, |state, ctx| {
            LendMath::given_percent(state, ctx, &fees, *asset_in, *percent)
        }),
        Command::BorrowDebt {
            pool,
            asset_out,
            debt_in,
        } => borrow(pool, &fees, |state, ctx| {
            BorrowMath::given_debt(state, ctx, &fees, *asset_out, *debt_in)
        }),
        Command::BorrowCollateral {
            pool,
            asset_out,
            collateral_in,
        } => borrow(pool, &fees, |state, ctx| {
            BorrowMath::given_collateral(state, ctx, &fees, *asset_out, *collateral_in)
        }),
        Command::BorrowPercent {
            pool,
            asset_out,
            percent,
        } => borrow(pool, &fees, |state, ctx| {
            BorrowMath::given_percent(state, ctx, &fees, *asset_out, *percent)
        }),
        Command::Repay {
            debt,
            collateral,
            asset_in,
        } => {
            let due = Due {
                debt: *debt,
                collateral: *collateral,
            };
            let collateral_out =
                BorrowMath::repay_collateral_out(&due, *asset_in).context("Repay rejected")?;
            render(&RepayOutput { collateral_out })
        }
        Command::ShowConfig => config.to_toml_string(),
    }
}

fn lend<F>(pool: &PoolArgs, fees: &FeeParams, solve: F) -> Result<String>
where
    F: FnOnce(&PoolState, &TimeContext) -> Result<TradeQuote, tenor_types::MathError>,
{
    let state = pool.state()?;
    let ctx = pool.context();
    let quote = solve(&state, &ctx).context("Lend rejected")?;
    let delta = &quote.delta;

    let bond_interest = claims::get_bond_interest(delta, &ctx)?;
    let insurance_principal = claims::get_insurance_principal(&state, delta)?;
    let insurance_interest = claims::get_insurance_interest(delta, &ctx)?;
    let output = LendOutput {
        quote,
        state_after: state.apply_lend(delta, quote.fees.lp_fee)?,
        bond: claims::get_bond(delta, &ctx)?,
        bond_principal: claims::get_bond_principal(delta),
        bond_interest,
        insurance: claims::get_insurance(&state, delta, &ctx)?,
        insurance_principal,
        insurance_interest,
        lend_rate: claims::get_lend_rate(delta, &ctx)?,
    };
    info!(
        fee = fees.fee,
        bond = output.bond,
        insurance = output.insurance,
        "lend quoted"
    );
    render(&output)
}

fn borrow<F>(pool: &PoolArgs, fees: &FeeParams, solve: F) -> Result<String>
where
    F: FnOnce(&PoolState, &TimeContext) -> Result<TradeQuote, tenor_types::MathError>,
{
    let state = pool.state()?;
    let ctx = pool.context();
    let quote = solve(&state, &ctx).context("Borrow rejected")?;
    let delta = &quote.delta;

    let output = BorrowOutput {
        quote,
        state_after: state.apply_borrow(delta, quote.fees.lp_fee)?,
        debt: claims::get_debt(delta, &ctx)?,
        collateral: claims::get_collateral(&state, delta, &ctx)?,
        borrow_rate: claims::get_borrow_rate(delta, &ctx)?,
    };
    info!(
        fee = fees.fee,
        debt = output.debt,
        collateral = output.collateral,
        "borrow quoted"
    );
    render(&output)
}

fn render<T: Serialize>(output: &T) -> Result<String> {
    serde_json::to_string_pretty(output).context("Failed to serialize output")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn pool() -> PoolArgs {
        PoolArgs {
            x: 10_000,
            y: 272_428,
            z: 515,
            maturity: 31_536_000,
            now: 10_000,
        }
    }

    fn run(command: Command) -> Value {
        let rendered = execute(&command, &AmmConfig::default()).unwrap();
        serde_json::from_str(&rendered).unwrap()
    }

    #[test]
    fn test_new_liquidity() {
        let output = run(Command::NewLiquidity {
            asset_in: 10_000,
            debt_in: 12_000,
            collateral_in: 1_000,
            maturity: 31_536_000,
            now: 5_000,
        });
        assert_eq!(output["delta"]["y"], 272_428);
        assert_eq!(output["debt"], 12_000);
        assert_eq!(output["collateral"], 999);
        assert_eq!(output["liquidity_out"], 655_360_000u64);
    }

    #[test]
    fn test_lend_insurance() {
        let output = run(Command::LendInsurance {
            pool: pool(),
            asset_in: 1_000,
            insurance_out: 67,
        });
        assert_eq!(output["insurance"], 67);
        assert_eq!(output["quote"]["delta"]["z"], 23);
        assert_eq!(output["state_after"]["x"], 11_000);
        assert!(output["lend_rate"].is_string());
    }

    #[test]
    fn test_borrow_percent() {
        let output = run(Command::BorrowPercent {
            pool: pool(),
            asset_out: 1_000,
            percent: 1 << 31,
        });
        assert_eq!(output["debt"], 1_121);
        assert_eq!(output["collateral"], 83);
        assert_eq!(output["state_after"]["z"], 541);
    }

    #[test]
    fn test_infeasible_borrow_is_an_error() {
        let err = execute(
            &Command::BorrowCollateral {
                pool: pool(),
                asset_out: 1_000,
                collateral_in: 1_010,
            },
            &AmmConfig::default(),
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("z increase above maximum"));
    }

    #[test]
    fn test_repay() {
        let output = run(Command::Repay {
            debt: 1_121,
            collateral: 83,
            asset_in: 500,
        });
        assert_eq!(output["collateral_out"], 37);
    }

    #[test]
    fn test_show_config() {
        let rendered = execute(&Command::ShowConfig, &AmmConfig::default()).unwrap();
        assert!(rendered.contains("protocol_fee = 6554"));
    }
}
