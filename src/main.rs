//! universal-calc command-line shell.

mod cli;
mod commands;

use clap::Parser;
use universal_calc_lib::core::features::currency::ExchangeRateApi;
use universal_calc_lib::logging::init_logging;
use universal_calc_lib::shared::settings::AppSettings;

use crate::cli::{Cli, Command};
use crate::commands::{run_calc, run_currency, run_units, run_units_list};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(error) = init_logging(cli.verbose) {
        eprintln!("error: {error}");
        std::process::exit(1);
    }

    let settings = match &cli.config {
        Some(path) => AppSettings::load_from(path).await,
        None => AppSettings::load().await,
    }
    .unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to load settings, using defaults");
        AppSettings::default()
    });

    let output = match cli.command {
        Command::Calc { keys } => run_calc(&keys),
        Command::Units { value, from, to } => {
            run_units(&value, &from, &to, settings.preferences.decimals)
        }
        Command::UnitsList => run_units_list(),
        Command::Currency { amount, from, to } => {
            let from = from.unwrap_or_else(|| settings.preferences.default_currency_from.clone());
            let to = to.unwrap_or_else(|| settings.preferences.default_currency_to.clone());
            let provider = match ExchangeRateApi::from_settings(&settings) {
                Ok(provider) => provider,
                Err(error) => {
                    eprintln!("error: {error}");
                    std::process::exit(1);
                }
            };
            run_currency(&amount, &from, &to, &provider, settings.currency.timeout()).await
        }
    };

    println!("{}", output.trim_end());
}
