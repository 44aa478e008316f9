//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "universal-calc",
    version,
    about = "Calculator, unit converter and currency converter"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log at debug level (overrides RUST_LOG).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Settings file to use instead of the per-user one.
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Press calculator keys in order and print the display, e.g. `calc 1 + 2 Enter`.
    Calc {
        /// Keys (`0`-`9`, `.`, `+ - * / ^ mod`, `Enter`, `Backspace`, `Delete`)
        /// or function names (`sqrt`, `sin`, `fact`, ...).
        #[arg(value_name = "KEYS", required = true, allow_hyphen_values = true)]
        keys: Vec<String>,
    },

    /// Convert a value between two units of the same category.
    Units {
        #[arg(allow_hyphen_values = true)]
        value: String,
        from: String,
        to: String,
    },

    /// List unit categories and their units.
    UnitsList,

    /// Convert an amount using the live exchange rate.
    Currency {
        amount: String,
        /// Defaults to `preferences.default_currency_from`.
        from: Option<String>,
        /// Defaults to `preferences.default_currency_to`.
        to: Option<String>,
    },
}
