//! Subcommand handlers. Each drives a [`Session`] and returns the text to print.

use std::fmt::Write as _;
use std::time::Duration;

use universal_calc_lib::core::features::calculator::{CalculatorIntent, UnaryOp};
use universal_calc_lib::core::features::currency::{self, CurrencyIntent, RateProvider};
use universal_calc_lib::core::features::formatter;
use universal_calc_lib::core::features::unit_converter::{self, UnitCategory, UnitIntent};
use universal_calc_lib::core::input::{self, InputEvent};
use universal_calc_lib::shared::types::ActiveInput;
use universal_calc_lib::shared::ERROR_DISPLAY;
use universal_calc_lib::{Intent, Mode, Session};

pub fn run_calc(keys: &[String]) -> String {
    let mut session = Session::new();
    let (tx, mut rx) = input::channel();

    for key in keys {
        if input::calculator_intent_for_key(key).is_some() {
            tx.key(key);
        } else if let Some(op) = UnaryOp::parse(key) {
            tx.calculator(CalculatorIntent::Unary(op));
        } else {
            tracing::warn!(key = %key, "ignoring unrecognised key");
        }
    }
    drop(tx);
    session.pump(&mut rx);

    session
        .calculator()
        .map(|calc| calc.display())
        .unwrap_or_else(|| ERROR_DISPLAY.to_string())
}

pub fn run_units(value: &str, from: &str, to: &str, decimals: usize) -> String {
    let mut session = Session::new();
    let (tx, mut rx) = input::channel();

    tx.send(InputEvent::SwitchMode(Mode::UnitConverter));
    for intent in [
        UnitIntent::SetFromValue(value.to_string()),
        UnitIntent::Focus(ActiveInput::From),
        UnitIntent::SelectUnit(from.to_string()),
        UnitIntent::Focus(ActiveInput::To),
        UnitIntent::SelectUnit(to.to_string()),
        UnitIntent::Convert,
    ] {
        tx.send(InputEvent::Intent(Intent::Unit(intent)));
    }
    drop(tx);
    session.pump(&mut rx);

    let Some(converter) = session.unit_converter() else {
        return ERROR_DISPLAY.to_string();
    };
    // A unit the registry does not know never gets selected.
    if converter.from_unit() != Some(from) || converter.to_unit() != Some(to) {
        return ERROR_DISPLAY.to_string();
    }
    match converter.to_value().parse::<f64>() {
        Ok(result) => format!(
            "{} {}",
            formatter::format(result, decimals),
            unit_converter::display_unit(to)
        ),
        Err(_) => converter.to_value().to_string(),
    }
}

pub fn run_units_list() -> String {
    let units = unit_converter::all_units().units;
    let mut out = String::new();
    for category in UnitCategory::ALL {
        let labels: Vec<&str> = units
            .iter()
            .filter(|unit| unit.category == category.as_str())
            .map(|unit| unit.label.as_str())
            .collect();
        let _ = writeln!(out, "{}: {}", category.as_str(), labels.join(", "));
    }
    out
}

pub async fn run_currency(
    amount: &str,
    from: &str,
    to: &str,
    provider: &dyn RateProvider,
    timeout: Duration,
) -> String {
    let mut session = Session::new();
    let (tx, rx) = input::channel();

    tx.send(InputEvent::SwitchMode(Mode::Currency));
    for intent in [
        CurrencyIntent::Cancel,
        CurrencyIntent::SetFromValue(amount.to_string()),
        CurrencyIntent::SelectCurrency(from.to_string()),
        CurrencyIntent::SelectCurrency(to.to_string()),
        CurrencyIntent::Convert,
    ] {
        tx.send(InputEvent::Intent(Intent::Currency(intent)));
    }
    drop(tx);
    session.run(rx, provider, timeout).await;

    let Some(converter) = session.currency() else {
        return ERROR_DISPLAY.to_string();
    };
    if converter.to_currency().is_none() {
        return ERROR_DISPLAY.to_string();
    }
    let result = converter.to_value();
    if result == ERROR_DISPLAY {
        return result.to_string();
    }
    match converter.to_currency().and_then(currency::symbol) {
        Some(symbol) => format!("{} {}", result, symbol),
        None => format!("{} {}", result, to.to_ascii_uppercase()),
    }
}
