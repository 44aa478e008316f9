//! Currency converter feature
//!
//! One rate lookup per conversion through a [`RateProvider`]. Requests carry a
//! token; a reply whose token is no longer current is dropped so it cannot
//! overwrite a converter that was cancelled, reversed or re-run meanwhile.

pub mod service;
pub mod types;

use std::str::FromStr;
use std::time::Duration;

use rust_decimal::{Decimal, RoundingStrategy};
use uuid::Uuid;

use super::formatter;
use super::{FeatureSnapshot, FeatureSync, Intent, Mode};
use crate::shared::error::{AppError, AppResult};
use crate::shared::types::CurrencyConverterSnapshot;
use crate::shared::ERROR_DISPLAY;

pub use service::{fetch_rate_with_timeout, ExchangeRateApi, RateProvider};
pub use types::PendingConversion;

/// Currencies offered by the shell, with their button symbols.
pub const SUPPORTED_CURRENCIES: &[(&str, &str)] = &[
    ("USD", "$"),
    ("EUR", "€"),
    ("PLN", "zł"),
    ("UAH", "₴"),
];

pub fn symbol(code: &str) -> Option<&'static str> {
    SUPPORTED_CURRENCIES
        .iter()
        .find(|(c, _)| c.eq_ignore_ascii_case(code))
        .map(|(_, symbol)| *symbol)
}

#[inline]
pub fn is_valid_code(code: &str) -> bool {
    let code = code.trim();
    code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic())
}

/// Exact form of an already validated amount. `None` beyond Decimal's range.
fn decimal_amount(text: &str) -> Option<Decimal> {
    let cleaned = formatter::normalize(text);
    Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .ok()
}

/// `amount * rate` with two fixed decimals.
///
/// Computed in `Decimal` when amount, rate and product fit its range, in `f64`
/// otherwise. Only a non-numeric amount or a non-finite product is an error.
pub fn convert_amount(amount: &str, rate: f64) -> AppResult<String> {
    let value = formatter::parse_strict(amount)?;
    let exact = decimal_amount(amount)
        .zip(Decimal::try_from(rate).ok())
        .and_then(|(amount, rate)| amount.checked_mul(rate));

    match exact {
        Some(result) => Ok(format!(
            "{:.2}",
            result.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        )),
        None => {
            let result = value * rate;
            if !result.is_finite() {
                return Err(AppError::Calculation(format!(
                    "No finite result for {} at rate {}",
                    amount, rate
                )));
            }
            tracing::debug!(amount, rate, "amount outside decimal range, using f64");
            Ok(format!("{:.2}", result))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CurrencyIntent {
    SetFromValue(String),
    SelectCurrency(String),
    /// Starts a rate request; the fetch itself is driven by the session.
    Convert,
    Reverse,
    Cancel,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CurrencyConverterEngine {
    from_value: String,
    to_value: String,
    from_currency: Option<String>,
    to_currency: Option<String>,
    pending: Option<Uuid>,
}

impl CurrencyConverterEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_value(&self) -> &str {
        &self.from_value
    }

    pub fn to_value(&self) -> &str {
        &self.to_value
    }

    pub fn from_currency(&self) -> Option<&str> {
        self.from_currency.as_deref()
    }

    pub fn to_currency(&self) -> Option<&str> {
        self.to_currency.as_deref()
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn set_from_value(&mut self, text: impl Into<String>) {
        self.from_value = text.into();
    }

    /// Fill the source slot first, then the target slot. Focus plays no part.
    pub fn select_currency(&mut self, code: &str) -> bool {
        if !is_valid_code(code) {
            tracing::warn!(code, "ignoring invalid currency code");
            return false;
        }
        let code = code.trim().to_ascii_uppercase();
        if self.from_currency.is_none() {
            self.from_currency = Some(code);
        } else {
            self.to_currency = Some(code);
        }
        true
    }

    /// Swap codes and values. Any outstanding request is superseded.
    pub fn reverse(&mut self) {
        std::mem::swap(&mut self.from_currency, &mut self.to_currency);
        std::mem::swap(&mut self.from_value, &mut self.to_value);
        self.pending = None;
    }

    pub fn cancel(&mut self) {
        *self = Self::default();
    }

    /// Start a conversion. `None` when input is incomplete (nothing changes)
    /// or the amount is not numeric (the result shows `"Error"` without a fetch).
    pub fn begin_conversion(&mut self) -> Option<PendingConversion> {
        let (Some(from), Some(to)) = (self.from_currency.clone(), self.to_currency.clone()) else {
            return None;
        };
        if self.from_value.is_empty() {
            return None;
        }
        if let Err(e) = formatter::parse_strict(&self.from_value) {
            tracing::warn!(error = %e, "currency amount rejected");
            self.pending = None;
            self.to_value = ERROR_DISPLAY.to_string();
            return None;
        }

        let token = Uuid::new_v4();
        self.pending = Some(token);
        tracing::debug!(%token, %from, %to, "currency conversion started");
        Some(PendingConversion {
            token,
            amount: self.from_value.clone(),
            from,
            to,
        })
    }

    /// Apply a fetch outcome. Returns `false` for a superseded request.
    pub fn apply_rate(&mut self, request: &PendingConversion, outcome: AppResult<f64>) -> bool {
        if self.pending != Some(request.token) {
            tracing::debug!(token = %request.token, "discarding stale rate response");
            return false;
        }
        self.pending = None;
        self.to_value = match outcome.and_then(|rate| convert_amount(&request.amount, rate)) {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(from = %request.from, to = %request.to, error = %e, "currency conversion failed");
                ERROR_DISPLAY.to_string()
            }
        };
        true
    }

    /// Begin, fetch and apply in one go. Returns `false` if nothing was started.
    pub async fn convert_with(&mut self, provider: &dyn RateProvider, timeout: Duration) -> bool {
        let Some(request) = self.begin_conversion() else {
            return false;
        };
        let outcome = fetch_rate_with_timeout(provider, &request.from, &request.to, timeout).await;
        self.apply_rate(&request, outcome)
    }

    pub fn snapshot(&self) -> CurrencyConverterSnapshot {
        CurrencyConverterSnapshot {
            from_value: self.from_value.clone(),
            to_value: self.to_value.clone(),
            from_currency: self.from_currency.clone(),
            to_currency: self.to_currency.clone(),
            pending: self.is_pending(),
        }
    }

    /// Synchronous part of [`CurrencyIntent`] handling; `Convert` hands back the
    /// request the caller must fetch.
    pub fn apply(&mut self, intent: CurrencyIntent) -> (bool, Option<PendingConversion>) {
        match intent {
            CurrencyIntent::SetFromValue(text) => {
                self.set_from_value(text);
                (true, None)
            }
            CurrencyIntent::SelectCurrency(code) => (self.select_currency(&code), None),
            CurrencyIntent::Convert => {
                let request = self.begin_conversion();
                (request.is_some(), request)
            }
            CurrencyIntent::Reverse => {
                self.reverse();
                (true, None)
            }
            CurrencyIntent::Cancel => {
                self.cancel();
                (true, None)
            }
        }
    }
}

impl FeatureSync for CurrencyConverterEngine {
    fn mode(&self) -> Mode {
        Mode::Currency
    }

    fn handle_intent(&mut self, intent: &Intent) -> bool {
        match intent {
            Intent::Currency(intent) => self.apply(intent.clone()).0,
            _ => false,
        }
    }

    fn view(&self) -> FeatureSnapshot {
        FeatureSnapshot::Currency(self.snapshot())
    }

    fn reset(&mut self) {
        self.cancel();
    }
}
