//! Feature engines and the session that owns them
//!
//! Uses enum_dispatch for static dispatch over the three modes. Each mode owns
//! an independent engine instance; nothing is shared between them.

use std::time::Duration;

use enum_dispatch::enum_dispatch;
use serde::Serialize;

use crate::core::input::{InputEvent, InputReceiver};
use crate::shared::types::{CalculatorSnapshot, CurrencyConverterSnapshot, UnitConverterSnapshot};

pub mod formatter;
pub mod calculator;
pub mod unit_converter;
pub mod currency;

use calculator::{CalculatorEngine, CalculatorIntent};
use currency::{CurrencyConverterEngine, CurrencyIntent, PendingConversion, RateProvider};
use unit_converter::{UnitConverterEngine, UnitIntent};

/// The three modes behind the shared shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    Calculator,
    UnitConverter,
    Currency,
}

/// A user intent addressed to one engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Calculator(CalculatorIntent),
    Unit(UnitIntent),
    Currency(CurrencyIntent),
}

impl Intent {
    pub fn mode(&self) -> Mode {
        match self {
            Intent::Calculator(_) => Mode::Calculator,
            Intent::Unit(_) => Mode::UnitConverter,
            Intent::Currency(_) => Mode::Currency,
        }
    }
}

/// Snapshot of whichever engine was asked.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", content = "state", rename_all = "snake_case")]
pub enum FeatureSnapshot {
    Calculator(CalculatorSnapshot),
    UnitConverter(UnitConverterSnapshot),
    Currency(CurrencyConverterSnapshot),
}

/// Methods every engine offers the session.
#[enum_dispatch]
pub trait FeatureSync {
    fn mode(&self) -> Mode;

    /// Apply an intent. Intents for other engines are ignored (`false`).
    fn handle_intent(&mut self, intent: &Intent) -> bool;

    /// Keyboard input. Only the calculator listens to keys.
    fn handle_key(&mut self, _key: &str) -> bool {
        false
    }

    fn view(&self) -> FeatureSnapshot;

    /// Back to the initial state.
    fn reset(&mut self);
}

#[enum_dispatch(FeatureSync)]
#[derive(Debug, Clone, PartialEq)]
pub enum AppFeature {
    Calculator(CalculatorEngine),
    UnitConverter(UnitConverterEngine),
    Currency(CurrencyConverterEngine),
}

impl AppFeature {
    pub fn all() -> Vec<Self> {
        vec![
            AppFeature::Calculator(CalculatorEngine::new()),
            AppFeature::UnitConverter(UnitConverterEngine::new()),
            AppFeature::Currency(CurrencyConverterEngine::new()),
        ]
    }
}

/// One engine per mode plus the mode currently on screen.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    features: Vec<AppFeature>,
    active: Mode,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            features: AppFeature::all(),
            active: Mode::Calculator,
        }
    }

    pub fn active_mode(&self) -> Mode {
        self.active
    }

    /// Switching keeps every engine's state.
    pub fn switch_mode(&mut self, mode: Mode) {
        tracing::debug!(?mode, "switching mode");
        self.active = mode;
    }

    fn feature_mut(&mut self, mode: Mode) -> Option<&mut AppFeature> {
        self.features.iter_mut().find(|f| f.mode() == mode)
    }

    pub fn snapshot(&self) -> Option<FeatureSnapshot> {
        self.snapshot_of(self.active)
    }

    pub fn snapshot_of(&self, mode: Mode) -> Option<FeatureSnapshot> {
        self.features.iter().find(|f| f.mode() == mode).map(|f| f.view())
    }

    pub fn calculator(&self) -> Option<&CalculatorEngine> {
        self.features.iter().find_map(|f| match f {
            AppFeature::Calculator(engine) => Some(engine),
            _ => None,
        })
    }

    pub fn unit_converter(&self) -> Option<&UnitConverterEngine> {
        self.features.iter().find_map(|f| match f {
            AppFeature::UnitConverter(engine) => Some(engine),
            _ => None,
        })
    }

    pub fn currency(&self) -> Option<&CurrencyConverterEngine> {
        self.features.iter().find_map(|f| match f {
            AppFeature::Currency(engine) => Some(engine),
            _ => None,
        })
    }

    fn currency_mut(&mut self) -> Option<&mut CurrencyConverterEngine> {
        self.features.iter_mut().find_map(|f| match f {
            AppFeature::Currency(engine) => Some(engine),
            _ => None,
        })
    }

    /// Reset every engine.
    pub fn reset_all(&mut self) {
        for feature in &mut self.features {
            feature.reset();
        }
    }

    /// Route one event. A currency `Convert` hands back the request to fetch.
    ///
    /// Keys go to the mode on screen; intents go to the engine they name.
    pub fn handle_event(&mut self, event: InputEvent) -> Option<PendingConversion> {
        match event {
            InputEvent::Key(key) => {
                let active = self.active;
                if let Some(feature) = self.feature_mut(active) {
                    feature.handle_key(&key);
                }
                None
            }
            InputEvent::Intent(Intent::Currency(intent)) => {
                self.currency_mut().and_then(|engine| engine.apply(intent).1)
            }
            InputEvent::Intent(intent) => {
                if let Some(feature) = self.feature_mut(intent.mode()) {
                    feature.handle_intent(&intent);
                }
                None
            }
            InputEvent::SwitchMode(mode) => {
                self.switch_mode(mode);
                None
            }
        }
    }

    /// Drain whatever is queued without waiting. Returns the most recent
    /// currency request started while draining, if any.
    pub fn pump(&mut self, rx: &mut InputReceiver) -> Option<PendingConversion> {
        let mut latest = None;
        while let Some(event) = rx.try_recv() {
            if let Some(request) = self.handle_event(event) {
                latest = Some(request);
            }
        }
        latest
    }

    pub fn apply_rate(&mut self, request: &PendingConversion, outcome: crate::shared::AppResult<f64>) -> bool {
        self.currency_mut()
            .map(|engine| engine.apply_rate(request, outcome))
            .unwrap_or(false)
    }

    /// Process events until every sender is gone.
    ///
    /// While a rate fetch is in flight, incoming events keep being handled; a
    /// newer `Convert` replaces the fetch and a `Cancel` makes its reply stale.
    pub async fn run(&mut self, mut rx: InputReceiver, provider: &dyn RateProvider, timeout: Duration) {
        while let Some(event) = rx.recv().await {
            let Some(mut request) = self.handle_event(event) else {
                continue;
            };

            let mut fetch = Box::pin(fetch_owned(provider, request.clone(), timeout));
            loop {
                tokio::select! {
                    biased;

                    next = rx.recv() => match next {
                        Some(event) => {
                            if let Some(newer) = self.handle_event(event) {
                                request = newer;
                                fetch = Box::pin(fetch_owned(provider, request.clone(), timeout));
                            }
                        }
                        None => {
                            let outcome = fetch.await;
                            self.apply_rate(&request, outcome);
                            return;
                        }
                    },
                    outcome = &mut fetch => {
                        self.apply_rate(&request, outcome);
                        break;
                    }
                }
            }
        }
    }
}

async fn fetch_owned(
    provider: &dyn RateProvider,
    request: PendingConversion,
    timeout: Duration,
) -> crate::shared::AppResult<f64> {
    currency::fetch_rate_with_timeout(provider, &request.from, &request.to, timeout).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::input::{self, InputEvent};
    use crate::shared::types::ActiveInput;
    use crate::shared::AppResult;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingRate {
        rate: f64,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl RateProvider for CountingRate {
        async fn fetch_rate(&self, _from: &str, _to: &str) -> AppResult<f64> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.rate)
        }
    }

    fn provider(rate: f64) -> CountingRate {
        CountingRate { rate, calls: AtomicUsize::new(0) }
    }

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn currency_setup(tx: &input::InputSender, amount: &str) {
        tx.send(InputEvent::Intent(Intent::Currency(CurrencyIntent::SetFromValue(amount.into()))));
        tx.send(InputEvent::Intent(Intent::Currency(CurrencyIntent::SelectCurrency("USD".into()))));
        tx.send(InputEvent::Intent(Intent::Currency(CurrencyIntent::SelectCurrency("EUR".into()))));
    }

    #[test]
    fn test_keys_and_buttons_share_one_path() {
        let mut by_keys = Session::new();
        let (tx, mut rx) = input::channel();
        for key in ["1", "+", "2", "Enter"] {
            tx.key(key);
        }
        by_keys.pump(&mut rx);

        let mut by_buttons = Session::new();
        let (tx, mut rx) = input::channel();
        for intent in [
            CalculatorIntent::Digit('1'),
            CalculatorIntent::Operator(calculator::Operator::Add),
            CalculatorIntent::Digit('2'),
            CalculatorIntent::Result,
        ] {
            tx.send(InputEvent::Intent(Intent::Calculator(intent)));
        }
        by_buttons.pump(&mut rx);

        assert_eq!(by_keys, by_buttons);
        assert_eq!(by_keys.calculator().unwrap().buffer(), "3");
    }

    #[test]
    fn test_keys_only_reach_active_mode() {
        let mut session = Session::new();
        session.switch_mode(Mode::UnitConverter);
        let (tx, mut rx) = input::channel();
        tx.key("5");
        session.pump(&mut rx);
        assert_eq!(session.calculator().unwrap().buffer(), "");

        tx.send(InputEvent::SwitchMode(Mode::Calculator));
        tx.key("5");
        session.pump(&mut rx);
        assert_eq!(session.calculator().unwrap().buffer(), "5");
    }

    #[test]
    fn test_modes_keep_independent_state() {
        let mut session = Session::new();
        let (tx, mut rx) = input::channel();
        tx.key("7");
        tx.send(InputEvent::Intent(Intent::Unit(UnitIntent::SetFromValue("100".into()))));
        tx.send(InputEvent::Intent(Intent::Unit(UnitIntent::SelectUnit("cm".into()))));
        tx.send(InputEvent::Intent(Intent::Unit(UnitIntent::Focus(ActiveInput::To))));
        tx.send(InputEvent::Intent(Intent::Unit(UnitIntent::SelectUnit("m".into()))));
        tx.send(InputEvent::Intent(Intent::Unit(UnitIntent::Convert)));
        session.pump(&mut rx);

        assert_eq!(session.calculator().unwrap().buffer(), "7");
        assert_eq!(session.unit_converter().unwrap().to_value(), "1");
        match session.snapshot_of(Mode::UnitConverter) {
            Some(FeatureSnapshot::UnitConverter(snap)) => assert_eq!(snap.to_unit.as_deref(), Some("m")),
            other => panic!("unexpected snapshot {:?}", other),
        }

        session.reset_all();
        assert_eq!(session, Session::new());
    }

    #[test]
    fn test_pump_returns_currency_request() {
        let mut session = Session::new();
        let (tx, mut rx) = input::channel();
        currency_setup(&tx, "10");
        tx.send(InputEvent::Intent(Intent::Currency(CurrencyIntent::Convert)));

        let request = session.pump(&mut rx).unwrap();
        assert_eq!((request.from.as_str(), request.to.as_str()), ("USD", "EUR"));
        assert!(session.currency().unwrap().is_pending());

        assert!(session.apply_rate(&request, Ok(2.0)));
        assert_eq!(session.currency().unwrap().to_value(), "20.00");
    }

    #[tokio::test]
    async fn test_run_converts_currency() {
        let mut session = Session::new();
        let (tx, rx) = input::channel();
        currency_setup(&tx, "10");
        tx.send(InputEvent::Intent(Intent::Currency(CurrencyIntent::Convert)));
        drop(tx);

        let rates = provider(1.1);
        session.run(rx, &rates, TIMEOUT).await;

        assert_eq!(session.currency().unwrap().to_value(), "11.00");
        assert_eq!(rates.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_run_cancel_while_fetching_discards_reply() {
        let mut session = Session::new();
        let (tx, rx) = input::channel();
        currency_setup(&tx, "10");
        tx.send(InputEvent::Intent(Intent::Currency(CurrencyIntent::Convert)));
        tx.send(InputEvent::Intent(Intent::Currency(CurrencyIntent::Cancel)));
        drop(tx);

        let rates = provider(1.1);
        session.run(rx, &rates, TIMEOUT).await;

        let currency = session.currency().unwrap();
        assert_eq!(currency.to_value(), "");
        assert_eq!(currency.from_currency(), None);
        assert!(!currency.is_pending());
    }

    #[tokio::test]
    async fn test_run_newer_convert_wins() {
        let mut session = Session::new();
        let (tx, rx) = input::channel();
        currency_setup(&tx, "10");
        tx.send(InputEvent::Intent(Intent::Currency(CurrencyIntent::Convert)));
        tx.send(InputEvent::Intent(Intent::Currency(CurrencyIntent::SetFromValue("30".into()))));
        tx.send(InputEvent::Intent(Intent::Currency(CurrencyIntent::Convert)));
        drop(tx);

        let rates = provider(2.0);
        session.run(rx, &rates, TIMEOUT).await;

        assert_eq!(session.currency().unwrap().to_value(), "60.00");
    }
}
