//! Input events and the channel that carries them to a [`Session`].
//!
//! Keyboard keys and on-screen buttons both end up as events on the same
//! channel, so there is one code path per action.
//!
//! [`Session`]: crate::core::features::Session

use tokio::sync::mpsc;

use super::features::calculator::{CalculatorIntent, Operator};
use super::features::{Intent, Mode};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    /// A key name as the platform reports it, e.g. `"7"`, `"+"`, `"Enter"`.
    Key(String),
    Intent(Intent),
    SwitchMode(Mode),
}

#[derive(Debug, Clone)]
pub struct InputSender {
    tx: mpsc::UnboundedSender<InputEvent>,
}

impl InputSender {
    /// Queue an event. Returns `false` once the receiving side is gone.
    pub fn send(&self, event: InputEvent) -> bool {
        self.tx.send(event).is_ok()
    }

    pub fn key(&self, key: &str) -> bool {
        self.send(InputEvent::Key(key.to_string()))
    }

    pub fn calculator(&self, intent: CalculatorIntent) -> bool {
        self.send(InputEvent::Intent(Intent::Calculator(intent)))
    }
}

#[derive(Debug)]
pub struct InputReceiver {
    rx: mpsc::UnboundedReceiver<InputEvent>,
}

impl InputReceiver {
    pub async fn recv(&mut self) -> Option<InputEvent> {
        self.rx.recv().await
    }

    /// Next queued event, without waiting.
    pub fn try_recv(&mut self) -> Option<InputEvent> {
        self.rx.try_recv().ok()
    }
}

pub fn channel() -> (InputSender, InputReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (InputSender { tx }, InputReceiver { rx })
}

/// Map a key name to a calculator intent. Unrecognised keys map to `None`.
pub fn calculator_intent_for_key(key: &str) -> Option<CalculatorIntent> {
    let mut chars = key.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        if c.is_ascii_digit() {
            return Some(CalculatorIntent::Digit(c));
        }
    }

    match key {
        "." | "," => Some(CalculatorIntent::DecimalPoint),
        "Enter" => Some(CalculatorIntent::Result),
        "Backspace" => Some(CalculatorIntent::Backspace),
        "Delete" => Some(CalculatorIntent::Clear),
        other => Operator::from_symbol(other).map(CalculatorIntent::Operator),
    }
}
