//! Two-operand calculator state machine
//!
//! Every failure (bad operand, division by zero, domain violation) lands in the
//! `"Error"` display state instead of surfacing as a Rust error; the next digit
//! press or an explicit Clear leaves it.

use super::formatter;
use super::{FeatureSnapshot, FeatureSync, Intent, Mode};
use crate::core::input;
use crate::shared::types::CalculatorSnapshot;
use crate::shared::ERROR_DISPLAY;

/// Pending binary operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
    Modulo,
}

impl Operator {
    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Multiply => "*",
            Operator::Divide => "/",
            Operator::Power => "^",
            Operator::Modulo => "mod",
        }
    }

    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "+" => Some(Operator::Add),
            "-" => Some(Operator::Subtract),
            "*" => Some(Operator::Multiply),
            "/" => Some(Operator::Divide),
            "^" => Some(Operator::Power),
            "mod" => Some(Operator::Modulo),
            _ => None,
        }
    }

    /// NaN marks an undefined result (zero divisor for `/` and `mod`).
    pub fn apply(self, lhs: f64, rhs: f64) -> f64 {
        match self {
            Operator::Add => lhs + rhs,
            Operator::Subtract => lhs - rhs,
            Operator::Multiply => lhs * rhs,
            Operator::Divide => {
                if rhs != 0.0 {
                    lhs / rhs
                } else {
                    f64::NAN
                }
            }
            Operator::Power => lhs.powf(rhs),
            Operator::Modulo => {
                if rhs != 0.0 {
                    lhs % rhs
                } else {
                    f64::NAN
                }
            }
        }
    }
}

/// Single-operand functions from the "more" panel. Trigonometry is in radians.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Percent,
    SquareRoot,
    CubeRoot,
    Square,
    Cube,
    Exp,
    TenPower,
    Log10,
    Ln,
    Abs,
    Negate,
    Factorial,
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
}

impl UnaryOp {
    pub const ALL: [UnaryOp; 18] = [
        UnaryOp::Percent,
        UnaryOp::SquareRoot,
        UnaryOp::CubeRoot,
        UnaryOp::Square,
        UnaryOp::Cube,
        UnaryOp::Exp,
        UnaryOp::TenPower,
        UnaryOp::Log10,
        UnaryOp::Ln,
        UnaryOp::Abs,
        UnaryOp::Negate,
        UnaryOp::Factorial,
        UnaryOp::Sin,
        UnaryOp::Cos,
        UnaryOp::Tan,
        UnaryOp::Asin,
        UnaryOp::Acos,
        UnaryOp::Atan,
    ];

    /// Button label as rendered by the shell.
    pub fn label(self) -> &'static str {
        match self {
            UnaryOp::Percent => "%",
            UnaryOp::SquareRoot => "√",
            UnaryOp::CubeRoot => "∛",
            UnaryOp::Square => "x²",
            UnaryOp::Cube => "x³",
            UnaryOp::Exp => "exp",
            UnaryOp::TenPower => "10ˣ",
            UnaryOp::Log10 => "log",
            UnaryOp::Ln => "ln",
            UnaryOp::Abs => "abs",
            UnaryOp::Negate => "±",
            UnaryOp::Factorial => "!",
            UnaryOp::Sin => "sin",
            UnaryOp::Cos => "cos",
            UnaryOp::Tan => "tan",
            UnaryOp::Asin => "asin",
            UnaryOp::Acos => "acos",
            UnaryOp::Atan => "atan",
        }
    }

    /// ASCII spelling for keyboards and the command line.
    pub fn name(self) -> &'static str {
        match self {
            UnaryOp::Percent => "percent",
            UnaryOp::SquareRoot => "sqrt",
            UnaryOp::CubeRoot => "cbrt",
            UnaryOp::Square => "sqr",
            UnaryOp::Cube => "cube",
            UnaryOp::Exp => "exp",
            UnaryOp::TenPower => "pow10",
            UnaryOp::Log10 => "log",
            UnaryOp::Ln => "ln",
            UnaryOp::Abs => "abs",
            UnaryOp::Negate => "neg",
            UnaryOp::Factorial => "fact",
            UnaryOp::Sin => "sin",
            UnaryOp::Cos => "cos",
            UnaryOp::Tan => "tan",
            UnaryOp::Asin => "asin",
            UnaryOp::Acos => "acos",
            UnaryOp::Atan => "atan",
        }
    }

    /// Accepts either the button label or the ASCII name.
    pub fn parse(token: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|op| op.label() == token || op.name() == token)
    }

    /// Domain guard checked before [`UnaryOp::apply`].
    pub fn accepts(self, x: f64) -> bool {
        match self {
            UnaryOp::SquareRoot => x >= 0.0,
            UnaryOp::Log10 | UnaryOp::Ln => x > 0.0,
            UnaryOp::Factorial => x >= 0.0 && x.fract() == 0.0,
            _ => true,
        }
    }

    pub fn apply(self, x: f64) -> f64 {
        match self {
            UnaryOp::Percent => x / 100.0,
            UnaryOp::SquareRoot => x.sqrt(),
            UnaryOp::CubeRoot => x.cbrt(),
            UnaryOp::Square => x.powi(2),
            UnaryOp::Cube => x.powi(3),
            UnaryOp::Exp => x.exp(),
            UnaryOp::TenPower => 10f64.powf(x),
            UnaryOp::Log10 => x.log10(),
            UnaryOp::Ln => x.ln(),
            UnaryOp::Abs => x.abs(),
            UnaryOp::Negate => -x,
            UnaryOp::Factorial => factorial(x),
            UnaryOp::Sin => x.sin(),
            UnaryOp::Cos => x.cos(),
            UnaryOp::Tan => x.tan(),
            UnaryOp::Asin => x.asin(),
            UnaryOp::Acos => x.acos(),
            UnaryOp::Atan => x.atan(),
        }
    }
}

/// Iterative product; NaN for negative or fractional input.
pub fn factorial(n: f64) -> f64 {
    if n < 0.0 || n.fract() != 0.0 || n.is_nan() {
        return f64::NAN;
    }
    let mut result = 1.0;
    let mut i = 2.0;
    while i <= n {
        result *= i;
        i += 1.0;
        if result.is_infinite() {
            break;
        }
    }
    result
}

/// Everything the shell can ask of the calculator, from buttons and keys alike.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalculatorIntent {
    Digit(char),
    DecimalPoint,
    Operator(Operator),
    Result,
    Unary(UnaryOp),
    Backspace,
    Clear,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CalculatorEngine {
    first_operand: Option<f64>,
    operator: Option<Operator>,
    buffer: String,
    clear_on_next_digit: bool,
}

impl CalculatorEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn operator(&self) -> Option<Operator> {
        self.operator
    }

    pub fn first_operand(&self) -> Option<f64> {
        self.first_operand
    }

    pub fn is_error(&self) -> bool {
        self.buffer == ERROR_DISPLAY
    }

    /// Rendered buffer: the raw text with live thousands grouping.
    pub fn display(&self) -> String {
        formatter::format_live_input(&self.buffer)
    }

    /// Apply one intent. Returns `false` when the intent had no effect.
    pub fn apply(&mut self, intent: CalculatorIntent) -> bool {
        let changed = match intent {
            CalculatorIntent::Digit(d) => self.press_digit(d),
            CalculatorIntent::DecimalPoint => self.press_decimal_point(),
            CalculatorIntent::Operator(op) => self.press_operator(op),
            CalculatorIntent::Result => self.request_result(),
            CalculatorIntent::Unary(op) => {
                self.apply_unary(op);
                true
            }
            CalculatorIntent::Backspace => self.buffer.pop().is_some(),
            CalculatorIntent::Clear => {
                self.clear();
                true
            }
        };
        tracing::debug!(?intent, changed, buffer = %self.buffer, "calculator intent");
        changed
    }

    pub fn press_digit(&mut self, digit: char) -> bool {
        if !digit.is_ascii_digit() {
            return false;
        }
        if self.clear_on_next_digit {
            self.buffer.clear();
            self.clear_on_next_digit = false;
        }
        if digit == '0' && self.buffer == "0" {
            return false;
        }
        self.buffer.push(digit);
        true
    }

    pub fn press_decimal_point(&mut self) -> bool {
        if self.clear_on_next_digit {
            self.buffer = "0.".to_string();
            self.clear_on_next_digit = false;
            return true;
        }
        if self.buffer.contains('.') {
            return false;
        }
        self.buffer.push('.');
        true
    }

    pub fn press_operator(&mut self, op: Operator) -> bool {
        if self.buffer.is_empty() {
            return false;
        }
        self.first_operand = Some(formatter::parse(&self.buffer));
        self.operator = Some(op);
        self.buffer.clear();
        true
    }

    pub fn request_result(&mut self) -> bool {
        let (Some(first), Some(op)) = (self.first_operand, self.operator) else {
            return false;
        };
        if self.buffer.is_empty() {
            return false;
        }
        let second = formatter::parse(&self.buffer);
        let result = op.apply(first, second);
        if result.is_finite() {
            self.buffer = formatter::format_result(result);
        } else {
            tracing::warn!(first, second, op = op.symbol(), "calculation has no finite result");
            self.buffer = ERROR_DISPLAY.to_string();
        }
        self.first_operand = None;
        self.operator = None;
        self.clear_on_next_digit = true;
        true
    }

    pub fn apply_unary(&mut self, op: UnaryOp) {
        let value = formatter::parse(&self.buffer);
        let usable = !self.buffer.is_empty() && !self.is_error() && !value.is_nan() && op.accepts(value);
        let result = if usable { op.apply(value) } else { f64::NAN };
        if result.is_finite() {
            self.buffer = formatter::format_result(result);
        } else {
            tracing::warn!(op = op.name(), input = %self.buffer, "unary operation rejected");
            self.buffer = ERROR_DISPLAY.to_string();
        }
        self.first_operand = None;
        self.operator = None;
        self.clear_on_next_digit = true;
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn snapshot(&self) -> CalculatorSnapshot {
        CalculatorSnapshot {
            display: self.display(),
            raw: self.buffer.clone(),
            operator: self.operator.map(|op| op.symbol().to_string()),
            first_operand: self.first_operand,
            clear_on_next_digit: self.clear_on_next_digit,
            is_error: self.is_error(),
        }
    }
}

impl FeatureSync for CalculatorEngine {
    fn mode(&self) -> Mode {
        Mode::Calculator
    }

    fn handle_intent(&mut self, intent: &Intent) -> bool {
        match intent {
            Intent::Calculator(intent) => self.apply(*intent),
            _ => false,
        }
    }

    fn handle_key(&mut self, key: &str) -> bool {
        match input::calculator_intent_for_key(key) {
            Some(intent) => self.apply(intent),
            None => false,
        }
    }

    fn view(&self) -> FeatureSnapshot {
        FeatureSnapshot::Calculator(self.snapshot())
    }

    fn reset(&mut self) {
        self.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(keys: &[CalculatorIntent]) -> CalculatorEngine {
        let mut calc = CalculatorEngine::new();
        for key in keys {
            calc.apply(*key);
        }
        calc
    }

    fn digits(calc: &mut CalculatorEngine, text: &str) {
        for d in text.chars() {
            calc.press_digit(d);
        }
    }

    #[test]
    fn test_addition() {
        let calc = run(&[
            CalculatorIntent::Digit('1'),
            CalculatorIntent::Operator(Operator::Add),
            CalculatorIntent::Digit('2'),
            CalculatorIntent::Result,
        ]);
        assert_eq!(calc.buffer(), "3");
        assert_eq!(calc.operator(), None);
        assert_eq!(calc.first_operand(), None);
        assert!(calc.snapshot().clear_on_next_digit);
    }

    #[test]
    fn test_division_by_zero_is_error() {
        let calc = run(&[
            CalculatorIntent::Digit('5'),
            CalculatorIntent::Operator(Operator::Divide),
            CalculatorIntent::Digit('0'),
            CalculatorIntent::Result,
        ]);
        assert_eq!(calc.buffer(), "Error");
        assert!(calc.is_error());
    }

    #[test]
    fn test_modulo() {
        let mut calc = CalculatorEngine::new();
        digits(&mut calc, "17");
        calc.press_operator(Operator::Modulo);
        digits(&mut calc, "5");
        calc.request_result();
        assert_eq!(calc.buffer(), "2");

        digits(&mut calc, "4");
        calc.press_operator(Operator::Modulo);
        digits(&mut calc, "0");
        calc.request_result();
        assert_eq!(calc.buffer(), "Error");
    }

    #[test]
    fn test_power_and_grouped_result() {
        let mut calc = CalculatorEngine::new();
        digits(&mut calc, "10");
        calc.press_operator(Operator::Power);
        digits(&mut calc, "6");
        calc.request_result();
        assert_eq!(calc.buffer(), "1 000 000");
        assert_eq!(calc.display(), "1 000 000");
    }

    #[test]
    fn test_tiny_negative_result_shows_unsigned_zero() {
        let mut calc = CalculatorEngine::new();
        digits(&mut calc, "1");
        calc.press_operator(Operator::Subtract);
        digits(&mut calc, "1");
        calc.press_decimal_point();
        digits(&mut calc, "001");
        calc.request_result();
        assert_eq!(calc.buffer(), "0");

        calc.press_decimal_point();
        digits(&mut calc, "001");
        calc.apply_unary(UnaryOp::Negate);
        assert_eq!(calc.buffer(), "0");
    }

    #[test]
    fn test_fractional_result_keeps_two_decimals() {
        let mut calc = CalculatorEngine::new();
        digits(&mut calc, "7");
        calc.press_operator(Operator::Divide);
        digits(&mut calc, "2");
        calc.request_result();
        assert_eq!(calc.buffer(), "3.50");
    }

    #[test]
    fn test_result_feeds_next_operation() {
        let mut calc = CalculatorEngine::new();
        digits(&mut calc, "999");
        calc.press_operator(Operator::Add);
        digits(&mut calc, "1");
        calc.request_result();
        assert_eq!(calc.buffer(), "1 000");

        // Grouped result is parsed back as 1000.
        calc.press_operator(Operator::Multiply);
        digits(&mut calc, "2");
        calc.request_result();
        assert_eq!(calc.buffer(), "2 000");
    }

    #[test]
    fn test_result_requires_operand_operator_and_buffer() {
        let mut calc = CalculatorEngine::new();
        assert!(!calc.request_result());
        digits(&mut calc, "4");
        assert!(!calc.request_result());
        calc.press_operator(Operator::Add);
        assert!(!calc.request_result());
        assert_eq!(calc.first_operand(), Some(4.0));
    }

    #[test]
    fn test_operator_ignored_on_empty_buffer() {
        let mut calc = CalculatorEngine::new();
        assert!(!calc.press_operator(Operator::Add));
        assert_eq!(calc.operator(), None);
    }

    #[test]
    fn test_square_root() {
        let mut calc = CalculatorEngine::new();
        digits(&mut calc, "9");
        calc.apply_unary(UnaryOp::SquareRoot);
        assert_eq!(calc.buffer(), "3");
    }

    #[test]
    fn test_square_root_of_negative_is_error() {
        let mut calc = CalculatorEngine::new();
        digits(&mut calc, "4");
        calc.apply_unary(UnaryOp::Negate);
        assert_eq!(calc.buffer(), "-4");
        calc.apply_unary(UnaryOp::SquareRoot);
        assert_eq!(calc.buffer(), "Error");
    }

    #[test]
    fn test_unary_on_empty_or_error_buffer() {
        let mut calc = CalculatorEngine::new();
        calc.apply_unary(UnaryOp::Square);
        assert!(calc.is_error());
        calc.apply_unary(UnaryOp::Abs);
        assert!(calc.is_error());
    }

    #[test]
    fn test_unary_clears_pending_operation() {
        let mut calc = CalculatorEngine::new();
        digits(&mut calc, "3");
        calc.press_operator(Operator::Add);
        digits(&mut calc, "2");
        calc.apply_unary(UnaryOp::Cube);
        assert_eq!(calc.buffer(), "8");
        assert_eq!(calc.operator(), None);
        assert_eq!(calc.first_operand(), None);
    }

    #[test]
    fn test_logarithms_require_positive_input() {
        let mut calc = CalculatorEngine::new();
        digits(&mut calc, "1000");
        calc.apply_unary(UnaryOp::Log10);
        assert_eq!(calc.buffer(), "3");

        calc.press_digit('0');
        calc.apply_unary(UnaryOp::Ln);
        assert_eq!(calc.buffer(), "Error");
    }

    #[test]
    fn test_percent_and_trig() {
        let mut calc = CalculatorEngine::new();
        digits(&mut calc, "50");
        calc.apply_unary(UnaryOp::Percent);
        assert_eq!(calc.buffer(), "0.50");

        calc.press_digit('0');
        calc.apply_unary(UnaryOp::Cos);
        assert_eq!(calc.buffer(), "1");

        calc.press_digit('2');
        calc.apply_unary(UnaryOp::Asin);
        assert_eq!(calc.buffer(), "Error");
    }

    #[test]
    fn test_factorial() {
        assert_eq!(factorial(5.0), 120.0);
        assert_eq!(factorial(0.0), 1.0);
        assert!(factorial(-3.0).is_nan());
        assert!(factorial(2.5).is_nan());

        let mut calc = CalculatorEngine::new();
        digits(&mut calc, "5");
        calc.apply_unary(UnaryOp::Factorial);
        assert_eq!(calc.buffer(), "120");

        calc.press_digit('2');
        calc.press_decimal_point();
        calc.press_digit('5');
        calc.apply_unary(UnaryOp::Factorial);
        assert_eq!(calc.buffer(), "Error");
    }

    #[test]
    fn test_digit_after_result_starts_fresh() {
        let mut calc = CalculatorEngine::new();
        digits(&mut calc, "5");
        calc.press_operator(Operator::Divide);
        digits(&mut calc, "0");
        calc.request_result();
        assert!(calc.is_error());

        calc.press_digit('7');
        assert_eq!(calc.buffer(), "7");
        assert!(!calc.snapshot().clear_on_next_digit);
    }

    #[test]
    fn test_decimal_point_after_result() {
        let mut calc = CalculatorEngine::new();
        digits(&mut calc, "9");
        calc.apply_unary(UnaryOp::SquareRoot);
        calc.press_decimal_point();
        assert_eq!(calc.buffer(), "0.");
        calc.press_digit('5');
        assert_eq!(calc.buffer(), "0.5");
    }

    #[test]
    fn test_decimal_point_only_once() {
        let mut calc = CalculatorEngine::new();
        calc.press_digit('1');
        assert!(calc.press_decimal_point());
        assert!(!calc.press_decimal_point());
        calc.press_digit('5');
        assert_eq!(calc.buffer(), "1.5");
    }

    #[test]
    fn test_leading_zero_rejected() {
        let mut calc = CalculatorEngine::new();
        assert!(calc.press_digit('0'));
        assert!(!calc.press_digit('0'));
        assert_eq!(calc.buffer(), "0");
        assert!(calc.press_digit('7'));
        assert_eq!(calc.buffer(), "07");
    }

    #[test]
    fn test_backspace_works_on_raw_buffer() {
        let mut calc = CalculatorEngine::new();
        digits(&mut calc, "12345");
        assert_eq!(calc.display(), "12 345");
        calc.apply(CalculatorIntent::Backspace);
        assert_eq!(calc.buffer(), "1234");
        assert_eq!(calc.display(), "1 234");

        let mut empty = CalculatorEngine::new();
        assert!(!empty.apply(CalculatorIntent::Backspace));
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut calc = CalculatorEngine::new();
        digits(&mut calc, "42");
        calc.press_operator(Operator::Subtract);
        digits(&mut calc, "1");

        calc.clear();
        let once = calc.clone();
        calc.clear();
        assert_eq!(calc, once);
        assert_eq!(calc, CalculatorEngine::new());
    }

    #[test]
    fn test_non_digit_rejected() {
        let mut calc = CalculatorEngine::new();
        assert!(!calc.press_digit('x'));
        assert_eq!(calc.buffer(), "");
    }

    #[test]
    fn test_unary_parse_by_label_or_name() {
        assert_eq!(UnaryOp::parse("√"), Some(UnaryOp::SquareRoot));
        assert_eq!(UnaryOp::parse("sqrt"), Some(UnaryOp::SquareRoot));
        assert_eq!(UnaryOp::parse("!"), Some(UnaryOp::Factorial));
        assert_eq!(UnaryOp::parse("nope"), None);
    }

    #[test]
    fn test_snapshot_reports_pending_operator() {
        let mut calc = CalculatorEngine::new();
        digits(&mut calc, "1234");
        calc.press_operator(Operator::Modulo);
        digits(&mut calc, "56789");

        let snap = calc.snapshot();
        assert_eq!(snap.display, "56 789");
        assert_eq!(snap.raw, "56789");
        assert_eq!(snap.operator.as_deref(), Some("mod"));
        assert_eq!(snap.first_operand, Some(1234.0));
        assert!(!snap.is_error);
    }
}
