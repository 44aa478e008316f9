//! Numeric text parsing and thousands grouping shared by every engine.
//!
//! Grouping always uses a single space and only touches the integer part;
//! fraction digits are left exactly as produced.

use crate::shared::error::{AppError, AppResult};
use once_cell::sync::Lazy;
use regex::Regex;

const GROUP_SEPARATOR: char = ' ';

static WHITESPACE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s+").expect("Failed to compile whitespace pattern")
});

// Plain decimal notation with an optional exponent; rejects "inf"/"NaN" spellings
// that f64::from_str would otherwise accept.
static NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?$")
        .expect("Failed to compile number pattern")
});

/// Parse user text into a number, returning NaN when it is not numeric.
pub fn parse(text: &str) -> f64 {
    parse_strict(text).unwrap_or(f64::NAN)
}

/// Drop grouping whitespace and turn a decimal comma into a point.
pub fn normalize(text: &str) -> String {
    WHITESPACE.replace_all(text, "").replace(',', ".")
}

/// Like [`parse`] but reports why the text was rejected.
pub fn parse_strict(text: &str) -> AppResult<f64> {
    let cleaned = normalize(text);
    if !NUMBER.is_match(&cleaned) {
        return Err(AppError::Validation(format!("Not a number: '{}'", text)));
    }
    cleaned
        .parse::<f64>()
        .map_err(|e| AppError::Validation(format!("Not a number: '{}' ({})", text, e)))
}

/// Round to `decimals` places and group the integer part.
///
/// `format(1234567.5, 2)` yields `"1 234 567.50"`.
pub fn format(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    let mut fixed = format!("{:.*}", decimals, value);
    // Anything that rounds to zero loses its sign: "-0.00" becomes "0.00".
    if fixed.starts_with('-') && fixed[1..].chars().all(|c| c == '0' || c == '.') {
        fixed.remove(0);
    }
    match fixed.split_once('.') {
        Some((int_part, decimal_part)) => format!("{}.{}", group_integer(int_part), decimal_part),
        None => group_integer(&fixed),
    }
}

/// Calculator result rendering: two decimals, dropping a fraction that is all zeros.
pub fn format_result(value: f64) -> String {
    let formatted = format(value, 2);
    match formatted.strip_suffix(".00") {
        Some(whole) => whole.to_string(),
        None => formatted,
    }
}

/// Group text that is still being typed.
///
/// Nothing is rounded, a trailing separator survives (`"1234."` becomes
/// `"1 234."`) and digits after the separator are never grouped.
pub fn format_live_input(text: &str) -> String {
    let (int_part, decimal_part) = match text.split_once('.') {
        Some((int_part, decimal_part)) => (int_part, Some(decimal_part)),
        None => (text, None),
    };
    let int_part = WHITESPACE.replace_all(int_part, "");
    let grouped = group_integer(&int_part);
    match decimal_part {
        Some(decimal_part) => format!("{}.{}", grouped, decimal_part),
        None => grouped,
    }
}

/// Insert a separator every three digits from the right of each digit run.
fn group_integer(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    let mut i = 0;
    while i < chars.len() {
        if !chars[i].is_ascii_digit() {
            result.push(chars[i]);
            i += 1;
            continue;
        }
        let start = i;
        while i < chars.len() && chars[i].is_ascii_digit() {
            i += 1;
        }
        let run = &chars[start..i];
        for (k, ch) in run.iter().enumerate() {
            if k > 0 && (run.len() - k) % 3 == 0 {
                result.push(GROUP_SEPARATOR);
            }
            result.push(*ch);
        }
    }
    result
}
