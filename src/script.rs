//! Headless key sequences: `7 ENTER 3 +`.
//!
//! Tokens are key labels. A run of digits and points such as `360` or
//! `6.5` is shorthand for pressing each of those keys in turn.

use crate::calculator::Calculator;
use crate::keys::{Key, KeyParseError};
use tracing::info;

/// Split every argument on whitespace and parse each piece.
pub fn parse<S: AsRef<str>>(args: &[S]) -> Result<Vec<Key>, KeyParseError> {
    let mut keys = Vec::new();
    for token in args.iter().flat_map(|arg| arg.as_ref().split_whitespace()) {
        if token.len() > 1 && token.chars().all(|c| c.is_ascii_digit() || c == '.') {
            keys.extend(token.chars().map(number_key));
        } else {
            keys.push(token.parse()?);
        }
    }
    Ok(keys)
}

fn number_key(c: char) -> Key {
    c.to_digit(10)
        .and_then(|d| Key::digit(d as u8))
        .unwrap_or(Key::Decimal)
}

/// Press `keys` in order on a fresh calculator.
pub fn run(keys: &[Key]) -> Calculator {
    let mut calculator = Calculator::new();
    for &key in keys {
        calculator.press(key);
    }
    info!(presses = keys.len(), display = calculator.display(), "script finished");
    calculator
}

/// Pretty JSON snapshot of the whole calculator, as printed by `run --json`.
pub fn to_json(calculator: &Calculator) -> serde_json::Result<String> {
    serde_json::to_string_pretty(calculator)
}
