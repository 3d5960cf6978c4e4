//! Conversions between the display string and `f64`.
//!
//! The display is free text built one key at a time, so parsing is lenient:
//! the longest numeric prefix wins and anything after it is ignored. Results
//! are written back in the short form a pocket calculator shows (`10`, not
//! `10.0`; `Infinity`, not `inf`).

use serde::{Serialize, Serializer};
use std::collections::VecDeque;

/// Parse the longest numeric prefix of `text`, or NaN if there is none.
///
/// Accepts an optional sign, then either `Infinity` or a decimal with an
/// optional fraction and exponent. `"1.2.3"` parses as `1.2`.
pub fn parse_display(text: &str) -> f64 {
    let s = text.trim_start();
    let bytes = s.as_bytes();
    let mut pos = 0;
    let mut normalized = String::with_capacity(s.len());

    if let Some(&sign @ (b'+' | b'-')) = bytes.first() {
        normalized.push(sign as char);
        pos = 1;
    }

    if s[pos..].starts_with("Infinity") {
        return if normalized.starts_with('-') {
            f64::NEG_INFINITY
        } else {
            f64::INFINITY
        };
    }

    let int_start = pos;
    while pos < bytes.len() && bytes[pos].is_ascii_digit() {
        pos += 1;
    }
    let int_digits = &s[int_start..pos];

    let mut frac_digits = "";
    if pos < bytes.len() && bytes[pos] == b'.' {
        let frac_start = pos + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        frac_digits = &s[frac_start..frac_end];
        if !int_digits.is_empty() || !frac_digits.is_empty() {
            pos = frac_end;
        }
    }

    if int_digits.is_empty() && frac_digits.is_empty() {
        return f64::NAN;
    }

    normalized.push_str(if int_digits.is_empty() { "0" } else { int_digits });
    if !frac_digits.is_empty() {
        normalized.push('.');
        normalized.push_str(frac_digits);
    }

    // Exponent only counts when at least one digit follows it.
    if pos < bytes.len() && (bytes[pos] == b'e' || bytes[pos] == b'E') {
        let mut exp_pos = pos + 1;
        let mut exponent = String::from("e");
        if let Some(&sign @ (b'+' | b'-')) = bytes.get(exp_pos) {
            exponent.push(sign as char);
            exp_pos += 1;
        }
        let exp_digits_start = exp_pos;
        while exp_pos < bytes.len() && bytes[exp_pos].is_ascii_digit() {
            exp_pos += 1;
        }
        if exp_pos > exp_digits_start {
            exponent.push_str(&s[exp_digits_start..exp_pos]);
            normalized.push_str(&exponent);
        }
    }

    normalized.parse().unwrap_or(f64::NAN)
}

/// Format an arithmetic result for the display.
pub fn format_number(value: f64) -> String {
    if let Some(word) = non_finite_word(value) {
        return word.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }

    let magnitude = value.abs();
    if (1e-6..1e21).contains(&magnitude) {
        format!("{value}")
    } else {
        exponent_form(value)
    }
}

/// Format `value` with exactly `decimals` fractional digits.
pub fn format_fixed(value: f64, decimals: usize) -> String {
    if let Some(word) = non_finite_word(value) {
        return word.to_string();
    }
    if value.abs() >= 1e21 {
        return format_number(value);
    }
    // -0.0 prints as plain zero
    let sign = if value < 0.0 { "-" } else { "" };
    let magnitude = value.abs();
    // Exact halves round away from zero; the next float up is past the tie.
    let magnitude = if is_exact_midpoint(magnitude, decimals) {
        f64::from_bits(magnitude.to_bits() + 1)
    } else {
        magnitude
    };
    format!("{sign}{magnitude:.decimals$}")
}

/// True when `magnitude` sits exactly halfway between two `decimals`-place values.
fn is_exact_midpoint(magnitude: f64, decimals: usize) -> bool {
    // An f64 never has more than 1074 fractional digits, so this is exact.
    let exact = format!("{magnitude:.1074}");
    let Some(tail) = exact
        .split_once('.')
        .and_then(|(_, frac)| frac.get(decimals..))
    else {
        return false;
    };
    tail.starts_with('5') && tail[1..].bytes().all(|b| b == b'0')
}

/// JSON form of a value: finite values as numbers, the rest as the words
/// the display uses, so `Infinity` and `NaN` stay distinguishable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JsonNumber(pub f64);

impl Serialize for JsonNumber {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match non_finite_word(self.0) {
            Some(word) => serializer.serialize_str(word),
            None => serializer.serialize_f64(self.0),
        }
    }
}

pub(crate) fn serialize_number<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    JsonNumber(*value).serialize(serializer)
}

pub(crate) fn serialize_numbers<S: Serializer>(
    values: &VecDeque<f64>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(values.iter().copied().map(JsonNumber))
}

fn non_finite_word(value: f64) -> Option<&'static str> {
    if value.is_nan() {
        Some("NaN")
    } else if value == f64::INFINITY {
        Some("Infinity")
    } else if value == f64::NEG_INFINITY {
        Some("-Infinity")
    } else {
        None
    }
}

fn exponent_form(value: f64) -> String {
    let raw = format!("{value:e}");
    match raw.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{mantissa}e+{exponent}")
        }
        _ => raw,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_numbers() {
        assert_eq!(parse_display("0"), 0.0);
        assert_eq!(parse_display("42"), 42.0);
        assert_eq!(parse_display("-3.25"), -3.25);
        assert_eq!(parse_display(".5"), 0.5);
        assert_eq!(parse_display("5."), 5.0);
    }

    #[test]
    fn test_parse_signs() {
        assert_eq!(parse_display("+7"), 7.0);
        assert_eq!(parse_display("-1e+3"), -1000.0);
        assert_eq!(parse_display("2.5e-1"), 0.25);
    }

    #[test]
    fn test_parse_ignores_trailing_garbage() {
        assert_eq!(parse_display("1.2.3"), 1.2);
        assert_eq!(parse_display("12abc"), 12.0);
        assert_eq!(parse_display("3e"), 3.0);
        assert_eq!(parse_display("1e+21"), 1e21);
        assert_eq!(parse_display("1.5e-7"), 1.5e-7);
    }

    #[test]
    fn test_parse_words() {
        assert_eq!(parse_display("Infinity"), f64::INFINITY);
        assert_eq!(parse_display("-Infinity"), f64::NEG_INFINITY);
        assert!(parse_display("NaN").is_nan());
        assert!(parse_display(".").is_nan());
        assert!(parse_display("Error: i is not a number").is_nan());
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(10.0), "10");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(0.1 + 0.2), "0.30000000000000004");
        assert_eq!(format_number(f64::INFINITY), "Infinity");
        assert_eq!(format_number(f64::NEG_INFINITY), "-Infinity");
        assert_eq!(format_number(f64::NAN), "NaN");
        assert_eq!(format_number(1e21), "1e+21");
        assert_eq!(format_number(1.5e-7), "1.5e-7");
    }

    #[test]
    fn test_format_fixed() {
        assert_eq!(format_fixed(1200.0, 2), "1200.00");
        assert_eq!(format_fixed(-0.0, 2), "0.00");
        assert_eq!(format_fixed(-12.345678, 2), "-12.35");
        assert_eq!(format_fixed(f64::NAN, 2), "NaN");
    }

    #[test]
    fn test_format_fixed_rounds_halves_away_from_zero() {
        assert_eq!(format_fixed(-0.125, 2), "-0.13");
        assert_eq!(format_fixed(0.125, 2), "0.13");
        assert_eq!(format_fixed(-10.125, 2), "-10.13");
        assert_eq!(format_fixed(2.5, 0), "3");
        // 1.005 is stored just below the half, 0.135 just above
        assert_eq!(format_fixed(1.005, 2), "1.00");
        assert_eq!(format_fixed(0.135, 2), "0.14");
        assert_eq!(format_fixed(-0.001, 2), "-0.00");
    }

    #[test]
    fn test_json_number_keeps_non_finite_words() {
        let values = [JsonNumber(1.5), JsonNumber(f64::INFINITY), JsonNumber(f64::NAN)];
        let json = serde_json::to_string(&values).unwrap();
        assert_eq!(json, r#"[1.5,"Infinity","NaN"]"#);
    }
}
