//! Every key on the keypad, with the labels printed on them.

use crate::calculator::Operator;
use crate::finance::Register;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const DIGIT_LABELS: [&str; 10] = ["0", "1", "2", "3", "4", "5", "6", "7", "8", "9"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// 0 through 9. Build it with [`Key::digit`]; a value above 9 labels
    /// as `?` and does nothing when pressed.
    Digit(u8),
    Decimal,
    Enter,
    Operator(Operator),
    Financial(Register),
    Unwired(UnwiredKey),
}

/// Keys that are drawn but have no function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnwiredKey {
    ChangeSign,
    Power,
    Reciprocal,
    PercentTotal,
    DeltaPercent,
    Percent,
    Exponent,
    Price,
    Ytm,
    StraightLine,
    Depreciation,
    DecliningBalance,
    RollDown,
    ProgramRun,
    SigmaPlus,
    Program,
    Swap,
    ClearX,
    On,
    F,
    G,
    Store,
    Recall,
    SigmaMinus,
}

impl UnwiredKey {
    pub const ALL: [UnwiredKey; 24] = [
        UnwiredKey::ChangeSign,
        UnwiredKey::Power,
        UnwiredKey::Reciprocal,
        UnwiredKey::PercentTotal,
        UnwiredKey::DeltaPercent,
        UnwiredKey::Percent,
        UnwiredKey::Exponent,
        UnwiredKey::Price,
        UnwiredKey::Ytm,
        UnwiredKey::StraightLine,
        UnwiredKey::Depreciation,
        UnwiredKey::DecliningBalance,
        UnwiredKey::RollDown,
        UnwiredKey::ProgramRun,
        UnwiredKey::SigmaPlus,
        UnwiredKey::Program,
        UnwiredKey::Swap,
        UnwiredKey::ClearX,
        UnwiredKey::On,
        UnwiredKey::F,
        UnwiredKey::G,
        UnwiredKey::Store,
        UnwiredKey::Recall,
        UnwiredKey::SigmaMinus,
    ];

    pub fn label(self) -> &'static str {
        match self {
            UnwiredKey::ChangeSign => "CHS",
            UnwiredKey::Power => "y^x",
            UnwiredKey::Reciprocal => "1/x",
            UnwiredKey::PercentTotal => "%T",
            UnwiredKey::DeltaPercent => "Δ%",
            UnwiredKey::Percent => "%",
            UnwiredKey::Exponent => "EEX",
            UnwiredKey::Price => "PRICE",
            UnwiredKey::Ytm => "YTM",
            UnwiredKey::StraightLine => "SL",
            UnwiredKey::Depreciation => "DEPR",
            UnwiredKey::DecliningBalance => "DB",
            UnwiredKey::RollDown => "R↓",
            UnwiredKey::ProgramRun => "P/R",
            UnwiredKey::SigmaPlus => "Σ+",
            UnwiredKey::Program => "PRGM",
            UnwiredKey::Swap => "x≷y",
            UnwiredKey::ClearX => "CLx",
            UnwiredKey::On => "ON",
            UnwiredKey::F => "f",
            UnwiredKey::G => "g",
            UnwiredKey::Store => "STO",
            UnwiredKey::Recall => "RCL",
            UnwiredKey::SigmaMinus => "Σ-",
        }
    }

    /// ASCII spelling accepted in scripts for labels with symbols in them.
    fn ascii_alias(self) -> Option<&'static str> {
        match self {
            UnwiredKey::DeltaPercent => Some("D%"),
            UnwiredKey::RollDown => Some("RDN"),
            UnwiredKey::SigmaPlus => Some("S+"),
            UnwiredKey::Swap => Some("X<>Y"),
            UnwiredKey::SigmaMinus => Some("S-"),
            _ => None,
        }
    }
}

impl Key {
    /// The digit key for `value`, if there is one.
    pub fn digit(value: u8) -> Option<Key> {
        (value <= 9).then_some(Key::Digit(value))
    }

    pub fn label(self) -> &'static str {
        match self {
            Key::Digit(d) => DIGIT_LABELS.get(d as usize).copied().unwrap_or("?"),
            Key::Decimal => ".",
            Key::Enter => "ENTER",
            Key::Operator(op) => op.symbol(),
            Key::Financial(Register::N) => "n",
            Key::Financial(Register::I) => "i",
            Key::Financial(Register::Pv) => "PV",
            Key::Financial(Register::Pmt) => "PMT",
            Key::Financial(Register::Fv) => "FV",
            Key::Unwired(key) => key.label(),
        }
    }

    pub fn is_wired(self) -> bool {
        !matches!(self, Key::Unwired(_))
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyParseError {
    #[error("unknown key '{token}'")]
    Unknown { token: String },
}

impl FromStr for Key {
    type Err = KeyParseError;

    /// Parse a key label. Case-insensitive; `*`, `x`, `/` and a few ASCII
    /// spellings stand in for the symbol keys.
    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let upper = token.trim().to_uppercase();
        let key = match upper.as_str() {
            "." => Key::Decimal,
            "ENTER" => Key::Enter,
            "+" => Key::Operator(Operator::Add),
            "-" => Key::Operator(Operator::Subtract),
            "×" | "*" | "X" => Key::Operator(Operator::Multiply),
            "÷" | "/" => Key::Operator(Operator::Divide),
            "N" => Key::Financial(Register::N),
            "I" => Key::Financial(Register::I),
            "PV" => Key::Financial(Register::Pv),
            "PMT" => Key::Financial(Register::Pmt),
            "FV" => Key::Financial(Register::Fv),
            other => {
                if let Some(digit) = single_digit(other) {
                    digit
                } else {
                    UnwiredKey::ALL
                        .into_iter()
                        .find(|key| {
                            key.label().to_uppercase() == other || key.ascii_alias() == Some(other)
                        })
                        .map(Key::Unwired)
                        .ok_or_else(|| KeyParseError::Unknown {
                            token: token.to_string(),
                        })?
                }
            }
        };
        Ok(key)
    }
}

fn single_digit(token: &str) -> Option<Key> {
    let mut chars = token.chars();
    let digit = chars.next()?.to_digit(10)?;
    if chars.next().is_some() {
        return None;
    }
    Key::digit(u8::try_from(digit).ok()?)
}
