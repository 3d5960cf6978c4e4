//! RPN financial calculator core.
//!
//! The library holds the calculator state and keypad model; the `fincalc`
//! binary draws them in a terminal.

pub mod calculator;
pub mod config;
pub mod finance;
pub mod keypad;
pub mod keys;
pub mod logging;
pub mod numeric;
pub mod script;

pub use calculator::{Calculator, CaptureTarget, InputMode, Operator};
pub use config::{ConfigError, LogSettings, Settings, UiSettings};
pub use finance::{present_value, PvError, Register, Registers};
pub use keys::{Key, KeyParseError, UnwiredKey};
