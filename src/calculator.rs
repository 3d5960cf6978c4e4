//! Calculator state and the operations the keypad drives.
//!
//! Everything the display shows lives in one [`Calculator`] value: the text
//! being entered, the operand stack, the five financial registers and the
//! pending register capture. Each operation runs to completion before the
//! next key is read, so there is no intermediate state to guard.

use crate::finance::{self, PvError, Register, Registers, PV_DECIMALS};
use crate::keys::Key;
use crate::numeric::{format_fixed, format_number, parse_display};
use serde::Serialize;
use std::collections::VecDeque;
use tracing::{debug, warn};

const INITIAL_DISPLAY: &str = "0";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operator {
    pub const ALL: [Operator; 4] = [
        Operator::Add,
        Operator::Subtract,
        Operator::Multiply,
        Operator::Divide,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Multiply => "×",
            Operator::Divide => "÷",
        }
    }

    /// `left op right`, IEEE semantics throughout.
    pub fn apply(self, left: f64, right: f64) -> f64 {
        match self {
            Operator::Add => left + right,
            Operator::Subtract => left - right,
            Operator::Multiply => left * right,
            Operator::Divide => left / right,
        }
    }
}

/// Registers that can wait for a value from ENTER. `pv` is solved, never captured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureTarget {
    N,
    I,
    Pmt,
    Fv,
}

impl CaptureTarget {
    pub fn from_register(register: Register) -> Option<Self> {
        match register {
            Register::N => Some(CaptureTarget::N),
            Register::I => Some(CaptureTarget::I),
            Register::Pmt => Some(CaptureTarget::Pmt),
            Register::Fv => Some(CaptureTarget::Fv),
            Register::Pv => None,
        }
    }

    pub fn register(self) -> Register {
        match self {
            CaptureTarget::N => Register::N,
            CaptureTarget::I => Register::I,
            CaptureTarget::Pmt => Register::Pmt,
            CaptureTarget::Fv => Register::Fv,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum InputMode {
    #[default]
    Idle,
    Awaiting(CaptureTarget),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Calculator {
    display: String,
    /// Most recently pushed first.
    #[serde(serialize_with = "crate::numeric::serialize_numbers")]
    stack: VecDeque<f64>,
    registers: Registers,
    input_mode: InputMode,
}

impl Default for Calculator {
    fn default() -> Self {
        Self {
            display: INITIAL_DISPLAY.to_string(),
            stack: VecDeque::new(),
            registers: Registers::default(),
            input_mode: InputMode::Idle,
        }
    }
}

impl Calculator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from a given register set, everything else at defaults.
    pub fn with_registers(registers: Registers) -> Self {
        Self {
            registers,
            ..Self::default()
        }
    }

    pub fn display(&self) -> &str {
        &self.display
    }

    pub fn stack(&self) -> &VecDeque<f64> {
        &self.stack
    }

    pub fn registers(&self) -> &Registers {
        &self.registers
    }

    pub fn input_mode(&self) -> InputMode {
        self.input_mode
    }

    /// Dispatch one key press.
    pub fn press(&mut self, key: Key) {
        debug!(key = key.label(), display = %self.display, "key pressed");
        match key {
            Key::Digit(d) => {
                if let Some(c) = char::from_digit(u32::from(d), 10) {
                    self.enter_digit(c);
                }
            }
            Key::Decimal => self.enter_digit('.'),
            Key::Enter => self.commit(),
            Key::Operator(op) => self.apply_operator(op),
            Key::Financial(register) => self.select_financial_key(register),
            Key::Unwired(_) => {}
        }
    }

    /// Append a digit or `.`; a lone `"0"` is replaced instead.
    ///
    /// Repeated decimal points are accepted as typed. Parsing stops at the
    /// second one, so `1.2.3` evaluates as `1.2`.
    pub fn enter_digit(&mut self, digit: char) {
        if self.display == INITIAL_DISPLAY {
            self.display.clear();
        }
        self.display.push(digit);
    }

    /// ENTER: push the display, fill any awaiting register, reset the display.
    pub fn commit(&mut self) {
        let value = parse_display(&self.display);
        self.stack.push_front(value);
        if let InputMode::Awaiting(target) = self.input_mode {
            self.capture(target, value);
            self.input_mode = InputMode::Idle;
        }
        self.reset_display();
    }

    /// Combine the stack top (left) with the display (right) and pop once.
    ///
    /// An empty stack reads as zero. A NaN top reads as zero too.
    pub fn apply_operator(&mut self, op: Operator) {
        let right = parse_display(&self.display);
        let left = match self.stack.front() {
            Some(&top) if !top.is_nan() => top,
            _ => 0.0,
        };
        let result = op.apply(left, right);
        self.stack.pop_front();
        self.display = format_number(result);
        debug!(op = op.symbol(), left, right, result, "applied operator");
    }

    /// `n`, `i`, `PMT`, `FV` store the display and wait for ENTER; `PV` solves.
    ///
    /// A register selected and then confirmed with ENTER is written twice:
    /// once here with the current display, again by [`commit`](Self::commit)
    /// with whatever was typed since. If ENTER never comes the first value
    /// stays. Selecting another register first retargets the capture.
    pub fn select_financial_key(&mut self, register: Register) {
        let Some(target) = CaptureTarget::from_register(register) else {
            // Failure already shows on the display.
            let _ = self.compute_pv();
            return;
        };
        let value = parse_display(&self.display);
        self.capture(target, value);
        self.input_mode = InputMode::Awaiting(target);
        self.reset_display();
    }

    /// Solve for present value and show it to two decimals.
    ///
    /// On success the unrounded value is stored in `pv`. On failure the
    /// error message replaces the display and no register changes.
    pub fn compute_pv(&mut self) -> Result<f64, PvError> {
        match finance::present_value(&self.registers) {
            Ok(pv) => {
                self.display = format_fixed(pv, PV_DECIMALS);
                self.registers.pv = pv;
                Ok(pv)
            }
            Err(err) => {
                warn!(error = %err, "present value failed");
                self.display = err.to_string();
                Err(err)
            }
        }
    }

    fn capture(&mut self, target: CaptureTarget, value: f64) {
        self.registers.set(target.register(), value);
    }

    fn reset_display(&mut self) {
        self.display.clear();
        self.display.push_str(INITIAL_DISPLAY);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::UnwiredKey;
    use std::io;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::MakeWriter;

    fn type_digits(calc: &mut Calculator, digits: &str) {
        for c in digits.chars() {
            calc.enter_digit(c);
        }
    }

    #[test]
    fn test_initial_state() {
        let calc = Calculator::new();
        assert_eq!(calc.display(), "0");
        assert!(calc.stack().is_empty());
        assert_eq!(*calc.registers(), Registers::default());
        assert_eq!(calc.input_mode(), InputMode::Idle);
    }

    #[test]
    fn test_digit_entry_replaces_lone_zero() {
        let mut calc = Calculator::new();
        calc.enter_digit('0');
        assert_eq!(calc.display(), "0");
        calc.enter_digit('4');
        assert_eq!(calc.display(), "4");
        calc.enter_digit('0');
        calc.enter_digit('.');
        calc.enter_digit('5');
        assert_eq!(calc.display(), "40.5");
    }

    #[test]
    fn test_leading_decimal_replaces_zero() {
        let mut calc = Calculator::new();
        calc.enter_digit('.');
        assert_eq!(calc.display(), ".");
    }

    #[test]
    fn test_multiple_decimal_points_are_kept() {
        let mut calc = Calculator::new();
        type_digits(&mut calc, "1.2.3");
        assert_eq!(calc.display(), "1.2.3");
        calc.commit();
        assert_eq!(calc.stack().front(), Some(&1.2));
    }

    #[test]
    fn test_commit_pushes_front_and_resets() {
        let mut calc = Calculator::new();
        type_digits(&mut calc, "7");
        calc.commit();
        type_digits(&mut calc, "8");
        calc.commit();
        assert_eq!(calc.display(), "0");
        assert_eq!(calc.stack().iter().copied().collect::<Vec<_>>(), vec![8.0, 7.0]);
    }

    #[test]
    fn test_operator_uses_stack_top_as_left() {
        let mut calc = Calculator::new();
        type_digits(&mut calc, "10");
        calc.commit();
        type_digits(&mut calc, "4");
        calc.apply_operator(Operator::Subtract);
        assert_eq!(calc.display(), "6");
        assert!(calc.stack().is_empty());

        let mut calc = Calculator::new();
        type_digits(&mut calc, "12");
        calc.commit();
        type_digits(&mut calc, "4");
        calc.apply_operator(Operator::Divide);
        assert_eq!(calc.display(), "3");
    }

    #[test]
    fn test_operator_on_empty_stack_reads_zero() {
        let mut calc = Calculator::new();
        type_digits(&mut calc, "5");
        calc.apply_operator(Operator::Subtract);
        assert_eq!(calc.display(), "-5");
        assert!(calc.stack().is_empty());
    }

    #[test]
    fn test_commit_then_operator_uses_zero_right() {
        for (op, expected) in [
            (Operator::Add, "9"),
            (Operator::Subtract, "9"),
            (Operator::Multiply, "0"),
            (Operator::Divide, "Infinity"),
        ] {
            let mut calc = Calculator::new();
            type_digits(&mut calc, "9");
            calc.commit();
            calc.apply_operator(op);
            assert_eq!(calc.display(), expected, "{}", op.symbol());
        }
    }

    #[test]
    fn test_nan_top_reads_zero() {
        let mut calc = Calculator::new();
        calc.enter_digit('.');
        calc.commit();
        assert!(calc.stack()[0].is_nan());
        type_digits(&mut calc, "3");
        calc.apply_operator(Operator::Add);
        assert_eq!(calc.display(), "3");
    }

    #[test]
    fn test_operator_pops_only_one() {
        let mut calc = Calculator::new();
        for d in ["1", "2", "3"] {
            type_digits(&mut calc, d);
            calc.commit();
        }
        type_digits(&mut calc, "1");
        calc.apply_operator(Operator::Multiply);
        assert_eq!(calc.display(), "3");
        assert_eq!(calc.stack().iter().copied().collect::<Vec<_>>(), vec![2.0, 1.0]);
    }

    #[test]
    fn test_capture_writes_immediately_and_on_enter() {
        let mut calc = Calculator::new();
        type_digits(&mut calc, "5");
        calc.select_financial_key(Register::N);
        assert_eq!(calc.registers().n, 5.0);
        assert_eq!(calc.display(), "0");
        assert_eq!(calc.input_mode(), InputMode::Awaiting(CaptureTarget::N));

        type_digits(&mut calc, "360");
        calc.commit();
        assert_eq!(calc.registers().n, 360.0);
        assert_eq!(calc.input_mode(), InputMode::Idle);
        assert_eq!(calc.stack().front(), Some(&360.0));
    }

    #[test]
    fn test_capture_without_enter_keeps_first_value() {
        let mut calc = Calculator::new();
        type_digits(&mut calc, "6.5");
        calc.select_financial_key(Register::I);
        type_digits(&mut calc, "9");
        assert_eq!(calc.registers().i, 6.5);
    }

    #[test]
    fn test_bare_enter_after_capture_stores_zero() {
        let mut calc = Calculator::new();
        type_digits(&mut calc, "250");
        calc.select_financial_key(Register::Pmt);
        calc.commit();
        assert_eq!(calc.registers().pmt, 0.0);
    }

    #[test]
    fn test_selecting_another_register_retargets() {
        let mut calc = Calculator::new();
        type_digits(&mut calc, "12");
        calc.select_financial_key(Register::N);
        type_digits(&mut calc, "1000");
        calc.select_financial_key(Register::Fv);
        assert_eq!(calc.registers().n, 12.0);
        assert_eq!(calc.registers().fv, 1000.0);
        assert_eq!(calc.input_mode(), InputMode::Awaiting(CaptureTarget::Fv));

        type_digits(&mut calc, "2000");
        calc.commit();
        assert_eq!(calc.registers().n, 12.0);
        assert_eq!(calc.registers().fv, 2000.0);
    }

    #[test]
    fn test_pv_key_solves_instead_of_capturing() {
        let mut calc = Calculator::with_registers(Registers {
            n: 12.0,
            pmt: -100.0,
            ..Default::default()
        });
        type_digits(&mut calc, "77");
        calc.select_financial_key(Register::Pv);
        assert_eq!(calc.display(), "1200.00");
        assert_eq!(calc.registers().pv, 1200.0);
        assert_eq!(calc.input_mode(), InputMode::Idle);
        assert!(calc.stack().is_empty());
    }

    #[test]
    fn test_pv_failure_shows_message_and_keeps_registers() {
        let mut calc = Calculator::new();
        calc.enter_digit('.');
        calc.select_financial_key(Register::Fv);
        let before = *calc.registers();
        assert!(before.fv.is_nan());

        let result = calc.compute_pv();
        assert!(result.is_err());
        assert_eq!(calc.display(), "Error: fv is not a number");
        assert_eq!(calc.registers().pv, 0.0);
        assert!(calc.registers().fv.is_nan());
    }

    #[test]
    fn test_typing_after_pv_failure_appends() {
        let mut calc = Calculator::new();
        calc.enter_digit('.');
        calc.select_financial_key(Register::N);
        let _ = calc.compute_pv();
        calc.enter_digit('1');
        assert_eq!(calc.display(), "Error: n is not a number1");
    }

    #[test]
    fn test_unwired_keys_change_nothing() {
        let mut calc = Calculator::new();
        type_digits(&mut calc, "42");
        calc.commit();
        type_digits(&mut calc, "7");
        calc.select_financial_key(Register::N);
        type_digits(&mut calc, "3");
        let before = calc.clone();

        for key in UnwiredKey::ALL {
            calc.press(Key::Unwired(key));
        }
        assert_eq!(calc, before);
    }

    #[test]
    fn test_press_dispatch() {
        let mut calc = Calculator::new();
        for key in [
            Key::Digit(2),
            Key::Decimal,
            Key::Digit(5),
            Key::Enter,
            Key::Digit(4),
            Key::Operator(Operator::Multiply),
        ] {
            calc.press(key);
        }
        assert_eq!(calc.display(), "10");
    }

    #[test]
    fn test_out_of_range_digit_is_ignored() {
        let mut calc = Calculator::new();
        calc.press(Key::Digit(4));
        let before = calc.clone();
        calc.press(Key::Digit(12));
        assert_eq!(calc, before);
    }

    /// Collects formatted log output in memory.
    #[derive(Clone, Default)]
    struct CapturedLog(Arc<Mutex<Vec<u8>>>);

    impl io::Write for CapturedLog {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLog {
        type Writer = CapturedLog;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn test_each_press_logs_a_debug_event() {
        let log = CapturedLog::default();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(log.clone())
            .finish();

        let mut calc = Calculator::new();
        tracing::subscriber::with_default(subscriber, || {
            calc.press(Key::Digit(7));
            calc.press(Key::Unwired(UnwiredKey::Store));
        });

        let output = String::from_utf8(log.0.lock().unwrap().clone()).unwrap();
        assert_eq!(output.matches("key pressed").count(), 2, "{output}");
        assert!(output.contains("DEBUG"), "{output}");
        assert!(output.contains("STO"), "{output}");
    }
}
