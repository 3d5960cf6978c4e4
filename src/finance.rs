//! Time-value-of-money registers and the present-value solver.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Payments per year. Rates are entered as an annual percentage and the
/// solver compounds monthly.
pub const PERIODS_PER_YEAR: f64 = 12.0;

/// Decimal places shown for a solved present value.
pub const PV_DECIMALS: usize = 2;

/// One of the five financial registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Register {
    N,
    I,
    Pv,
    Pmt,
    Fv,
}

impl Register {
    pub const ALL: [Register; 5] = [
        Register::N,
        Register::I,
        Register::Pv,
        Register::Pmt,
        Register::Fv,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Register::N => "n",
            Register::I => "i",
            Register::Pv => "pv",
            Register::Pmt => "pmt",
            Register::Fv => "fv",
        }
    }

    /// Longer description for the register panel.
    pub fn description(self) -> &'static str {
        match self {
            Register::N => "periods",
            Register::I => "rate %/yr",
            Register::Pv => "present value",
            Register::Pmt => "payment",
            Register::Fv => "future value",
        }
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Registers {
    /// Number of periods
    #[serde(serialize_with = "crate::numeric::serialize_number")]
    pub n: f64,
    /// Interest rate, percent per annum
    #[serde(serialize_with = "crate::numeric::serialize_number")]
    pub i: f64,
    /// Present value
    #[serde(serialize_with = "crate::numeric::serialize_number")]
    pub pv: f64,
    /// Payment per period
    #[serde(serialize_with = "crate::numeric::serialize_number")]
    pub pmt: f64,
    /// Future value
    #[serde(serialize_with = "crate::numeric::serialize_number")]
    pub fv: f64,
}

impl Registers {
    pub fn get(&self, register: Register) -> f64 {
        match register {
            Register::N => self.n,
            Register::I => self.i,
            Register::Pv => self.pv,
            Register::Pmt => self.pmt,
            Register::Fv => self.fv,
        }
    }

    pub fn set(&mut self, register: Register, value: f64) {
        let slot = match register {
            Register::N => &mut self.n,
            Register::I => &mut self.i,
            Register::Pv => &mut self.pv,
            Register::Pmt => &mut self.pmt,
            Register::Fv => &mut self.fv,
        };
        *slot = value;
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PvError {
    #[error("Error: {register} is not a number")]
    NotANumber { register: Register },
}

/// Solve for present value from `n`, `i`, `pmt` and `fv`.
///
/// Uses the ordinary annuity formula at a monthly rate of `i / 100 / 12`,
/// negated so that PV carries the opposite sign to the payments and future
/// value it balances. A zero rate degrades to `-fv - pmt * n`.
///
/// The stored `pv` is not an input and is ignored.
pub fn present_value(registers: &Registers) -> Result<f64, PvError> {
    for register in [Register::N, Register::I, Register::Pmt, Register::Fv] {
        if registers.get(register).is_nan() {
            return Err(PvError::NotANumber { register });
        }
    }

    let Registers { n, i, pmt, fv, .. } = *registers;
    let monthly_rate = i / 100.0 / PERIODS_PER_YEAR;

    if monthly_rate == 0.0 {
        return Ok(-fv - pmt * n);
    }

    let growth = 1.0 + monthly_rate;
    let pv_of_fv = fv / growth.powf(n);
    let pv_of_pmt = pmt * ((1.0 - growth.powf(-n)) / monthly_rate);
    Ok(-(pv_of_fv + pv_of_pmt))
}
