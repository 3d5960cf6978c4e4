//! Physical keypad: a 5 x 10 grid of keys, matching the calculator face.

use crate::calculator::Operator;
use crate::finance::Register;
use crate::keys::{Key, UnwiredKey};
use ratatui::layout::{Constraint, Direction, Layout, Rect};

pub const COLUMNS: u16 = 10;
pub const ROWS: usize = 5;

/// Face colour class of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyFace {
    Plain,
    /// `n`, `i`
    Orange,
    /// `PV`, `PMT`, `FV`
    Blue,
    /// `f` shift
    Gold,
    /// `g` shift
    Teal,
}

/// One grid position. `key` is `None` for the blank area under ENTER's row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub key: Option<Key>,
    pub span: u16,
}

impl Slot {
    const fn key(key: Key) -> Self {
        Self {
            key: Some(key),
            span: 1,
        }
    }

    const fn wide(key: Key, span: u16) -> Self {
        Self {
            key: Some(key),
            span,
        }
    }

    const fn gap(span: u16) -> Self {
        Self { key: None, span }
    }
}

const fn unwired(key: UnwiredKey) -> Slot {
    Slot::key(Key::Unwired(key))
}

const fn digit(d: u8) -> Slot {
    Slot::key(Key::Digit(d))
}

const fn op(op: Operator) -> Slot {
    Slot::key(Key::Operator(op))
}

const fn fin(register: Register) -> Slot {
    Slot::key(Key::Financial(register))
}

pub const LAYOUT: [&[Slot]; ROWS] = [
    &[
        fin(Register::N),
        fin(Register::I),
        fin(Register::Pv),
        fin(Register::Pmt),
        fin(Register::Fv),
        unwired(UnwiredKey::ChangeSign),
        digit(7),
        digit(8),
        digit(9),
        op(Operator::Divide),
    ],
    &[
        unwired(UnwiredKey::Power),
        unwired(UnwiredKey::Reciprocal),
        unwired(UnwiredKey::PercentTotal),
        unwired(UnwiredKey::DeltaPercent),
        unwired(UnwiredKey::Percent),
        unwired(UnwiredKey::Exponent),
        digit(4),
        digit(5),
        digit(6),
        op(Operator::Multiply),
    ],
    &[
        unwired(UnwiredKey::Price),
        unwired(UnwiredKey::Ytm),
        unwired(UnwiredKey::StraightLine),
        unwired(UnwiredKey::Depreciation),
        unwired(UnwiredKey::DecliningBalance),
        unwired(UnwiredKey::RollDown),
        digit(1),
        digit(2),
        digit(3),
        op(Operator::Subtract),
    ],
    &[
        unwired(UnwiredKey::ProgramRun),
        unwired(UnwiredKey::SigmaPlus),
        unwired(UnwiredKey::Program),
        unwired(UnwiredKey::Swap),
        unwired(UnwiredKey::ClearX),
        Slot::wide(Key::Enter, 3),
        digit(0),
        op(Operator::Add),
    ],
    &[
        unwired(UnwiredKey::On),
        unwired(UnwiredKey::F),
        unwired(UnwiredKey::G),
        unwired(UnwiredKey::Store),
        unwired(UnwiredKey::Recall),
        Slot::gap(3),
        Slot::key(Key::Decimal),
        unwired(UnwiredKey::SigmaMinus),
    ],
];

pub fn face(key: Key) -> KeyFace {
    match key {
        Key::Financial(Register::N | Register::I) => KeyFace::Orange,
        Key::Financial(_) => KeyFace::Blue,
        Key::Unwired(UnwiredKey::F) => KeyFace::Gold,
        Key::Unwired(UnwiredKey::G) => KeyFace::Teal,
        _ => KeyFace::Plain,
    }
}

/// Every key on the face, row by row.
pub fn keys() -> impl Iterator<Item = Key> {
    LAYOUT
        .into_iter()
        .flat_map(|row| row.iter().filter_map(|slot| slot.key))
}

/// Screen rectangle of every key when the keypad fills `area`.
pub fn key_areas(area: Rect) -> Vec<(Key, Rect)> {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Ratio(1, ROWS as u32); ROWS])
        .split(area);

    let mut areas = Vec::new();
    for (row_slots, row_area) in LAYOUT.iter().zip(rows.iter()) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, COLUMNS as u32); COLUMNS as usize])
            .split(*row_area);

        let mut column = 0usize;
        for slot in row_slots.iter() {
            let first = columns[column];
            let last = columns[column + slot.span as usize - 1];
            if let Some(key) = slot.key {
                areas.push((key, first.union(last)));
            }
            column += slot.span as usize;
        }
    }
    areas
}

/// Key under terminal cell (`column`, `row`), if any.
pub fn hit_test(area: Rect, column: u16, row: u16) -> Option<Key> {
    key_areas(area)
        .into_iter()
        .find(|(_, rect)| {
            column >= rect.x
                && column < rect.x + rect.width
                && row >= rect.y
                && row < rect.y + rect.height
        })
        .map(|(key, _)| key)
}
