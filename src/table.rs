// SPDX: CC0-1.0

//! Value table the user fills in by hand.

use crate::Number;
use core::{fmt, ops::Range};

/// Largest difference from the true value still counted as correct.
pub const TOLERANCE: Number = 0.05;

/// Roughly this many intervals span the window.
const TABLE_INTERVALS: Number = 8.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Correct,
    Incorrect,
    /// Nothing numeric was entered; no styling applies.
    Indeterminate,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Correct => f.write_str("correct"),
            Self::Incorrect => f.write_str("incorrect"),
            Self::Indeterminate => f.write_str("-"),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TableRow {
    pub x: Number,
    value: Number,
    pub entered: String,
    pub verdict: Verdict,
}

impl TableRow {
    pub fn new(x: Number, value: Number) -> Self {
        Self {
            x,
            value,
            entered: String::new(),
            verdict: Verdict::Indeterminate,
        }
    }

    /// Rows where the curve is undefined take no input.
    pub fn is_disabled(&self) -> bool {
        !self.value.is_finite()
    }

    /// The hidden comparison target.
    pub fn true_value(&self) -> Option<Number> {
        (!self.is_disabled()).then_some(self.value)
    }
}

/// Distance between consecutive table `x` values.
pub fn table_step(x: &Range<Number>) -> Number {
    ((x.end - x.start) / TABLE_INTERVALS).round().max(1.0)
}

/// One row per step from `ceil(x.start)` up to and including `x.end`.
pub fn generate_table<F>(x: &Range<Number>, mut f: F) -> Vec<TableRow>
where
    F: FnMut(Number) -> Number,
{
    let step = table_step(x);
    let start = x.start.ceil();
    let mut rows = Vec::new();
    if !(start.is_finite() && x.end.is_finite()) {
        return rows;
    }
    for i in 0u32.. {
        let at = start + Number::from(i) * step;
        if at > x.end {
            break;
        }
        rows.push(TableRow::new(at, f(at)));
    }
    rows
}

pub fn validate_entry(entered: &str, true_value: Number) -> Verdict {
    let Ok(entered) = entered.trim().parse::<Number>() else {
        return Verdict::Indeterminate;
    };
    if !entered.is_finite() || !true_value.is_finite() {
        return Verdict::Indeterminate;
    }
    if (entered - true_value).abs() < TOLERANCE {
        Verdict::Correct
    } else {
        Verdict::Incorrect
    }
}
