// SPDX: CC0-1.0

use crate::{curve::Coefficients, Number};
use core::ops::Range;

/// Initial state of a plotting session.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    pub width: u32,
    pub height: u32,
    pub x: Range<Number>,
    pub y: Range<Number>,
    pub coefficients: Coefficients,
    pub expr: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            x: -10.0..10.0,
            y: -10.0..10.0,
            coefficients: Coefficients {
                a: 1.0,
                ..Coefficients::default()
            },
            expr: String::from("a*x^2+b*x+c"),
        }
    }
}
