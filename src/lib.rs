// SPDX: CC0-1.0

pub mod config;
pub mod controller;
pub mod curve;
pub mod eval;
pub mod lex;
pub mod logging;
pub mod parse;
pub mod render;
pub mod shell;
pub mod stdlib;
pub mod svg;
pub mod table;
pub mod viewport;

pub type Number = f64;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point<T> {
    pub x: T,
    pub y: T,
}
