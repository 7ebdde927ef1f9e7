// SPDX: CC0-1.0

use crate::{curve::Coefficients, eval::*, Number};
use core::f64::consts;
use std::collections::HashMap; // assumes Number = f64

pub const X: &str = "x";

pub const COEFFICIENTS: [&str; 5] = ["a", "b", "c", "d", "e"];

/// Whitelisted functions and constants, plus the coefficients bound as
/// constants. `x` is declared without a value.
pub fn standard_idents(coefficients: &Coefficients) -> Idents {
    let mut ret = HashMap::new();

    ret.insert("abs".into(), Ident::Fun(Fun::new(1, abs)));
    ret.insert("sqrt".into(), Ident::Fun(Fun::new(1, sqrt)));
    ret.insert("log".into(), Ident::Fun(Fun::new(1, log)));

    // trig
    ret.insert("sin".into(), Ident::Fun(Fun::new(1, sin)));
    ret.insert("cos".into(), Ident::Fun(Fun::new(1, cos)));
    ret.insert("tan".into(), Ident::Fun(Fun::new(1, tan)));

    ret.insert("PI".into(), Ident::Const(consts::PI));
    ret.insert("E".into(), Ident::Const(consts::E));

    for (name, val) in COEFFICIENTS.into_iter().zip(coefficients.values()) {
        ret.insert(name.into(), Ident::Const(val));
    }

    ret.insert(X.into(), Ident::Var(None));
    ret
}

#[track_caller]
fn expect_n<const N: usize>(args: &[Number]) -> [Number; N] {
    assert_eq!(args.len(), N);
    let mut ret = [Number::NAN; N];
    ret.copy_from_slice(args);
    ret
}

pub fn neg(args: &[Number]) -> Number {
    let [x] = expect_n::<1>(args);
    -x
}

pub fn add(args: &[Number]) -> Number {
    let [x, y] = expect_n::<2>(args);
    x + y
}

pub fn sub(args: &[Number]) -> Number {
    let [x, y] = expect_n::<2>(args);
    x - y
}

pub fn mul(args: &[Number]) -> Number {
    let [x, y] = expect_n::<2>(args);
    x * y
}

pub fn div(args: &[Number]) -> Number {
    let [x, y] = expect_n::<2>(args);
    x / y
}

pub fn pow(args: &[Number]) -> Number {
    let [x, exp] = expect_n::<2>(args);
    x.powf(exp)
}

pub fn abs(args: &[Number]) -> Number {
    let [x] = expect_n::<1>(args);
    x.abs()
}

pub fn sqrt(args: &[Number]) -> Number {
    let [x] = expect_n::<1>(args);
    x.sqrt()
}

/// Natural logarithm.
pub fn log(args: &[Number]) -> Number {
    let [x] = expect_n::<1>(args);
    x.ln()
}

pub fn sin(args: &[Number]) -> Number {
    let [x] = expect_n::<1>(args);
    x.sin()
}

pub fn cos(args: &[Number]) -> Number {
    let [x] = expect_n::<1>(args);
    x.cos()
}

pub fn tan(args: &[Number]) -> Number {
    let [x] = expect_n::<1>(args);
    x.tan()
}
