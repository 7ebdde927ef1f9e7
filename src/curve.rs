// SPDX: CC0-1.0

//! Compiling a user expression into a plottable curve.

use crate::{
    eval::{self, EvalErr, Expr, Idents, With},
    lex::{Lexer, SubStr},
    parse::{self, ParseErr},
    stdlib::{self, X},
    Number,
};
use core::fmt;
use std::sync::Arc;

/// Coefficients `a` to `e` available to every expression.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Coefficients {
    pub a: Number,
    pub b: Number,
    pub c: Number,
    pub d: Number,
    pub e: Number,
}

impl Coefficients {
    pub const fn values(&self) -> [Number; 5] {
        [self.a, self.b, self.c, self.d, self.e]
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Number> {
        match name {
            "a" => Some(&mut self.a),
            "b" => Some(&mut self.b),
            "c" => Some(&mut self.c),
            "d" => Some(&mut self.d),
            "e" => Some(&mut self.e),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub enum CompileErr {
    Parse(ParseErr),
    Eval(EvalErr),
}

impl CompileErr {
    pub fn loc(&self) -> &SubStr {
        match self {
            Self::Parse(err) => &err.loc,
            Self::Eval(err) => &err.loc,
        }
    }

    /// Closest known identifier to an unknown one, with its kind.
    pub fn suggestion(&self, idents: &Idents) -> Option<(String, &'static str)> {
        let Self::Eval(err) = self else {
            return None;
        };
        let unknown = err.ident()?;
        idents
            .iter()
            .map(|(k, v)| {
                (
                    strsim::normalized_damerau_levenshtein(
                        &unknown.to_ascii_lowercase(),
                        &k.get().to_ascii_lowercase(),
                    ),
                    (k, v),
                )
            })
            .filter(|(_, (k, _))| k.get() != unknown)
            .reduce(|(acc_sim, acc_kv), (elem_sim, elem_kv)| {
                if elem_sim > acc_sim {
                    (elem_sim, elem_kv)
                } else {
                    (acc_sim, acc_kv)
                }
            })
            .filter(|(sim, _)| *sim > 0.3)
            .map(|(_, (k, v))| (k.get().to_string(), v.kind()))
    }
}

impl fmt::Display for CompileErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(err) => write!(f, "parse error: {err}"),
            Self::Eval(err) => write!(f, "evaluation error: {err}"),
        }
    }
}

impl std::error::Error for CompileErr {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Parse(err) => Some(err),
            Self::Eval(err) => Some(err),
        }
    }
}

impl From<ParseErr> for CompileErr {
    fn from(err: ParseErr) -> Self {
        Self::Parse(err)
    }
}

impl From<EvalErr> for CompileErr {
    fn from(err: EvalErr) -> Self {
        Self::Eval(err)
    }
}

/// A compiled `y = f(x)` with its coefficients bound.
#[derive(Debug)]
pub struct Curve {
    text: Arc<String>,
    expr: Expr,
    idents: Idents,
}

impl Curve {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    pub fn try_eval(&self, x: Number) -> Result<Number, EvalErr> {
        eval::eval(
            &self.expr,
            &With {
                outer: &self.idents,
                name: X,
                val: x,
            },
        )
    }

    /// Value at `x`; NaN where the expression is undefined.
    pub fn eval(&self, x: Number) -> Number {
        self.try_eval(x).unwrap_or(Number::NAN)
    }
}

/// Parses `text` and binds `coefficients`, then evaluates once at `x = 0`.
///
/// A NaN at zero is accepted; only evaluation errors reject the expression.
pub fn compile_expression(text: &str, coefficients: &Coefficients) -> Result<Curve, CompileErr> {
    let text = Arc::new(text.to_string());
    let expr = parse::parse(Lexer::new(&text))?;
    let curve = Curve {
        idents: stdlib::standard_idents(coefficients),
        text,
        expr,
    };
    let at_zero = curve.try_eval(0.0)?;
    tracing::debug!(expr = %curve.text, at_zero, "compiled expression");
    Ok(curve)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quadratic() -> Coefficients {
        Coefficients {
            a: 1.0,
            ..Default::default()
        }
    }

    #[test]
    fn evaluates_quadratic_at_three() {
        let curve = compile_expression("a*x^2+b*x+c", &quadratic()).unwrap();
        assert_eq!(curve.eval(3.0), 9.0);
    }

    #[test]
    fn undefined_at_zero_still_compiles() {
        let curve = compile_expression("sqrt(x - 5)", &quadratic()).unwrap();
        assert!(curve.eval(0.0).is_nan());
        assert_eq!(curve.eval(9.0), 2.0);
    }

    #[test]
    fn unknown_identifier_is_rejected_with_hint() {
        let err = compile_expression("sinn(x)", &quadratic()).unwrap_err();
        assert!(matches!(err, CompileErr::Eval(_)));
        assert_eq!(err.loc().get(), "sinn");
        let idents = stdlib::standard_idents(&quadratic());
        let (name, kind) = err.suggestion(&idents).unwrap();
        assert_eq!(name, "sin");
        assert_eq!(kind, "function");
    }

    #[test]
    fn wrong_arity_is_rejected() {
        let err = compile_expression("sin(x, 2)", &quadratic()).unwrap_err();
        assert!(err.to_string().contains("requires 1 argument"));
    }

    #[test]
    fn parse_errors_are_compile_errors() {
        let err = compile_expression("x = 2", &quadratic()).unwrap_err();
        assert!(matches!(err, CompileErr::Parse(_)));
        assert_eq!(err.loc().get(), "=");
    }
}
