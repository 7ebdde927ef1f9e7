// SPDX: CC0-1.0

// shunting yard algorithm by dijkstra (see https://en.wikipedia.org/wiki/Shunting_yard_algorithm),
// emitting tree nodes instead of postfix operations

use crate::{
    eval::{Associativity, Expr, ExprTyp, OperatorTyp},
    lex::{LexErr, LexErrTyp, Lexer, SubStr, TokTyp},
    Number,
};
use core::{fmt, num::ParseFloatError};
use std::sync::Arc;

#[derive(Clone, Debug, PartialEq)]
pub enum ParseErrTyp {
    LexErr(LexErrTyp),
    ParseNum(ParseFloatError),
    ParenMismatch,
    MissingOperand,
    UnexpectedTok,
    Empty,
    TooDeep,
}

impl fmt::Display for ParseErrTyp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LexErr(err) => write!(f, "{err}"),
            Self::ParseNum(err) => write!(f, "invalid number: {err}"),
            Self::ParenMismatch => write!(f, "mismatched parentheses"),
            Self::MissingOperand => write!(f, "expected a value"),
            Self::UnexpectedTok => write!(f, "unexpected token"),
            Self::Empty => write!(f, "expression is empty"),
            Self::TooDeep => write!(f, "expression nests deeper than {MAX_DEPTH} levels"),
        }
    }
}

/// Deepest tree the parser builds. Evaluation recurses once per level.
pub const MAX_DEPTH: usize = 200;

#[derive(Clone, Debug, PartialEq)]
pub struct ParseErr {
    pub typ: ParseErrTyp,
    pub loc: SubStr,
}

impl fmt::Display for ParseErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.typ)
    }
}

impl std::error::Error for ParseErr {}

impl From<LexErr> for ParseErr {
    fn from(err: LexErr) -> Self {
        Self {
            typ: ParseErrTyp::LexErr(err.typ),
            loc: err.loc,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum ShuntOpTyp {
    Operator(OperatorTyp),
    /// Function call whose open paren has been consumed. `argc` counts the
    /// arguments completed so far.
    Call { argc: usize },
    OpenParen,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct ShuntOp {
    typ: ShuntOpTyp,
    loc: SubStr,
}

fn err<T>(typ: ParseErrTyp, loc: &SubStr) -> Result<T, ParseErr> {
    Err(ParseErr {
        typ,
        loc: loc.clone(),
    })
}

/// Finished subtree on the output stack.
#[derive(Debug)]
struct Operand {
    expr: Expr,
    depth: usize,
}

/// Pushes `expr`, refusing trees deeper than [`MAX_DEPTH`]. `at` locates
/// the error.
fn push(out: &mut Vec<Operand>, expr: Expr, depth: usize, at: &SubStr) -> Result<(), ParseErr> {
    if depth > MAX_DEPTH {
        return err(ParseErrTyp::TooDeep, at);
    }
    out.push(Operand { expr, depth });
    Ok(())
}

/// Pops the operands of `op` from `out` and pushes the combined node.
fn apply(out: &mut Vec<Operand>, op: OperatorTyp, loc: SubStr) -> Result<(), ParseErr> {
    let (node, depth) = if op == OperatorTyp::Neg {
        let Some(arg) = out.pop() else {
            return err(ParseErrTyp::MissingOperand, &loc);
        };
        let node = Expr {
            loc: loc.join(&arg.expr.loc),
            typ: ExprTyp::Unary(op, Box::new(arg.expr)),
        };
        (node, arg.depth + 1)
    } else {
        let (Some(rhs), Some(lhs)) = (out.pop(), out.pop()) else {
            return err(ParseErrTyp::MissingOperand, &loc);
        };
        let node = Expr {
            loc: lhs.expr.loc.join(&rhs.expr.loc),
            typ: ExprTyp::Binary(op, Box::new(lhs.expr), Box::new(rhs.expr)),
        };
        (node, lhs.depth.max(rhs.depth) + 1)
    };
    push(out, node, depth, &loc)
}

/// Pops operators into `out` until a paren or call marker is on top.
fn unwind(out: &mut Vec<Operand>, ops: &mut Vec<ShuntOp>) -> Result<(), ParseErr> {
    while let Some(ShuntOp {
        typ: ShuntOpTyp::Operator(typ),
        ..
    }) = ops.last()
    {
        let typ = *typ;
        if let Some(op) = ops.pop() {
            apply(out, typ, op.loc)?;
        }
    }
    Ok(())
}

pub fn parse(lex: Lexer<'_>) -> Result<Expr, ParseErr> {
    let src: Arc<String> = Arc::clone(lex.src());
    let mut lex = lex.peekable();
    let mut out: Vec<Operand> = Vec::new(); // output
    let mut ops: Vec<ShuntOp> = Vec::new(); // operator stack
    let mut expect_operand = true;
    let mut last_loc: Option<SubStr> = None;

    while let Some(tok) = lex.next() {
        let tok = tok?;
        last_loc = Some(tok.loc.clone());
        match tok.typ {
            TokTyp::Number => {
                if !expect_operand {
                    return err(ParseErrTyp::UnexpectedTok, &tok.loc);
                }
                let num: Number = match tok.loc.get().parse() {
                    Ok(val) => val,
                    Err(e) => return err(ParseErrTyp::ParseNum(e), &tok.loc),
                };
                let at = tok.loc.clone();
                push(
                    &mut out,
                    Expr {
                        typ: ExprTyp::Val(num),
                        loc: tok.loc,
                    },
                    1,
                    &at,
                )?;
                expect_operand = false;
            }

            TokTyp::Ident => {
                if !expect_operand {
                    return err(ParseErrTyp::UnexpectedTok, &tok.loc);
                }
                let is_call = matches!(
                    lex.peek(),
                    Some(Ok(next)) if next.typ == TokTyp::OpenParen
                );
                if is_call {
                    // the paren belongs to the call
                    lex.next();
                    ops.push(ShuntOp {
                        typ: ShuntOpTyp::Call { argc: 0 },
                        loc: tok.loc,
                    });
                } else {
                    let at = tok.loc.clone();
                    push(
                        &mut out,
                        Expr {
                            typ: ExprTyp::Ident,
                            loc: tok.loc,
                        },
                        1,
                        &at,
                    )?;
                    expect_operand = false;
                }
            }

            TokTyp::Op(o1) if expect_operand => match o1 {
                OperatorTyp::Sub => ops.push(ShuntOp {
                    typ: ShuntOpTyp::Operator(OperatorTyp::Neg),
                    loc: tok.loc,
                }),
                // unary plus is a no-op
                OperatorTyp::Add => {}
                _ => return err(ParseErrTyp::MissingOperand, &tok.loc),
            },

            TokTyp::Op(o1) => {
                while let Some(ShuntOp {
                    typ: ShuntOpTyp::Operator(o2),
                    ..
                }) = ops.last()
                {
                    let o2 = *o2;
                    if (o2.precedence() > o1.precedence())
                        || ((o1.precedence() == o2.precedence())
                            && (o1.associativity() == Associativity::Left))
                    {
                        if let Some(op) = ops.pop() {
                            apply(&mut out, o2, op.loc)?;
                        }
                    } else {
                        break;
                    }
                }
                ops.push(ShuntOp {
                    typ: ShuntOpTyp::Operator(o1),
                    loc: tok.loc,
                });
                expect_operand = true;
            }

            TokTyp::OpenParen => {
                if !expect_operand {
                    return err(ParseErrTyp::UnexpectedTok, &tok.loc);
                }
                ops.push(ShuntOp {
                    typ: ShuntOpTyp::OpenParen,
                    loc: tok.loc,
                });
            }

            TokTyp::Comma => {
                if expect_operand {
                    return err(ParseErrTyp::MissingOperand, &tok.loc);
                }
                unwind(&mut out, &mut ops)?;
                match ops.last_mut() {
                    Some(ShuntOp {
                        typ: ShuntOpTyp::Call { argc },
                        ..
                    }) => *argc += 1,
                    _ => return err(ParseErrTyp::UnexpectedTok, &tok.loc),
                }
                expect_operand = true;
            }

            TokTyp::CloseParen => {
                let empty_call = expect_operand
                    && matches!(
                        ops.last(),
                        Some(ShuntOp {
                            typ: ShuntOpTyp::Call { argc: 0 },
                            ..
                        })
                    );
                if expect_operand && !empty_call {
                    return err(ParseErrTyp::MissingOperand, &tok.loc);
                }
                unwind(&mut out, &mut ops)?;

                match ops.pop() {
                    Some(ShuntOp {
                        typ: ShuntOpTyp::OpenParen,
                        ..
                    }) => {}

                    Some(ShuntOp {
                        typ: ShuntOpTyp::Call { argc },
                        loc: name,
                    }) => {
                        let argc = if empty_call { 0 } else { argc + 1 };
                        if out.len() < argc {
                            return err(ParseErrTyp::MissingOperand, &name);
                        }
                        let args = out.split_off(out.len() - argc);
                        let depth = args.iter().map(|arg| arg.depth).max().unwrap_or(0) + 1;
                        let args = args.into_iter().map(|arg| arg.expr).collect();
                        let at = name.clone();
                        push(
                            &mut out,
                            Expr {
                                loc: name.join(&tok.loc),
                                typ: ExprTyp::Call { name, args },
                            },
                            depth,
                            &at,
                        )?;
                    }

                    _ => return err(ParseErrTyp::ParenMismatch, &tok.loc),
                }
                expect_operand = false;
            }
        }
    }

    let Some(last_loc) = last_loc else {
        return err(ParseErrTyp::Empty, &SubStr::all(src));
    };
    if expect_operand {
        return err(ParseErrTyp::MissingOperand, &SubStr::end_of(src));
    }

    while let Some(op) = ops.pop() {
        match op.typ {
            ShuntOpTyp::Operator(typ) => apply(&mut out, typ, op.loc)?,
            ShuntOpTyp::OpenParen | ShuntOpTyp::Call { .. } => {
                return err(ParseErrTyp::ParenMismatch, &op.loc)
            }
        }
    }

    match (out.pop(), out.is_empty()) {
        (Some(Operand { expr, .. }), true) => Ok(expr),
        _ => err(ParseErrTyp::UnexpectedTok, &last_loc),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::{eval, Ident, Idents, With};
    use crate::stdlib::{standard_idents, X};

    fn parse_str(src: &str) -> Result<Expr, ParseErr> {
        let src = Arc::new(src.to_string());
        parse(Lexer::new(&src))
    }

    fn eval_at(src: &str, x: Number) -> Number {
        let expr = parse_str(src).unwrap();
        let mut idents: Idents = standard_idents(&Default::default());
        idents.insert("a".into(), Ident::Const(2.0));
        eval(
            &expr,
            &With {
                outer: &idents,
                name: X,
                val: x,
            },
        )
        .unwrap()
    }

    #[test]
    fn respects_precedence_and_associativity() {
        assert_eq!(eval_at("1 + 2 * 3", 0.0), 7.0);
        assert_eq!(eval_at("2 ^ 3 ^ 2", 0.0), 512.0);
        assert_eq!(eval_at("8 / 4 / 2", 0.0), 1.0);
        assert_eq!(eval_at("10 - 4 - 3", 0.0), 3.0);
        assert_eq!(eval_at("(1 + 2) * 3", 0.0), 9.0);
    }

    #[test]
    fn unary_minus_binds_looser_than_power() {
        assert_eq!(eval_at("-x^2", 3.0), -9.0);
        assert_eq!(eval_at("2^-x", 1.0), 0.5);
        assert_eq!(eval_at("-2*3", 0.0), -6.0);
        assert_eq!(eval_at("x - -x", 2.0), 4.0);
        assert_eq!(eval_at("+x", 2.0), 2.0);
    }

    #[test]
    fn calls_functions() {
        assert_eq!(eval_at("abs(-x)", 4.0), 4.0);
        assert_eq!(eval_at("sqrt(a*8)", 0.0), 4.0);
        assert!((eval_at("sin(PI/2) + cos(0)", 0.0) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn reports_mismatched_parens() {
        let e = parse_str("(x + 1").unwrap_err();
        assert_eq!(e.typ, ParseErrTyp::ParenMismatch);
        assert_eq!(e.loc.start(), 0);

        let e = parse_str("x + 1)").unwrap_err();
        assert_eq!(e.typ, ParseErrTyp::ParenMismatch);
        assert_eq!(e.loc.start(), 5);
    }

    #[test]
    fn reports_missing_operands() {
        assert_eq!(
            parse_str("x +").unwrap_err().typ,
            ParseErrTyp::MissingOperand
        );
        assert_eq!(
            parse_str("* x").unwrap_err().typ,
            ParseErrTyp::MissingOperand
        );
        assert_eq!(parse_str("   ").unwrap_err().typ, ParseErrTyp::Empty);
    }

    #[test]
    fn rejects_implicit_multiplication() {
        let e = parse_str("2x").unwrap_err();
        assert_eq!(e.typ, ParseErrTyp::UnexpectedTok);
        assert_eq!(e.loc.get(), "x");
    }

    #[test]
    fn limits_tree_depth() {
        let negs = format!("{}x", "-".repeat(20_000));
        assert_eq!(parse_str(&negs).unwrap_err().typ, ParseErrTyp::TooDeep);

        let sum = format!("x{}", "+x".repeat(MAX_DEPTH));
        let e = parse_str(&sum).unwrap_err();
        assert_eq!(e.typ, ParseErrTyp::TooDeep);
        assert_eq!(e.loc.get(), "+");

        let calls = format!("{}x{}", "abs(".repeat(MAX_DEPTH), ")".repeat(MAX_DEPTH));
        assert_eq!(parse_str(&calls).unwrap_err().typ, ParseErrTyp::TooDeep);

        // parens alone add no depth
        let parens = format!("{}x{}", "(".repeat(20_000), ")".repeat(20_000));
        assert!(parse_str(&parens).is_ok());
        let deepest = format!("x{}", "+x".repeat(MAX_DEPTH - 2));
        assert_eq!(eval_at(&deepest, 1.0), (MAX_DEPTH - 1) as Number);
    }

    #[test]
    fn spans_cover_whole_call() {
        let expr = parse_str("1 + sin(x)").unwrap();
        match expr.typ {
            ExprTyp::Binary(OperatorTyp::Add, _, rhs) => assert_eq!(rhs.loc.get(), "sin(x)"),
            other => panic!("unexpected node {other:?}"),
        }
    }
}
