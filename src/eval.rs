// SPDX: CC0-1.0

use crate::{lex::SubStr, stdlib, Number};
use core::{borrow::Borrow, fmt};
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OperatorTyp {
    Neg,
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Associativity {
    Left,
    Right,
}

impl OperatorTyp {
    pub const fn precedence(&self) -> i8 {
        match self {
            Self::Add => 2,
            Self::Sub => 2,
            Self::Mul => 3,
            Self::Div => 3,
            Self::Neg => 4,
            Self::Pow => 5,
        }
    }

    pub const fn associativity(&self) -> Associativity {
        use Associativity::{Left, Right};
        match self {
            Self::Neg => Right,
            Self::Add => Left,
            Self::Sub => Left,
            Self::Mul => Left,
            Self::Div => Left,
            Self::Pow => Right,
        }
    }

    pub const fn fun(&self) -> (&'static str, Fun) {
        match self {
            Self::Neg => ("neg", Fun::new(1, stdlib::neg)),
            Self::Add => ("add", Fun::new(2, stdlib::add)),
            Self::Sub => ("sub", Fun::new(2, stdlib::sub)),
            Self::Mul => ("mul", Fun::new(2, stdlib::mul)),
            Self::Div => ("div", Fun::new(2, stdlib::div)),
            Self::Pow => ("pow", Fun::new(2, stdlib::pow)),
        }
    }
}

/// Node of a parsed expression.
#[derive(Clone, Debug, PartialEq)]
pub enum ExprTyp {
    Val(Number),
    /// Variable or constant, named by the node's span.
    Ident,
    Unary(OperatorTyp, Box<Expr>),
    Binary(OperatorTyp, Box<Expr>, Box<Expr>),
    Call { name: SubStr, args: Vec<Expr> },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Expr {
    pub typ: ExprTyp,
    pub loc: SubStr,
}

impl Expr {
    /// Calls `visit` for this node and every node below it, parents first.
    pub fn walk<'a>(&'a self, depth: usize, visit: &mut impl FnMut(&'a Expr, usize)) {
        visit(self, depth);
        match &self.typ {
            ExprTyp::Val(_) | ExprTyp::Ident => {}
            ExprTyp::Unary(_, arg) => arg.walk(depth + 1, visit),
            ExprTyp::Binary(_, lhs, rhs) => {
                lhs.walk(depth + 1, visit);
                rhs.walk(depth + 1, visit);
            }
            ExprTyp::Call { args, .. } => {
                for arg in args {
                    arg.walk(depth + 1, visit);
                }
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.typ {
            ExprTyp::Val(val) => write!(f, "value {val}"),
            ExprTyp::Ident => write!(f, "identifier '{}'", self.loc.get()),
            ExprTyp::Unary(typ, _) => write!(f, "unary '{}'", typ.fun().0),
            ExprTyp::Binary(typ, _, _) => write!(f, "binary '{}'", typ.fun().0),
            ExprTyp::Call { name, args } => {
                write!(f, "call '{}' with {} argument(s)", name.get(), args.len())
            }
        }
    }
}

#[derive(Debug)]
pub enum EvalErrTyp {
    MissingArgs {
        name: IdentKey,
        arity: usize,
        found: usize,
    },
    UndefinedIdent {
        text: SubStr,
    },
    NullVar {
        text: SubStr,
    },
    NotAFunction {
        text: SubStr,
    },
    FunAsValue {
        text: SubStr,
    },
}

#[derive(Debug)]
pub struct EvalErr {
    pub typ: EvalErrTyp,
    pub loc: SubStr,
}

impl EvalErr {
    /// Name of the identifier responsible for the error, if there is one.
    pub fn ident(&self) -> Option<&str> {
        match &self.typ {
            EvalErrTyp::MissingArgs { name, .. } => Some(name.get()),
            EvalErrTyp::UndefinedIdent { text }
            | EvalErrTyp::NullVar { text }
            | EvalErrTyp::NotAFunction { text }
            | EvalErrTyp::FunAsValue { text } => Some(text.get()),
        }
    }
}

impl fmt::Display for EvalErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.typ {
            EvalErrTyp::MissingArgs { name, arity, found } => write!(
                f,
                "function '{name}' requires {arity} argument{s}, but found {found}",
                name = name.get(),
                s = if *arity == 1 { "" } else { "s" }
            ),

            EvalErrTyp::UndefinedIdent { text } => {
                write!(f, "undefined identifier '{}'", text.get())
            }

            EvalErrTyp::NullVar { text } => {
                write!(
                    f,
                    "variable '{}' is declared but its value is not defined",
                    text.get()
                )
            }

            EvalErrTyp::NotAFunction { text } => {
                write!(f, "'{}' is not a function", text.get())
            }

            EvalErrTyp::FunAsValue { text } => {
                write!(f, "function '{}' must be called with arguments", text.get())
            }
        }
    }
}

impl std::error::Error for EvalErr {}

#[derive(Clone, Copy, Debug)]
pub struct Fun {
    pub arity: usize,
    pub fun: fn(&[Number]) -> Number,
}

impl Fun {
    pub const fn new(arity: usize, fun: fn(&[Number]) -> Number) -> Self {
        Self { arity, fun }
    }
}

#[derive(Clone, Copy, Debug)]
pub enum Ident {
    Var(Option<Number>),
    Const(Number),
    Fun(Fun),
}

impl Ident {
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Var(_) => "variable",
            Self::Const(_) => "constant",
            Self::Fun(_) => "function",
        }
    }
}

#[derive(Clone, Debug, Eq)]
pub enum IdentKey {
    Arc(SubStr),
    Static(&'static str),
}

impl PartialEq for IdentKey {
    fn eq(&self, other: &Self) -> bool {
        self.get() == other.get()
    }
}

impl core::hash::Hash for IdentKey {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.get().hash(state)
    }
}

// hashes and compares as the underlying str
impl Borrow<str> for IdentKey {
    fn borrow(&self) -> &str {
        self.get()
    }
}

impl IdentKey {
    pub fn get(&self) -> &str {
        match self {
            Self::Arc(s) => s.get(),
            Self::Static(s) => s,
        }
    }
}

impl fmt::Display for IdentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.get())
    }
}

impl From<SubStr> for IdentKey {
    fn from(s: SubStr) -> Self {
        Self::Arc(s)
    }
}

impl From<&'static str> for IdentKey {
    fn from(s: &'static str) -> Self {
        Self::Static(s)
    }
}

pub type Idents = HashMap<IdentKey, Ident>;

/// Identifier resolution used while evaluating.
pub trait Scope {
    fn lookup(&self, name: &str) -> Option<Ident>;
}

impl Scope for Idents {
    fn lookup(&self, name: &str) -> Option<Ident> {
        self.get(name).copied()
    }
}

/// Binds one variable on top of another scope without touching it.
#[derive(Debug)]
pub struct With<'a, S: ?Sized> {
    pub outer: &'a S,
    pub name: &'a str,
    pub val: Number,
}

impl<S: Scope + ?Sized> Scope for With<'_, S> {
    fn lookup(&self, name: &str) -> Option<Ident> {
        if name == self.name {
            Some(Ident::Var(Some(self.val)))
        } else {
            self.outer.lookup(name)
        }
    }
}

pub fn eval<S: Scope + ?Sized>(expr: &Expr, scope: &S) -> Result<Number, EvalErr> {
    fn call(fun: &Fun, name: IdentKey, args: &[Number], loc: &SubStr) -> Result<Number, EvalErr> {
        if args.len() != fun.arity {
            return Err(EvalErr {
                typ: EvalErrTyp::MissingArgs {
                    name,
                    arity: fun.arity,
                    found: args.len(),
                },
                loc: loc.clone(),
            });
        }
        Ok((fun.fun)(args))
    }

    match &expr.typ {
        ExprTyp::Val(num) => Ok(*num),

        ExprTyp::Ident => {
            let text = expr.loc.clone();
            match scope.lookup(text.get()) {
                Some(Ident::Var(Some(val)) | Ident::Const(val)) => Ok(val),
                Some(Ident::Var(None)) => Err(EvalErr {
                    typ: EvalErrTyp::NullVar { text },
                    loc: expr.loc.clone(),
                }),
                Some(Ident::Fun(_)) => Err(EvalErr {
                    typ: EvalErrTyp::FunAsValue { text },
                    loc: expr.loc.clone(),
                }),
                None => Err(EvalErr {
                    typ: EvalErrTyp::UndefinedIdent { text },
                    loc: expr.loc.clone(),
                }),
            }
        }

        ExprTyp::Unary(typ, arg) => {
            let (name, fun) = typ.fun();
            let arg = eval(arg, scope)?;
            call(&fun, name.into(), &[arg], &expr.loc)
        }

        ExprTyp::Binary(typ, lhs, rhs) => {
            let (name, fun) = typ.fun();
            let lhs = eval(lhs, scope)?;
            let rhs = eval(rhs, scope)?;
            call(&fun, name.into(), &[lhs, rhs], &expr.loc)
        }

        ExprTyp::Call { name, args } => {
            let fun = match scope.lookup(name.get()) {
                Some(Ident::Fun(fun)) => fun,
                Some(_) => {
                    return Err(EvalErr {
                        typ: EvalErrTyp::NotAFunction { text: name.clone() },
                        loc: name.clone(),
                    })
                }
                None => {
                    return Err(EvalErr {
                        typ: EvalErrTyp::UndefinedIdent { text: name.clone() },
                        loc: name.clone(),
                    })
                }
            };
            let args = args
                .iter()
                .map(|arg| eval(arg, scope))
                .collect::<Result<Vec<Number>, EvalErr>>()?;
            call(&fun, name.clone().into(), &args, &expr.loc)
        }
    }
}
