// SPDX: CC0-1.0

use crate::{eval::Expr, lex::SubStr, table::TableRow};
use anyhow::Context;
use core::fmt;
use std::{
    io::{self, stdin, BufRead, Write},
    sync::Arc,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Help,
    Quit,
    SetExpr,
    SetCoef,
    SetWin,
    Table,
    Answer,
    Points,
    Pan,
    Zoom,
    Hover,
    Resize,
    Curve,
    Plot,
    PrintProg,
}

impl Command {
    pub const fn exhaustive() -> &'static [Command] {
        &[
            Self::Help,
            Self::Quit,
            Self::SetExpr,
            Self::SetCoef,
            Self::SetWin,
            Self::Table,
            Self::Answer,
            Self::Points,
            Self::Pan,
            Self::Zoom,
            Self::Hover,
            Self::Resize,
            Self::Curve,
            Self::Plot,
            Self::PrintProg,
        ]
    }

    pub const fn help(&self) -> &'static str {
        match self {
            Self::Help => "display help for each command",
            Self::Quit => "quit the shell",
            Self::SetExpr => "set the function to plot",
            Self::SetCoef => "set coefficients a through e",
            Self::SetWin => "set window bounds",
            Self::Table => "print the value table",
            Self::Answer => "enter a value into the table",
            Self::Points => "list confirmed points",
            Self::Pan => "drag the canvas by a pixel offset",
            Self::Zoom => "turn the wheel ('in' or 'out')",
            Self::Hover => "move the cursor to a pixel position",
            Self::Resize => "resize the canvas",
            Self::Curve => "toggle curve visibility",
            Self::Plot => "render the current frame to an svg file",
            Self::PrintProg => "print the expression tree (for debugging)",
        }
    }

    pub const fn name(&self) -> &'static str {
        match self {
            Self::Help => "help",
            Self::Quit => "quit",
            Self::SetExpr => "set",
            Self::SetCoef => "coef",
            Self::SetWin => "window",
            Self::Table => "table",
            Self::Answer => "answer",
            Self::Points => "points",
            Self::Pan => "pan",
            Self::Zoom => "zoom",
            Self::Hover => "hover",
            Self::Resize => "resize",
            Self::Curve => "curve",
            Self::Plot => "plot",
            Self::PrintProg => "prog",
        }
    }
}

impl core::str::FromStr for Command {
    type Err = ();
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::exhaustive()
            .iter()
            .find(|c| c.name() == s)
            .copied()
            .ok_or(())
    }
}

pub fn input<W: Write>(out: W, prompt: impl fmt::Display) -> anyhow::Result<String> {
    fn inner<W: Write>(mut out: W, prompt: impl fmt::Display) -> io::Result<String> {
        write!(out, "{prompt}")?;
        out.flush()?;
        let mut stdin = stdin().lock();
        let mut s = String::new();
        stdin.read_line(&mut s)?;
        Ok(s.trim().to_string())
    }

    let s = inner(out, prompt).context("read from standard input failed")?;
    Ok(s)
}

pub fn read_fromstr<W: Write, T: core::str::FromStr>(
    mut out: W,
    prompt: impl fmt::Display,
    ignore_empty: bool,
) -> anyhow::Result<Result<Option<T>, <T as core::str::FromStr>::Err>>
where
    <T as core::str::FromStr>::Err: fmt::Display,
{
    let input = Arc::new(input(&mut out, prompt)?);
    if ignore_empty && input.is_empty() {
        return Ok(Ok(None));
    }
    match input.parse::<T>() {
        Ok(new) => Ok(Ok(Some(new))),
        Err(err) => {
            writeln!(out)?;
            underline(&mut out, &SubStr::all(input))?;
            writeln!(out, "parse error: {err}")?;
            Ok(Err(err))
        }
    }
}

pub fn underline<W: Write>(mut out: W, span: &SubStr) -> io::Result<()> {
    writeln!(out, "{}", span.source())?;
    writeln!(
        out,
        "{}{}",
        " ".repeat(span.column()),
        "^".repeat(span.width().max(1))
    )?;
    Ok(())
}

pub fn dump_expr<W: Write>(mut out: W, expr: &Expr, title: fmt::Arguments<'_>) -> io::Result<()> {
    writeln!(out, "{title}: ")?;
    let mut res = Ok(());
    expr.walk(1, &mut |node, depth| {
        if res.is_ok() {
            res = writeln!(out, "{}{node}", "  ".repeat(depth));
        }
    });
    res
}

pub fn dump_table<W: Write>(mut out: W, rows: &[TableRow]) -> io::Result<()> {
    if rows.is_empty() {
        writeln!(out, "  (empty)")?;
    }
    for (idx, row) in rows.iter().enumerate() {
        if row.is_disabled() {
            writeln!(out, "  [{idx}] x = {:<8} y = (undefined)", row.x)?;
        } else {
            writeln!(
                out,
                "  [{idx}] x = {:<8} y = {:<10} {}",
                row.x, row.entered, row.verdict
            )?;
        }
    }
    Ok(())
}

pub fn expr_invalid<W: Write>(mut out: W) -> io::Result<()> {
    writeln!(out, "error: the current expression is invalid")
}
