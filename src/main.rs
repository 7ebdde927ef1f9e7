// SPDX: CC0-1.0

use anyhow::Context;
use chrono::{DateTime, Local};
use function_plot::{
    config::Config,
    controller::{Controller, Form, FormErr},
    curve::CompileErr,
    eval::Idents,
    lex::LexErrTyp,
    logging,
    parse::ParseErrTyp,
    render::{self, format_label},
    shell::{self, Command},
    stdlib::{self, COEFFICIENTS},
    svg::SvgCanvas,
    Number, Point,
};
use std::{
    fs::OpenOptions,
    io::{stdout, BufWriter, Write},
    process::ExitCode,
};

fn output_svg_filename(now: DateTime<Local>) -> String {
    format!(
        "{}_output-{}.{}",
        env!("CARGO_PKG_NAME"),
        now.format("%Y-%m-%d_%H-%M-%S"),
        "svg"
    )
}

fn main() -> ExitCode {
    logging::init();
    match try_main() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("unexpected error: {err}");
            let chain = err.chain();
            if chain.len() > 1 {
                eprintln!();
                eprintln!("context:");
                for it in chain.skip(1) {
                    eprintln!("  {it}");
                }
            }
            ExitCode::FAILURE
        }
    }
}

#[derive(Debug)]
struct State {
    ctl: Controller,
    canvas: SvgCanvas,
}

impl State {
    /// Repaints after every handled event.
    fn render(&mut self) {
        render::render(&mut self.canvas, &self.ctl.frame());
    }
}

fn try_main() -> anyhow::Result<()> {
    let mut state = State {
        ctl: Controller::new(Config::default()).context("invalid default configuration")?,
        canvas: SvgCanvas::new(),
    };
    state.render();

    let mut stdout = BufWriter::new(stdout());
    loop {
        if state.ctl.expression_valid() {
            writeln!(stdout, "y = {}", state.ctl.expr())?;
        } else {
            writeln!(stdout, "y = {} (invalid)", state.ctl.expr())?;
        }

        let mut try_cmd = shell::input(&mut stdout, "> ")?;
        try_cmd.make_ascii_lowercase();
        writeln!(stdout)?;

        if let Ok(cmd) = try_cmd.parse::<Command>() {
            match cmd {
                Command::Help => {
                    for c in Command::exhaustive() {
                        writeln!(stdout, "{name}: {help}", name = c.name(), help = c.help())?;
                    }
                }

                Command::Quit => break,

                Command::SetExpr => set_expr(&mut stdout, &mut state)?,

                Command::SetCoef => set_coef(&mut stdout, &mut state)?,

                Command::SetWin => set_win(&mut stdout, &mut state)?,

                Command::Table => shell::dump_table(&mut stdout, state.ctl.table())?,

                Command::Answer => answer(&mut stdout, &mut state)?,

                Command::Points => {
                    if state.ctl.points().is_empty() {
                        writeln!(stdout, "no points confirmed yet")?;
                    }
                    for p in state.ctl.points() {
                        writeln!(stdout, "  ({}, {})", format_label(p.x), format_label(p.y))?;
                    }
                }

                Command::Pan => pan(&mut stdout, &mut state)?,

                Command::Zoom => {
                    let dir = shell::input(&mut stdout, "?in/out = ")?;
                    match dir.as_str() {
                        "in" => state.ctl.wheel(-1.0),
                        "out" => state.ctl.wheel(1.0),
                        _ => writeln!(stdout, "expected 'in' or 'out'")?,
                    }
                    writeln!(stdout, "win = {:#}", state.ctl.viewport())?;
                }

                Command::Hover => hover(&mut stdout, &mut state)?,

                Command::Resize => resize(&mut stdout, &mut state)?,

                Command::Curve => {
                    let shown = state.ctl.toggle_curve();
                    writeln!(stdout, "curve {}", if shown { "shown" } else { "hidden" })?;
                }

                Command::Plot => plot(&mut stdout, &state)?,

                Command::PrintProg => {
                    if let Some(curve) = state.ctl.curve() {
                        shell::dump_expr(&mut stdout, curve.expr(), format_args!("expression"))?;
                    } else {
                        shell::expr_invalid(&mut stdout)?;
                    }
                }
            }
            state.render();
        } else {
            writeln!(stdout, r#"Unknown command, try "help" for help"#)?;
        }

        writeln!(stdout)?;
    }
    stdout.flush()?;
    Ok(())
}

fn plot<W: Write>(mut out: W, state: &State) -> anyhow::Result<()> {
    let svg_path = output_svg_filename(Local::now());
    let mut file = BufWriter::new(
        OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&svg_path)
            .context("failed to open output svg file")?,
    );
    file.write_all(state.canvas.finish().as_bytes())
        .context("failed to write output svg file")?;
    file.flush()?;
    file.get_mut().sync_data()?;
    tracing::info!(path = %svg_path, "wrote frame");
    writeln!(out, "wrote {svg_path}")?;
    Ok(())
}

fn set_win<W: Write>(mut out: W, state: &mut State) -> anyhow::Result<()> {
    writeln!(out, "win = {:#}", state.ctl.viewport())?;
    writeln!(out)?;
    writeln!(out, "note: leave blank to skip")?;

    let mut form = state.ctl.form();
    for (name, dst) in [
        ("x min", &mut form.x_min),
        ("x max", &mut form.x_max),
        ("y min", &mut form.y_min),
        ("y max", &mut form.y_max),
    ] {
        let new = shell::input(&mut out, format_args!("?{name} (is {cur}) = ", cur = *dst))?;
        if !new.is_empty() {
            *dst = new;
        }
    }

    if let Err(err) = state.ctl.apply_bounds(&form) {
        writeln!(out, "error: {err}")?;
        writeln!(out, "note: the previous window was kept")?;
    }
    Ok(())
}

fn set_coef<W: Write>(mut out: W, state: &mut State) -> anyhow::Result<()> {
    writeln!(out, "note: leave blank to skip")?;
    let mut form = state.ctl.form();
    for (name, dst) in COEFFICIENTS.into_iter().zip(form.coefficients.iter_mut()) {
        let new = shell::input(&mut out, format_args!("?{name} (is {cur}) = ", cur = *dst))?;
        if !new.is_empty() {
            *dst = new;
        }
    }
    apply_function(&mut out, state, &form)
}

fn set_expr<W: Write>(mut out: W, state: &mut State) -> anyhow::Result<()> {
    let input = shell::input(&mut out, "y = ")?;
    if input.is_empty() {
        return Ok(());
    }
    let mut form = state.ctl.form();
    form.expr = input;
    apply_function(&mut out, state, &form)
}

fn apply_function<W: Write>(mut out: W, state: &mut State, form: &Form) -> anyhow::Result<()> {
    match state.ctl.apply_function(form) {
        Ok(()) => {}
        Err(FormErr::Compile(err)) => {
            let idents = stdlib::standard_idents(state.ctl.coefficients());
            report_compile_err(&mut out, &err, &idents)?
        }
        Err(err) => writeln!(out, "error: {err}")?,
    }
    Ok(())
}

fn report_compile_err<W: Write>(
    mut out: W,
    err: &CompileErr,
    idents: &Idents,
) -> anyhow::Result<()> {
    writeln!(out)?;
    shell::underline(&mut out, err.loc())?;
    writeln!(out, "{err}")?;

    match err {
        CompileErr::Parse(err) => match &err.typ {
            ParseErrTyp::LexErr(LexErrTyp::InvalidChar) => writeln!(
                out,
                "note: available tokens are numbers, identifiers, and symbols +-*/^,()"
            )?,
            ParseErrTyp::LexErr(LexErrTyp::Unsupported(chr)) => match chr {
                '|' => writeln!(
                    out,
                    "note: use the 'abs' function to compute absolute value"
                )?,
                '=' | '>' | '<' => writeln!(
                    out,
                    "note: expected an expression in x but found an equation or inequality"
                )?,
                _ => writeln!(out, "note: use parentheses for grouping")?,
            },
            ParseErrTyp::UnexpectedTok => writeln!(
                out,
                "note: implicit multiplication is not supported, so for example '5x' would be '5*x'"
            )?,
            ParseErrTyp::ParseNum(_) => writeln!(out, "note: parsing as floating point number")?,
            ParseErrTyp::TooDeep => writeln!(out, "note: try simplifying the expression")?,
            ParseErrTyp::ParenMismatch | ParseErrTyp::MissingOperand | ParseErrTyp::Empty => {}
        },

        CompileErr::Eval(_) => {
            if let Some((name, kind)) = err.suggestion(idents) {
                writeln!(out, "note: {kind} '{name}' has a similar name")?;
            }
        }
    }
    Ok(())
}

fn answer<W: Write>(mut out: W, state: &mut State) -> anyhow::Result<()> {
    shell::dump_table(&mut out, state.ctl.table())?;
    let row = match shell::read_fromstr::<_, usize>(&mut out, "?row = ", true)? {
        Ok(Some(row)) => row,
        Ok(None) | Err(_) => return Ok(()),
    };
    let text = shell::input(&mut out, "?y = ")?;
    match state.ctl.enter_value(row, &text) {
        Some(verdict) => writeln!(out, "{verdict}")?,
        None => writeln!(out, "error: no row {row}")?,
    }
    Ok(())
}

fn read_point<W: Write>(
    mut out: W,
    x_name: &str,
    y_name: &str,
) -> anyhow::Result<Option<Point<Number>>> {
    let mut read = |name: &str| -> anyhow::Result<Option<Number>> {
        match shell::read_fromstr::<_, Number>(&mut out, format_args!("?{name} = "), false)? {
            Ok(val) => Ok(val),
            Err(_) => Ok(None),
        }
    };
    let Some(x) = read(x_name)? else {
        return Ok(None);
    };
    let Some(y) = read(y_name)? else {
        return Ok(None);
    };
    Ok(Some(Point { x, y }))
}

fn pan<W: Write>(mut out: W, state: &mut State) -> anyhow::Result<()> {
    let Some(delta) = read_point(&mut out, "dx (px)", "dy (px)")? else {
        return Ok(());
    };
    // a drag from the canvas centre
    let (width, height) = state.ctl.viewport().pixel_size();
    let start = Point {
        x: Number::from(width) / 2.0,
        y: Number::from(height) / 2.0,
    };
    state.ctl.pointer_down(start);
    state.ctl.pointer_move(Point {
        x: start.x + delta.x,
        y: start.y + delta.y,
    });
    state.ctl.pointer_up();
    writeln!(out, "win = {:#}", state.ctl.viewport())?;
    Ok(())
}

fn hover<W: Write>(mut out: W, state: &mut State) -> anyhow::Result<()> {
    let Some(at) = read_point(&mut out, "x (px)", "y (px)")? else {
        return Ok(());
    };
    state.ctl.pointer_move(at);
    match state.ctl.hover() {
        Some(p) => writeln!(
            out,
            "on curve at ({}, {})",
            format_label(p.x),
            format_label(p.y)
        )?,
        None => writeln!(out, "not near the curve")?,
    }
    Ok(())
}

fn resize<W: Write>(mut out: W, state: &mut State) -> anyhow::Result<()> {
    let (width, height) = state.ctl.viewport().pixel_size();
    let Ok(Some(new_width)) =
        shell::read_fromstr::<_, u32>(&mut out, format_args!("?width (is {width}) = "), true)?
    else {
        return Ok(());
    };
    let Ok(Some(new_height)) =
        shell::read_fromstr::<_, u32>(&mut out, format_args!("?height (is {height}) = "), true)?
    else {
        return Ok(());
    };
    if let Err(err) = state.ctl.resize(new_width, new_height) {
        writeln!(out, "error: {err}")?;
    }
    Ok(())
}
