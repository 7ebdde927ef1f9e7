// SPDX: CC0-1.0

//! Session state and the transitions input events drive.
//!
//! Every method is a pure state transition; painting happens separately by
//! handing [`Controller::frame`] to [`crate::render::render`].

use crate::{
    config::Config,
    curve::{compile_expression, Coefficients, CompileErr, Curve},
    render::Frame,
    stdlib::COEFFICIENTS,
    table::{self, TableRow, Verdict},
    viewport::{Viewport, ViewportErr, ZoomDir},
    Number, Point,
};
use core::fmt;

/// Distance auto-scaling leaves between a new point and the window edge.
pub const AUTO_SCALE_PADDING: Number = 2.0;

/// Hover hits the curve within this fraction of the y range.
pub const HOVER_TOLERANCE: Number = 0.05;

/// Text of every input field, as the user typed it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Form {
    pub x_min: String,
    pub x_max: String,
    pub y_min: String,
    pub y_max: String,
    pub coefficients: [String; 5],
    pub expr: String,
}

#[derive(Debug)]
pub enum FormErr {
    InvalidNumber { field: &'static str, text: String },
    Viewport(ViewportErr),
    Compile(CompileErr),
}

impl fmt::Display for FormErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidNumber { field, text } => {
                write!(f, "{field}: '{text}' is not a number")
            }
            Self::Viewport(err) => write!(f, "invalid window: {err}"),
            Self::Compile(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for FormErr {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidNumber { .. } => None,
            Self::Viewport(err) => Some(err),
            Self::Compile(err) => Some(err),
        }
    }
}

impl From<ViewportErr> for FormErr {
    fn from(err: ViewportErr) -> Self {
        Self::Viewport(err)
    }
}

impl From<CompileErr> for FormErr {
    fn from(err: CompileErr) -> Self {
        Self::Compile(err)
    }
}

fn parse_field(field: &'static str, text: &str) -> Result<Number, FormErr> {
    match text.trim().parse::<Number>() {
        Ok(val) if val.is_finite() => Ok(val),
        _ => Err(FormErr::InvalidNumber {
            field,
            text: text.to_string(),
        }),
    }
}

#[derive(Debug)]
pub struct Controller {
    viewport: Viewport,
    coefficients: Coefficients,
    expr: String,
    curve: Option<Curve>,
    expr_valid: bool,
    points: Vec<Point<Number>>,
    table: Vec<TableRow>,
    show_curve: bool,
    // last pointer position while a drag is in progress
    drag: Option<Point<Number>>,
    hover: Option<Point<Number>>,
}

impl Controller {
    /// Starts a session. An expression that fails to compile leaves the
    /// session running without a curve.
    pub fn new(config: Config) -> Result<Self, ViewportErr> {
        let viewport = Viewport::new(config.x, config.y, config.width, config.height)?;
        let mut ret = Self {
            viewport,
            coefficients: config.coefficients,
            expr: config.expr,
            curve: None,
            expr_valid: false,
            points: Vec::new(),
            table: Vec::new(),
            show_curve: true,
            drag: None,
            hover: None,
        };
        if let Err(err) = ret.compile() {
            tracing::warn!(%err, "initial expression rejected");
        }
        Ok(ret)
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn curve(&self) -> Option<&Curve> {
        self.curve.as_ref()
    }

    pub fn expr(&self) -> &str {
        &self.expr
    }

    pub fn coefficients(&self) -> &Coefficients {
        &self.coefficients
    }

    pub fn expression_valid(&self) -> bool {
        self.expr_valid
    }

    pub fn points(&self) -> &[Point<Number>] {
        &self.points
    }

    pub fn table(&self) -> &[TableRow] {
        &self.table
    }

    pub fn show_curve(&self) -> bool {
        self.show_curve
    }

    pub fn hover(&self) -> Option<Point<Number>> {
        self.hover
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_some()
    }

    /// Field contents reflecting the current state.
    pub fn form(&self) -> Form {
        let (x, y) = (self.viewport.x(), self.viewport.y());
        Form {
            x_min: x.start.to_string(),
            x_max: x.end.to_string(),
            y_min: y.start.to_string(),
            y_max: y.end.to_string(),
            coefficients: self.coefficients.values().map(|val| val.to_string()),
            expr: self.expr.clone(),
        }
    }

    pub fn frame(&self) -> Frame<'_> {
        Frame {
            viewport: &self.viewport,
            curve: self.curve.as_ref(),
            points: &self.points,
            show_curve: self.show_curve,
            hover: self.hover,
        }
    }

    /// Reads the four bound fields and regenerates the table. Nothing
    /// changes unless all four are valid.
    pub fn apply_bounds(&mut self, form: &Form) -> Result<(), FormErr> {
        let x_min = parse_field("x min", &form.x_min)?;
        let x_max = parse_field("x max", &form.x_max)?;
        let y_min = parse_field("y min", &form.y_min)?;
        let y_max = parse_field("y max", &form.y_max)?;
        self.set_bounds(x_min..x_max, y_min..y_max)?;
        self.generate_table();
        Ok(())
    }

    pub fn set_bounds(
        &mut self,
        x: core::ops::Range<Number>,
        y: core::ops::Range<Number>,
    ) -> Result<(), ViewportErr> {
        if let Err(err) = self.viewport.set_bounds(x, y) {
            tracing::warn!(%err, "bounds rejected");
            return Err(err);
        }
        self.hover = None;
        tracing::debug!(viewport = %self.viewport, "bounds set");
        Ok(())
    }

    /// Reads the coefficient fields and the expression, then recompiles.
    pub fn apply_function(&mut self, form: &Form) -> Result<(), FormErr> {
        let mut coefficients = self.coefficients;
        for (name, text) in COEFFICIENTS.into_iter().zip(&form.coefficients) {
            let val = parse_field(name, text)?;
            if let Some(dst) = coefficients.get_mut(name) {
                *dst = val;
            }
        }
        self.coefficients = coefficients;
        self.expr = form.expr.trim().to_string();
        self.compile()?;
        Ok(())
    }

    /// Compiles the current expression. On failure the previous curve is
    /// dropped and the expression is marked invalid.
    pub fn compile(&mut self) -> Result<(), CompileErr> {
        self.hover = None;
        match compile_expression(&self.expr, &self.coefficients) {
            Ok(curve) => {
                self.curve = Some(curve);
                self.expr_valid = true;
                self.generate_table();
                Ok(())
            }
            Err(err) => {
                tracing::debug!(expr = %self.expr, %err, "expression rejected");
                self.curve = None;
                self.expr_valid = false;
                self.table.clear();
                Err(err)
            }
        }
    }

    /// Rebuilds the table over the current x range.
    pub fn generate_table(&mut self) {
        self.table = match self.curve {
            Some(ref curve) => table::generate_table(&self.viewport.x(), |x| curve.eval(x)),
            None => Vec::new(),
        };
    }

    /// Checks the value typed into table row `row`. Returns `None` if there
    /// is no such row.
    pub fn enter_value(&mut self, row: usize, text: &str) -> Option<Verdict> {
        let entry = self.table.get_mut(row)?;
        entry.entered = text.to_string();
        entry.verdict = match entry.true_value() {
            Some(val) => table::validate_entry(text, val),
            None => Verdict::Indeterminate,
        };
        let verdict = entry.verdict;
        if let (Verdict::Correct, Some(y)) = (verdict, entry.true_value()) {
            let x = entry.x;
            if !self.points.iter().any(|p| p.x == x) {
                let point = Point { x, y };
                tracing::debug!(x, y, "point confirmed");
                self.points.push(point);
                self.auto_scale(point);
            }
        }
        Some(verdict)
    }

    /// Grows the window to show `point`. Returns whether it moved.
    pub fn auto_scale(&mut self, point: Point<Number>) -> bool {
        match self.viewport.expand_to_include(point, AUTO_SCALE_PADDING) {
            Ok(changed) => {
                if changed {
                    tracing::debug!(viewport = %self.viewport, "auto-scaled");
                }
                changed
            }
            Err(err) => {
                tracing::warn!(%err, x = point.x, y = point.y, "auto-scale rejected");
                false
            }
        }
    }

    pub fn toggle_curve(&mut self) -> bool {
        self.set_show_curve(!self.show_curve);
        self.show_curve
    }

    pub fn set_show_curve(&mut self, show: bool) {
        self.show_curve = show;
        if !show {
            self.hover = None;
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), ViewportErr> {
        self.viewport.set_size(width, height)?;
        self.hover = None;
        Ok(())
    }

    pub fn pointer_down(&mut self, at: Point<Number>) {
        self.drag = Some(at);
    }

    pub fn pointer_up(&mut self) {
        self.drag = None;
    }

    pub fn pointer_leave(&mut self) {
        self.drag = None;
    }

    /// Pans while dragging, otherwise hit-tests the hover point.
    pub fn pointer_move(&mut self, at: Point<Number>) {
        if let Some(last) = self.drag {
            if let Err(err) = self.viewport.pan_by_pixels(at.x - last.x, at.y - last.y) {
                tracing::warn!(%err, "pan rejected");
            }
            self.drag = Some(at);
            self.hover = None;
        } else {
            self.hover = self.hit_test(at);
        }
    }

    /// Positive `delta` scrolls down and zooms out.
    pub fn wheel(&mut self, delta: Number) {
        if let Some(dir) = ZoomDir::from_wheel(delta) {
            self.hover = None;
            match self.viewport.zoom(dir) {
                Ok(()) => tracing::debug!(?dir, viewport = %self.viewport, "zoomed"),
                Err(err) => tracing::warn!(%err, ?dir, "zoom rejected"),
            }
        }
    }

    /// Point on the shown curve vertically close to the cursor at `at`
    /// (pixels), if any.
    pub fn hit_test(&self, at: Point<Number>) -> Option<Point<Number>> {
        if !self.show_curve {
            return None;
        }
        let curve = self.curve.as_ref()?;
        let cursor = self.viewport.map_from_pixel(at);
        let y = curve.eval(cursor.x);
        if y.is_finite() && (cursor.y - y).abs() < HOVER_TOLERANCE * self.viewport.y_span() {
            Some(Point { x: cursor.x, y })
        } else {
            None
        }
    }
}
