// SPDX: CC0-1.0

//! Full repaint of a frame onto a 2D drawing surface.

use crate::{
    curve::Curve,
    viewport::{choose_grid_step, Viewport, MIN_GRID_SPACING},
    Number, Point,
};

pub const MARKER_RADIUS: Number = 5.0;

/// Points this far outside the canvas still get a marker.
pub const MARKER_MARGIN: Number = 10.0;

/// Grid values closer to zero than this are left to the origin label.
pub const ZERO_LABEL_EPSILON: Number = 1e-4;

const ARROW_SIZE: Number = 8.0;
const LABEL_OFFSET: Number = 4.0;

const GRID_COLOR: &str = "#e0e0e0";
const AXIS_COLOR: &str = "#000000";
const LABEL_COLOR: &str = "#444444";
const CURVE_COLOR: &str = "#1f77b4";
const POINT_COLOR: &str = "#d62728";
const HOVER_COLOR: &str = "#ff7f0e";
const LABEL_FONT: &str = "12px sans-serif";

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Seg {
    MoveTo(Point<Number>),
    LineTo(Point<Number>),
    /// Full circle.
    Arc {
        center: Point<Number>,
        radius: Number,
    },
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Path {
    pub segs: Vec<Seg>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(&mut self, p: Point<Number>) -> &mut Self {
        self.segs.push(Seg::MoveTo(p));
        self
    }

    pub fn line_to(&mut self, p: Point<Number>) -> &mut Self {
        self.segs.push(Seg::LineTo(p));
        self
    }

    pub fn circle(&mut self, center: Point<Number>, radius: Number) -> &mut Self {
        self.segs.push(Seg::Arc { center, radius });
        self
    }

    pub fn polyline(&mut self, points: &[Point<Number>]) -> &mut Self {
        let mut it = points.iter();
        if let Some(first) = it.next() {
            self.move_to(*first);
            for p in it {
                self.line_to(*p);
            }
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.segs.is_empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Baseline {
    Top,
    Middle,
    Bottom,
}

/// A resizable 2D drawing surface.
pub trait Canvas {
    fn clear(&mut self, width: u32, height: u32);
    fn set_stroke(&mut self, color: &str, width: Number);
    fn set_fill(&mut self, color: &str);
    fn set_font(&mut self, font: &str);
    fn set_text_align(&mut self, align: TextAlign, baseline: Baseline);
    fn stroke_path(&mut self, path: &Path);
    fn fill_path(&mut self, path: &Path);
    fn fill_text(&mut self, text: &str, at: Point<Number>);
}

/// Everything one repaint reads.
#[derive(Clone, Copy, Debug)]
pub struct Frame<'a> {
    pub viewport: &'a Viewport,
    pub curve: Option<&'a Curve>,
    pub points: &'a [Point<Number>],
    pub show_curve: bool,
    pub hover: Option<Point<Number>>,
}

/// Formats a grid or point value with at most four decimals.
pub fn format_label(val: Number) -> String {
    let s = format!("{val:.4}");
    let s = if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        &s
    };
    if s == "-0" {
        String::from("0")
    } else {
        s.to_string()
    }
}

/// Multiples of `step` inside `range`.
fn grid_values(start: Number, end: Number, step: Number) -> impl Iterator<Item = Number> {
    let first = (start / step).ceil() as i64;
    let last = (end / step).floor() as i64;
    (first..=last).map(move |k| k as Number * step)
}

/// Samples `curve` once per pixel column, returning pixel-space polylines.
///
/// A sample joins the current polyline only if its pixel `y` is finite and
/// within twice the canvas height of the top edge. Anything else ends the
/// polyline; runs shorter than two samples are dropped.
pub fn sample_curve(viewport: &Viewport, curve: &Curve) -> Vec<Vec<Point<Number>>> {
    let (width, _) = viewport.pixel_size();
    let limit = 2.0 * viewport.height();
    let mut lines = Vec::new();
    let mut cur: Vec<Point<Number>> = Vec::new();

    for column in 0..=width {
        let px = Number::from(column);
        let x = viewport.map_from_pixel(Point { x: px, y: 0.0 }).x;
        let y = curve.eval(x);
        let py = viewport.map_to_pixel(Point { x, y }).y;
        if py.is_finite() && py.abs() < limit {
            cur.push(Point { x: px, y: py });
        } else if !cur.is_empty() {
            lines.push(core::mem::take(&mut cur));
        }
    }
    if !cur.is_empty() {
        lines.push(cur);
    }
    lines.retain(|line| line.len() >= 2);
    lines
}

fn marker_visible(viewport: &Viewport, p: Point<Number>) -> bool {
    p.x >= -MARKER_MARGIN
        && p.x <= viewport.width() + MARKER_MARGIN
        && p.y >= -MARKER_MARGIN
        && p.y <= viewport.height() + MARKER_MARGIN
}

fn arrowhead(tip: Point<Number>, dir: Point<Number>) -> Path {
    // `dir` is a unit vector pointing out of the tip
    let back = Point {
        x: tip.x - dir.x * ARROW_SIZE,
        y: tip.y - dir.y * ARROW_SIZE,
    };
    let side = Point {
        x: -dir.y * ARROW_SIZE / 2.0,
        y: dir.x * ARROW_SIZE / 2.0,
    };
    let mut path = Path::new();
    path.move_to(tip)
        .line_to(Point {
            x: back.x + side.x,
            y: back.y + side.y,
        })
        .line_to(Point {
            x: back.x - side.x,
            y: back.y - side.y,
        })
        .line_to(tip);
    path
}

fn draw_grid<C: Canvas + ?Sized>(canvas: &mut C, viewport: &Viewport) {
    let (x, y) = (viewport.x(), viewport.y());
    let (width, height) = (viewport.width(), viewport.height());

    // pixel position of each axis, or the canvas edge labels fall back to
    let origin = viewport.map_to_pixel(Point { x: 0.0, y: 0.0 });
    let axis_px = (x.start..=x.end).contains(&0.0).then_some(origin.x);
    let axis_py = (y.start..=y.end).contains(&0.0).then_some(origin.y);

    let step_x = choose_grid_step(viewport.x_span(), width, MIN_GRID_SPACING);
    let step_y = choose_grid_step(viewport.y_span(), height, MIN_GRID_SPACING);

    let mut lines = Path::new();
    let mut labels: Vec<(String, Point<Number>, TextAlign, Baseline)> = Vec::new();

    if let Some(step) = step_x {
        for gx in grid_values(x.start, x.end, step) {
            let px = viewport.map_to_pixel(Point { x: gx, y: 0.0 }).x;
            lines
                .move_to(Point { x: px, y: 0.0 })
                .line_to(Point { x: px, y: height });
            if gx.abs() < ZERO_LABEL_EPSILON {
                continue;
            }
            let (py, baseline) = match axis_py {
                Some(py) if py + LABEL_OFFSET < height - 12.0 => {
                    (py + LABEL_OFFSET, Baseline::Top)
                }
                _ => (height - LABEL_OFFSET, Baseline::Bottom),
            };
            labels.push((
                format_label(gx),
                Point { x: px, y: py },
                TextAlign::Center,
                baseline,
            ));
        }
    }

    if let Some(step) = step_y {
        for gy in grid_values(y.start, y.end, step) {
            let py = viewport.map_to_pixel(Point { x: 0.0, y: gy }).y;
            lines
                .move_to(Point { x: 0.0, y: py })
                .line_to(Point { x: width, y: py });
            if gy.abs() < ZERO_LABEL_EPSILON {
                continue;
            }
            let (px, align) = match axis_px {
                Some(px) if px - LABEL_OFFSET > 24.0 => (px - LABEL_OFFSET, TextAlign::Right),
                _ => (LABEL_OFFSET, TextAlign::Left),
            };
            labels.push((format_label(gy), Point { x: px, y: py }, align, Baseline::Middle));
        }
    }

    if !lines.is_empty() {
        canvas.set_stroke(GRID_COLOR, 1.0);
        canvas.stroke_path(&lines);
    }

    canvas.set_stroke(AXIS_COLOR, 2.0);
    canvas.set_fill(AXIS_COLOR);
    if let Some(py) = axis_py {
        let mut axis = Path::new();
        axis.move_to(Point { x: 0.0, y: py })
            .line_to(Point { x: width, y: py });
        canvas.stroke_path(&axis);
        canvas.fill_path(&arrowhead(Point { x: width, y: py }, Point { x: 1.0, y: 0.0 }));
    }
    if let Some(px) = axis_px {
        let mut axis = Path::new();
        axis.move_to(Point { x: px, y: height })
            .line_to(Point { x: px, y: 0.0 });
        canvas.stroke_path(&axis);
        canvas.fill_path(&arrowhead(Point { x: px, y: 0.0 }, Point { x: 0.0, y: -1.0 }));
    }

    canvas.set_fill(LABEL_COLOR);
    canvas.set_font(LABEL_FONT);
    for (text, at, align, baseline) in labels {
        canvas.set_text_align(align, baseline);
        canvas.fill_text(&text, at);
    }
    if let (Some(px), Some(py)) = (axis_px, axis_py) {
        canvas.set_text_align(TextAlign::Right, Baseline::Top);
        canvas.fill_text(
            "0",
            Point {
                x: px - LABEL_OFFSET,
                y: py + LABEL_OFFSET,
            },
        );
    }
}

/// Clears `canvas` and paints `frame` from scratch.
pub fn render<C: Canvas + ?Sized>(canvas: &mut C, frame: &Frame<'_>) {
    let viewport = frame.viewport;
    let (width, height) = viewport.pixel_size();
    canvas.clear(width, height);

    draw_grid(canvas, viewport);

    if let (true, Some(curve)) = (frame.show_curve, frame.curve) {
        let mut path = Path::new();
        for line in sample_curve(viewport, curve) {
            path.polyline(&line);
        }
        if !path.is_empty() {
            canvas.set_stroke(CURVE_COLOR, 2.0);
            canvas.stroke_path(&path);
        }
    }

    let mut markers = Path::new();
    for p in frame.points {
        let px = viewport.map_to_pixel(*p);
        if marker_visible(viewport, px) {
            markers.circle(px, MARKER_RADIUS);
        }
    }
    if !markers.is_empty() {
        canvas.set_fill(POINT_COLOR);
        canvas.fill_path(&markers);
    }

    if let Some(hover) = frame.hover {
        let px = viewport.map_to_pixel(hover);
        let mut marker = Path::new();
        marker.circle(px, MARKER_RADIUS);
        canvas.set_fill(HOVER_COLOR);
        canvas.fill_path(&marker);
        canvas.set_font(LABEL_FONT);
        canvas.set_text_align(TextAlign::Left, Baseline::Bottom);
        canvas.fill_text(
            &format!("({}, {})", format_label(hover.x), format_label(hover.y)),
            Point {
                x: px.x + 2.0 * LABEL_OFFSET,
                y: px.y - 2.0 * LABEL_OFFSET,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curve::{compile_expression, Coefficients};

    #[test]
    fn labels_trim_trailing_zeros() {
        assert_eq!(format_label(2.0), "2");
        assert_eq!(format_label(-0.5), "-0.5");
        assert_eq!(format_label(1.0 / 3.0), "0.3333");
        assert_eq!(format_label(-0.00001), "0");
        assert_eq!(format_label(120.0), "120");
    }

    #[test]
    fn grid_values_cover_bounds() {
        let vals: Vec<Number> = grid_values(-3.5, 4.0, 2.0).collect();
        assert_eq!(vals, [-2.0, 0.0, 2.0, 4.0]);
    }

    #[test]
    fn samples_every_column() {
        let viewport = Viewport::new(-10.0..10.0, -10.0..10.0, 200, 100).unwrap();
        let curve = compile_expression("x", &Coefficients::default()).unwrap();
        let lines = sample_curve(&viewport, &curve);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].len(), 201);
        assert!((lines[0][100].y - 50.0).abs() < 1e-9);
    }

    #[test]
    fn asymptote_splits_polyline() {
        let viewport = Viewport::new(-10.0..10.0, -10.0..10.0, 200, 100).unwrap();
        let curve = compile_expression("1/x", &Coefficients::default()).unwrap();
        let lines = sample_curve(&viewport, &curve);
        assert_eq!(lines.len(), 2);
        assert!(lines[0].iter().all(|p| p.x < 100.0));
        assert!(lines[1].iter().all(|p| p.x > 100.0));
    }

    #[test]
    fn undefined_region_is_skipped() {
        let viewport = Viewport::new(-10.0..10.0, -10.0..10.0, 200, 100).unwrap();
        let curve = compile_expression("sqrt(x)", &Coefficients::default()).unwrap();
        let lines = sample_curve(&viewport, &curve);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].first().map(|p| p.x), Some(100.0));
    }
}
