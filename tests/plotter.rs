// SPDX: CC0-1.0

use function_plot::{
    config::Config,
    controller::Controller,
    curve::{compile_expression, Coefficients},
    render::{self, Baseline, Canvas, Frame, Path, Seg, TextAlign, MARKER_RADIUS},
    table::{generate_table, validate_entry, Verdict},
    viewport::{choose_grid_step, Viewport, ZoomDir, MIN_GRID_SPACING},
    Number, Point,
};

#[derive(Clone, Debug, PartialEq)]
enum Op {
    Clear(u32, u32),
    Stroke { color: String, path: Path },
    Fill { color: String, path: Path },
    Text { text: String, at: Point<Number> },
}

#[derive(Debug, Default)]
struct Recorder {
    stroke: String,
    fill: String,
    ops: Vec<Op>,
}

impl Canvas for Recorder {
    fn clear(&mut self, width: u32, height: u32) {
        self.ops.clear();
        self.ops.push(Op::Clear(width, height));
    }

    fn set_stroke(&mut self, color: &str, _width: Number) {
        self.stroke = color.to_string();
    }

    fn set_fill(&mut self, color: &str) {
        self.fill = color.to_string();
    }

    fn set_font(&mut self, _font: &str) {}

    fn set_text_align(&mut self, _align: TextAlign, _baseline: Baseline) {}

    fn stroke_path(&mut self, path: &Path) {
        self.ops.push(Op::Stroke {
            color: self.stroke.clone(),
            path: path.clone(),
        });
    }

    fn fill_path(&mut self, path: &Path) {
        self.ops.push(Op::Fill {
            color: self.fill.clone(),
            path: path.clone(),
        });
    }

    fn fill_text(&mut self, text: &str, at: Point<Number>) {
        self.ops.push(Op::Text {
            text: text.to_string(),
            at,
        });
    }
}

impl Recorder {
    fn texts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    fn circles(&self) -> Vec<Point<Number>> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::Fill { path, .. } => Some(path),
                _ => None,
            })
            .flat_map(|path| path.segs.iter())
            .filter_map(|seg| match seg {
                Seg::Arc { center, radius } if *radius == MARKER_RADIUS => Some(*center),
                _ => None,
            })
            .collect()
    }

    fn stroked_with(&self, color: &str) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, Op::Stroke { color: c, .. } if c == color))
            .count()
    }
}

fn close(a: Number, b: Number) -> bool {
    (a - b).abs() <= 1e-9 * (1.0 + a.abs().max(b.abs()))
}

fn quadratic() -> Coefficients {
    Coefficients {
        a: 1.0,
        ..Coefficients::default()
    }
}

#[test]
fn pixel_mapping_round_trips() {
    let windows = [
        (-10.0..10.0, -10.0..10.0, 800, 600),
        (0.001..0.002, -1e6..1e6, 37, 1024),
        (-3.5..120.25, 4.0..4.5, 1, 1),
    ];
    for (x, y, w, h) in windows {
        let v = Viewport::new(x.clone(), y.clone(), w, h).unwrap();
        for i in 0..=10 {
            let t = Number::from(i) / 10.0;
            let p = Point {
                x: x.start + t * (x.end - x.start),
                y: y.end - t * (y.end - y.start) * 0.7,
            };
            let back = v.map_from_pixel(v.map_to_pixel(p));
            assert!(close(back.x, p.x), "{back:?} != {p:?}");
            assert!(close(back.y, p.y), "{back:?} != {p:?}");
        }
    }
}

#[test]
fn grid_step_is_smallest_sufficient_power_of_two() {
    for (range, extent) in [(1.0, 800.0), (20.0, 800.0), (333.0, 600.0), (1e5, 50.0)] {
        let step = choose_grid_step(range, extent, MIN_GRID_SPACING).unwrap();
        assert!(extent / (range / step) >= MIN_GRID_SPACING);
        assert_eq!(step.log2().fract(), 0.0);
        if step > 1.0 {
            let half = step / 2.0;
            assert!(extent / (range / half) < MIN_GRID_SPACING);
        }
    }
}

#[test]
fn pan_and_reverse_restores_bounds() {
    let mut v = Viewport::new(-7.0..3.0, -2.0..9.0, 640, 480).unwrap();
    let before = (v.x(), v.y());
    v.pan_by_pixels(37.0, -112.5).unwrap();
    assert!(!close(v.x().start, before.0.start));
    v.pan_by_pixels(-37.0, 112.5).unwrap();
    assert!(close(v.x().start, before.0.start) && close(v.x().end, before.0.end));
    assert!(close(v.y().start, before.1.start) && close(v.y().end, before.1.end));
}

#[test]
fn zoom_out_then_in_restores_bounds() {
    let mut v = Viewport::new(-7.0..3.0, -2.0..9.0, 640, 480).unwrap();
    let center = v.center();
    for _ in 0..3 {
        v.zoom(ZoomDir::Out).unwrap();
    }
    assert!(v.x_span() > 13.0);
    for _ in 0..3 {
        v.zoom(ZoomDir::In).unwrap();
    }
    assert!(close(v.x().start, -7.0) && close(v.x().end, 3.0));
    assert!(close(v.y().start, -2.0) && close(v.y().end, 9.0));
    assert!(close(v.center().x, center.x) && close(v.center().y, center.y));
}

#[test]
fn window_stays_valid_at_float_limits() {
    let mut v = Viewport::new(-1e307..1e307, -1.0..1.0, 800, 600).unwrap();
    for _ in 0..30 {
        let _ = v.zoom(ZoomDir::Out);
    }
    for _ in 0..30 {
        let _ = v.zoom(ZoomDir::In);
    }
    let (x, y) = (v.x(), v.y());
    assert!(x.start.is_finite() && x.end.is_finite() && x.start < x.end);
    assert!(y.start.is_finite() && y.end.is_finite() && y.start < y.end);
    let center = v.map_from_pixel(Point { x: 400.0, y: 300.0 });
    assert!(center.x.is_finite() && center.y.is_finite());

    let before = v.clone();
    assert!(v.pan_by_pixels(1e300, 0.0).is_err());
    assert_eq!(v, before);

    // every bound is finite but the span is not
    assert!(v.set_bounds(-1e308..1e308, -1.0..1.0).is_err());
    assert_eq!(v, before);
}

#[test]
fn deeply_nested_expression_is_rejected() {
    let text = format!("{}x", "-".repeat(20_000));
    assert!(compile_expression(&text, &quadratic()).is_err());
    let text = format!("x{}", "+x".repeat(20_000));
    assert!(compile_expression(&text, &quadratic()).is_err());
    // grouping alone does not deepen the tree
    let text = format!("{}x{}", "(".repeat(20_000), ")".repeat(20_000));
    assert_eq!(compile_expression(&text, &quadratic()).unwrap().eval(3.0), 3.0);
}

#[test]
fn table_over_zero_to_sixteen() {
    let curve = compile_expression("a*x^2+b*x+c", &quadratic()).unwrap();
    let rows = generate_table(&(0.0..16.0), |x| curve.eval(x));
    assert_eq!(rows.len(), 9);
    for (i, row) in rows.iter().enumerate() {
        assert_eq!(row.x, 2.0 * i as Number);
    }
}

#[test]
fn entry_tolerance() {
    assert_eq!(validate_entry("4.001", 4.0), Verdict::Correct);
    assert_eq!(validate_entry("4.06", 4.0), Verdict::Incorrect);
}

#[test]
fn quadratic_at_three() {
    let curve = compile_expression("a*x^2+b*x+c", &quadratic()).unwrap();
    assert_eq!(curve.eval(3.0), 9.0);
}

#[test]
fn point_beyond_x_max_expands_only_x_max() {
    let mut ctl = Controller::new(Config {
        x: -10.0..10.0,
        y: -10.0..200.0,
        ..Config::default()
    })
    .unwrap();
    assert!(ctl.auto_scale(Point { x: 12.0, y: 144.0 }));
    assert_eq!(ctl.viewport().x(), -10.0..14.0);
    assert_eq!(ctl.viewport().y(), -10.0..200.0);
    assert!(!ctl.auto_scale(Point { x: 0.0, y: 0.0 }));
}

#[test]
fn render_hides_axes_outside_window() {
    let v = Viewport::new(1.0..9.0, 1.0..9.0, 400, 400).unwrap();
    let mut canvas = Recorder::default();
    render::render(
        &mut canvas,
        &Frame {
            viewport: &v,
            curve: None,
            points: &[],
            show_curve: true,
            hover: None,
        },
    );
    assert_eq!(canvas.ops[0], Op::Clear(400, 400));
    // grid only, no axis strokes or arrowheads
    assert_eq!(canvas.stroked_with("#000000"), 0);
    assert!(!canvas.texts().contains(&"0"));
}

#[test]
fn render_labels_skip_zero_but_draw_origin() {
    let v = Viewport::new(-4.0..4.0, -4.0..4.0, 400, 400).unwrap();
    let mut canvas = Recorder::default();
    render::render(
        &mut canvas,
        &Frame {
            viewport: &v,
            curve: None,
            points: &[],
            show_curve: true,
            hover: None,
        },
    );
    let texts = canvas.texts();
    // one label per non-zero grid line on each axis, plus the origin
    assert_eq!(texts.iter().filter(|t| **t == "0").count(), 1);
    assert_eq!(texts.iter().filter(|t| **t == "4").count(), 2);
    assert_eq!(texts.iter().filter(|t| **t == "-4").count(), 2);
    assert_eq!(texts.len(), 8 * 2 + 1);
    assert_eq!(canvas.stroked_with("#000000"), 2);
}

#[test]
fn render_draws_curve_and_visible_markers() {
    let v = Viewport::new(-10.0..10.0, -10.0..10.0, 200, 200).unwrap();
    let curve = compile_expression("x", &quadratic()).unwrap();
    let points = [
        Point { x: 1.0, y: 1.0 },
        // 5 px past the right edge, inside the margin
        Point { x: 10.5, y: 0.0 },
        Point { x: 50.0, y: 0.0 },
    ];
    let mut canvas = Recorder::default();
    let frame = Frame {
        viewport: &v,
        curve: Some(&curve),
        points: &points,
        show_curve: true,
        hover: None,
    };
    render::render(&mut canvas, &frame);
    assert_eq!(canvas.stroked_with("#1f77b4"), 1);
    assert_eq!(canvas.circles().len(), 2);

    // painting is idempotent
    let first = canvas.ops.clone();
    render::render(&mut canvas, &frame);
    assert_eq!(canvas.ops, first);

    render::render(
        &mut canvas,
        &Frame {
            show_curve: false,
            ..frame
        },
    );
    assert_eq!(canvas.stroked_with("#1f77b4"), 0);
}

#[test]
fn hover_overlays_marker_and_label() {
    let mut ctl = Controller::new(Config {
        width: 400,
        height: 400,
        x: -4.0..4.0,
        y: -4.0..4.0,
        ..Config::default()
    })
    .unwrap();
    let at = ctl.viewport().map_to_pixel(Point { x: 1.0, y: 1.1 });
    ctl.pointer_move(at);

    let mut canvas = Recorder::default();
    render::render(&mut canvas, &ctl.frame());
    assert!(canvas.texts().contains(&"(1, 1)"));
    assert_eq!(canvas.circles().len(), 1);
}

#[test]
fn session_walkthrough() {
    let mut ctl = Controller::new(Config {
        x: 0.0..16.0,
        y: -10.0..10.0,
        ..Config::default()
    })
    .unwrap();

    let mut form = ctl.form();
    form.expr = String::from("sqrt(x) * c");
    form.coefficients[2] = String::from("3");
    ctl.apply_function(&form).unwrap();
    assert_eq!(ctl.curve().map(|c| c.eval(4.0)), Some(6.0));

    // x = 16 is the last row: 3 * 4
    let last = ctl.table().len() - 1;
    assert_eq!(ctl.enter_value(last, "12"), Some(Verdict::Correct));
    assert_eq!(ctl.viewport().y(), -10.0..14.0);

    form.expr = String::from("sqrt(x) *");
    assert!(ctl.apply_function(&form).is_err());
    assert!(!ctl.expression_valid());
    // confirmed points survive a bad expression
    assert_eq!(ctl.points().len(), 1);

    ctl.wheel(1.0);
    assert!(close(ctl.viewport().x_span(), 17.6));
    assert!(ctl.resize(0, 10).is_err());
}
