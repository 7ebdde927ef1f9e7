// SPDX: CC0-1.0

//! `Canvas` backed by an in-memory SVG document.

use crate::{
    render::{Baseline, Canvas, Path, Seg, TextAlign},
    Number,
};

#[derive(Clone, Debug)]
pub struct SvgCanvas {
    width: u32,
    height: u32,
    stroke: (String, Number),
    fill: String,
    font: String,
    align: TextAlign,
    baseline: Baseline,
    body: String,
}

impl Default for SvgCanvas {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            stroke: (String::from("#000000"), 1.0),
            fill: String::from("#000000"),
            font: String::from("10px sans-serif"),
            align: TextAlign::Left,
            baseline: Baseline::Bottom,
            body: String::new(),
        }
    }
}

fn path_data(path: &Path) -> String {
    let mut d = String::new();
    for seg in &path.segs {
        if !d.is_empty() {
            d.push(' ');
        }
        match seg {
            Seg::MoveTo(p) => d.push_str(&format!("M{:.2} {:.2}", p.x, p.y)),
            Seg::LineTo(p) => d.push_str(&format!("L{:.2} {:.2}", p.x, p.y)),
            Seg::Arc { center, radius } => {
                // two half arcs, since one arc cannot start and end on the same point
                let (cx, cy, r) = (center.x, center.y, *radius);
                d.push_str(&format!(
                    "M{:.2} {cy:.2} A{r} {r} 0 1 0 {:.2} {cy:.2} A{r} {r} 0 1 0 {:.2} {cy:.2} Z",
                    cx + r,
                    cx - r,
                    cx + r,
                ));
            }
        }
    }
    d
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for chr in text.chars() {
        match chr {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(chr),
        }
    }
    out
}

impl SvgCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// The complete SVG document for everything painted since `clear`.
    pub fn finish(&self) -> String {
        format!(
            concat!(
                r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
                "\n",
                r##"<rect width="{w}" height="{h}" fill="#ffffff"/>"##,
                "\n{body}</svg>\n"
            ),
            w = self.width,
            h = self.height,
            body = self.body,
        )
    }
}

impl Canvas for SvgCanvas {
    fn clear(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.body.clear();
    }

    fn set_stroke(&mut self, color: &str, width: Number) {
        self.stroke = (color.to_string(), width);
    }

    fn set_fill(&mut self, color: &str) {
        self.fill = color.to_string();
    }

    fn set_font(&mut self, font: &str) {
        self.font = font.to_string();
    }

    fn set_text_align(&mut self, align: TextAlign, baseline: Baseline) {
        self.align = align;
        self.baseline = baseline;
    }

    fn stroke_path(&mut self, path: &Path) {
        self.body.push_str(&format!(
            "<path d=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"{}\"/>\n",
            path_data(path),
            self.stroke.0,
            self.stroke.1
        ));
    }

    fn fill_path(&mut self, path: &Path) {
        self.body.push_str(&format!(
            "<path d=\"{}\" fill=\"{}\"/>\n",
            path_data(path),
            self.fill
        ));
    }

    fn fill_text(&mut self, text: &str, at: crate::Point<Number>) {
        let anchor = match self.align {
            TextAlign::Left => "start",
            TextAlign::Center => "middle",
            TextAlign::Right => "end",
        };
        let baseline = match self.baseline {
            Baseline::Top => "hanging",
            Baseline::Middle => "middle",
            Baseline::Bottom => "text-after-edge",
        };
        self.body.push_str(&format!(
            "<text x=\"{:.2}\" y=\"{:.2}\" style=\"font: {}\" fill=\"{}\" text-anchor=\"{anchor}\" dominant-baseline=\"{baseline}\">{}</text>\n",
            at.x,
            at.y,
            self.font,
            self.fill,
            escape(text)
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Point;

    #[test]
    fn clear_resets_document() {
        let mut svg = SvgCanvas::new();
        svg.clear(10, 20);
        svg.fill_text("a", Point { x: 1.0, y: 2.0 });
        svg.clear(30, 40);
        assert!(svg.body().is_empty());
        assert!(svg.finish().contains(r#"width="30" height="40""#));
    }

    #[test]
    fn writes_paths_and_escaped_text() {
        let mut svg = SvgCanvas::new();
        svg.clear(100, 100);
        let mut path = Path::new();
        path.move_to(Point { x: 0.0, y: 0.0 })
            .line_to(Point { x: 10.0, y: 5.0 });
        svg.set_stroke("#123456", 2.0);
        svg.stroke_path(&path);
        svg.set_text_align(TextAlign::Center, Baseline::Top);
        svg.fill_text("x < 1", Point { x: 5.0, y: 5.0 });

        let doc = svg.finish();
        assert!(doc.contains(r##"d="M0.00 0.00 L10.00 5.00" fill="none" stroke="#123456""##));
        assert!(doc.contains("x &lt; 1"));
        assert!(doc.contains(r#"text-anchor="middle""#));
    }
}
