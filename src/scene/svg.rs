use std::fmt::Write as _;

use crate::foundation::color::Rgba8;
use crate::foundation::core::{Affine, Point};
use crate::scene::model::{Node, Scene, Stroke, TextAnchor, TextRun};

const SANS: &str = "Inter, Helvetica, Arial, sans-serif";
const MONO: &str = "JetBrains Mono, Menlo, monospace";

/// Serialize a scene as a standalone SVG document.
///
/// Output is byte-stable: numbers are printed with fixed precision and nodes are emitted in
/// scene order, so equal scenes always produce equal documents.
pub fn to_svg(scene: &Scene) -> String {
    let mut w = SvgWriter {
        out: String::with_capacity(256 + scene.node_count() * 96),
        filters: 0,
    };
    let _ = write!(
        w.out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{0}" height="{1}" viewBox="0 0 {0} {1}">"#,
        scene.width, scene.height
    );
    let _ = write!(
        w.out,
        r#"<rect width="{}" height="{}"{}/>"#,
        scene.width,
        scene.height,
        paint("fill", scene.background)
    );
    for node in &scene.nodes {
        w.node(node);
    }
    w.out.push_str("</svg>");
    w.out
}

struct SvgWriter {
    out: String,
    filters: usize,
}

impl SvgWriter {
    fn node(&mut self, node: &Node) {
        match node {
            Node::Group {
                transform,
                opacity,
                children,
            } => {
                if *opacity <= 0.0 || children.is_empty() {
                    return;
                }
                self.out.push_str("<g");
                if *transform != Affine::IDENTITY {
                    let c = transform.as_coeffs();
                    let _ = write!(
                        self.out,
                        r#" transform="matrix({} {} {} {} {} {})""#,
                        num(c[0]),
                        num(c[1]),
                        num(c[2]),
                        num(c[3]),
                        num(c[4]),
                        num(c[5])
                    );
                }
                if *opacity < 1.0 {
                    let _ = write!(self.out, r#" opacity="{}""#, num(*opacity));
                }
                self.out.push('>');
                for child in children {
                    self.node(child);
                }
                self.out.push_str("</g>");
            }
            Node::Rect {
                rect,
                radius,
                fill,
                stroke,
            } => {
                let _ = write!(
                    self.out,
                    r#"<rect x="{}" y="{}" width="{}" height="{}""#,
                    num(rect.x0),
                    num(rect.y0),
                    num(rect.width()),
                    num(rect.height())
                );
                if *radius > 0.0 {
                    let _ = write!(self.out, r#" rx="{}""#, num(*radius));
                }
                self.out.push_str(&paint("fill", *fill));
                if let Some(stroke) = stroke {
                    self.out.push_str(&stroke_attrs(*stroke));
                }
                self.out.push_str("/>");
            }
            Node::Circle {
                center,
                radius,
                fill,
            } => {
                let _ = write!(
                    self.out,
                    r#"<circle cx="{}" cy="{}" r="{}"{}/>"#,
                    num(center.x),
                    num(center.y),
                    num(*radius),
                    paint("fill", *fill)
                );
            }
            Node::Line { from, to, stroke } => {
                let _ = write!(
                    self.out,
                    r#"<line x1="{}" y1="{}" x2="{}" y2="{}"{} stroke-linecap="round"/>"#,
                    num(from.x),
                    num(from.y),
                    num(to.x),
                    num(to.y),
                    stroke_attrs(*stroke)
                );
            }
            Node::Polyline {
                points,
                stroke,
                blur,
            } => self.polyline(points, *stroke, *blur),
            Node::Text(run) => self.text(run),
        }
    }

    fn polyline(&mut self, points: &[Point], stroke: Stroke, blur: f64) {
        if points.len() < 2 {
            return;
        }
        let mut filter = String::new();
        if blur > 0.0 {
            let id = format!("glow{}", self.filters);
            self.filters += 1;
            // The default filter region is bbox-relative and collapses for axis-aligned lines.
            let pad = 3.0 * blur + stroke.width;
            let (min, max) = bounds(points);
            let _ = write!(
                self.out,
                r#"<defs><filter id="{id}" filterUnits="userSpaceOnUse" x="{}" y="{}" width="{}" height="{}"><feGaussianBlur stdDeviation="{}"/></filter></defs>"#,
                num(min.x - pad),
                num(min.y - pad),
                num(max.x - min.x + 2.0 * pad),
                num(max.y - min.y + 2.0 * pad),
                num(blur)
            );
            filter = format!(r#" filter="url(#{id})""#);
        }
        self.out.push_str(r#"<polyline points=""#);
        for (i, p) in points.iter().enumerate() {
            if i > 0 {
                self.out.push(' ');
            }
            let _ = write!(self.out, "{},{}", num(p.x), num(p.y));
        }
        let _ = write!(
            self.out,
            r#"" fill="none"{} stroke-linecap="round" stroke-linejoin="round"{filter}/>"#,
            stroke_attrs(stroke)
        );
    }

    fn text(&mut self, run: &TextRun) {
        if run.text.is_empty() {
            return;
        }
        let anchor = match run.anchor {
            TextAnchor::Start => "",
            TextAnchor::Middle => r#" text-anchor="middle""#,
        };
        let _ = write!(
            self.out,
            r#"<text x="{}" y="{}" font-family="{}" font-size="{}" font-weight="{}"{}{anchor}>{}</text>"#,
            num(run.at.x),
            num(run.at.y),
            if run.monospace { MONO } else { SANS },
            num(run.size),
            run.weight,
            paint("fill", run.fill),
            escape(&run.text)
        );
    }
}

fn paint(attr: &str, color: Rgba8) -> String {
    if color.a == 255 {
        format!(r#" {attr}="{}""#, color.to_hex_rgb())
    } else {
        format!(
            r#" {attr}="{}" {attr}-opacity="{}""#,
            color.to_hex_rgb(),
            num(color.alpha_f64())
        )
    }
}

fn stroke_attrs(stroke: Stroke) -> String {
    format!(
        r#"{} stroke-width="{}""#,
        paint("stroke", stroke.color),
        num(stroke.width)
    )
}

fn bounds(points: &[Point]) -> (Point, Point) {
    points.iter().fold(
        (
            Point::new(f64::INFINITY, f64::INFINITY),
            Point::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
        ),
        |(lo, hi), p| {
            (
                Point::new(lo.x.min(p.x), lo.y.min(p.y)),
                Point::new(hi.x.max(p.x), hi.y.max(p.y)),
            )
        },
    )
}

/// Fixed three-decimal formatting with trailing zeros trimmed; non-finite values print as 0.
pub(crate) fn num(v: f64) -> String {
    if !v.is_finite() {
        return "0".to_owned();
    }
    let mut s = format!("{v:.3}");
    if s.contains('.') {
        let trimmed = s.trim_end_matches('0').trim_end_matches('.').len();
        s.truncate(trimmed);
    }
    if s == "-0" {
        s.remove(0);
    }
    s
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/scene/svg.rs"]
mod tests;
