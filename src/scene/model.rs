use crate::foundation::color::Rgba8;
use crate::foundation::core::{Affine, Point, Rect};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stroke {
    pub color: Rgba8,
    pub width: f64,
}

impl Stroke {
    pub fn new(color: Rgba8, width: f64) -> Self {
        Self { color, width }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextAnchor {
    #[default]
    Start,
    Middle,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TextRun {
    /// Baseline origin.
    pub at: Point,
    pub text: String,
    pub size: f64,
    pub weight: u16,
    pub fill: Rgba8,
    pub anchor: TextAnchor,
    pub monospace: bool,
}

/// One drawable element. Coordinates are in the parent group's space.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    Group {
        transform: Affine,
        opacity: f64,
        children: Vec<Node>,
    },
    Rect {
        rect: Rect,
        radius: f64,
        fill: Rgba8,
        stroke: Option<Stroke>,
    },
    Circle {
        center: Point,
        radius: f64,
        fill: Rgba8,
    },
    Line {
        from: Point,
        to: Point,
        stroke: Stroke,
    },
    /// Open polyline with round caps; `blur` is a Gaussian standard deviation in pixels.
    Polyline {
        points: Vec<Point>,
        stroke: Stroke,
        blur: f64,
    },
    Text(TextRun),
}

impl Node {
    pub fn group(transform: Affine, opacity: f64, children: Vec<Node>) -> Self {
        Self::Group {
            transform,
            opacity,
            children,
        }
    }
}

/// A fully resolved frame description: pure data, no timing left in it.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    pub width: u32,
    pub height: u32,
    pub background: Rgba8,
    pub nodes: Vec<Node>,
}

impl Scene {
    /// Total node count, groups included.
    pub fn node_count(&self) -> usize {
        fn count(nodes: &[Node]) -> usize {
            nodes
                .iter()
                .map(|n| match n {
                    Node::Group { children, .. } => 1 + count(children),
                    _ => 1,
                })
                .sum()
        }
        count(&self.nodes)
    }
}
