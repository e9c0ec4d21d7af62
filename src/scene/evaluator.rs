use serde::{Deserialize, Serialize};

use crate::animation::clock::Clock;
use crate::animation::ease::Ease;
use crate::animation::entrance::Entrance;
use crate::chart::annotation::{Callout, Tone, Trendline};
use crate::chart::candle::Candle;
use crate::chart::scale::PriceScale;
use crate::config::{AnimationTiming, Palette, Settings};
use crate::editor::state::EditorState;
use crate::foundation::color::Rgba8;
use crate::foundation::core::{Affine, Canvas, Point, Rect, Size, Vec2};
use crate::scene::model::{Node, Scene, Stroke, TextAnchor, TextRun};

const GRID_SPACING: f64 = 100.0;
const CARD_WIDTH: f64 = 240.0;
const CARD_HEIGHT: f64 = 88.0;
const CONNECTOR_LENGTH: f64 = 40.0;

/// Headline overlay drawn in canvas space on top of the chart.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TitleCard {
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
}

/// Everything the renderer reads: a snapshot of the document, detached from editor handles.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SceneInput {
    pub candles: Vec<Candle>,
    pub trendlines: Vec<Trendline>,
    pub callouts: Vec<Callout>,
    pub title: Option<TitleCard>,
}

impl SceneInput {
    pub fn from_state(state: &EditorState) -> Self {
        Self {
            candles: state.candle_values(),
            trendlines: state.trendlines.clone(),
            callouts: state.callouts.clone(),
            title: None,
        }
    }

    pub fn with_title(mut self, title: Option<TitleCard>) -> Self {
        self.title = title;
        self
    }
}

/// Output canvas plus the chart-local to canvas mapping.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub canvas: Canvas,
    pub chart_transform: Affine,
}

impl Viewport {
    /// Canvas sized to the chart itself, chart pixels == canvas pixels (the editor surface).
    pub fn editor(chart_extent: Size) -> Self {
        Self {
            canvas: Canvas {
                width: chart_extent.width.ceil().max(1.0) as u32,
                height: chart_extent.height.ceil().max(1.0) as u32,
            },
            chart_transform: Affine::IDENTITY,
        }
    }

    /// Uniformly scale the chart into `canvas`, centered, leaving `margin` of each side free.
    pub fn fit(canvas: Canvas, chart_extent: Size, margin: f64) -> Self {
        let size = canvas.size();
        let avail = Size::new(size.width * (1.0 - 2.0 * margin), size.height * (1.0 - 2.0 * margin));
        let s = (avail.width / chart_extent.width.max(1.0))
            .min(avail.height / chart_extent.height.max(1.0))
            .max(f64::EPSILON);
        let offset = Vec2::new(
            (size.width - chart_extent.width * s) / 2.0,
            (size.height - chart_extent.height * s) / 2.0,
        );
        Self {
            canvas,
            chart_transform: Affine::translate(offset) * Affine::scale(s),
        }
    }
}

/// Resolve `input` at `clock` into a [`Scene`].
///
/// Pure: identical arguments always yield an identical scene, which is what makes preview and
/// frame-by-frame export interchangeable.
pub fn evaluate(input: &SceneInput, settings: &Settings, viewport: &Viewport, clock: Clock) -> Scene {
    let timing = &settings.timing;
    let palette = &settings.palette;
    let scale = settings.chart.price_scale(&input.candles);

    let mut chart = Vec::with_capacity(
        input.candles.len() + input.trendlines.len() + input.callouts.len(),
    );
    for (i, candle) in input.candles.iter().enumerate() {
        chart.extend(candle_node(i, candle, settings, &scale, clock));
    }
    for line in &input.trendlines {
        chart.extend(trendline_node(line, timing, clock));
    }
    for callout in &input.callouts {
        chart.extend(callout_node(callout, timing, palette, clock));
    }

    let mut nodes = vec![
        grid_node(viewport.canvas, palette.grid),
        Node::group(viewport.chart_transform, 1.0, chart),
    ];
    if let Some(title) = &input.title {
        nodes.extend(title_node(title, timing, palette, clock));
    }

    Scene {
        width: viewport.canvas.width,
        height: viewport.canvas.height,
        background: palette.background,
        nodes,
    }
}

fn grid_node(canvas: Canvas, color: Rgba8) -> Node {
    let size = canvas.size();
    let stroke = Stroke::new(color, 1.0);
    let mut lines = Vec::new();
    let mut x = 0.0;
    while x <= size.width {
        lines.push(Node::Line {
            from: Point::new(x, 0.0),
            to: Point::new(x, size.height),
            stroke,
        });
        x += GRID_SPACING;
    }
    let mut y = 0.0;
    while y <= size.height {
        lines.push(Node::Line {
            from: Point::new(0.0, y),
            to: Point::new(size.width, y),
            stroke,
        });
        y += GRID_SPACING;
    }
    Node::group(Affine::IDENTITY, 1.0, lines)
}

fn candle_node(
    index: usize,
    candle: &Candle,
    settings: &Settings,
    scale: &PriceScale,
    clock: Clock,
) -> Option<Node> {
    let timing = &settings.timing;
    let layout = &settings.chart;
    let delay = index as f64 * timing.candle_stagger_secs;

    let p = Entrance::spring(delay, timing.candle_spring).progress(clock);
    if p <= 0.0 {
        return None;
    }

    let color = if candle.is_bull() {
        settings.palette.bull
    } else {
        settings.palette.bear
    };
    let x = layout.column_left(index);
    let cx = layout.column_center(index);
    let high_y = scale.price_to_y(candle.high);
    let low_y = scale.price_to_y(candle.low);
    let top = scale.price_to_y(candle.body_top());
    let full_height = (scale.price_to_y(candle.body_bottom()) - top).max(1.0);

    let mut children = Vec::with_capacity(2);
    let wick = Entrance::tween(
        delay + timing.wick_delay_secs,
        timing.wick_duration_secs,
        Ease::OutQuad,
    )
    .progress(clock);
    if wick > 0.0 {
        children.push(Node::Line {
            from: Point::new(cx, high_y),
            to: Point::new(cx, high_y + (low_y - high_y) * wick),
            stroke: Stroke::new(color, 1.0),
        });
    }

    // The body grows upward from its bottom edge.
    let grow = Entrance::spring(delay, timing.body_spring).progress(clock).max(0.0);
    let height = full_height * grow;
    if height > 0.0 {
        children.push(Node::Rect {
            rect: Rect::new(x, top + full_height - height, x + layout.column_width, top + full_height),
            radius: 1.0,
            fill: color,
            stroke: None,
        });
    }

    Some(Node::group(
        Affine::translate((0.0, (1.0 - p) * timing.candle_rise_px)),
        p.clamp(0.0, 1.0),
        children,
    ))
}

fn trendline_node(line: &Trendline, timing: &AnimationTiming, clock: Clock) -> Option<Node> {
    if line.points.len() < 2 {
        return None;
    }
    let delay = f64::from(line.delay_rank) * timing.rank_step_secs + timing.trendline_base_delay_secs;

    let mut children = Vec::with_capacity(3);
    let draw = Entrance::tween(delay, timing.trendline_draw_secs, Ease::InOutCubic).progress(clock);
    if draw > 0.0 {
        let partial = partial_polyline(&line.points, draw);
        children.push(Node::Polyline {
            points: partial.clone(),
            stroke: Stroke::new(line.color.faded(0.5 * draw), 8.0),
            blur: 6.0,
        });
        children.push(Node::Polyline {
            points: partial,
            stroke: Stroke::new(Rgba8::WHITE, 2.0),
            blur: 0.0,
        });
    }

    if let Some(label) = line.label.as_deref().filter(|l| !l.trim().is_empty()) {
        let fade = Entrance::tween(
            delay + timing.label_delay_secs,
            timing.label_fade_secs,
            Ease::OutQuad,
        )
        .progress(clock);
        if fade > 0.0 {
            let first = line.points[0];
            let last = line.points[line.points.len() - 1];
            let mid = first.midpoint(last);
            children.push(Node::Text(TextRun {
                at: Point::new(mid.x, mid.y - 15.0 + 10.0 * (1.0 - fade)),
                text: label.to_uppercase(),
                size: 14.0,
                weight: 600,
                fill: line.color.faded(fade),
                anchor: TextAnchor::Middle,
                monospace: false,
            }));
        }
    }

    (!children.is_empty()).then(|| Node::group(Affine::IDENTITY, 1.0, children))
}

fn callout_node(
    callout: &Callout,
    timing: &AnimationTiming,
    palette: &Palette,
    clock: Clock,
) -> Option<Node> {
    let delay =
        f64::from(callout.delay_rank) * timing.rank_step_secs + timing.callout_base_delay_secs;
    let p = Entrance::spring(delay, timing.callout_spring).progress(clock);
    if p <= 0.0 {
        return None;
    }

    let accent = match callout.tone {
        Tone::Bull => palette.bull,
        Tone::Bear => palette.bear,
        Tone::Info => palette.accent,
    };
    let scale = timing.callout_start_scale + (1.0 - timing.callout_start_scale) * p;
    let center = Vec2::new(CARD_WIDTH / 2.0, CARD_HEIGHT / 2.0);
    let transform = Affine::translate((
        callout.position.x,
        callout.position.y + timing.callout_rise_px * (1.0 - p),
    )) * Affine::translate(center)
        * Affine::scale(scale)
        * Affine::translate(-center);

    let connector_end = Point::new(24.0, CARD_HEIGHT + CONNECTOR_LENGTH);
    let children = vec![
        Node::Rect {
            rect: Rect::new(0.0, 0.0, CARD_WIDTH, CARD_HEIGHT),
            radius: 12.0,
            fill: palette.card,
            stroke: Some(Stroke::new(accent.faded(0.5), 1.0)),
        },
        Node::Rect {
            rect: Rect::new(16.0, 16.0, 44.0, 44.0),
            radius: 8.0,
            fill: accent.faded(0.125),
            stroke: None,
        },
        Node::Circle {
            center: Point::new(30.0, 30.0),
            radius: 5.0,
            fill: accent,
        },
        Node::Text(TextRun {
            at: Point::new(56.0, 35.0),
            text: callout.title.to_uppercase(),
            size: 14.0,
            weight: 700,
            fill: palette.text,
            anchor: TextAnchor::Start,
            monospace: false,
        }),
        Node::Text(TextRun {
            at: Point::new(16.0, 68.0),
            text: callout.description.clone(),
            size: 11.0,
            weight: 400,
            fill: palette.muted,
            anchor: TextAnchor::Start,
            monospace: true,
        }),
        Node::Line {
            from: Point::new(24.0, CARD_HEIGHT),
            to: connector_end,
            stroke: Stroke::new(accent, 2.0),
        },
        Node::Circle {
            center: connector_end,
            radius: 4.0,
            fill: accent,
        },
    ];

    Some(Node::group(transform, p.clamp(0.0, 1.0), children))
}

fn title_node(
    title: &TitleCard,
    timing: &AnimationTiming,
    palette: &Palette,
    clock: Clock,
) -> Option<Node> {
    let p = Entrance::spring(timing.title_delay_secs, timing.title_spring)
        .progress(clock)
        .clamp(0.0, 1.0);
    if p <= 0.0 {
        return None;
    }
    let mut children = vec![Node::Text(TextRun {
        at: Point::new(100.0, 160.0),
        text: title.title.clone(),
        size: 80.0,
        weight: 800,
        fill: palette.text,
        anchor: TextAnchor::Start,
        monospace: false,
    })];
    if !title.subtitle.is_empty() {
        children.push(Node::Text(TextRun {
            at: Point::new(100.0, 208.0),
            text: title.subtitle.clone(),
            size: 40.0,
            weight: 400,
            fill: palette.muted,
            anchor: TextAnchor::Start,
            monospace: false,
        }));
    }
    Some(Node::group(Affine::IDENTITY, p, children))
}

/// Prefix of `points` covering fraction `t` of the polyline's total length.
pub fn partial_polyline(points: &[Point], t: f64) -> Vec<Point> {
    let t = t.clamp(0.0, 1.0);
    if points.len() < 2 || t >= 1.0 {
        return points.to_vec();
    }
    let total: f64 = points.windows(2).map(|w| w[0].distance(w[1])).sum();
    if total <= 0.0 {
        return points[..2].to_vec();
    }

    let mut remaining = total * t;
    let mut out = vec![points[0]];
    for w in points.windows(2) {
        let seg = w[0].distance(w[1]);
        if seg >= remaining {
            let f = if seg > 0.0 { remaining / seg } else { 0.0 };
            out.push(w[0].lerp(w[1], f));
            return out;
        }
        remaining -= seg;
        out.push(w[1]);
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/scene/evaluator.rs"]
mod tests;
