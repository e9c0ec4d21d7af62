use serde::{Deserialize, Serialize};

use crate::chart::candle::Candle;
use crate::chart::layout::ChartLayout;
use crate::chart::scale::PriceScale;
use crate::editor::state::{CalloutId, CandleId, EditorState, TrendlineId};
use crate::foundation::core::Point;
use crate::foundation::error::{TradeAnimError, TradeAnimResult};

/// Pixel tolerances for pointer hit-testing.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HitTolerance {
    /// Half-size of the square box around callout anchors and trendline points.
    pub select_radius: f64,
    /// Extra grab distance beyond a wick's tip.
    pub wick_grab: f64,
}

impl Default for HitTolerance {
    fn default() -> Self {
        Self {
            select_radius: 50.0,
            wick_grab: 10.0,
        }
    }
}

impl HitTolerance {
    pub fn validate(&self) -> TradeAnimResult<()> {
        if !(self.select_radius.is_finite() && self.select_radius >= 0.0) {
            return Err(TradeAnimError::validation("select_radius must be >= 0"));
        }
        if !(self.wick_grab.is_finite() && self.wick_grab >= 0.0) {
            return Err(TradeAnimError::validation("wick_grab must be >= 0"));
        }
        Ok(())
    }
}

/// Part of a candle that was grabbed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Handle {
    High,
    Low,
    Body,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Hit {
    Callout(CalloutId),
    TrendlinePoint { id: TrendlineId, point: usize },
    /// `handle` is `None` when the column was hit away from the candle's wicks and body.
    Candle {
        id: CandleId,
        index: usize,
        handle: Option<Handle>,
    },
}

/// Resolve what sits under `p`: callouts first, then trendline points, then the candle column.
pub fn hit_test(
    state: &EditorState,
    layout: &ChartLayout,
    tolerance: &HitTolerance,
    scale: &PriceScale,
    p: Point,
) -> Option<Hit> {
    let near = |q: Point| {
        (q.x - p.x).abs() < tolerance.select_radius && (q.y - p.y).abs() < tolerance.select_radius
    };

    if let Some(c) = state.callouts.iter().find(|c| near(c.position)) {
        return Some(Hit::Callout(c.id));
    }

    for line in &state.trendlines {
        if let Some(point) = line.points.iter().position(|&q| near(q)) {
            return Some(Hit::TrendlinePoint { id: line.id, point });
        }
    }

    let index = layout.column_at(p.x)?;
    let entry = state.candles.get(index)?;
    Some(Hit::Candle {
        id: entry.id,
        index,
        handle: candle_handle(&entry.candle, scale, tolerance.wick_grab, p.y),
    })
}

/// Which handle of `candle` a pointer at pixel `y` grabs, checked high, low, then body.
pub fn candle_handle(
    candle: &Candle,
    scale: &PriceScale,
    wick_grab: f64,
    y: f64,
) -> Option<Handle> {
    let high_y = scale.price_to_y(candle.high);
    let low_y = scale.price_to_y(candle.low);
    let body_top_y = scale.price_to_y(candle.body_top());
    let body_bottom_y = scale.price_to_y(candle.body_bottom());

    if y >= high_y - wick_grab && y <= body_top_y {
        Some(Handle::High)
    } else if y >= body_bottom_y && y <= low_y + wick_grab {
        Some(Handle::Low)
    } else if y >= body_top_y && y <= body_bottom_y {
        Some(Handle::Body)
    } else {
        None
    }
}

#[cfg(test)]
#[path = "../../tests/unit/editor/hit.rs"]
mod tests;
