use crate::chart::candle::Candle;
use crate::chart::scale::PriceScale;
use crate::editor::hit::Handle;
use crate::editor::state::{CandleId, TrendlineId};

/// A captured pointer gesture, alive from pointer-down until pointer-up (or leave).
///
/// Each variant freezes the price scale seen at pointer-down, so the pixel/price mapping does not
/// drift while the drag itself changes the series' range.
#[derive(Clone, Debug, PartialEq)]
pub enum Gesture {
    DrawCandle {
        candle: CandleId,
        open: f64,
        scale: PriceScale,
    },
    DrawTrendline {
        trendline: TrendlineId,
    },
    Sculpt {
        candle: CandleId,
        handle: Handle,
        start_y: f64,
        snapshot: Candle,
        scale: PriceScale,
    },
}

/// Reshape `snapshot` by a total price `delta` applied to `handle`.
///
/// High never drops below the body top, low never rises above the body bottom, and a body drag
/// moves all four prices together.
pub fn sculpt(snapshot: &Candle, handle: Handle, delta: f64) -> Candle {
    match handle {
        Handle::High => Candle {
            high: snapshot.body_top().max(snapshot.high + delta),
            ..*snapshot
        },
        Handle::Low => Candle {
            low: snapshot.body_bottom().min(snapshot.low + delta),
            ..*snapshot
        },
        Handle::Body => snapshot.shifted(delta),
    }
}

/// Candle for a draw-candle drag that currently points at `price`.
pub fn drawn_candle(open: f64, price: f64, time: i64) -> Candle {
    let spread = (open - price).abs() * 0.1;
    Candle {
        open,
        close: price,
        high: open.max(price) + spread,
        low: open.min(price) - spread,
        time,
    }
}

#[cfg(test)]
#[path = "../../tests/unit/editor/gesture.rs"]
mod tests;
