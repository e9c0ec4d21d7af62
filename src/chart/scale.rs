use serde::{Deserialize, Serialize};

use crate::chart::candle::Candle;

/// Inclusive price interval.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

impl Default for PriceRange {
    fn default() -> Self {
        Self {
            min: 64_000.0,
            max: 66_000.0,
        }
    }
}

/// Affine mapping between price space and chart-local pixel Y (0 at the top).
///
/// A degenerate range (`max <= min`, or non-finite bounds) is widened to one price unit, and a
/// non-positive height is treated as one pixel, so both directions are always defined.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PriceScale {
    min: f64,
    max: f64,
    height: f64,
}

impl PriceScale {
    pub fn new(min: f64, max: f64, height: f64) -> Self {
        let min = if min.is_finite() { min } else { 0.0 };
        let max = if max.is_finite() && max > min { max } else { min + 1.0 };
        let height = if height.is_finite() && height > 0.0 {
            height
        } else {
            1.0
        };
        Self { min, max, height }
    }

    /// Derive the range from the lowest low / highest high of `candles`, expanded by `padding`
    /// (a fraction of each bound's magnitude). An empty series maps `fallback` instead.
    pub fn from_candles<'a>(
        candles: impl IntoIterator<Item = &'a Candle>,
        height: f64,
        padding: f64,
        fallback: PriceRange,
    ) -> Self {
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for c in candles {
            if !c.is_finite() {
                continue;
            }
            lo = lo.min(c.low);
            hi = hi.max(c.high);
        }

        if lo > hi {
            return Self::new(fallback.min, fallback.max, height);
        }
        let padding = padding.max(0.0);
        Self::new(lo - lo.abs() * padding, hi + hi.abs() * padding, height)
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    pub fn price_to_y(&self, price: f64) -> f64 {
        self.height - (price - self.min) * self.height / self.span()
    }

    pub fn y_to_price(&self, y: f64) -> f64 {
        self.min + (self.height - y) * self.span() / self.height
    }

    /// Price change corresponding to a vertical drag from `from_y` to `to_y`.
    pub fn price_delta(&self, from_y: f64, to_y: f64) -> f64 {
        (from_y - to_y) * self.span() / self.height
    }
}

#[cfg(test)]
#[path = "../../tests/unit/chart/scale.rs"]
mod tests;
