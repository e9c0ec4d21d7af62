use serde::{Deserialize, Serialize};

use crate::chart::candle::Candle;
use crate::chart::scale::{PriceRange, PriceScale};
use crate::foundation::core::Size;
use crate::foundation::error::{TradeAnimError, TradeAnimResult};

/// Chart geometry in chart-local pixels: fixed-width candle columns laid out left to right.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartLayout {
    pub chart_height: f64,
    pub column_width: f64,
    pub gap: f64,
    /// Fraction of each price bound's magnitude added around the observed range.
    pub price_padding: f64,
    pub fallback_range: PriceRange,
}

impl Default for ChartLayout {
    fn default() -> Self {
        Self {
            chart_height: 800.0,
            column_width: 16.0,
            gap: 8.0,
            price_padding: 0.05,
            fallback_range: PriceRange::default(),
        }
    }
}

impl ChartLayout {
    pub fn validate(&self) -> TradeAnimResult<()> {
        if !(self.chart_height.is_finite() && self.chart_height > 0.0) {
            return Err(TradeAnimError::validation("chart_height must be > 0"));
        }
        if !(self.column_width.is_finite() && self.column_width > 0.0) {
            return Err(TradeAnimError::validation("column_width must be > 0"));
        }
        if !(self.gap.is_finite() && self.gap >= 0.0) {
            return Err(TradeAnimError::validation("gap must be >= 0"));
        }
        if !(self.price_padding.is_finite() && self.price_padding >= 0.0) {
            return Err(TradeAnimError::validation("price_padding must be >= 0"));
        }
        if !(self.fallback_range.max > self.fallback_range.min) {
            return Err(TradeAnimError::validation(
                "fallback_range max must be greater than min",
            ));
        }
        Ok(())
    }

    pub fn pitch(&self) -> f64 {
        self.column_width + self.gap
    }

    /// Column under chart-local `x`, or `None` left of the chart.
    pub fn column_at(&self, x: f64) -> Option<usize> {
        let col = (x / self.pitch()).floor();
        (col.is_finite() && col >= 0.0).then_some(col as usize)
    }

    pub fn column_left(&self, index: usize) -> f64 {
        index as f64 * self.pitch()
    }

    pub fn column_center(&self, index: usize) -> f64 {
        self.column_left(index) + self.column_width / 2.0
    }

    pub fn price_scale<'a>(&self, candles: impl IntoIterator<Item = &'a Candle>) -> PriceScale {
        PriceScale::from_candles(
            candles,
            self.chart_height,
            self.price_padding,
            self.fallback_range,
        )
    }

    /// Pixel extent of a chart with `candle_count` columns (at least one column wide).
    pub fn extent(&self, candle_count: usize) -> Size {
        Size::new(
            self.pitch() * candle_count.max(1) as f64,
            self.chart_height,
        )
    }
}

#[cfg(test)]
#[path = "../../tests/unit/chart/layout.rs"]
mod tests;
