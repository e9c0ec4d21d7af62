use serde::{Deserialize, Serialize};

/// One OHLC price bar. `time` is Unix milliseconds (or a plain sequence index for data that has
/// no clock, such as vision output).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub time: i64,
}

impl Candle {
    pub fn new(open: f64, high: f64, low: f64, close: f64, time: i64) -> Self {
        Self {
            open,
            high,
            low,
            close,
            time,
        }
    }

    /// The fallback bar used when a render is requested for an empty series.
    pub fn placeholder(time: i64) -> Self {
        Self::new(100.0, 110.0, 95.0, 105.0, time)
    }

    pub fn is_bull(&self) -> bool {
        self.close >= self.open
    }

    pub fn body_top(&self) -> f64 {
        self.open.max(self.close)
    }

    pub fn body_bottom(&self) -> f64 {
        self.open.min(self.close)
    }

    pub fn is_finite(&self) -> bool {
        self.open.is_finite() && self.high.is_finite() && self.low.is_finite() && self.close.is_finite()
    }

    /// `high >= max(open, close)` and `low <= min(open, close)`.
    pub fn wicks_cover_body(&self) -> bool {
        self.high >= self.body_top() && self.low <= self.body_bottom()
    }

    /// Widen the wicks just enough to cover the body.
    pub fn normalized(self) -> Self {
        Self {
            high: self.high.max(self.body_top()),
            low: self.low.min(self.body_bottom()),
            ..self
        }
    }

    /// Shift every price by `delta`, keeping the shape.
    pub fn shifted(self, delta: f64) -> Self {
        Self {
            open: self.open + delta,
            high: self.high + delta,
            low: self.low + delta,
            close: self.close + delta,
            ..self
        }
    }
}

/// Partial candle update. Non-finite prices are ignored, and the result is normalized.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CandlePatch {
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub time: Option<i64>,
}

impl CandlePatch {
    pub fn prices(open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            open: Some(open),
            high: Some(high),
            low: Some(low),
            close: Some(close),
            time: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn apply_to(&self, candle: Candle) -> Candle {
        fn pick(update: Option<f64>, current: f64) -> f64 {
            match update {
                Some(v) if v.is_finite() => v,
                _ => current,
            }
        }

        Candle {
            open: pick(self.open, candle.open),
            high: pick(self.high, candle.high),
            low: pick(self.low, candle.low),
            close: pick(self.close, candle.close),
            time: self.time.unwrap_or(candle.time),
        }
        .normalized()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/chart/candle.rs"]
mod tests;
