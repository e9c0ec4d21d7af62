use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::chart::candle::Candle;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendKind {
    Uptrend,
    Downtrend,
    Ranging,
}

impl TrendKind {
    /// Signed drift added to every close, scaled by `bias`.
    fn drift(self, bias: f64) -> f64 {
        match self {
            Self::Uptrend => bias,
            Self::Downtrend => -bias,
            Self::Ranging => 0.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrendParams {
    pub count: usize,
    pub start_price: f64,
    /// Maximum close noise and wick length.
    pub volatility: f64,
    /// Per-candle drift magnitude for up/down trends.
    pub bias: f64,
    pub start_ms: i64,
    pub step_ms: i64,
}

impl Default for TrendParams {
    fn default() -> Self {
        Self {
            count: 60,
            start_price: 10_000.0,
            volatility: 20.0,
            bias: 15.0,
            start_ms: 0,
            step_ms: 60_000,
        }
    }
}

/// A chained series where each candle opens at the previous close.
pub fn trend(kind: TrendKind, params: &TrendParams, rng: &mut impl Rng) -> Vec<Candle> {
    let v = params.volatility;
    let drift = kind.drift(params.bias);
    let mut price = params.start_price;
    let mut time = params.start_ms;

    let mut out = Vec::with_capacity(params.count);
    for _ in 0..params.count {
        let open = price;
        let close = open + drift + (rng.gen_range(0.0..1.0) * v * 2.0 - v);
        let high = open.max(close) + rng.gen_range(0.0..1.0) * v;
        let low = open.min(close) - rng.gen_range(0.0..1.0) * v;
        out.push(Candle::new(open, high, low, close, time));
        price = close;
        time += params.step_ms;
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/generate/trend.rs"]
mod tests;
