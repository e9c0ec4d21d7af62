use rand::Rng;

use crate::chart::candle::Candle;

const STEP_MS: i64 = 15 * 60 * 1000;

/// Market-like series: 0.5% volatility per candle with a slight upward drift, 15 minutes apart.
pub fn mock_series(count: usize, start_price: f64, start_ms: i64, rng: &mut impl Rng) -> Vec<Candle> {
    let mut price = start_price;
    let mut out = Vec::with_capacity(count);
    for i in 0..count {
        let volatility = price * 0.005;
        let drift = (rng.gen_range(0.0..1.0) - 0.45) * volatility;
        let open = price;
        let close = open + drift + (rng.gen_range(0.0..1.0) - 0.5) * volatility;
        let high = open.max(close) + rng.gen_range(0.0..1.0) * volatility * 0.5;
        let low = open.min(close) - rng.gen_range(0.0..1.0) * volatility * 0.5;
        out.push(Candle::new(open, high, low, close, start_ms + i as i64 * STEP_MS));
        price = close;
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/generate/mock.rs"]
mod tests;
