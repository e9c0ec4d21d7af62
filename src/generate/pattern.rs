use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::chart::candle::Candle;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pattern {
    BullFlag,
    RandomWalk,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Direction {
    Bull,
    Bear,
    Neutral,
}

/// One candle opening at `start`: body up to `volatility`, each wick up to half of it.
fn generate_candle(start: f64, direction: Direction, volatility: f64, rng: &mut impl Rng) -> Candle {
    let bull = match direction {
        Direction::Bull => true,
        Direction::Bear => false,
        Direction::Neutral => rng.gen_bool(0.5),
    };
    let body = rng.gen_range(0.0..1.0) * volatility;
    let open = start;
    let close = if bull { open + body } else { open - body };
    let high = open.max(close) + rng.gen_range(0.0..1.0) * volatility * 0.5;
    let low = open.min(close) - rng.gen_range(0.0..1.0) * volatility * 0.5;
    Candle::new(open, high, low, close, 0)
}

/// `count` chained candles shaped like `pattern`; `time` is the candle index.
///
/// A bull flag is a 20% pole of strong bull candles, a 60% drifting flag (every third candle
/// bullish) and a high-volatility bullish breakout for the rest.
pub fn pattern(pattern: Pattern, count: usize, start_price: f64, rng: &mut impl Rng) -> Vec<Candle> {
    let pole = count / 5;
    let flag = count * 3 / 5;

    let mut out = Vec::with_capacity(count);
    let mut price = start_price;
    for i in 0..count {
        let (direction, volatility) = match pattern {
            Pattern::BullFlag if i < pole => (Direction::Bull, 4.0),
            Pattern::BullFlag if i < pole + flag => {
                if (i - pole) % 3 == 0 {
                    (Direction::Bull, 1.5)
                } else {
                    (Direction::Bear, 1.5)
                }
            }
            Pattern::BullFlag => (Direction::Bull, 5.0),
            Pattern::RandomWalk => (Direction::Neutral, 2.0),
        };
        let mut c = generate_candle(price, direction, volatility, rng);
        c.time = i as i64;
        price = c.close;
        out.push(c);
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/generate/pattern.rs"]
mod tests;
