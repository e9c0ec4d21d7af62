//! Synthetic candle series for seeding the editor.
//!
//! Every generator draws from a caller-supplied [`rand::Rng`]; pass a seeded `StdRng` for
//! reproducible output.

/// 15-minute mock market data.
pub mod mock;
/// Named chart patterns (bull flag, random walk).
pub mod pattern;
/// Biased trends (uptrend, downtrend, ranging).
pub mod trend;
