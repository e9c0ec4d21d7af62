//! Chart data and geometry: candles, price scale, column layout, annotations.

pub mod annotation;
pub mod candle;
pub mod layout;
pub mod scale;
