//! Candle import from exported chart data.

/// TradingView-style CSV (`time,open,high,low,close[,volume]`).
pub mod csv;
