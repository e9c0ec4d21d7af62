use chrono::{DateTime, NaiveDate, NaiveDateTime};

use crate::chart::candle::Candle;
use crate::foundation::error::{TradeAnimError, TradeAnimResult};

/// Unix values below this are seconds, at or above it milliseconds.
const MILLIS_THRESHOLD: f64 = 1e11;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CsvOptions {
    /// Time of the first row when its time column cannot be parsed.
    pub fallback_start_ms: i64,
    /// Spacing used for rows whose time cannot be parsed.
    pub fallback_step_ms: i64,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            fallback_start_ms: 0,
            fallback_step_ms: 60_000,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Columns {
    time: usize,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
}

impl Default for Columns {
    fn default() -> Self {
        Self {
            time: 0,
            open: 1,
            high: 2,
            low: 3,
            close: 4,
        }
    }
}

impl Columns {
    /// Column positions from a header row, or `None` if the row is data.
    fn from_header(row: &csv::StringRecord) -> Option<Self> {
        let names: Vec<String> = row.iter().map(|h| h.trim().to_ascii_lowercase()).collect();
        let find = |pred: &dyn Fn(&str) -> bool| names.iter().position(|n| pred(n.as_str()));
        let is_header = names.iter().any(|n| {
            matches!(
                n.as_str(),
                "time" | "date" | "datetime" | "timestamp" | "open" | "high" | "low" | "close" | "volume"
            )
        });
        if !is_header {
            return None;
        }
        let d = Self::default();
        Some(Self {
            time: find(&|n| n == "time" || n == "date" || n == "datetime" || n.contains("timestamp"))
                .unwrap_or(d.time),
            open: find(&|n| n == "open").unwrap_or(d.open),
            high: find(&|n| n == "high").unwrap_or(d.high),
            low: find(&|n| n == "low").unwrap_or(d.low),
            close: find(&|n| n == "close").unwrap_or(d.close),
        })
    }
}

pub fn parse_candles_csv(text: &str) -> TradeAnimResult<Vec<Candle>> {
    parse_candles_csv_with(text, &CsvOptions::default())
}

/// Parse candles from CSV text.
///
/// Rows with fewer than five columns or an unparseable price are skipped; candles are normalized
/// so the wicks cover the body. No candle at all is an error.
#[tracing::instrument(level = "debug", skip(text), fields(bytes = text.len()))]
pub fn parse_candles_csv_with(text: &str, opts: &CsvOptions) -> TradeAnimResult<Vec<Candle>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut columns = Columns::default();
    let mut candles: Vec<Candle> = Vec::new();
    let mut skipped = 0usize;

    for (row, record) in reader.records().enumerate() {
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                tracing::debug!(row, error = %e, "skipping unreadable csv row");
                skipped += 1;
                continue;
            }
        };
        if row == 0
            && let Some(header) = Columns::from_header(&record)
        {
            columns = header;
            continue;
        }
        if record.len() < 5 || record.iter().all(str::is_empty) {
            skipped += 1;
            continue;
        }

        let price = |i: usize| {
            record
                .get(i)
                .and_then(|s| s.parse::<f64>().ok())
                .filter(|v| v.is_finite())
        };
        let (Some(open), Some(high), Some(low), Some(close)) = (
            price(columns.open),
            price(columns.high),
            price(columns.low),
            price(columns.close),
        ) else {
            skipped += 1;
            continue;
        };

        let time = record
            .get(columns.time)
            .and_then(parse_time_ms)
            .unwrap_or_else(|| match candles.last() {
                Some(prev) => prev.time + opts.fallback_step_ms,
                None => opts.fallback_start_ms,
            });
        candles.push(Candle::new(open, high, low, close, time).normalized());
    }

    if candles.is_empty() {
        return Err(TradeAnimError::import("no candle rows found in csv"));
    }
    tracing::debug!(parsed = candles.len(), skipped, "csv parsed");
    Ok(candles)
}

/// RFC 3339, `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DD` (UTC) or a Unix timestamp in seconds or
/// milliseconds.
pub fn parse_time_ms(s: &str) -> Option<i64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(v) = s.parse::<f64>() {
        if !v.is_finite() {
            return None;
        }
        let ms = if v.abs() < MILLIS_THRESHOLD { v * 1000.0 } else { v };
        return Some(ms.round() as i64);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.timestamp_millis());
    }
    for fmt in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.and_utc().timestamp_millis());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_millis())
}

#[cfg(test)]
#[path = "../../tests/unit/import/csv.rs"]
mod tests;
