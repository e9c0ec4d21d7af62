use std::io::Write as _;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::Duration;

use anyhow::Context as _;
use serde::Deserialize;

use crate::chart::candle::Candle;
use crate::foundation::error::{TradeAnimError, TradeAnimResult};
use crate::foundation::process::wait_with_timeout;

/// Candle measured in image pixels; y grows downward.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct PixelCandle {
    pub y_open: f64,
    pub y_close: f64,
    pub y_high: f64,
    pub y_low: f64,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DelegateOutput {
    Error { error: String },
    Candles { candles: Vec<Candle> },
    Raw { raw_candles: Vec<PixelCandle> },
}

/// External screenshot-to-candles program.
///
/// The image is written to a temporary file whose path is passed as the last argument; the
/// program prints one JSON document on stdout.
#[derive(Clone, Debug)]
pub struct VisionPipeline {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub timeout: Duration,
}

impl VisionPipeline {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args,
            timeout,
        }
    }

    /// Extract candles from an uploaded chart image. `extension` is the upload's file extension.
    #[tracing::instrument(level = "info", skip(self, image), fields(program = %self.program.display(), bytes = image.len()))]
    pub fn analyze(&self, image: &[u8], extension: &str) -> TradeAnimResult<Vec<Candle>> {
        let suffix = format!(".{}", extension.trim_start_matches('.'));
        // Removed on drop, whichever way this function returns.
        let mut upload = tempfile::Builder::new()
            .prefix("tradeanim-upload-")
            .suffix(&suffix)
            .tempfile()
            .context("create upload temp file")?;
        upload.write_all(image).context("write upload temp file")?;
        upload.flush().context("flush upload temp file")?;

        let program = self.program.display().to_string();
        let child = Command::new(&self.program)
            .args(&self.args)
            .arg(upload.path())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| TradeAnimError::service(format!("failed to spawn {program}: {e}")))?;
        let output = wait_with_timeout(child, &program, self.timeout)?;

        let parsed = parse_output(&String::from_utf8_lossy(&output.stdout));
        if output.status.success() {
            let candles = parsed?;
            tracing::info!(candles = candles.len(), "vision delegate finished");
            return Ok(candles);
        }
        match parsed {
            Err(e @ TradeAnimError::Service(_)) => Err(e),
            _ => Err(TradeAnimError::service(format!(
                "{program} exited with status {}: {}",
                output.status,
                output.stderr_lossy()
            ))),
        }
    }
}

/// Parse the delegate's stdout. An `{"error": ..}` body becomes a service error.
pub fn parse_output(stdout: &str) -> TradeAnimResult<Vec<Candle>> {
    let output: DelegateOutput = serde_json::from_str(stdout.trim()).map_err(|e| {
        TradeAnimError::serde(format!("vision output is not a recognized JSON document: {e}"))
    })?;
    match output {
        DelegateOutput::Error { error } => Err(TradeAnimError::service(error)),
        DelegateOutput::Candles { candles } => Ok(candles.into_iter().map(Candle::normalized).collect()),
        DelegateOutput::Raw { raw_candles } => Ok(normalize_pixel_candles(&raw_candles)),
    }
}

/// Flip pixel candles into prices: the lowest point of the image plus 50 is price 0.
pub fn normalize_pixel_candles(raw: &[PixelCandle]) -> Vec<Candle> {
    let max_y = raw
        .iter()
        .flat_map(|c| [c.y_open, c.y_close, c.y_high, c.y_low])
        .fold(f64::NEG_INFINITY, f64::max);
    let reference = max_y + 50.0;
    raw.iter()
        .enumerate()
        .map(|(i, c)| {
            Candle::new(
                reference - c.y_open,
                reference - c.y_high,
                reference - c.y_low,
                reference - c.y_close,
                i as i64,
            )
            .normalized()
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/service/vision.rs"]
mod tests;
