//! Runtime settings shared by the editor, renderer and export services.
//!
//! Every field has a default, so a settings file only needs the values it overrides:
//!
//! ```json
//! { "video": { "width": 1280, "height": 720, "fps": 30 }, "palette": { "bull": "#22c55e" } }
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::animation::spring::Spring;
use crate::chart::layout::ChartLayout;
use crate::editor::hit::HitTolerance;
use crate::encode::ffmpeg::Container;
use crate::foundation::color::Rgba8;
use crate::foundation::core::{Canvas, Fps, FrameIndex, FrameRange};
use crate::foundation::error::{TradeAnimError, TradeAnimResult};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub chart: ChartLayout,
    pub hit: HitTolerance,
    pub timing: AnimationTiming,
    pub palette: Palette,
    pub video: VideoSettings,
    pub export: ExportSettings,
}

impl Settings {
    /// Load and validate settings from a JSON file.
    pub fn from_path(path: &Path) -> TradeAnimResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read settings '{}'", path.display()))?;
        let settings: Self = serde_json::from_str(&text).map_err(|e| {
            TradeAnimError::serde(format!("parse settings '{}': {e}", path.display()))
        })?;
        settings.validate()?;
        Ok(settings)
    }

    /// Defaults when `path` is `None`.
    pub fn load(path: Option<&Path>) -> TradeAnimResult<Self> {
        match path {
            Some(path) => Self::from_path(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> TradeAnimResult<()> {
        self.chart.validate()?;
        self.hit.validate()?;
        self.timing.validate()?;
        self.video.validate()?;
        self.export.validate()?;
        Ok(())
    }
}

/// Entrance timing for every animated element, in seconds and pixels.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationTiming {
    /// Delay added per candle index.
    pub candle_stagger_secs: f64,
    pub candle_spring: Spring,
    /// Vertical distance a candle rises from while fading in.
    pub candle_rise_px: f64,
    pub wick_delay_secs: f64,
    pub wick_duration_secs: f64,
    pub body_spring: Spring,

    /// Delay added per trendline/callout rank.
    pub rank_step_secs: f64,
    pub trendline_base_delay_secs: f64,
    pub trendline_draw_secs: f64,
    pub label_delay_secs: f64,
    pub label_fade_secs: f64,

    pub callout_base_delay_secs: f64,
    pub callout_spring: Spring,
    pub callout_rise_px: f64,
    pub callout_start_scale: f64,

    pub title_delay_secs: f64,
    pub title_spring: Spring,
}

impl Default for AnimationTiming {
    fn default() -> Self {
        Self {
            candle_stagger_secs: 0.05,
            candle_spring: Spring::new(100.0, 15.0),
            candle_rise_px: 50.0,
            wick_delay_secs: 0.1,
            wick_duration_secs: 0.4,
            body_spring: Spring::new(120.0, 10.0),
            rank_step_secs: 0.05,
            trendline_base_delay_secs: 0.5,
            trendline_draw_secs: 1.5,
            label_delay_secs: 1.0,
            label_fade_secs: 0.5,
            callout_base_delay_secs: 1.0,
            callout_spring: Spring::new(200.0, 15.0),
            callout_rise_px: 20.0,
            callout_start_scale: 0.8,
            title_delay_secs: 1.0,
            title_spring: Spring::default(),
        }
    }
}

impl AnimationTiming {
    pub fn validate(&self) -> TradeAnimResult<()> {
        for spring in [
            &self.candle_spring,
            &self.body_spring,
            &self.callout_spring,
            &self.title_spring,
        ] {
            spring.validate()?;
        }
        let non_negative = [
            ("candle_stagger_secs", self.candle_stagger_secs),
            ("wick_delay_secs", self.wick_delay_secs),
            ("wick_duration_secs", self.wick_duration_secs),
            ("rank_step_secs", self.rank_step_secs),
            ("trendline_base_delay_secs", self.trendline_base_delay_secs),
            ("trendline_draw_secs", self.trendline_draw_secs),
            ("label_delay_secs", self.label_delay_secs),
            ("label_fade_secs", self.label_fade_secs),
            ("callout_base_delay_secs", self.callout_base_delay_secs),
            ("title_delay_secs", self.title_delay_secs),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(TradeAnimError::validation(format!("{name} must be >= 0")));
            }
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub background: Rgba8,
    pub grid: Rgba8,
    pub bull: Rgba8,
    pub bear: Rgba8,
    pub accent: Rgba8,
    pub card: Rgba8,
    pub text: Rgba8,
    pub muted: Rgba8,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: Rgba8::rgb(0x09, 0x09, 0x0b),
            grid: Rgba8::rgba(255, 255, 255, 13),
            bull: Rgba8::rgb(0x10, 0xb9, 0x81),
            bear: Rgba8::rgb(0xef, 0x44, 0x44),
            accent: crate::chart::annotation::ACCENT,
            card: Rgba8::rgba(0x18, 0x18, 0x1b, 0xd9),
            text: Rgba8::WHITE,
            muted: Rgba8::rgb(0x9c, 0xa3, 0xaf),
        }
    }
}

/// Output video geometry and timing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoSettings {
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    pub duration_frames: u64,
    pub container: Container,
    /// Fraction of each canvas side left empty around the chart.
    pub margin: f64,
}

impl Default for VideoSettings {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            fps: 60,
            duration_frames: 300,
            container: Container::Mp4,
            margin: 0.1,
        }
    }
}

impl VideoSettings {
    pub fn validate(&self) -> TradeAnimResult<()> {
        self.canvas().validate()?;
        self.fps()?;
        if self.duration_frames == 0 {
            return Err(TradeAnimError::validation("duration_frames must be > 0"));
        }
        if !(self.margin.is_finite() && (0.0..0.5).contains(&self.margin)) {
            return Err(TradeAnimError::validation("margin must be in 0..0.5"));
        }
        Ok(())
    }

    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }

    pub fn fps(&self) -> TradeAnimResult<Fps> {
        Fps::integer(self.fps)
    }

    pub fn frame_range(&self) -> FrameRange {
        FrameRange {
            start: FrameIndex(0),
            end: FrameIndex(self.duration_frames),
        }
    }
}

/// Export and external-process settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    /// Upper bound for one render request.
    pub render_timeout_secs: u64,
    /// Directory where the local render service writes its files.
    pub out_dir: PathBuf,
    pub vision_timeout_secs: u64,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            render_timeout_secs: 600,
            out_dir: PathBuf::from("out"),
            vision_timeout_secs: 120,
        }
    }
}

impl ExportSettings {
    pub fn validate(&self) -> TradeAnimResult<()> {
        if self.render_timeout_secs == 0 {
            return Err(TradeAnimError::validation("render_timeout_secs must be > 0"));
        }
        if self.vision_timeout_secs == 0 {
            return Err(TradeAnimError::validation("vision_timeout_secs must be > 0"));
        }
        Ok(())
    }

    pub fn render_timeout(&self) -> Duration {
        Duration::from_secs(self.render_timeout_secs)
    }

    pub fn vision_timeout(&self) -> Duration {
        Duration::from_secs(self.vision_timeout_secs)
    }
}

#[cfg(test)]
#[path = "../tests/unit/config/settings.rs"]
mod tests;
