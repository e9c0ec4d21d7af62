//! tradeanim is a headless editor core and deterministic renderer for candlestick trading-chart
//! animations.
//!
//! # Pipeline overview
//!
//! 1. **Edit**: [`Controller`] turns pointer and key input into [`Action`]s applied to an
//!    [`EditorState`] (candles, trendlines, callouts, selection).
//! 2. **Evaluate**: `SceneInput + Clock -> Scene` ([`evaluate`]). Preview samples the clock from
//!    elapsed wall time, export from the frame index; both reduce to the same [`SceneTime`].
//! 3. **Render**: `Scene -> SVG -> FrameRGBA` ([`Rasterizer`], CPU via `resvg`).
//! 4. **Encode**: stream frames to the system `ffmpeg` binary for MP4/WebM ([`FfmpegSink`]).
//!
//! Seed data comes from the [`generate`] functions, CSV import ([`parse_candles_csv`]) or an
//! external vision program ([`VisionPipeline`]).
#![forbid(unsafe_code)]

mod animation;
mod chart;
mod editor;
mod encode;
mod foundation;
mod import;
mod render;
mod scene;
mod service;

/// Runtime settings (JSON, every field defaulted).
pub mod config;
/// Synthetic candle series.
pub mod generate;

pub use animation::clock::{Clock, SceneTime};
pub use animation::ease::Ease;
pub use animation::entrance::{Curve, Entrance};
pub use animation::spring::Spring;
pub use chart::annotation::{ACCENT, Callout, Tone, Trendline};
pub use chart::candle::{Candle, CandlePatch};
pub use chart::layout::ChartLayout;
pub use chart::scale::{PriceRange, PriceScale};
pub use config::{AnimationTiming, ExportSettings, Palette, Settings, VideoSettings};
pub use editor::action::{
    ACTION_TYPES, Action, CalloutPatch, CalloutSpec, TrendlinePatch, TrendlineSpec,
    actions_from_json, reduce,
};
pub use editor::controller::{Controller, Key, PointerEvent, StepDirection, append_step_candle};
pub use editor::gesture::Gesture;
pub use editor::hit::{Handle, Hit, HitTolerance, hit_test};
pub use editor::state::{
    CalloutId, CandleEntry, CandleId, EditorState, Mode, Selection, TrendlineId,
};
pub use encode::ffmpeg::{Container, FfmpegSink, FfmpegSinkOpts, is_ffmpeg_on_path};
pub use encode::sink::{FrameSink, InMemorySink, SinkConfig};
pub use foundation::color::Rgba8;
pub use foundation::core::{Affine, Canvas, Fps, FrameIndex, FrameRange, Point, Rect, Size, Vec2};
pub use foundation::error::{TradeAnimError, TradeAnimResult};
pub use import::csv::{CsvOptions, parse_candles_csv, parse_candles_csv_with, parse_time_ms};
pub use render::pipeline::{RenderSession, RenderStats};
pub use render::raster::{FrameRGBA, Rasterizer};
pub use scene::evaluator::{SceneInput, TitleCard, Viewport, evaluate, partial_polyline};
pub use scene::model::{Node, Scene, Stroke, TextAnchor, TextRun};
pub use scene::svg::to_svg;
pub use service::render::{
    ErrorBody, ExportController, ExportStatus, LocalRenderService, RenderRequest, RenderService,
    RenderedVideo,
};
pub use service::vision::{PixelCandle, VisionPipeline, normalize_pixel_candles, parse_output};
