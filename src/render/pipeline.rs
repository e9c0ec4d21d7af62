use std::path::Path;

use crate::animation::clock::{Clock, SceneTime};
use crate::config::Settings;
use crate::encode::ffmpeg::{Container, FfmpegSink, FfmpegSinkOpts};
use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::core::{Fps, FrameIndex, FrameRange};
use crate::foundation::error::{TradeAnimError, TradeAnimResult};
use crate::render::raster::{FrameRGBA, Rasterizer};
use crate::scene::evaluator::{SceneInput, Viewport, evaluate};
use crate::scene::model::Scene;

/// Range render statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    /// Total frames in the requested range.
    pub frames_total: u64,
    /// Frames actually rasterized.
    pub frames_rendered: u64,
    /// Frames whose scene matched the previous frame and reused its pixels.
    pub frames_elided: u64,
}

/// Renders one document at a fixed output geometry.
///
/// The viewport fits the chart into the video canvas once, up front; every frame is then a pure
/// function of its index.
pub struct RenderSession {
    input: SceneInput,
    settings: Settings,
    viewport: Viewport,
    fps: Fps,
    rasterizer: Rasterizer,
}

impl RenderSession {
    pub fn new(input: SceneInput, settings: Settings, rasterizer: Rasterizer) -> TradeAnimResult<Self> {
        settings.validate()?;
        let fps = settings.video.fps()?;
        let viewport = Viewport::fit(
            settings.video.canvas(),
            settings.chart.extent(input.candles.len()),
            settings.video.margin,
        );
        Ok(Self {
            input,
            settings,
            viewport,
            fps,
            rasterizer,
        })
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn fps(&self) -> Fps {
        self.fps
    }

    /// Frame range covering the configured duration.
    pub fn full_range(&self) -> FrameRange {
        self.settings.video.frame_range()
    }

    pub fn scene_at(&self, clock: Clock) -> Scene {
        evaluate(&self.input, &self.settings, &self.viewport, clock)
    }

    pub fn scene_at_frame(&self, frame: FrameIndex) -> Scene {
        self.scene_at(SceneTime::from_frame(frame, self.fps).into())
    }

    #[tracing::instrument(level = "debug", skip(self))]
    pub fn render_frame(&self, frame: FrameIndex) -> TradeAnimResult<FrameRGBA> {
        if !self.full_range().contains(frame) {
            return Err(TradeAnimError::validation(
                "render_frame frame must be within the video duration",
            ));
        }
        self.rasterizer.render_scene(&self.scene_at_frame(frame))
    }

    /// Render a frame range and stream frames into a sink, in strictly increasing frame order.
    #[tracing::instrument(level = "info", skip(self, sink), fields(start = range.start.0, end = range.end.0))]
    pub fn render_range(
        &self,
        range: FrameRange,
        sink: &mut dyn FrameSink,
    ) -> TradeAnimResult<RenderStats> {
        if range.is_empty() {
            return Err(TradeAnimError::validation(
                "render_range range must be non-empty",
            ));
        }
        if range.end.0 > self.full_range().end.0 {
            return Err(TradeAnimError::validation(
                "render_range range must be within the video duration",
            ));
        }

        sink.begin(SinkConfig {
            width: self.viewport.canvas.width,
            height: self.viewport.canvas.height,
            fps: self.fps,
        })?;

        let mut stats = RenderStats {
            frames_total: range.len_frames(),
            ..RenderStats::default()
        };
        // Once every entrance has settled, consecutive scenes are equal and the pixels can be reused.
        let mut last: Option<(Scene, FrameRGBA)> = None;
        for frame in range.iter() {
            let scene = self.scene_at_frame(frame);
            match &last {
                Some((prev, pixels)) if *prev == scene => {
                    sink.push_frame(frame, pixels)?;
                    stats.frames_elided += 1;
                }
                _ => {
                    let pixels = self.rasterizer.render_scene(&scene)?;
                    sink.push_frame(frame, &pixels)?;
                    stats.frames_rendered += 1;
                    last = Some((scene, pixels));
                }
            }
        }
        sink.end()?;

        tracing::info!(
            rendered = stats.frames_rendered,
            elided = stats.frames_elided,
            "range rendered"
        );
        Ok(stats)
    }

    /// Encode the full duration to `out_path` through `ffmpeg`.
    pub fn render_to_file(&self, out_path: &Path, container: Container) -> TradeAnimResult<RenderStats> {
        let mut sink = FfmpegSink::new(FfmpegSinkOpts {
            out_path: out_path.to_path_buf(),
            container,
            background: self.settings.palette.background,
        });
        self.render_range(self.full_range(), &mut sink)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/pipeline.rs"]
mod tests;
