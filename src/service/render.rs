use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::chart::annotation::{Callout, Trendline};
use crate::chart::candle::Candle;
use crate::config::{Settings, VideoSettings};
use crate::editor::state::EditorState;
use crate::encode::ffmpeg::{Container, ensure_parent_dir};
use crate::foundation::error::{TradeAnimError, TradeAnimResult};
use crate::render::pipeline::RenderSession;
use crate::render::raster::Rasterizer;
use crate::scene::evaluator::{SceneInput, TitleCard};

/// A document snapshot sent to a render service.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderRequest {
    pub candles: Vec<Candle>,
    pub trendlines: Vec<Trendline>,
    pub callouts: Vec<Callout>,
    pub title: Option<TitleCard>,
    /// Overrides the service's configured video settings.
    pub video: Option<VideoSettings>,
}

impl RenderRequest {
    pub fn from_state(state: &EditorState) -> Self {
        Self {
            candles: state.candle_values(),
            trendlines: state.trendlines.clone(),
            callouts: state.callouts.clone(),
            title: None,
            video: None,
        }
    }

    /// Candles to render; an empty document renders a single placeholder candle.
    pub fn effective_candles(&self) -> Vec<Candle> {
        if self.candles.is_empty() {
            vec![Candle::placeholder(0)]
        } else {
            self.candles.iter().map(|c| c.normalized()).collect()
        }
    }

    pub fn scene_input(&self) -> SceneInput {
        SceneInput {
            candles: self.effective_candles(),
            trendlines: self.trendlines.clone(),
            callouts: self.callouts.clone(),
            title: self.title.clone(),
        }
    }
}

/// An encoded video returned by a render service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedVideo {
    /// Suggested download name.
    pub file_name: String,
    pub container: Container,
    pub bytes: Vec<u8>,
}

/// Failure payload of the render service boundary: `{"error": "..."}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn from_error(err: &TradeAnimError) -> Self {
        Self {
            error: err.to_string(),
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::json!({ "error": self.error }).to_string()
    }
}

/// Turns a [`RenderRequest`] into an encoded video.
pub trait RenderService: Send + Sync {
    fn render(&self, request: &RenderRequest) -> TradeAnimResult<RenderedVideo>;
}

/// Renders in-process through [`RenderSession`] and `ffmpeg`, keeping each output under
/// `export.out_dir`.
#[derive(Clone, Debug)]
pub struct LocalRenderService {
    settings: Settings,
    rasterizer: Rasterizer,
}

static RENDER_SEQ: AtomicU64 = AtomicU64::new(0);

impl LocalRenderService {
    pub fn new(settings: Settings, rasterizer: Rasterizer) -> Self {
        Self {
            settings,
            rasterizer,
        }
    }

    fn output_path(&self, container: Container) -> PathBuf {
        let seq = RENDER_SEQ.fetch_add(1, Ordering::Relaxed);
        self.settings.export.out_dir.join(format!(
            "render-{}-{seq}.{}",
            chrono::Utc::now().timestamp_millis(),
            container.extension()
        ))
    }
}

impl RenderService for LocalRenderService {
    #[tracing::instrument(level = "info", skip_all, fields(candles = request.candles.len()))]
    fn render(&self, request: &RenderRequest) -> TradeAnimResult<RenderedVideo> {
        let mut settings = self.settings.clone();
        if let Some(video) = &request.video {
            settings.video = video.clone();
        }
        let container = settings.video.container;
        let out = self.output_path(container);

        let session = RenderSession::new(request.scene_input(), settings, self.rasterizer.clone())?;
        let stats = session.render_to_file(&out, container)?;
        let bytes =
            std::fs::read(&out).with_context(|| format!("read rendered video '{}'", out.display()))?;
        tracing::info!(
            out = %out.display(),
            bytes = bytes.len(),
            frames = stats.frames_total,
            "render finished"
        );

        Ok(RenderedVideo {
            file_name: format!("trade_animation_custom.{}", container.extension()),
            container,
            bytes,
        })
    }
}

/// User-visible state of the export flow.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ExportStatus {
    #[default]
    Idle,
    Rendering,
    Saved(PathBuf),
    Failed(String),
}

/// Runs one export at a time against a [`RenderService`].
///
/// The render runs on a worker thread that owns the in-flight flag, so an export that timed out
/// still blocks new exports until the service actually returns. Editor state is never touched.
pub struct ExportController {
    service: Arc<dyn RenderService>,
    timeout: Duration,
    in_flight: Arc<AtomicBool>,
    status: Mutex<ExportStatus>,
}

struct InFlight(Arc<AtomicBool>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl ExportController {
    pub fn new(service: Arc<dyn RenderService>, timeout: Duration) -> Self {
        Self {
            service,
            timeout,
            in_flight: Arc::new(AtomicBool::new(false)),
            status: Mutex::new(ExportStatus::Idle),
        }
    }

    pub fn status(&self) -> ExportStatus {
        self.status
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    fn set_status(&self, status: ExportStatus) {
        *self.status.lock().unwrap_or_else(|e| e.into_inner()) = status;
    }

    /// Render `request` and save the returned video at `dest`.
    ///
    /// Fails immediately, without touching the status, when another export is outstanding.
    #[tracing::instrument(level = "info", skip(self, request), fields(dest = %dest.display()))]
    pub fn export(&self, request: RenderRequest, dest: &Path) -> TradeAnimResult<PathBuf> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(TradeAnimError::service("an export is already in progress"));
        }
        let guard = InFlight(self.in_flight.clone());
        self.set_status(ExportStatus::Rendering);

        let result = self.run(guard, request).and_then(|video| {
            ensure_parent_dir(dest)?;
            std::fs::write(dest, &video.bytes)
                .with_context(|| format!("save video to '{}'", dest.display()))?;
            Ok(dest.to_path_buf())
        });

        match &result {
            Ok(path) => {
                tracing::info!(path = %path.display(), "export saved");
                self.set_status(ExportStatus::Saved(path.clone()));
            }
            Err(e) => {
                tracing::warn!(error = %e, "export failed");
                self.set_status(ExportStatus::Failed(e.to_string()));
            }
        }
        result
    }

    fn run(&self, guard: InFlight, request: RenderRequest) -> TradeAnimResult<RenderedVideo> {
        let (tx, rx) = mpsc::channel();
        let service = self.service.clone();
        thread::Builder::new()
            .name("tradeanim-export".into())
            .spawn(move || {
                let _guard = guard;
                let _ = tx.send(service.render(&request));
            })
            .context("spawn export worker")?;

        match rx.recv_timeout(self.timeout) {
            Ok(result) => result,
            Err(RecvTimeoutError::Timeout) => Err(TradeAnimError::service(format!(
                "render timed out after {:.1}s",
                self.timeout.as_secs_f64()
            ))),
            Err(RecvTimeoutError::Disconnected) => Err(TradeAnimError::service(
                "render worker exited without a result",
            )),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/service/render.rs"]
mod tests;
