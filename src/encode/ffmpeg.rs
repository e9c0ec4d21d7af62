use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};
use std::thread::JoinHandle;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::encode::sink::{FrameSink, SinkConfig};
use crate::foundation::color::Rgba8;
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{TradeAnimError, TradeAnimResult};
use crate::foundation::process::{join_drain, spawn_drain};
use crate::render::raster::FrameRGBA;

/// Output container, which also fixes the video codec.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Container {
    /// H.264 in MP4.
    #[default]
    Mp4,
    /// VP9 in WebM.
    Webm,
}

impl Container {
    /// Infer from a file extension; anything but `.webm` is MP4.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("webm") => Self::Webm,
            _ => Self::Mp4,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Mp4 => "mp4",
            Self::Webm => "webm",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Mp4 => "video/mp4",
            Self::Webm => "video/webm",
        }
    }

    fn codec_args(self) -> &'static [&'static str] {
        match self {
            Self::Mp4 => &[
                "-an",
                "-c:v",
                "libx264",
                "-pix_fmt",
                "yuv420p",
                "-movflags",
                "+faststart",
            ],
            Self::Webm => &[
                "-an",
                "-c:v",
                "libvpx-vp9",
                "-pix_fmt",
                "yuv420p",
                "-b:v",
                "0",
                "-crf",
                "32",
            ],
        }
    }
}

/// Where and how an [`FfmpegSink`] writes its video. Existing files are overwritten.
#[derive(Clone, Debug)]
pub struct FfmpegSinkOpts {
    pub out_path: PathBuf,
    pub container: Container,
    /// Translucent pixels are composited over this colour; the video has no alpha.
    pub background: Rgba8,
}

impl FfmpegSinkOpts {
    /// Black background, container inferred from the extension.
    pub fn new(out_path: impl Into<PathBuf>) -> Self {
        let out_path = out_path.into();
        Self {
            container: Container::from_path(&out_path),
            out_path,
            background: Rgba8::BLACK,
        }
    }
}

/// A running `ffmpeg` reading opaque RGBA frames from stdin.
struct Encoder {
    child: Child,
    stdin: ChildStdin,
    stderr: JoinHandle<std::io::Result<Vec<u8>>>,
    config: SinkConfig,
    last: Option<FrameIndex>,
    opaque: Vec<u8>,
}

/// Frame sink that pipes every frame into the system `ffmpeg`.
pub struct FfmpegSink {
    opts: FfmpegSinkOpts,
    encoder: Option<Encoder>,
}

impl FfmpegSink {
    pub fn new(opts: FfmpegSinkOpts) -> Self {
        Self {
            opts,
            encoder: None,
        }
    }

    fn command(&self, cfg: SinkConfig) -> Command {
        let mut cmd = Command::new("ffmpeg");
        cmd.args(["-y", "-loglevel", "error", "-f", "rawvideo", "-pix_fmt", "rgba"])
            .arg("-s")
            .arg(format!("{}x{}", cfg.width, cfg.height))
            .arg("-r")
            .arg(format!("{}/{}", cfg.fps.num, cfg.fps.den))
            .args(["-i", "pipe:0"])
            .args(self.opts.container.codec_args())
            .arg(&self.opts.out_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped());
        cmd
    }
}

fn check_geometry(cfg: &SinkConfig) -> TradeAnimResult<()> {
    if cfg.fps.num == 0 || cfg.fps.den == 0 {
        return Err(TradeAnimError::validation("video fps must be non-zero"));
    }
    if cfg.width == 0 || cfg.height == 0 {
        return Err(TradeAnimError::validation("video size must be non-zero"));
    }
    // yuv420p subsamples chroma by two in both directions.
    if !cfg.width.is_multiple_of(2) || !cfg.height.is_multiple_of(2) {
        return Err(TradeAnimError::validation(format!(
            "video size {}x{} must be even",
            cfg.width, cfg.height
        )));
    }
    Ok(())
}

impl FrameSink for FfmpegSink {
    fn begin(&mut self, cfg: SinkConfig) -> TradeAnimResult<()> {
        check_geometry(&cfg)?;
        if self.encoder.is_some() {
            return Err(TradeAnimError::render("ffmpeg encode already in progress"));
        }
        ensure_parent_dir(&self.opts.out_path)?;
        if !is_ffmpeg_on_path() {
            return Err(TradeAnimError::render("ffmpeg not found on PATH"));
        }

        tracing::debug!(
            out = %self.opts.out_path.display(),
            container = ?self.opts.container,
            width = cfg.width,
            height = cfg.height,
            "starting ffmpeg"
        );
        let mut child = self
            .command(cfg)
            .spawn()
            .map_err(|e| TradeAnimError::render(format!("spawn ffmpeg: {e}")))?;
        let (Some(stdin), Some(stderr)) = (child.stdin.take(), child.stderr.take()) else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(TradeAnimError::render("ffmpeg pipes unavailable"));
        };

        self.encoder = Some(Encoder {
            child,
            stdin,
            stderr: spawn_drain(stderr),
            config: cfg,
            last: None,
            opaque: vec![0; cfg.width as usize * cfg.height as usize * 4],
        });
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> TradeAnimResult<()> {
        let Some(enc) = self.encoder.as_mut() else {
            return Err(TradeAnimError::render("ffmpeg sink has not begun"));
        };
        if enc.last.is_some_and(|last| idx <= last) {
            return Err(TradeAnimError::render(format!(
                "frame {} arrived after frame {}",
                idx.0,
                enc.last.map_or(0, |l| l.0)
            )));
        }
        if (frame.width, frame.height) != (enc.config.width, enc.config.height) {
            return Err(TradeAnimError::validation(format!(
                "frame is {}x{}, encoder expects {}x{}",
                frame.width, frame.height, enc.config.width, enc.config.height
            )));
        }

        flatten(&mut enc.opaque, &frame.data, self.opts.background)?;
        enc.stdin
            .write_all(&enc.opaque)
            .map_err(|e| TradeAnimError::render(format!("write frame {} to ffmpeg: {e}", idx.0)))?;
        enc.last = Some(idx);
        Ok(())
    }

    fn end(&mut self) -> TradeAnimResult<()> {
        let Some(Encoder {
            mut child,
            stdin,
            stderr,
            ..
        }) = self.encoder.take()
        else {
            return Err(TradeAnimError::render("ffmpeg sink has not begun"));
        };
        // EOF on stdin lets ffmpeg finalize the container.
        drop(stdin);
        let status = child
            .wait()
            .map_err(|e| TradeAnimError::render(format!("wait for ffmpeg: {e}")))?;
        let log = join_drain(Some(stderr), "ffmpeg", "stderr")?;
        if !status.success() {
            return Err(TradeAnimError::render(format!(
                "ffmpeg failed ({status}): {}",
                String::from_utf8_lossy(&log).trim()
            )));
        }
        Ok(())
    }
}

impl Drop for FfmpegSink {
    fn drop(&mut self) {
        // An encode that never reached `end` is abandoned, not finalized.
        if let Some(mut enc) = self.encoder.take() {
            let _ = enc.child.kill();
            let _ = enc.child.wait();
        }
    }
}

/// Composite premultiplied `src` over `background` into opaque RGBA.
fn flatten(dst: &mut [u8], src: &[u8], background: Rgba8) -> TradeAnimResult<()> {
    if dst.len() != src.len() {
        return Err(TradeAnimError::validation(format!(
            "frame holds {} bytes, expected {}",
            src.len(),
            dst.len()
        )));
    }
    let bg = [background.r, background.g, background.b];
    for (out, px) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let cover = 255 - u32::from(px[3]);
        for c in 0..3 {
            let under = (u32::from(bg[c]) * cover + 127) / 255;
            out[c] = (u32::from(px[c]) + under).min(255) as u8;
        }
        out[3] = 255;
    }
    Ok(())
}

/// Create the parent directory of `path` if it is missing.
pub fn ensure_parent_dir(path: &Path) -> TradeAnimResult<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => std::fs::create_dir_all(dir)
            .with_context(|| format!("create directory '{}'", dir.display()))
            .map_err(Into::into),
        _ => Ok(()),
    }
}

/// Return `true` when `ffmpeg` can be invoked from `PATH`.
pub fn is_ffmpeg_on_path() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(test)]
#[path = "../../tests/unit/encode/ffmpeg.rs"]
mod tests;
