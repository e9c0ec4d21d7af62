use std::time::Duration;

use crate::foundation::core::{Fps, FrameIndex};

/// A point on the animation timeline, in seconds since the scene started.
///
/// Frame-driven export and wall-clock preview both reduce to this value, so they share every
/// downstream computation.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, serde::Serialize, serde::Deserialize)]
pub struct SceneTime(f64);

impl SceneTime {
    pub const ZERO: Self = Self(0.0);

    pub fn from_secs(secs: f64) -> Self {
        Self(if secs.is_finite() { secs.max(0.0) } else { 0.0 })
    }

    pub fn from_frame(frame: FrameIndex, fps: Fps) -> Self {
        Self::from_secs(fps.frames_to_secs(frame.0))
    }

    pub fn from_elapsed(elapsed: Duration) -> Self {
        Self::from_secs(elapsed.as_secs_f64())
    }

    pub fn secs(self) -> f64 {
        self.0
    }
}

/// How the renderer samples entrances.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Clock {
    /// Every entrance finished: the static design view of the editor.
    Settled,
    At(SceneTime),
}

impl From<SceneTime> for Clock {
    fn from(t: SceneTime) -> Self {
        Self::At(t)
    }
}
