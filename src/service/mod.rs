//! Out-of-process collaborators: the video render service and the vision delegate.

/// Render requests, render services and the export controller.
pub mod render;
/// Screenshot-to-candles delegate.
pub mod vision;
