//! Frame rasterization and range rendering.

/// Range rendering into frame sinks.
pub mod pipeline;
/// Scene to pixels.
pub mod raster;
