use serde::{Deserialize, Serialize};

use crate::editor::state::{CalloutId, TrendlineId};
use crate::foundation::color::Rgba8;
use crate::foundation::core::Point;

/// Default trendline/info accent.
pub const ACCENT: Rgba8 = Rgba8::rgb(0x3b, 0x82, 0xf6);

/// A polyline drawn over the chart, in chart-local pixels.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Trendline {
    #[serde(default)]
    pub id: TrendlineId,
    pub points: Vec<Point>,
    #[serde(default = "default_accent")]
    pub color: Rgba8,
    #[serde(default)]
    pub label: Option<String>,
    /// Entrance ordering; larger ranks appear later.
    #[serde(default)]
    pub delay_rank: u32,
}

/// Callout category, which picks the accent color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Bull,
    Bear,
    #[default]
    Info,
}

/// Annotation card anchored at its top-left corner.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Callout {
    #[serde(default)]
    pub id: CalloutId,
    pub position: Point,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tone: Tone,
    #[serde(default)]
    pub delay_rank: u32,
}

fn default_accent() -> Rgba8 {
    ACCENT
}
