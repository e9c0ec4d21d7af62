use serde::{Deserialize, Serialize};

use crate::chart::annotation::{Callout, Trendline};
use crate::chart::candle::Candle;

macro_rules! element_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);
    };
}

element_id!(
    /// Stable candle handle, independent of the candle's position in the series.
    CandleId
);
element_id!(TrendlineId);
element_id!(CalloutId);

/// Active tool.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Select,
    DrawCandle,
    DrawTrendline,
    AddCallout,
}

/// The currently selected element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Selection {
    Candle(CandleId),
    Trendline(TrendlineId),
    Callout(CalloutId),
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CandleEntry {
    pub id: CandleId,
    #[serde(flatten)]
    pub candle: Candle,
}

/// One editing session's document plus tool state.
///
/// Mutated only through [`crate::Action`]s (see [`EditorState::apply`]); the fields are public
/// for reading and for (de)serializing project files.
///
/// Loading a project never trusts its stored `next_id` below the handles already present.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "ProjectFile")]
pub struct EditorState {
    pub mode: Mode,
    pub candles: Vec<CandleEntry>,
    pub trendlines: Vec<Trendline>,
    pub callouts: Vec<Callout>,
    pub selection: Option<Selection>,
    /// Next handle to hand out. Never reused within a session.
    pub next_id: u64,
}

/// On-disk shape of [`EditorState`]; every field may be missing.
#[derive(Deserialize, Default)]
#[serde(default)]
struct ProjectFile {
    mode: Mode,
    candles: Vec<CandleEntry>,
    trendlines: Vec<Trendline>,
    callouts: Vec<Callout>,
    selection: Option<Selection>,
    next_id: u64,
}

impl From<ProjectFile> for EditorState {
    fn from(file: ProjectFile) -> Self {
        let in_use = file
            .candles
            .iter()
            .map(|c| c.id.0)
            .chain(file.trendlines.iter().map(|t| t.id.0))
            .chain(file.callouts.iter().map(|c| c.id.0))
            .max()
            .map_or(0, |max| max.saturating_add(1));
        let mut state = Self {
            mode: file.mode,
            candles: file.candles,
            trendlines: file.trendlines,
            callouts: file.callouts,
            selection: None,
            next_id: file.next_id.max(in_use),
        };
        if let Some(sel) = file.selection
            && state.contains(sel)
        {
            state.selection = Some(sel);
        }
        state
    }
}

impl EditorState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh state holding `candles` in order.
    pub fn with_candles(candles: impl IntoIterator<Item = Candle>) -> Self {
        let mut state = Self::new();
        state.candles = candles
            .into_iter()
            .map(|candle| CandleEntry {
                id: CandleId(state.alloc_id()),
                candle: candle.normalized(),
            })
            .collect();
        state
    }

    pub(crate) fn alloc_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn candle_count(&self) -> usize {
        self.candles.len()
    }

    pub fn candle_values(&self) -> Vec<Candle> {
        self.candles.iter().map(|e| e.candle).collect()
    }

    pub fn candle_index(&self, id: CandleId) -> Option<usize> {
        self.candles.iter().position(|e| e.id == id)
    }

    pub fn candle(&self, id: CandleId) -> Option<&Candle> {
        self.candles.iter().find(|e| e.id == id).map(|e| &e.candle)
    }

    pub fn candle_id_at(&self, index: usize) -> Option<CandleId> {
        self.candles.get(index).map(|e| e.id)
    }

    pub fn last_candle(&self) -> Option<&Candle> {
        self.candles.last().map(|e| &e.candle)
    }

    pub fn trendline(&self, id: TrendlineId) -> Option<&Trendline> {
        self.trendlines.iter().find(|t| t.id == id)
    }

    pub fn callout(&self, id: CalloutId) -> Option<&Callout> {
        self.callouts.iter().find(|c| c.id == id)
    }

    /// Whether `selection` still refers to a live element.
    pub fn contains(&self, selection: Selection) -> bool {
        match selection {
            Selection::Candle(id) => self.candle(id).is_some(),
            Selection::Trendline(id) => self.trendline(id).is_some(),
            Selection::Callout(id) => self.callout(id).is_some(),
        }
    }

    /// The selected candle with its current position, if a candle is selected.
    pub fn selected_candle(&self) -> Option<(usize, CandleId)> {
        match self.selection {
            Some(Selection::Candle(id)) => self.candle_index(id).map(|idx| (idx, id)),
            _ => None,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/editor/state.rs"]
mod tests;
