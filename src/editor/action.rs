use serde::{Deserialize, Serialize};

use crate::chart::annotation::{Callout, Tone, Trendline};
use crate::chart::candle::{Candle, CandlePatch};
use crate::editor::state::{
    CalloutId, CandleEntry, CandleId, EditorState, Mode, Selection, TrendlineId,
};
use crate::foundation::color::Rgba8;
use crate::foundation::core::Point;
use crate::foundation::error::{TradeAnimError, TradeAnimResult};

/// Payload for [`Action::AddTrendline`]; the id is assigned by the state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrendlineSpec {
    pub points: Vec<Point>,
    pub color: Rgba8,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub delay_rank: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendlinePatch {
    pub points: Option<Vec<Point>>,
    pub color: Option<Rgba8>,
    /// `Some(None)` clears the label.
    pub label: Option<Option<String>>,
    pub delay_rank: Option<u32>,
}

/// Payload for [`Action::AddCallout`]; the id is assigned by the state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CalloutSpec {
    pub position: Point,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tone: Tone,
    #[serde(default)]
    pub delay_rank: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalloutPatch {
    pub position: Option<Point>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub tone: Option<Tone>,
    pub delay_rank: Option<u32>,
}

/// The closed set of editor state transitions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum Action {
    SetMode(Mode),
    AddCandle(Candle),
    ReplaceCandles(Vec<Candle>),
    UpdateCandle { id: CandleId, patch: CandlePatch },
    RemoveCandle(CandleId),
    AddTrendline(TrendlineSpec),
    UpdateTrendline { id: TrendlineId, patch: TrendlinePatch },
    RemoveTrendline(TrendlineId),
    AddCallout(CalloutSpec),
    UpdateCallout { id: CalloutId, patch: CalloutPatch },
    RemoveCallout(CalloutId),
    Select(Option<Selection>),
    ClearAll,
}

/// Every `type` tag [`Action`] accepts.
pub const ACTION_TYPES: &[&str] = &[
    "set_mode",
    "add_candle",
    "replace_candles",
    "update_candle",
    "remove_candle",
    "add_trendline",
    "update_trendline",
    "remove_trendline",
    "add_callout",
    "update_callout",
    "remove_callout",
    "select",
    "clear_all",
];

/// Parse a JSON array of actions.
///
/// Entries with an unrecognized `type` are skipped with a warning. A known type with a malformed
/// payload fails the whole batch.
pub fn actions_from_json(text: &str) -> TradeAnimResult<Vec<Action>> {
    let entries: Vec<serde_json::Value> = serde_json::from_str(text)
        .map_err(|e| TradeAnimError::serde(format!("actions must be a JSON array: {e}")))?;
    let mut actions = Vec::with_capacity(entries.len());
    for (i, entry) in entries.into_iter().enumerate() {
        let tag = entry.get("type").and_then(|t| t.as_str()).map(str::to_owned);
        match tag {
            Some(tag) if !ACTION_TYPES.contains(&tag.as_str()) => {
                tracing::warn!(index = i, action = %tag, "skipping unknown action");
            }
            _ => actions.push(
                serde_json::from_value(entry)
                    .map_err(|e| TradeAnimError::serde(format!("action {i}: {e}")))?,
            ),
        }
    }
    Ok(actions)
}

/// Pure reducer: consume `state`, return the state after `action`.
pub fn reduce(mut state: EditorState, action: Action) -> EditorState {
    state.apply(action);
    state
}

impl EditorState {
    /// Apply `action` in place.
    ///
    /// Returns the handle of the element created by an `Add*` action, `None` otherwise.
    /// Updates and removals that name an unknown handle leave the state untouched.
    pub fn apply(&mut self, action: Action) -> Option<Selection> {
        match action {
            Action::SetMode(mode) => {
                self.mode = mode;
                self.selection = None;
                None
            }
            Action::AddCandle(candle) => {
                let id = CandleId(self.alloc_id());
                self.candles.push(CandleEntry {
                    id,
                    candle: candle.normalized(),
                });
                Some(Selection::Candle(id))
            }
            Action::ReplaceCandles(candles) => {
                self.candles.clear();
                for candle in candles {
                    let id = CandleId(self.alloc_id());
                    self.candles.push(CandleEntry {
                        id,
                        candle: candle.normalized(),
                    });
                }
                if matches!(self.selection, Some(Selection::Candle(_))) {
                    self.selection = None;
                }
                None
            }
            Action::UpdateCandle { id, patch } => {
                if let Some(entry) = self.candles.iter_mut().find(|e| e.id == id) {
                    entry.candle = patch.apply_to(entry.candle);
                }
                None
            }
            Action::RemoveCandle(id) => {
                self.candles.retain(|e| e.id != id);
                self.clear_selection_if(Selection::Candle(id));
                None
            }
            Action::AddTrendline(spec) => {
                let id = TrendlineId(self.alloc_id());
                self.trendlines.push(Trendline {
                    id,
                    points: spec.points,
                    color: spec.color,
                    label: spec.label,
                    delay_rank: spec.delay_rank,
                });
                let sel = Selection::Trendline(id);
                self.selection = Some(sel);
                Some(sel)
            }
            Action::UpdateTrendline { id, patch } => {
                if let Some(line) = self.trendlines.iter_mut().find(|t| t.id == id) {
                    if let Some(points) = patch.points {
                        line.points = points;
                    }
                    if let Some(color) = patch.color {
                        line.color = color;
                    }
                    if let Some(label) = patch.label {
                        line.label = label;
                    }
                    if let Some(rank) = patch.delay_rank {
                        line.delay_rank = rank;
                    }
                }
                None
            }
            Action::RemoveTrendline(id) => {
                self.trendlines.retain(|t| t.id != id);
                self.clear_selection_if(Selection::Trendline(id));
                None
            }
            Action::AddCallout(spec) => {
                let id = CalloutId(self.alloc_id());
                self.callouts.push(Callout {
                    id,
                    position: spec.position,
                    title: spec.title,
                    description: spec.description,
                    tone: spec.tone,
                    delay_rank: spec.delay_rank,
                });
                let sel = Selection::Callout(id);
                self.selection = Some(sel);
                Some(sel)
            }
            Action::UpdateCallout { id, patch } => {
                if let Some(callout) = self.callouts.iter_mut().find(|c| c.id == id) {
                    if let Some(position) = patch.position {
                        callout.position = position;
                    }
                    if let Some(title) = patch.title {
                        callout.title = title;
                    }
                    if let Some(description) = patch.description {
                        callout.description = description;
                    }
                    if let Some(tone) = patch.tone {
                        callout.tone = tone;
                    }
                    if let Some(rank) = patch.delay_rank {
                        callout.delay_rank = rank;
                    }
                }
                None
            }
            Action::RemoveCallout(id) => {
                self.callouts.retain(|c| c.id != id);
                self.clear_selection_if(Selection::Callout(id));
                None
            }
            Action::Select(selection) => {
                match selection {
                    None => self.selection = None,
                    Some(sel) if self.contains(sel) => self.selection = Some(sel),
                    Some(sel) => tracing::debug!(?sel, "ignoring selection of unknown element"),
                }
                None
            }
            Action::ClearAll => {
                self.candles.clear();
                self.trendlines.clear();
                self.callouts.clear();
                self.selection = None;
                None
            }
        }
    }

    fn clear_selection_if(&mut self, removed: Selection) {
        if self.selection == Some(removed) {
            self.selection = None;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/editor/action.rs"]
mod tests;
