use crate::chart::annotation::{ACCENT, Tone};
use crate::chart::candle::{Candle, CandlePatch};
use crate::chart::layout::ChartLayout;
use crate::chart::scale::PriceScale;
use crate::config::Settings;
use crate::editor::action::{Action, CalloutSpec, TrendlinePatch, TrendlineSpec};
use crate::editor::gesture::{Gesture, drawn_candle, sculpt};
use crate::editor::hit::{Hit, HitTolerance, hit_test};
use crate::editor::state::{CandleId, EditorState, Mode, Selection};
use crate::foundation::core::Point;

/// Proportional wick margin of a freshly clicked candle.
const DRAW_WICK_MARGIN: f64 = 0.001;

pub const NEW_CALLOUT_TITLE: &str = "New Callout";
pub const NEW_CALLOUT_DESCRIPTION: &str = "Double click to edit in properties.";

/// Pointer sample in chart-local pixels. `time_ms` stamps candles created by the event.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerEvent {
    pub position: Point,
    pub time_ms: i64,
}

impl PointerEvent {
    pub fn new(x: f64, y: f64, time_ms: i64) -> Self {
        Self {
            position: Point::new(x, y),
            time_ms,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Delete,
    Backspace,
    Escape,
    Other,
}

/// Direction of a candle appended with [`append_step_candle`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepDirection {
    Up,
    Down,
}

/// Interprets pointer and key input against the current [`Mode`], mutating the state only
/// through [`Action`]s.
///
/// The controller owns the active [`Gesture`]: once pointer-down captures a target, every move
/// goes to that gesture until pointer-up or pointer-leave ends it.
#[derive(Clone, Debug, Default)]
pub struct Controller {
    layout: ChartLayout,
    tolerance: HitTolerance,
    gesture: Option<Gesture>,
}

impl Controller {
    pub fn new(layout: ChartLayout, tolerance: HitTolerance) -> Self {
        Self {
            layout,
            tolerance,
            gesture: None,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.chart.clone(), settings.hit)
    }

    pub fn layout(&self) -> &ChartLayout {
        &self.layout
    }

    pub fn gesture(&self) -> Option<&Gesture> {
        self.gesture.as_ref()
    }

    pub fn is_capturing(&self) -> bool {
        self.gesture.is_some()
    }

    /// Price scale for the state as currently displayed.
    pub fn price_scale(&self, state: &EditorState) -> PriceScale {
        self.layout.price_scale(state.candles.iter().map(|e| &e.candle))
    }

    #[tracing::instrument(level = "debug", skip(self, state), fields(mode = ?state.mode))]
    pub fn pointer_down(&mut self, state: &mut EditorState, ev: PointerEvent) {
        if self.gesture.is_some() {
            // A lost pointer-up must not leave a stale capture behind.
            self.pointer_up(state);
        }

        let scale = self.price_scale(state);

        match state.mode {
            Mode::DrawCandle => {
                let price = scale.y_to_price(ev.position.y);
                let open = state.last_candle().map_or(price, |c| c.close);
                let top = open.max(price);
                let bottom = open.min(price);
                let candle = Candle {
                    open,
                    close: price,
                    high: top + top.abs() * DRAW_WICK_MARGIN,
                    low: bottom - bottom.abs() * DRAW_WICK_MARGIN,
                    time: ev.time_ms,
                };
                if let Some(Selection::Candle(id)) = state.apply(Action::AddCandle(candle)) {
                    self.gesture = Some(Gesture::DrawCandle {
                        candle: id,
                        open,
                        scale,
                    });
                }
            }
            Mode::DrawTrendline => {
                let spec = TrendlineSpec {
                    points: vec![ev.position, ev.position],
                    color: ACCENT,
                    label: None,
                    delay_rank: rank_of(state),
                };
                if let Some(Selection::Trendline(id)) = state.apply(Action::AddTrendline(spec)) {
                    self.gesture = Some(Gesture::DrawTrendline { trendline: id });
                }
            }
            Mode::AddCallout => {
                state.apply(Action::AddCallout(CalloutSpec {
                    position: ev.position,
                    title: NEW_CALLOUT_TITLE.to_owned(),
                    description: NEW_CALLOUT_DESCRIPTION.to_owned(),
                    tone: Tone::Info,
                    delay_rank: rank_of(state),
                }));
                state.apply(Action::SetMode(Mode::Select));
            }
            Mode::Select => self.select_at(state, scale, ev.position),
        }
    }

    fn select_at(&mut self, state: &mut EditorState, scale: PriceScale, p: Point) {
        match hit_test(state, &self.layout, &self.tolerance, &scale, p) {
            Some(Hit::Callout(id)) => {
                state.apply(Action::Select(Some(Selection::Callout(id))));
            }
            Some(Hit::TrendlinePoint { id, .. }) => {
                state.apply(Action::Select(Some(Selection::Trendline(id))));
            }
            Some(Hit::Candle { id, handle, .. }) => {
                state.apply(Action::Select(Some(Selection::Candle(id))));
                if let (Some(handle), Some(snapshot)) = (handle, state.candle(id).copied()) {
                    tracing::debug!(?id, ?handle, "sculpt started");
                    self.gesture = Some(Gesture::Sculpt {
                        candle: id,
                        handle,
                        start_y: p.y,
                        snapshot,
                        scale,
                    });
                }
            }
            None => {
                state.apply(Action::Select(None));
            }
        }
    }

    /// Route a move to the captured gesture. Moves without a capture are ignored.
    pub fn pointer_move(&mut self, state: &mut EditorState, ev: PointerEvent) {
        let Some(gesture) = self.gesture.as_ref() else {
            return;
        };

        match gesture {
            Gesture::DrawCandle {
                candle,
                open,
                scale,
            } => {
                let Some(time) = state.candle(*candle).map(|c| c.time) else {
                    return;
                };
                let next = drawn_candle(*open, scale.y_to_price(ev.position.y), time);
                state.apply(Action::UpdateCandle {
                    id: *candle,
                    patch: CandlePatch::prices(next.open, next.high, next.low, next.close),
                });
            }
            Gesture::DrawTrendline { trendline } => {
                let Some(first) = state
                    .trendline(*trendline)
                    .and_then(|t| t.points.first().copied())
                else {
                    return;
                };
                state.apply(Action::UpdateTrendline {
                    id: *trendline,
                    patch: TrendlinePatch {
                        points: Some(vec![first, ev.position]),
                        ..TrendlinePatch::default()
                    },
                });
            }
            Gesture::Sculpt {
                candle,
                handle,
                start_y,
                snapshot,
                scale,
            } => {
                let delta = scale.price_delta(*start_y, ev.position.y);
                let next = sculpt(snapshot, *handle, delta);
                state.apply(Action::UpdateCandle {
                    id: *candle,
                    patch: CandlePatch::prices(next.open, next.high, next.low, next.close),
                });
            }
        }
    }

    /// Release the capture. A finished trendline drag returns the tool to select mode.
    pub fn pointer_up(&mut self, state: &mut EditorState) {
        if let Some(Gesture::DrawTrendline { .. }) = self.gesture.take() {
            state.apply(Action::SetMode(Mode::Select));
        }
    }

    /// Leaving the surface ends the gesture exactly like pointer-up.
    pub fn pointer_leave(&mut self, state: &mut EditorState) {
        self.pointer_up(state);
    }

    /// Returns `true` when the key changed anything.
    pub fn key_down(&mut self, state: &mut EditorState, key: Key) -> bool {
        match key {
            Key::Delete | Key::Backspace => {
                let Some(selection) = state.selection else {
                    return false;
                };
                // Ends any capture; a trendline drag also returns to select mode.
                self.pointer_up(state);
                state.apply(match selection {
                    Selection::Candle(id) => Action::RemoveCandle(id),
                    Selection::Trendline(id) => Action::RemoveTrendline(id),
                    Selection::Callout(id) => Action::RemoveCallout(id),
                });
                true
            }
            Key::Escape => {
                let had_gesture = self.gesture.take().is_some();
                if had_gesture || state.mode != Mode::Select {
                    state.apply(Action::SetMode(Mode::Select));
                    return true;
                }
                false
            }
            Key::Other => false,
        }
    }
}

fn rank_of(state: &EditorState) -> u32 {
    u32::try_from(state.candle_count()).unwrap_or(u32::MAX)
}

/// Append a two-point step after the last close (100 when empty) and select it.
pub fn append_step_candle(
    state: &mut EditorState,
    direction: StepDirection,
    time_ms: i64,
) -> Option<CandleId> {
    let open = state.last_candle().map_or(100.0, |c| c.close);
    let close = match direction {
        StepDirection::Up => open + 2.0,
        StepDirection::Down => open - 2.0,
    };
    let candle = Candle::new(open, open.max(close) + 1.0, open.min(close) - 1.0, close, time_ms);
    let Some(Selection::Candle(id)) = state.apply(Action::AddCandle(candle)) else {
        return None;
    };
    state.apply(Action::Select(Some(Selection::Candle(id))));
    Some(id)
}

#[cfg(test)]
#[path = "../../tests/unit/editor/controller.rs"]
mod tests;
