use super::*;
use crate::chart::scale::PriceRange;
use crate::editor::hit::Handle;

fn controller_with_fallback(min: f64, max: f64) -> Controller {
    Controller::new(
        ChartLayout {
            fallback_range: PriceRange { min, max },
            ..ChartLayout::default()
        },
        HitTolerance::default(),
    )
}

fn one_candle() -> EditorState {
    EditorState::with_candles([Candle::new(100.0, 110.0, 95.0, 105.0, 0)])
}

#[test]
fn draw_candle_on_empty_chart_uses_clicked_price() {
    let mut ctl = controller_with_fallback(0.0, 100.0);
    let mut state = EditorState::new();
    state.apply(Action::SetMode(Mode::DrawCandle));

    ctl.pointer_down(&mut state, PointerEvent::new(5.0, 400.0, 1234));

    assert_eq!(state.candles.len(), 1);
    let c = state.candles[0].candle;
    assert!((c.open - 50.0).abs() < 1e-9);
    assert!((c.close - 50.0).abs() < 1e-9);
    assert!(c.high > 50.0 && c.low < 50.0);
    assert!(((c.high - 50.0) - (50.0 - c.low)).abs() < 1e-9);
    assert_eq!(c.time, 1234);
    assert!(matches!(ctl.gesture(), Some(Gesture::DrawCandle { .. })));
}

#[test]
fn draw_candle_opens_at_previous_close_and_tracks_cursor() {
    let mut ctl = Controller::default();
    let mut state = one_candle();
    state.apply(Action::SetMode(Mode::DrawCandle));
    let scale = ctl.price_scale(&state);

    ctl.pointer_down(&mut state, PointerEvent::new(30.0, scale.price_to_y(100.0), 1));
    let id = state.candles[1].id;
    assert_eq!(state.candle(id).unwrap().open, 105.0);

    ctl.pointer_move(&mut state, PointerEvent::new(30.0, scale.price_to_y(115.0), 2));
    let c = *state.candle(id).unwrap();
    assert!((c.close - 115.0).abs() < 1e-6);
    assert!((c.high - 116.0).abs() < 1e-6);
    assert!((c.low - 104.0).abs() < 1e-6);
    assert_eq!(c.time, 1);

    ctl.pointer_up(&mut state);
    assert!(!ctl.is_capturing());
    assert_eq!(state.mode, Mode::DrawCandle);
}

#[test]
fn dragging_high_below_body_clamps_to_body_top() {
    let mut ctl = Controller::default();
    let mut state = one_candle();
    let scale = ctl.price_scale(&state);
    let high_y = scale.price_to_y(110.0);

    ctl.pointer_down(&mut state, PointerEvent::new(8.0, high_y, 0));
    assert_eq!(state.selection, Some(Selection::Candle(CandleId(0))));
    assert!(matches!(
        ctl.gesture(),
        Some(Gesture::Sculpt {
            handle: Handle::High,
            ..
        })
    ));

    ctl.pointer_move(&mut state, PointerEvent::new(8.0, high_y + 600.0, 0));
    let c = *state.candle(CandleId(0)).unwrap();
    assert_eq!(c.high, 105.0);
    assert!(c.wicks_cover_body());

    ctl.pointer_up(&mut state);
    assert!(!ctl.is_capturing());
}

#[test]
fn sculpt_applies_total_delta_from_gesture_start() {
    let mut ctl = Controller::default();
    let mut state = one_candle();
    let scale = ctl.price_scale(&state);
    let low_y = scale.price_to_y(95.0);

    ctl.pointer_down(&mut state, PointerEvent::new(8.0, low_y, 0));
    // Overshoot then come back: the result depends only on the final position.
    ctl.pointer_move(&mut state, PointerEvent::new(8.0, low_y - 300.0, 0));
    assert_eq!(state.candle(CandleId(0)).unwrap().low, 100.0);
    ctl.pointer_move(&mut state, PointerEvent::new(8.0, low_y + 10.0, 0));
    let expected = 95.0 + scale.price_delta(low_y, low_y + 10.0);
    assert!((state.candle(CandleId(0)).unwrap().low - expected).abs() < 1e-9);
}

#[test]
fn body_drag_moves_whole_candle() {
    let mut ctl = Controller::default();
    let mut state = one_candle();
    let scale = ctl.price_scale(&state);
    let mid_y = scale.price_to_y(102.5);

    ctl.pointer_down(&mut state, PointerEvent::new(8.0, mid_y, 0));
    ctl.pointer_move(&mut state, PointerEvent::new(400.0, mid_y - 40.0, 0));

    let delta = scale.price_delta(mid_y, mid_y - 40.0);
    let c = *state.candle(CandleId(0)).unwrap();
    assert!((c.open - (100.0 + delta)).abs() < 1e-9);
    assert!((c.close - (105.0 + delta)).abs() < 1e-9);
    assert!((c.high - (110.0 + delta)).abs() < 1e-9);
    assert!((c.low - (95.0 + delta)).abs() < 1e-9);
}

#[test]
fn pointer_leave_releases_capture() {
    let mut ctl = Controller::default();
    let mut state = one_candle();
    let high_y = ctl.price_scale(&state).price_to_y(110.0);

    ctl.pointer_down(&mut state, PointerEvent::new(8.0, high_y, 0));
    ctl.pointer_leave(&mut state);
    assert!(!ctl.is_capturing());

    let before = state.clone();
    ctl.pointer_move(&mut state, PointerEvent::new(8.0, high_y - 100.0, 0));
    assert_eq!(state, before);
}

#[test]
fn column_hit_outside_handles_only_selects() {
    let mut ctl = Controller::default();
    let mut state = one_candle();
    ctl.pointer_down(&mut state, PointerEvent::new(8.0, 1.0, 0));
    assert_eq!(state.selection, Some(Selection::Candle(CandleId(0))));
    assert!(!ctl.is_capturing());
}

#[test]
fn clicking_empty_space_clears_selection() {
    let mut ctl = Controller::default();
    let mut state = one_candle();
    state.apply(Action::Select(Some(Selection::Candle(CandleId(0)))));
    ctl.pointer_down(&mut state, PointerEvent::new(500.0, 10.0, 0));
    assert_eq!(state.selection, None);
}

#[test]
fn draw_trendline_gesture() {
    let mut ctl = Controller::default();
    let mut state = one_candle();
    state.apply(Action::SetMode(Mode::DrawTrendline));

    ctl.pointer_down(&mut state, PointerEvent::new(10.0, 20.0, 0));
    let line = state.trendlines[0].id;
    assert_eq!(state.selection, Some(Selection::Trendline(line)));
    assert_eq!(state.trendlines[0].points, vec![Point::new(10.0, 20.0); 2]);
    assert_eq!(state.trendlines[0].delay_rank, 1);

    ctl.pointer_move(&mut state, PointerEvent::new(200.0, 90.0, 0));
    assert_eq!(
        state.trendlines[0].points,
        vec![Point::new(10.0, 20.0), Point::new(200.0, 90.0)]
    );

    ctl.pointer_up(&mut state);
    assert_eq!(state.mode, Mode::Select);
    assert_eq!(state.selection, None);
    assert_eq!(state.trendlines.len(), 1);
}

#[test]
fn add_callout_is_single_shot() {
    let mut ctl = Controller::default();
    let mut state = one_candle();
    state.apply(Action::SetMode(Mode::AddCallout));

    ctl.pointer_down(&mut state, PointerEvent::new(300.0, 120.0, 0));
    assert_eq!(state.callouts.len(), 1);
    let c = &state.callouts[0];
    assert_eq!(c.title, NEW_CALLOUT_TITLE);
    assert_eq!(c.description, NEW_CALLOUT_DESCRIPTION);
    assert_eq!(c.tone, Tone::Info);
    assert_eq!(c.position, Point::new(300.0, 120.0));
    assert_eq!(state.mode, Mode::Select);
    assert!(!ctl.is_capturing());
}

#[test]
fn delete_removes_any_selected_element() {
    let mut ctl = Controller::default();
    let mut state = one_candle();
    assert!(!ctl.key_down(&mut state, Key::Delete));

    state.apply(Action::Select(Some(Selection::Candle(CandleId(0)))));
    assert!(ctl.key_down(&mut state, Key::Backspace));
    assert!(state.candles.is_empty());
    assert_eq!(state.selection, None);

    state.apply(Action::SetMode(Mode::AddCallout));
    ctl.pointer_down(&mut state, PointerEvent::new(50.0, 50.0, 0));
    let callout = state.callouts[0].id;
    state.apply(Action::Select(Some(Selection::Callout(callout))));
    assert!(ctl.key_down(&mut state, Key::Delete));
    assert!(state.callouts.is_empty());
}

#[test]
fn delete_during_trendline_drag_returns_to_select() {
    let mut ctl = Controller::default();
    let mut state = one_candle();
    state.apply(Action::SetMode(Mode::DrawTrendline));
    ctl.pointer_down(&mut state, PointerEvent::new(10.0, 10.0, 0));
    ctl.pointer_move(&mut state, PointerEvent::new(60.0, 40.0, 0));

    assert!(ctl.key_down(&mut state, Key::Delete));
    assert!(state.trendlines.is_empty());
    assert!(!ctl.is_capturing());
    assert_eq!(state.mode, Mode::Select);

    ctl.pointer_up(&mut state);
    assert_eq!(state.mode, Mode::Select);
    assert_eq!(state.candles.len(), 1);
}

#[test]
fn pointer_event_keeps_coordinates() {
    let ev = PointerEvent::new(12.5, -3.0, 42);
    assert_eq!(ev.position, Point::new(12.5, -3.0));
    assert_eq!(ev.time_ms, 42);
}

#[test]
fn gesture_on_removed_candle_is_a_no_op() {
    let mut ctl = Controller::default();
    let mut state = one_candle();
    let high_y = ctl.price_scale(&state).price_to_y(110.0);
    ctl.pointer_down(&mut state, PointerEvent::new(8.0, high_y, 0));
    state.apply(Action::RemoveCandle(CandleId(0)));

    ctl.pointer_move(&mut state, PointerEvent::new(8.0, high_y - 50.0, 0));
    assert!(state.candles.is_empty());
}

#[test]
fn escape_cancels_gesture_and_tool() {
    let mut ctl = Controller::default();
    let mut state = EditorState::new();
    state.apply(Action::SetMode(Mode::DrawTrendline));
    ctl.pointer_down(&mut state, PointerEvent::new(1.0, 1.0, 0));
    assert!(ctl.key_down(&mut state, Key::Escape));
    assert!(!ctl.is_capturing());
    assert_eq!(state.mode, Mode::Select);
    assert!(!ctl.key_down(&mut state, Key::Escape));
    assert!(!ctl.key_down(&mut state, Key::Other));
}

#[test]
fn append_step_candle_chains_from_last_close() {
    let mut state = EditorState::new();
    let first = append_step_candle(&mut state, StepDirection::Up, 0).unwrap();
    assert_eq!(*state.candle(first).unwrap(), Candle::new(100.0, 103.0, 99.0, 102.0, 0));
    assert_eq!(state.selection, Some(Selection::Candle(first)));

    let second = append_step_candle(&mut state, StepDirection::Down, 60_000).unwrap();
    assert_eq!(*state.candle(second).unwrap(), Candle::new(102.0, 103.0, 99.0, 100.0, 60_000));
    assert_eq!(state.selection, Some(Selection::Candle(second)));
}
