use super::*;

#[test]
fn with_candles_assigns_sequential_handles() {
    let state = EditorState::with_candles([
        Candle::new(1.0, 2.0, 0.5, 1.5, 0),
        Candle::new(1.5, 3.0, 1.0, 2.5, 1),
    ]);
    assert_eq!(state.candle_id_at(0), Some(CandleId(0)));
    assert_eq!(state.candle_id_at(1), Some(CandleId(1)));
    assert_eq!(state.candle_id_at(2), None);
    assert_eq!(state.next_id, 2);
    assert_eq!(state.candle_index(CandleId(1)), Some(1));
}

#[test]
fn with_candles_normalizes_wicks() {
    let state = EditorState::with_candles([Candle::new(10.0, 10.0, 10.0, 12.0, 0)]);
    assert_eq!(state.candles[0].candle.high, 12.0);
}

#[test]
fn selection_round_trips_as_tagged_json() {
    let sel = Selection::Trendline(TrendlineId(7));
    let v = serde_json::to_value(sel).unwrap();
    assert_eq!(v, serde_json::json!({"kind": "trendline", "id": 7}));
    let back: Selection = serde_json::from_value(v).unwrap();
    assert_eq!(back, sel);
}

#[test]
fn state_json_is_flat_per_candle() {
    let state = EditorState::with_candles([Candle::new(1.0, 2.0, 0.5, 1.5, 42)]);
    let v = serde_json::to_value(&state).unwrap();
    assert_eq!(v["candles"][0]["id"], 0);
    assert_eq!(v["candles"][0]["time"], 42);
    assert_eq!(v["mode"], "select");
    let back: EditorState = serde_json::from_value(v).unwrap();
    assert_eq!(back, state);
}

#[test]
fn contains_tracks_live_elements() {
    let state = EditorState::with_candles([Candle::placeholder(0)]);
    assert!(state.contains(Selection::Candle(CandleId(0))));
    assert!(!state.contains(Selection::Candle(CandleId(9))));
    assert!(!state.contains(Selection::Callout(CalloutId(0))));
}

#[test]
fn loading_without_next_id_keeps_handles_unique() {
    let mut state: EditorState = serde_json::from_str(
        r#"{"candles":[
            {"id":0,"open":1,"high":2,"low":0.5,"close":1.5,"time":0},
            {"id":1,"open":1.5,"high":3,"low":1,"close":2.5,"time":1}
        ]}"#,
    )
    .unwrap();
    assert_eq!(state.next_id, 2);

    let Some(Selection::Candle(added)) =
        state.apply(crate::Action::AddCandle(Candle::new(2.5, 3.0, 2.0, 2.8, 2)))
    else {
        panic!("AddCandle should select the new candle");
    };
    assert_eq!(added, CandleId(2));

    state.apply(crate::Action::RemoveCandle(CandleId(0)));
    assert_eq!(state.candles.len(), 2);
    assert_eq!(state.candle_index(added), Some(1));
}

#[test]
fn stale_next_id_is_raised_past_annotations() {
    let state: EditorState = serde_json::from_value(serde_json::json!({
        "next_id": 1,
        "callouts": [{"id": 9, "position": {"x": 0.0, "y": 0.0}, "title": "t"}]
    }))
    .unwrap();
    assert_eq!(state.next_id, 10);
}

#[test]
fn loaded_selection_must_exist() {
    let state: EditorState = serde_json::from_value(serde_json::json!({
        "selection": {"kind": "callout", "id": 3}
    }))
    .unwrap();
    assert_eq!(state.selection, None);
}
