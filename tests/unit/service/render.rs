use super::*;
use crate::editor::action::Action;

struct Fixed(Vec<u8>);

impl RenderService for Fixed {
    fn render(&self, _request: &RenderRequest) -> TradeAnimResult<RenderedVideo> {
        Ok(RenderedVideo {
            file_name: "trade_animation_custom.mp4".into(),
            container: Container::Mp4,
            bytes: self.0.clone(),
        })
    }
}

struct Failing;

impl RenderService for Failing {
    fn render(&self, _request: &RenderRequest) -> TradeAnimResult<RenderedVideo> {
        Err(TradeAnimError::render("ffmpeg exited with status 1: boom"))
    }
}

/// Blocks until the test sends on the gate.
struct Gated(Mutex<mpsc::Receiver<()>>);

impl RenderService for Gated {
    fn render(&self, request: &RenderRequest) -> TradeAnimResult<RenderedVideo> {
        let _ = self.0.lock().unwrap().recv();
        Fixed(b"late".to_vec()).render(request)
    }
}

fn wait_until(mut cond: impl FnMut() -> bool) {
    for _ in 0..500 {
        if cond() {
            return;
        }
        thread::sleep(Duration::from_millis(5));
    }
    panic!("condition not reached");
}

#[test]
fn export_saves_payload_and_reports_status() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("nested/out.mp4");
    let ctl = ExportController::new(Arc::new(Fixed(b"video".to_vec())), Duration::from_secs(5));
    assert_eq!(ctl.status(), ExportStatus::Idle);

    let saved = ctl.export(RenderRequest::default(), &dest).unwrap();

    assert_eq!(saved, dest);
    assert_eq!(std::fs::read(&dest).unwrap(), b"video");
    assert_eq!(ctl.status(), ExportStatus::Saved(dest));
    wait_until(|| !ctl.is_busy());
}

#[test]
fn service_failure_is_reported_and_releases_flag() {
    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("out.mp4");
    let ctl = ExportController::new(Arc::new(Failing), Duration::from_secs(5));

    let err = ctl.export(RenderRequest::default(), &dest).unwrap_err();

    assert!(err.to_string().contains("boom"));
    assert!(matches!(ctl.status(), ExportStatus::Failed(msg) if msg.contains("boom")));
    assert!(!dest.exists());
    wait_until(|| !ctl.is_busy());
    let again = ctl.export(RenderRequest::default(), &dest).unwrap_err();
    assert!(again.to_string().contains("boom"));
}

#[test]
fn reentrant_export_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let (gate, rx) = mpsc::channel();
    let ctl = Arc::new(ExportController::new(
        Arc::new(Gated(Mutex::new(rx))),
        Duration::from_secs(10),
    ));

    let first = {
        let ctl = ctl.clone();
        let dest = dir.path().join("first.mp4");
        thread::spawn(move || ctl.export(RenderRequest::default(), &dest))
    };
    wait_until(|| ctl.status() == ExportStatus::Rendering);

    let err = ctl
        .export(RenderRequest::default(), &dir.path().join("second.mp4"))
        .unwrap_err();
    assert!(err.to_string().contains("already in progress"));
    assert_eq!(ctl.status(), ExportStatus::Rendering);

    gate.send(()).unwrap();
    let saved = first.join().unwrap().unwrap();
    assert_eq!(std::fs::read(saved).unwrap(), b"late");
    assert!(!dir.path().join("second.mp4").exists());
}

#[test]
fn timeout_fails_but_keeps_flag_until_worker_returns() {
    let dir = tempfile::tempdir().unwrap();
    let (gate, rx) = mpsc::channel();
    let ctl = ExportController::new(Arc::new(Gated(Mutex::new(rx))), Duration::from_millis(20));

    let err = ctl
        .export(RenderRequest::default(), &dir.path().join("a.mp4"))
        .unwrap_err();
    assert!(err.to_string().contains("timed out"));
    assert!(matches!(ctl.status(), ExportStatus::Failed(_)));
    assert!(ctl.is_busy());

    gate.send(()).unwrap();
    wait_until(|| !ctl.is_busy());
}

#[test]
fn request_snapshots_state_and_fills_placeholder() {
    let empty = RenderRequest::from_state(&EditorState::new());
    assert_eq!(empty.effective_candles(), vec![Candle::placeholder(0)]);

    let mut state = EditorState::with_candles([Candle::new(1.0, 2.0, 0.5, 1.5, 7)]);
    state.apply(Action::ClearAll);
    state.apply(Action::AddCandle(Candle::new(10.0, 9.0, 8.0, 11.0, 3)));
    let req = RenderRequest::from_state(&state);
    let input = req.scene_input();
    assert_eq!(input.candles.len(), 1);
    assert!(input.candles[0].wicks_cover_body());
}

#[test]
fn request_json_accepts_partial_documents() {
    let req: RenderRequest = serde_json::from_str(
        r#"{"candles":[{"open":1,"high":2,"low":0.5,"close":1.5}],"title":{"title":"BTC"}}"#,
    )
    .unwrap();
    assert_eq!(req.candles[0].time, 0);
    assert_eq!(req.title.unwrap().subtitle, "");
    assert!(req.video.is_none());
}

#[test]
fn error_body_is_json() {
    let body = ErrorBody::from_error(&TradeAnimError::service("nope"));
    let v: serde_json::Value = serde_json::from_str(&body.to_json()).unwrap();
    assert_eq!(v["error"], "service error: nope");
}
