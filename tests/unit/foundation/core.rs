use super::*;

#[test]
fn fps_rejects_zero_parts() {
    assert!(Fps::new(0, 1).is_err());
    assert!(Fps::new(60, 0).is_err());
    assert!(Fps::integer(60).is_ok());
}

#[test]
fn fps_frame_second_conversions() {
    let fps = Fps::integer(60).unwrap();
    assert_eq!(fps.frames_to_secs(60), 1.0);
    assert_eq!(fps.secs_to_frames_floor(2.51), 150);
    assert_eq!(fps.secs_to_frames_floor(-1.0), 0);

    let ntsc = Fps::new(30_000, 1001).unwrap();
    assert!((ntsc.as_f64() - 29.97).abs() < 0.01);
}

#[test]
fn frame_range_iterates_half_open() {
    let r = FrameRange::new(FrameIndex(2), FrameIndex(5)).unwrap();
    assert_eq!(r.len_frames(), 3);
    assert!(r.contains(FrameIndex(4)));
    assert!(!r.contains(FrameIndex(5)));
    let frames: Vec<u64> = r.iter().map(|f| f.0).collect();
    assert_eq!(frames, vec![2, 3, 4]);
    assert!(FrameRange::new(FrameIndex(3), FrameIndex(1)).is_err());
}

#[test]
fn canvas_rejects_empty() {
    assert!(Canvas { width: 0, height: 10 }.validate().is_err());
    assert!(Canvas { width: 4, height: 4 }.validate().is_ok());
}
