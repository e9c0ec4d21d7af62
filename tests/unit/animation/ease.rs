use super::*;

const ALL: [Ease; 6] = [
    Ease::Linear,
    Ease::InQuad,
    Ease::OutQuad,
    Ease::InOutQuad,
    Ease::OutCubic,
    Ease::InOutCubic,
];

#[test]
fn endpoints_are_exact() {
    for ease in ALL {
        assert_eq!(ease.apply(0.0), 0.0, "{ease:?}");
        assert_eq!(ease.apply(1.0), 1.0, "{ease:?}");
    }
}

#[test]
fn out_of_range_input_is_clamped() {
    for ease in ALL {
        assert_eq!(ease.apply(-3.0), 0.0);
        assert_eq!(ease.apply(7.0), 1.0);
    }
}

#[test]
fn strictly_increasing_on_samples() {
    for ease in ALL {
        let mut prev = ease.apply(0.0);
        for i in 1..=20 {
            let v = ease.apply(f64::from(i) / 20.0);
            assert!(v > prev, "{ease:?} at {i}");
            prev = v;
        }
    }
}

#[test]
fn in_out_curves_are_symmetric() {
    for ease in [Ease::InOutQuad, Ease::InOutCubic] {
        assert!((ease.apply(0.5) - 0.5).abs() < 1e-12);
        assert!((ease.apply(0.2) + ease.apply(0.8) - 1.0).abs() < 1e-12);
    }
}
