use super::*;
use proptest::prelude::*;

#[test]
fn empty_series_uses_fallback_range() {
    let s = PriceScale::from_candles(&Vec::<Candle>::new(), 800.0, 0.05, PriceRange::default());
    assert_eq!(s.min(), 64_000.0);
    assert_eq!(s.max(), 66_000.0);
    assert_eq!(s.price_to_y(66_000.0), 0.0);
    assert_eq!(s.price_to_y(64_000.0), 800.0);
}

#[test]
fn padding_expands_observed_extremes() {
    let candles = [
        Candle::new(100.0, 110.0, 90.0, 105.0, 0),
        Candle::new(105.0, 120.0, 100.0, 101.0, 1),
    ];
    let s = PriceScale::from_candles(&candles, 800.0, 0.05, PriceRange::default());
    assert!((s.min() - 85.5).abs() < 1e-9);
    assert!((s.max() - 126.0).abs() < 1e-9);
}

#[test]
fn degenerate_range_is_one_unit() {
    let s = PriceScale::new(50.0, 50.0, 100.0);
    assert_eq!(s.span(), 1.0);
    assert_eq!(s.price_to_y(50.0), 100.0);
    assert_eq!(s.price_to_y(51.0), 0.0);
    assert!(s.y_to_price(37.0).is_finite());

    let flat = [Candle::new(0.0, 0.0, 0.0, 0.0, 0)];
    let s = PriceScale::from_candles(&flat, 100.0, 0.05, PriceRange::default());
    assert_eq!(s.span(), 1.0);
}

#[test]
fn non_positive_height_is_guarded() {
    let s = PriceScale::new(0.0, 10.0, 0.0);
    assert_eq!(s.height(), 1.0);
    assert!(s.y_to_price(0.5).is_finite());
}

#[test]
fn price_delta_is_positive_when_dragging_up() {
    let s = PriceScale::new(0.0, 100.0, 200.0);
    assert_eq!(s.price_delta(100.0, 80.0), 10.0);
    assert_eq!(s.price_delta(80.0, 100.0), -10.0);
}

proptest! {
    #[test]
    fn y_to_price_inverts_price_to_y(
        min in -1.0e6f64..1.0e6,
        span in 1.0e-3f64..1.0e6,
        height in 1.0f64..4000.0,
        t in 0.0f64..=1.0,
    ) {
        let s = PriceScale::new(min, min + span, height);
        let p = min + span * t;
        let back = s.y_to_price(s.price_to_y(p));
        prop_assert!((back - p).abs() <= 1e-6 * (1.0 + p.abs()));
    }
}
