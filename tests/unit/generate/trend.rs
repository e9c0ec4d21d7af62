use super::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

#[test]
fn chained_valid_series() {
    let mut rng = StdRng::seed_from_u64(7);
    let params = TrendParams::default();
    let candles = trend(TrendKind::Ranging, &params, &mut rng);

    assert_eq!(candles.len(), 60);
    assert_eq!(candles[0].open, 10_000.0);
    for pair in candles.windows(2) {
        assert_eq!(pair[1].open, pair[0].close);
        assert_eq!(pair[1].time - pair[0].time, 60_000);
    }
    assert!(candles.iter().all(|c| c.wicks_cover_body()));
}

#[test]
fn closes_stay_within_noise_of_drift() {
    let mut rng = StdRng::seed_from_u64(1);
    let params = TrendParams::default();
    for c in trend(TrendKind::Uptrend, &params, &mut rng) {
        let step = c.close - c.open;
        assert!((-5.0..=35.0).contains(&step), "{step}");
        assert!(c.high - c.body_top() <= 20.0);
        assert!(c.body_bottom() - c.low <= 20.0);
    }
}

#[test]
fn uptrend_rises_and_downtrend_falls() {
    let params = TrendParams::default();
    let up = trend(TrendKind::Uptrend, &params, &mut StdRng::seed_from_u64(3));
    let down = trend(TrendKind::Downtrend, &params, &mut StdRng::seed_from_u64(3));
    // Same seed, same noise: only the drift differs.
    assert!((up[59].close - down[59].close - 2.0 * 15.0 * 60.0).abs() < 1e-6);
}

#[test]
fn same_seed_same_series() {
    let params = TrendParams {
        count: 10,
        ..TrendParams::default()
    };
    let a = trend(TrendKind::Downtrend, &params, &mut StdRng::seed_from_u64(42));
    let b = trend(TrendKind::Downtrend, &params, &mut StdRng::seed_from_u64(42));
    assert_eq!(a, b);
}
