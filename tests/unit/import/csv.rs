use super::*;

#[test]
fn parses_header_and_date_rows() {
    let candles = parse_candles_csv("time,open,high,low,close\n2024-01-01,10,12,9,11\n").unwrap();
    assert_eq!(candles, vec![Candle::new(10.0, 12.0, 9.0, 11.0, 1_704_067_200_000)]);
}

#[test]
fn headerless_rows_and_volume_column() {
    let text = "1700000000,1,2,0.5,1.5,900\n1700000060000,1.5,2,1,1.2,100\n";
    let candles = parse_candles_csv(text).unwrap();
    assert_eq!(candles.len(), 2);
    assert_eq!(candles[0].time, 1_700_000_000_000);
    assert_eq!(candles[1].time, 1_700_000_060_000);
}

#[test]
fn header_columns_may_be_reordered() {
    let text = "Date,Close,Open,High,Low\n2024-01-02 10:30:00,11,10,12,9\n";
    let c = parse_candles_csv(text).unwrap()[0];
    assert_eq!((c.open, c.high, c.low, c.close), (10.0, 12.0, 9.0, 11.0));
    assert_eq!(c.time, 1_704_191_400_000);
}

#[test]
fn bad_rows_are_dropped() {
    let text = "time,open,high,low,close\n\
                2024-01-01,10,12,9,11\n\
                2024-01-02,10,12\n\
                2024-01-03,abc,12,9,11\n\
                \n\
                2024-01-04,11,13,10,12\n";
    let candles = parse_candles_csv(text).unwrap();
    assert_eq!(candles.len(), 2);
    assert_eq!(candles[1].open, 11.0);
}

#[test]
fn unparseable_time_falls_back_to_previous_plus_step() {
    let text = "2024-01-01T00:00:00Z,1,2,0,1\nyesterday,1,2,0,1\n???,1,2,0,1\n";
    let candles = parse_candles_csv(text).unwrap();
    assert_eq!(candles[1].time, candles[0].time + 60_000);
    assert_eq!(candles[2].time, candles[0].time + 120_000);

    let opts = CsvOptions {
        fallback_start_ms: 5_000,
        fallback_step_ms: 1_000,
    };
    let candles = parse_candles_csv_with("a,1,2,0,1\nb,1,2,0,1\n", &opts).unwrap();
    assert_eq!((candles[0].time, candles[1].time), (5_000, 6_000));
}

#[test]
fn wicks_are_widened() {
    let c = parse_candles_csv("0,10,10.5,10.2,12\n").unwrap()[0];
    assert!(c.wicks_cover_body());
    assert_eq!(c.high, 12.0);
    assert_eq!(c.low, 10.0);
}

#[test]
fn empty_input_is_an_import_error() {
    assert!(matches!(parse_candles_csv(""), Err(TradeAnimError::Import(_))));
    assert!(matches!(
        parse_candles_csv("time,open,high,low,close\n"),
        Err(TradeAnimError::Import(_))
    ));
}

#[test]
fn time_formats() {
    assert_eq!(parse_time_ms("2024-01-01T00:00:00+01:00"), Some(1_704_063_600_000));
    assert_eq!(parse_time_ms("2024-01-01 00:00:01"), Some(1_704_067_201_000));
    assert_eq!(parse_time_ms("1704067200"), Some(1_704_067_200_000));
    assert_eq!(parse_time_ms("1704067200000"), Some(1_704_067_200_000));
    assert_eq!(parse_time_ms("not a date"), None);
    assert_eq!(parse_time_ms(""), None);
}
