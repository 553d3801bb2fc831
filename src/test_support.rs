//! Candle fixtures shared by unit tests

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::types::{Candle, Series};

/// 08:30 New York (EST) on a Wednesday, inside the New York kill zone
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 8, 13, 30, 0).unwrap()
}

/// Price expressed as points above 1.10000, one point = one pip-equivalent at multiplier 100000
pub fn px(points: f64) -> f64 {
    1.1 + points * 1e-5
}

/// One-minute candle `index` minutes after `base_time()`, prices in points
pub fn candle_at(index: i64, open: f64, high: f64, low: f64, close: f64) -> Candle {
    Candle::new(
        base_time() + Duration::minutes(index),
        px(open),
        px(high),
        px(low),
        px(close),
        100.0,
    )
}

/// One-minute series from (open, high, low, close) tuples in points
pub fn minute_series(bars: &[(f64, f64, f64, f64)]) -> Series {
    let candles = bars
        .iter()
        .enumerate()
        .map(|(i, &(o, h, l, c))| candle_at(i as i64, o, h, l, c))
        .collect();
    Series::new("1m", candles)
}

/// Series built from a list of highs/lows only; open/close sit mid-bar
pub fn series_from_extremes(timeframe: &str, start: DateTime<Utc>, step: Duration, extremes: &[(f64, f64)]) -> Series {
    let candles = extremes
        .iter()
        .enumerate()
        .map(|(i, &(high, low))| {
            let mid = (high + low) / 2.0;
            Candle::new(start + step * i as i32, mid, high, low, mid, 100.0)
        })
        .collect();
    Series::new(timeframe, candles)
}

/// Triangle wave with a 12-candle cycle: troughs at 0, 12, 24, ... and peaks at 6, 18, 30, ...
/// Mid-prices run from `trough` to `peak`; each candle spans `wick` either side of its mid.
pub fn zigzag(timeframe: &str, start: DateTime<Utc>, step: Duration, count: usize, trough: f64, peak: f64, wick: f64) -> Series {
    let unit = (peak - trough) / 6.0;
    let extremes: Vec<(f64, f64)> = (0..count)
        .map(|k| {
            let phase = k % 12;
            let v = if phase <= 6 { phase } else { 12 - phase };
            let mid = trough + v as f64 * unit;
            (mid + wick, mid - wick)
        })
        .collect();
    series_from_extremes(timeframe, start, step, &extremes)
}

/// The 15-candle order block scenario: candle 6 is a down candle, candle 7 displaces above its high.
/// No swing points survive at period 5 (candle 4 holds the highest high, candle 10 the lowest low)
/// and no fair value gaps form. Last close is 1.10025.
pub fn order_block_scenario() -> Series {
    minute_series(&[
        (10.0, 14.0, 6.0, 12.0),
        (12.0, 16.0, 9.0, 13.0),
        (13.0, 17.0, 10.0, 15.0),
        (15.0, 18.0, 12.0, 16.0),
        (16.0, 60.0, 14.0, 18.0),
        (18.0, 22.0, 12.0, 20.0),
        (20.0, 21.0, 12.0, 13.0),
        (13.0, 30.0, 13.0, 28.0),
        (28.0, 31.0, 20.0, 29.0),
        (29.0, 32.0, 26.0, 30.0),
        (30.0, 31.0, -80.0, 29.0),
        (29.0, 30.0, 25.0, 28.0),
        (28.0, 30.0, 26.0, 29.0),
        (29.0, 30.0, 27.0, 28.0),
        (28.0, 29.0, 24.0, 25.0),
    ])
}

/// Reference (15m) series whose range puts the scenario's last close deep in discount
pub fn discount_reference() -> Series {
    zigzag(
        "15m",
        base_time() - Duration::minutes(15 * 40),
        Duration::minutes(15),
        40,
        1.0990,
        1.1100,
        0.0001,
    )
}

/// 30 one-minute candles with swing lows at 6 (0) and 18 (2) that cluster into one
/// two-touch level, swing highs at 12 (45) and 23 (37), and a last candle that wicks
/// to -3 and closes back at 8.5, sweeping the clustered lows. Open equals close on
/// every candle, so no order blocks form, and no fair value gaps form either.
pub fn liquidity_sweep_scenario() -> Series {
    let mut lows: Vec<f64> = vec![30.0, 25.0, 20.0, 15.0, 10.0, 5.0, 0.0];
    lows.extend([5.0, 10.0, 15.0, 20.0, 25.0, 30.0]);
    lows.extend([25.0, 20.0, 15.0, 10.0, 5.0, 2.0]);
    lows.extend([5.0, 10.0, 15.0, 20.0, 25.0]);
    lows.extend([22.0, 20.0, 18.0, 16.0, 14.0]);

    let mut extremes: Vec<(f64, f64)> = lows.iter().map(|&low| (px(low + 12.0), px(low))).collect();
    extremes[12] = (px(45.0), px(30.0));
    extremes.push((px(20.0), px(-3.0)));

    series_from_extremes("1m", base_time(), Duration::minutes(1), &extremes)
}
