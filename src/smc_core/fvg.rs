//! Fair value gap detection over candle triples `(i-2, i-1, i)`

use crate::config::AnalysisConfig;
use crate::types::{minutes_since, to_pips, Candle, Direction};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FairValueGap {
    pub kind: Direction,
    pub zone_min: f64,
    pub zone_max: f64,
    /// Middle candle of the triple
    pub time: DateTime<Utc>,
    pub index: usize,
    pub freshness: f64,
    /// Gap height in pip-equivalents
    pub size: f64,
    pub strength: f64,
}

impl FairValueGap {
    pub fn midpoint(&self) -> f64 {
        (self.zone_min + self.zone_max) / 2.0
    }
}

/// Find untraded three-candle gaps.
///
/// Bullish: the first candle's low sits above the third candle's high.
/// Bearish: the first candle's high sits below the third candle's low.
pub fn detect_fair_value_gaps(candles: &[Candle], config: &AnalysisConfig, now: DateTime<Utc>) -> Vec<FairValueGap> {
    let mut gaps = Vec::new();

    for (offset, triple) in candles.windows(3).enumerate() {
        let (first, middle, last) = (&triple[0], &triple[1], &triple[2]);

        let (kind, zone_min, zone_max) = if first.low > last.high {
            (Direction::Bullish, last.high, first.low)
        } else if first.high < last.low {
            (Direction::Bearish, first.high, last.low)
        } else {
            continue;
        };

        let freshness = minutes_since(middle.timestamp, now);
        if freshness > config.max_freshness_minutes {
            continue;
        }

        let size = to_pips(zone_max - zone_min, config.price_multiplier);
        gaps.push(FairValueGap {
            kind,
            zone_min,
            zone_max,
            time: middle.timestamp,
            index: offset + 1,
            freshness,
            size,
            strength: (size * 10.0).clamp(0.0, 100.0),
        });
    }

    gaps
}
