//! Order block detection
//!
//! A bullish order block is the last down candle before a displacement up: candle
//! `i` closes below its open and candle `i + 1` closes above candle `i`'s high.
//! Bearish is the mirror image. The zone runs from the anchor's open to its far wick.

use crate::config::AnalysisConfig;
use crate::types::{minutes_since, to_pips, Candle, Direction};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Minimum anchor body (pip-equivalents) for a block to count
const MIN_BODY_PIPS: f64 = 2.0;

/// Minimum displacement beyond the anchor's extreme (pip-equivalents)
const MIN_DISPLACEMENT_PIPS: f64 = 3.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBlock {
    pub kind: Direction,
    pub zone_min: f64,
    pub zone_max: f64,
    /// Anchor candle open, the proximal edge of the zone
    pub price: f64,
    pub time: DateTime<Utc>,
    pub index: usize,
    pub freshness: f64,
    /// Anchor body in pip-equivalents
    pub size: f64,
    pub strength: f64,
}

/// Scan consecutive candle triples for order blocks
pub fn detect_order_blocks(candles: &[Candle], config: &AnalysisConfig, now: DateTime<Utc>) -> Vec<OrderBlock> {
    let mut blocks = Vec::new();

    for (i, triple) in candles.windows(3).enumerate() {
        let anchor = &triple[0];
        let next = &triple[1];

        let (kind, displacement) = if anchor.is_bearish() && next.close > anchor.high {
            (Direction::Bullish, next.close - anchor.high)
        } else if anchor.is_bullish() && next.close < anchor.low {
            (Direction::Bearish, anchor.low - next.close)
        } else {
            continue;
        };

        let body_pips = to_pips(anchor.body(), config.price_multiplier);
        let displacement_pips = to_pips(displacement, config.price_multiplier);
        if body_pips < MIN_BODY_PIPS && displacement_pips < MIN_DISPLACEMENT_PIPS {
            continue;
        }

        let freshness = minutes_since(anchor.timestamp, now);
        if freshness > config.max_freshness_minutes {
            continue;
        }

        let (zone_min, zone_max) = match kind {
            Direction::Bullish => (anchor.low, anchor.open),
            Direction::Bearish => (anchor.open, anchor.high),
        };

        blocks.push(OrderBlock {
            kind,
            zone_min,
            zone_max,
            price: anchor.open,
            time: anchor.timestamp,
            index: i,
            freshness,
            size: body_pips,
            strength: (body_pips * 10.0).clamp(0.0, 100.0),
        });
    }

    blocks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{base_time, candle_at, order_block_scenario, px};
    use chrono::Duration;

    #[test]
    fn test_scenario_yields_single_bullish_block() {
        let series = order_block_scenario();
        let now = base_time() + Duration::minutes(15);
        let blocks = detect_order_blocks(&series.candles, &AnalysisConfig::default(), now);

        assert_eq!(blocks.len(), 1);
        let block = &blocks[0];
        assert_eq!(block.kind, Direction::Bullish);
        assert_eq!(block.index, 6);
        assert_eq!(block.zone_min, series.candles[6].low);
        assert_eq!(block.zone_max, series.candles[6].open);
        assert_eq!(block.time, series.candles[6].timestamp);
        assert!((block.freshness - 9.0).abs() < 1e-9);
        assert!((block.size - 7.0).abs() < 1e-6);
        assert!((block.strength - 70.0).abs() < 1e-4);
    }

    #[test]
    fn test_bearish_block() {
        let candles = vec![
            candle_at(0, 10.0, 20.0, 8.0, 18.0),
            candle_at(1, 18.0, 19.0, 0.0, 2.0),
            candle_at(2, 2.0, 4.0, 0.0, 3.0),
        ];
        let now = base_time() + Duration::minutes(3);
        let blocks = detect_order_blocks(&candles, &AnalysisConfig::default(), now);

        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].kind, Direction::Bearish);
        assert_eq!(blocks[0].zone_min, px(10.0));
        assert_eq!(blocks[0].zone_max, px(20.0));
    }

    #[test]
    fn test_size_filter() {
        // One-point body and a one-point displacement: too small
        let candles = vec![
            candle_at(0, 11.0, 12.0, 9.0, 10.0),
            candle_at(1, 10.0, 13.5, 10.0, 13.0),
            candle_at(2, 13.0, 14.0, 12.0, 13.5),
        ];
        let now = base_time() + Duration::minutes(3);
        assert!(detect_order_blocks(&candles, &AnalysisConfig::default(), now).is_empty());

        // Same small body but a four-point displacement passes
        let candles = vec![
            candle_at(0, 11.0, 12.0, 9.0, 10.0),
            candle_at(1, 10.0, 17.0, 10.0, 16.0),
            candle_at(2, 16.0, 17.0, 15.0, 16.5),
        ];
        assert_eq!(detect_order_blocks(&candles, &AnalysisConfig::default(), now).len(), 1);
    }

    #[test]
    fn test_stale_blocks_dropped() {
        let series = order_block_scenario();
        let now = base_time() + Duration::minutes(6 + 121);
        assert!(detect_order_blocks(&series.candles, &AnalysisConfig::default(), now).is_empty());
    }
}
