//! Liquidity sweep detection
//!
//! A sweep is a candle whose wick pierces a liquidity level while its close lands
//! back on the original side. At most one sweep is recorded per level per call.

use super::liquidity::LiquidityLevel;
use super::swings::SwingKind;
use crate::types::{minutes_since, Candle};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepKind {
    /// Sell-side liquidity taken below a low, close back above
    BullishSweep,
    /// Buy-side liquidity taken above a high, close back below
    BearishSweep,
}

impl std::fmt::Display for SweepKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SweepKind::BullishSweep => write!(f, "bullish_sweep"),
            SweepKind::BearishSweep => write!(f, "bearish_sweep"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sweep {
    pub kind: SweepKind,
    pub level_price: f64,
    /// Sweeping candle time
    pub time: DateTime<Utc>,
    pub freshness: f64,
    /// Touches and strength of the swept level, carried for scoring
    pub touch_count: u32,
    pub level_strength: f64,
}

/// Check the newest `lookback` candles (newest first) against each level.
/// Marks swept levels in place and returns one record per swept level.
pub fn detect_sweeps(
    levels: &mut [LiquidityLevel],
    candles: &[Candle],
    lookback: usize,
    max_freshness_minutes: f64,
    now: DateTime<Utc>,
) -> Vec<Sweep> {
    let mut sweeps = Vec::new();
    let recent = &candles[candles.len().saturating_sub(lookback)..];

    for level in levels.iter_mut() {
        for candle in recent.iter().rev() {
            let freshness = minutes_since(candle.timestamp, now);
            if freshness > max_freshness_minutes {
                // Older candles are staler still
                break;
            }

            let kind = match level.kind {
                SwingKind::Low if candle.low < level.price && candle.close > level.price => SweepKind::BullishSweep,
                SwingKind::High if candle.high > level.price && candle.close < level.price => SweepKind::BearishSweep,
                _ => continue,
            };

            level.swept = true;
            sweeps.push(Sweep {
                kind,
                level_price: level.price,
                time: candle.timestamp,
                freshness,
                touch_count: level.touch_count,
                level_strength: level.strength,
            });
            break;
        }
    }

    sweeps
}
