//! Swing point detection
//!
//! A candle is a swing high when its high is the maximum high over the symmetric
//! window `[i - period, i + period]`, and a swing low when its low is the window
//! minimum. Flat tops/bottoms emit every tied index.

use crate::types::Candle;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwingKind {
    High,
    Low,
}

impl std::fmt::Display for SwingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SwingKind::High => write!(f, "high"),
            SwingKind::Low => write!(f, "low"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwingPoint {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
    pub kind: SwingKind,
    /// Index of the source candle within its series
    pub index: usize,
}

/// Swing highs, swing lows and their time-ordered merge
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SwingSet {
    pub highs: Vec<SwingPoint>,
    pub lows: Vec<SwingPoint>,
    pub all: Vec<SwingPoint>,
}

impl SwingSet {
    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }
}

/// Detect swing points with a window half-width of `period` candles
pub fn detect_swings(candles: &[Candle], period: usize) -> SwingSet {
    let mut swings = SwingSet::default();

    if candles.len() < 2 * period + 1 {
        return swings;
    }

    for i in period..candles.len() - period {
        let window = &candles[i - period..=i + period];
        let window_high = window.iter().map(|c| c.high).fold(f64::MIN, f64::max);
        let window_low = window.iter().map(|c| c.low).fold(f64::MAX, f64::min);
        let candle = &candles[i];

        if candle.high == window_high {
            let swing = SwingPoint {
                timestamp: candle.timestamp,
                price: candle.high,
                kind: SwingKind::High,
                index: i,
            };
            swings.highs.push(swing.clone());
            swings.all.push(swing);
        }

        if candle.low == window_low {
            let swing = SwingPoint {
                timestamp: candle.timestamp,
                price: candle.low,
                kind: SwingKind::Low,
                index: i,
            };
            swings.lows.push(swing.clone());
            swings.all.push(swing);
        }
    }

    swings
}
