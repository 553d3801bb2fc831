//! Market structure: trend, break of structure (BOS) and change of character (CHoCH)

use super::swings::SwingSet;
use crate::types::{Candle, Side};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Trend {
    #[serde(rename = "BULLISH")]
    Bullish,
    #[serde(rename = "BEARISH")]
    Bearish,
    #[serde(rename = "SIDEWAYS")]
    Sideways,
    /// Not enough swings yet
    #[serde(rename = "FORMING")]
    Forming,
    /// No candles at all
    #[serde(rename = "NO DATA")]
    NoData,
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Trend::Bullish => write!(f, "BULLISH"),
            Trend::Bearish => write!(f, "BEARISH"),
            Trend::Sideways => write!(f, "SIDEWAYS"),
            Trend::Forming => write!(f, "FORMING"),
            Trend::NoData => write!(f, "NO DATA"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StructureStatus {
    Confirmed,
    InsufficientData,
    NoData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketStructure {
    pub trend: Trend,
    pub bos: bool,
    pub choch: bool,
    /// Trade side implied by a BOS or CHoCH, if either fired
    pub signal: Option<Side>,
    pub status: StructureStatus,
    pub last_swing_high: Option<f64>,
    pub last_swing_low: Option<f64>,
}

impl MarketStructure {
    pub fn no_data() -> Self {
        Self {
            trend: Trend::NoData,
            bos: false,
            choch: false,
            signal: None,
            status: StructureStatus::NoData,
            last_swing_high: None,
            last_swing_low: None,
        }
    }

    fn forming(last_swing_high: Option<f64>, last_swing_low: Option<f64>) -> Self {
        Self {
            trend: Trend::Forming,
            status: StructureStatus::InsufficientData,
            last_swing_high,
            last_swing_low,
            ..Self::no_data()
        }
    }
}

/// Classify trend and breakout state from swings and the latest close
pub fn classify_structure(candles: &[Candle], swings: &SwingSet) -> MarketStructure {
    let Some(current) = candles.last() else {
        return MarketStructure::no_data();
    };

    let last_high = swings.highs.last().map(|s| s.price);
    let last_low = swings.lows.last().map(|s| s.price);

    if swings.highs.len() < 2 || swings.lows.len() < 2 {
        return MarketStructure::forming(last_high, last_low);
    }

    let highs = &swings.highs[swings.highs.len() - 2..];
    let lows = &swings.lows[swings.lows.len() - 2..];
    let (prev_high, latest_high) = (highs[0].price, highs[1].price);
    let (prev_low, latest_low) = (lows[0].price, lows[1].price);

    let trend = if latest_high > prev_high && latest_low > prev_low {
        Trend::Bullish
    } else if latest_high < prev_high && latest_low < prev_low {
        Trend::Bearish
    } else {
        Trend::Sideways
    };

    let close = current.close;
    let (bos, choch, signal) = match trend {
        Trend::Bullish if close > latest_high => (true, false, Some(Side::Buy)),
        Trend::Bullish if close < latest_low => (false, true, Some(Side::Sell)),
        Trend::Bearish if close < latest_low => (true, false, Some(Side::Sell)),
        Trend::Bearish if close > latest_high => (false, true, Some(Side::Buy)),
        _ => (false, false, None),
    };

    MarketStructure {
        trend,
        bos,
        choch,
        signal,
        status: StructureStatus::Confirmed,
        last_swing_high: Some(latest_high),
        last_swing_low: Some(latest_low),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smc_core::swings::{detect_swings, SwingKind, SwingPoint};
    use crate::test_support::{base_time, candle_at, discount_reference};
    use chrono::Duration;

    fn swings(highs: &[f64], lows: &[f64]) -> SwingSet {
        let make = |prices: &[f64], kind: SwingKind| -> Vec<SwingPoint> {
            prices
                .iter()
                .enumerate()
                .map(|(i, &price)| SwingPoint {
                    timestamp: base_time() + Duration::minutes(i as i64),
                    price,
                    kind,
                    index: i,
                })
                .collect()
        };
        let highs = make(highs, SwingKind::High);
        let lows = make(lows, SwingKind::Low);
        let mut all: Vec<SwingPoint> = highs.iter().chain(lows.iter()).cloned().collect();
        all.sort_by_key(|s| s.index);
        SwingSet { highs, lows, all }
    }

    fn closing_at(close: f64) -> Vec<Candle> {
        vec![candle_at(0, close, close + 1.0, close - 1.0, close)]
    }

    #[test]
    fn test_empty_series_is_no_data() {
        let structure = classify_structure(&[], &SwingSet::default());
        assert_eq!(structure.trend, Trend::NoData);
        assert_eq!(structure.status, StructureStatus::NoData);
    }

    #[test]
    fn test_insufficient_swings_is_forming() {
        let structure = classify_structure(&closing_at(10.0), &swings(&[20.0], &[5.0, 6.0]));
        assert_eq!(structure.trend, Trend::Forming);
        assert_eq!(structure.status, StructureStatus::InsufficientData);
        assert!(!structure.bos && !structure.choch);
        assert_eq!(structure.last_swing_high, Some(20.0));
    }

    #[test]
    fn test_bullish_bos() {
        let set = swings(&[20.0, 25.0], &[5.0, 8.0]);
        let structure = classify_structure(&closing_at(26.0), &set);
        assert_eq!(structure.trend, Trend::Bullish);
        assert!(structure.bos);
        assert!(!structure.choch);
        assert_eq!(structure.signal, Some(Side::Buy));
    }

    #[test]
    fn test_bullish_choch() {
        let set = swings(&[20.0, 25.0], &[5.0, 8.0]);
        let structure = classify_structure(&closing_at(7.0), &set);
        assert_eq!(structure.trend, Trend::Bullish);
        assert!(!structure.bos);
        assert!(structure.choch);
        assert_eq!(structure.signal, Some(Side::Sell));
    }

    #[test]
    fn test_bearish_bos_and_choch() {
        let set = swings(&[25.0, 20.0], &[8.0, 5.0]);

        let bos = classify_structure(&closing_at(4.0), &set);
        assert_eq!(bos.trend, Trend::Bearish);
        assert!(bos.bos && !bos.choch);
        assert_eq!(bos.signal, Some(Side::Sell));

        let choch = classify_structure(&closing_at(21.0), &set);
        assert!(choch.choch && !choch.bos);
        assert_eq!(choch.signal, Some(Side::Buy));
    }

    #[test]
    fn test_sideways_has_no_signal() {
        let set = swings(&[25.0, 20.0], &[5.0, 8.0]);
        let structure = classify_structure(&closing_at(30.0), &set);
        assert_eq!(structure.trend, Trend::Sideways);
        assert!(!structure.bos && !structure.choch);
        assert_eq!(structure.signal, None);
    }

    #[test]
    fn test_zigzag_reference_is_sideways() {
        // Equal peaks and troughs: neither higher highs nor lower lows
        let series = discount_reference();
        let set = detect_swings(&series.candles, 5);
        let structure = classify_structure(&series.candles, &set);
        assert_eq!(structure.status, StructureStatus::Confirmed);
        assert_eq!(structure.trend, Trend::Sideways);
    }
}
