use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One OHLCV candle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    pub fn new(timestamp: DateTime<Utc>, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }

    /// Absolute open-to-close distance
    pub fn body(&self) -> f64 {
        (self.close - self.open).abs()
    }
}

/// Ordered candles for one timeframe (e.g. "1m", "15m")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub timeframe: String,
    pub candles: Vec<Candle>,
}

impl Series {
    pub fn new(timeframe: impl Into<String>, candles: Vec<Candle>) -> Self {
        Self {
            timeframe: timeframe.into(),
            candles,
        }
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn last(&self) -> Option<&Candle> {
        self.candles.last()
    }
}

/// Directional bias of a detected pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Bullish,
    Bearish,
}

impl Direction {
    /// Trade side a reaction at this pattern would take
    pub fn side(self) -> Side {
        match self {
            Direction::Bullish => Side::Buy,
            Direction::Bearish => Side::Sell,
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Bullish => write!(f, "Bullish"),
            Direction::Bearish => write!(f, "Bearish"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    #[serde(rename = "BUY")]
    Buy,
    #[serde(rename = "SELL")]
    Sell,
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::Buy => write!(f, "BUY"),
            Side::Sell => write!(f, "SELL"),
        }
    }
}

/// Minutes elapsed from `then` to `now`, floored at zero for candles stamped in the future
pub fn minutes_since(then: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let elapsed = (now - then).num_milliseconds() as f64 / 60_000.0;
    elapsed.max(0.0)
}

/// Price difference expressed in pip-equivalents
pub fn to_pips(price_diff: f64, multiplier: f64) -> f64 {
    price_diff.abs() * multiplier
}
