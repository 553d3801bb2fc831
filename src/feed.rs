//! Market data retrieval at the engine boundary
//!
//! Sources never fail hard for missing or partial data: callers get an explicit
//! `FetchOutcome::NoData` and fall through to the engine's HOLD sentinel.

use crate::types::{Candle, Series};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Data(Series),
    NoData { reason: String },
}

impl FetchOutcome {
    pub fn no_data(reason: impl Into<String>) -> Self {
        FetchOutcome::NoData { reason: reason.into() }
    }

    pub fn into_series(self) -> Option<Series> {
        match self {
            FetchOutcome::Data(series) => Some(series),
            FetchOutcome::NoData { .. } => None,
        }
    }
}

/// Anything that can hand out the newest `limit` candles of a symbol/timeframe
pub trait CandleSource: Send + Sync {
    fn fetch(&self, symbol: &str, timeframe: &str, limit: usize) -> FetchOutcome;
}

/// CSV row: `timestamp,open,high,low,close,volume`
#[derive(Debug, Deserialize)]
struct CsvRow {
    timestamp: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    #[serde(default)]
    volume: f64,
}

/// Reads `<dir>/<SYMBOL>_<timeframe>.csv`
#[derive(Debug, Clone)]
pub struct CsvCandleSource {
    dir: PathBuf,
}

impl CsvCandleSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, symbol: &str, timeframe: &str) -> PathBuf {
        self.dir.join(format!("{}_{}.csv", symbol, timeframe))
    }

    /// Load every valid candle from the file, oldest first
    pub fn load(&self, symbol: &str, timeframe: &str) -> Result<Vec<Candle>> {
        let path = self.path_for(symbol, timeframe);
        load_candles(&path)
    }
}

impl CandleSource for CsvCandleSource {
    fn fetch(&self, symbol: &str, timeframe: &str, limit: usize) -> FetchOutcome {
        match self.load(symbol, timeframe) {
            Ok(candles) if candles.is_empty() => {
                FetchOutcome::no_data(format!("no valid {} candles for {}", timeframe, symbol))
            }
            Ok(mut candles) => {
                let skip = candles.len().saturating_sub(limit);
                candles.drain(..skip);
                debug!("Loaded {} {} candles for {}", candles.len(), timeframe, symbol);
                FetchOutcome::Data(Series::new(timeframe, candles))
            }
            Err(e) => FetchOutcome::no_data(format!("{:#}", e)),
        }
    }
}

/// RFC 3339 or unix seconds
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    let secs: i64 = raw
        .parse()
        .with_context(|| format!("Failed to parse timestamp: {}", raw))?;
    DateTime::from_timestamp(secs, 0).with_context(|| format!("Timestamp out of range: {}", raw))
}

/// Validate a candle has reasonable values.
pub fn validate_candle(candle: &Candle) -> bool {
    candle.open.is_finite()
        && candle.high.is_finite()
        && candle.low.is_finite()
        && candle.close.is_finite()
        && candle.volume.is_finite()
        && candle.high >= candle.low
        && candle.open > 0.0
        && candle.close > 0.0
        && candle.low > 0.0
        && candle.volume >= 0.0
}

/// Parse a candle CSV, skipping invalid rows and rows that do not advance in time
pub fn load_candles(path: &Path) -> Result<Vec<Candle>> {
    let file = File::open(path).with_context(|| format!("Failed to open file: {:?}", path))?;
    let mut csv_reader = csv::Reader::from_reader(BufReader::new(file));

    let mut candles: Vec<Candle> = Vec::new();
    let mut skipped = 0u64;

    for result in csv_reader.deserialize() {
        let row: CsvRow = result.with_context(|| format!("Failed to parse CSV row in {:?}", path))?;
        let timestamp = parse_timestamp(&row.timestamp)?;
        let candle = Candle::new(timestamp, row.open, row.high, row.low, row.close, row.volume);

        let advances = candles.last().map_or(true, |prev| candle.timestamp > prev.timestamp);
        if !validate_candle(&candle) || !advances {
            skipped += 1;
            continue;
        }
        candles.push(candle);
    }

    if skipped > 0 {
        warn!("Skipped {} invalid or out-of-order candles in {:?}", skipped, path);
    }

    Ok(candles)
}

/// Fetch on the blocking pool with a hard deadline. Timeouts and loader panics
/// come back as `NoData`.
pub async fn fetch_with_timeout(
    source: Arc<dyn CandleSource>,
    symbol: &str,
    timeframe: &str,
    limit: usize,
    timeout: Duration,
) -> FetchOutcome {
    let (sym, tf) = (symbol.to_string(), timeframe.to_string());
    let task = tokio::task::spawn_blocking(move || source.fetch(&sym, &tf, limit));

    let outcome = match tokio::time::timeout(timeout, task).await {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(e)) => FetchOutcome::no_data(format!("loader failed: {}", e)),
        Err(_) => FetchOutcome::no_data(format!("timed out after {:?}", timeout)),
    };

    if let FetchOutcome::NoData { reason } = &outcome {
        warn!("No {} data for {}: {}", timeframe, symbol, reason);
    }
    outcome
}

/// Most recent close and its timestamp
pub fn latest_price(series: &Series) -> Option<(f64, DateTime<Utc>)> {
    series.last().map(|c| (c.close, c.timestamp))
}

/// Symbol format check: 3-20 characters of `A-Z`, `0-9`, `.`, `_`, `-`
pub fn is_valid_symbol(symbol: &str) -> bool {
    (3..=20).contains(&symbol.len())
        && symbol
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || matches!(c, '.' | '_' | '-'))
}
