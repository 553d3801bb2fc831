//! Configuration for the analysis engine

use anyhow::{bail, Context, Result};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Session priority used by the confluence scorer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Priority::High => write!(f, "high"),
            Priority::Medium => write!(f, "medium"),
            Priority::Low => write!(f, "low"),
        }
    }
}

/// A named intraday session window ("kill zone"), in the configured session timezone.
/// Windows are half-open: `[start, end)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionWindow {
    pub name: String,
    pub priority: Priority,
    pub start_hour: u32,
    pub start_minute: u32,
    pub end_hour: u32,
    pub end_minute: u32,
}

impl SessionWindow {
    pub fn new(name: &str, priority: Priority, start: (u32, u32), end: (u32, u32)) -> Self {
        Self {
            name: name.to_string(),
            priority,
            start_hour: start.0,
            start_minute: start.1,
            end_hour: end.0,
            end_minute: end.1,
        }
    }

    /// Window start as minute-of-day
    pub fn start_of_day(&self) -> u32 {
        self.start_hour * 60 + self.start_minute
    }

    /// Window end as minute-of-day
    pub fn end_of_day(&self) -> u32 {
        self.end_hour * 60 + self.end_minute
    }

    /// Whether a minute-of-day falls inside this window (handles windows that wrap midnight)
    pub fn contains(&self, minute_of_day: u32) -> bool {
        let start = self.start_of_day();
        let end = self.end_of_day();
        if start <= end {
            minute_of_day >= start && minute_of_day < end
        } else {
            minute_of_day >= start || minute_of_day < end
        }
    }
}

/// Everything the detection-and-scoring pipeline needs, passed by reference into every stage
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Swing detection half-window in candles
    pub swing_period: usize,

    /// Max price distance for a swing to join a liquidity cluster
    pub liquidity_tolerance: f64,

    /// Reaction levels further than this (pip-equivalents) are discarded
    pub max_distance_pips: f64,

    /// Minimum confluence score (0-100) for a reaction level to be reported
    pub min_confluence_score: u8,

    /// Multiplier turning a price difference into pip-equivalents (EURUSD = 100000)
    pub price_multiplier: f64,

    /// Patterns older than this many minutes are ignored
    pub max_freshness_minutes: f64,

    /// Kill zone definitions
    pub sessions: Vec<SessionWindow>,

    /// Timezone the session windows are expressed in
    pub session_timezone: Tz,

    /// Timeframe that drives level detection and structure
    pub execution_timeframe: String,

    /// Higher timeframe used for the premium/discount range
    pub reference_timeframe: String,

    /// Number of most recent reference swings forming the trading range
    pub zone_swing_count: usize,

    /// Number of most recent candles checked for liquidity sweeps
    pub sweep_lookback: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            swing_period: 5,
            liquidity_tolerance: 0.00005,
            max_distance_pips: 50.0,
            min_confluence_score: 70,
            price_multiplier: 100_000.0,
            max_freshness_minutes: 120.0,
            sessions: vec![
                SessionWindow::new("London", Priority::Medium, (2, 0), (5, 0)),
                SessionWindow::new("New York", Priority::High, (8, 0), (11, 0)),
            ],
            session_timezone: chrono_tz::America::New_York,
            execution_timeframe: "1m".to_string(),
            reference_timeframe: "15m".to_string(),
            zone_swing_count: 20,
            sweep_lookback: 20,
        }
    }
}

impl AnalysisConfig {
    /// Five-decimal majors (EURUSD, GBPUSD, ...)
    pub fn forex_major() -> Self {
        Self::default()
    }

    /// Three-decimal yen crosses (USDJPY, ...)
    pub fn jpy_pair() -> Self {
        Self {
            liquidity_tolerance: 0.005,
            price_multiplier: 1000.0,
            ..Default::default()
        }
    }

    /// Look up a named preset
    pub fn preset(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "forex" | "forex_major" | "major" => Some(Self::forex_major()),
            "jpy" | "jpy_pair" => Some(Self::jpy_pair()),
            _ => None,
        }
    }

    /// Load a (possibly partial) config from JSON; missing fields take defaults
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: Self = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;
        config
            .validate()
            .with_context(|| format!("Invalid config in {:?}", path))?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.swing_period == 0 {
            bail!("swing_period must be at least 1");
        }
        if !self.liquidity_tolerance.is_finite() || self.liquidity_tolerance < 0.0 {
            bail!("liquidity_tolerance must be a non-negative number, got {}", self.liquidity_tolerance);
        }
        if !self.max_distance_pips.is_finite() || self.max_distance_pips <= 0.0 {
            bail!("max_distance_pips must be positive, got {}", self.max_distance_pips);
        }
        if self.min_confluence_score > 100 {
            bail!("min_confluence_score must be within 0-100, got {}", self.min_confluence_score);
        }
        if !self.price_multiplier.is_finite() || self.price_multiplier <= 0.0 {
            bail!("price_multiplier must be positive, got {}", self.price_multiplier);
        }
        if !self.max_freshness_minutes.is_finite() || self.max_freshness_minutes <= 0.0 {
            bail!("max_freshness_minutes must be positive, got {}", self.max_freshness_minutes);
        }
        if self.sessions.is_empty() {
            bail!("at least one session window is required");
        }
        for session in &self.sessions {
            if session.start_hour > 23 || session.end_hour > 23 || session.start_minute > 59 || session.end_minute > 59 {
                bail!("session '{}' has an out-of-range time", session.name);
            }
            if session.start_of_day() == session.end_of_day() {
                bail!("session '{}' is empty (start == end)", session.name);
            }
        }
        if self.execution_timeframe.trim().is_empty() || self.reference_timeframe.trim().is_empty() {
            bail!("execution_timeframe and reference_timeframe must be set");
        }
        if self.zone_swing_count < 4 {
            bail!("zone_swing_count must be at least 4 (two highs and two lows)");
        }
        if self.sweep_lookback == 0 {
            bail!("sweep_lookback must be at least 1");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = AnalysisConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.swing_period, 5);
        assert_eq!(config.min_confluence_score, 70);
        assert_eq!(config.sessions.len(), 2);
    }

    #[test]
    fn test_session_contains() {
        let london = SessionWindow::new("London", Priority::Medium, (2, 0), (5, 0));
        assert!(!london.contains(119));
        assert!(london.contains(120));
        assert!(london.contains(299));
        assert!(!london.contains(300));

        // Wraps midnight
        let asia = SessionWindow::new("Asia", Priority::Low, (20, 0), (1, 0));
        assert!(asia.contains(20 * 60));
        assert!(asia.contains(30));
        assert!(!asia.contains(60));
        assert!(!asia.contains(19 * 60 + 59));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = AnalysisConfig {
            swing_period: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = AnalysisConfig {
            min_confluence_score: 101,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = AnalysisConfig {
            sessions: vec![SessionWindow::new("Broken", Priority::High, (9, 0), (9, 0))],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let config: AnalysisConfig =
            serde_json::from_str(r#"{"min_confluence_score": 80, "session_timezone": "Europe/London"}"#).unwrap();
        assert_eq!(config.min_confluence_score, 80);
        assert_eq!(config.swing_period, 5);
        assert_eq!(config.session_timezone, chrono_tz::Europe::London);
    }

    #[test]
    fn test_from_json_file() {
        let path = std::env::temp_dir().join(format!("smc-levels-config-{}.json", std::process::id()));
        std::fs::write(&path, r#"{"max_distance_pips": 25.0, "price_multiplier": 1000.0}"#).unwrap();
        let config = AnalysisConfig::from_json_file(&path).unwrap();
        assert_eq!(config.max_distance_pips, 25.0);
        assert_eq!(config.price_multiplier, 1000.0);

        std::fs::write(&path, r#"{"price_multiplier": -1.0}"#).unwrap();
        let err = AnalysisConfig::from_json_file(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("price_multiplier"));

        std::fs::remove_file(&path).ok();
        assert!(AnalysisConfig::from_json_file(&path).is_err());
    }

    #[test]
    fn test_presets() {
        let jpy = AnalysisConfig::preset("jpy").unwrap();
        assert_eq!(jpy.price_multiplier, 1000.0);
        assert!(AnalysisConfig::preset("unknown").is_none());
    }
}
