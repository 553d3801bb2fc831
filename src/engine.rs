//! Pipeline orchestration
//!
//! `analyze` runs every detection stage over one market snapshot and assembles the
//! result. It never performs I/O and keeps no state between calls, so the same
//! snapshot, config and clock always produce the same result.

use crate::clock::Clock;
use crate::config::AnalysisConfig;
use crate::smc_core::{
    aggregate_liquidity, calculate_zones, classify_session, classify_structure, collect_candidates,
    detect_fair_value_gaps, detect_order_blocks, detect_swings, detect_sweeps, generate_recommendation,
    rank_reaction_levels, FairValueGap, KillZone, LiquidityLevel, MarketStructure, OrderBlock,
    PremiumDiscountZone, ReactionLevel, Recommendation, ScoringContext, Sweep,
};
use crate::types::{Series, Side};
use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Everything known about one symbol at analysis time
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub symbol: Option<String>,
    /// One series per timeframe
    pub series: Vec<Series>,
    /// Externally looked-up price; falls back to the last execution close
    pub current_price: Option<f64>,
}

impl MarketSnapshot {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: Some(symbol.into()),
            ..Default::default()
        }
    }

    pub fn with_series(mut self, series: Series) -> Self {
        self.series.push(series);
        self
    }

    pub fn with_current_price(mut self, price: f64) -> Self {
        self.current_price = Some(price);
        self
    }

    /// Non-empty series for a timeframe label
    pub fn series_for(&self, timeframe: &str) -> Option<&Series> {
        self.series.iter().find(|s| s.timeframe == timeframe && !s.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShiftKind {
    #[serde(rename = "BOS")]
    Bos,
    #[serde(rename = "CHoCH")]
    Choch,
}

impl std::fmt::Display for ShiftKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShiftKind::Bos => write!(f, "BOS"),
            ShiftKind::Choch => write!(f, "CHoCH"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketStructureShift {
    #[serde(rename = "type")]
    pub kind: ShiftKind,
    pub signal: Side,
    pub description: String,
}

impl MarketStructureShift {
    fn from_structure(structure: &MarketStructure) -> Option<Self> {
        let signal = structure.signal?;
        let (kind, description) = if structure.bos {
            (ShiftKind::Bos, format!("Break of structure in a {} trend", structure.trend))
        } else if structure.choch {
            (ShiftKind::Choch, format!("Change of character against a {} trend", structure.trend))
        } else {
            return None;
        };
        Some(Self { kind, signal, description })
    }
}

/// Nearest detected element of each kind to the current price
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClosestElements {
    pub closest_order_block: Option<OrderBlock>,
    pub closest_fvg: Option<FairValueGap>,
    pub closest_liquidity: Option<LiquidityLevel>,
    pub closest_sweep: Option<Sweep>,
    pub market_structure_shift: Option<MarketStructureShift>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub symbol: Option<String>,
    pub analysis_time: DateTime<Utc>,
    pub current_price: f64,
    /// Structure on the execution timeframe
    pub structure_1min: MarketStructure,
    /// Structure for every supplied timeframe
    pub structure: BTreeMap<String, MarketStructure>,
    pub active_kill_zone: KillZone,
    pub premium_discount_zones: PremiumDiscountZone,
    pub closest_elements: ClosestElements,
    pub reaction_levels: Vec<ReactionLevel>,
    pub recommendation: Recommendation,
}

impl AnalysisResult {
    /// Fully-populated HOLD result for a snapshot missing required data
    pub fn missing_data(snapshot: &MarketSnapshot, kill_zone: KillZone, now: DateTime<Utc>, reason: &str) -> Self {
        Self {
            symbol: snapshot.symbol.clone(),
            analysis_time: now,
            current_price: snapshot.current_price.unwrap_or(0.0),
            structure_1min: MarketStructure::no_data(),
            structure: BTreeMap::new(),
            active_kill_zone: kill_zone,
            premium_discount_zones: PremiumDiscountZone::unknown(),
            closest_elements: ClosestElements::default(),
            reaction_levels: Vec::new(),
            recommendation: Recommendation::hold(reason),
        }
    }
}

/// First element with the smallest distance to `target`
fn nearest<'a, T>(items: &'a [T], target: f64, price: impl Fn(&T) -> f64) -> Option<&'a T> {
    let mut best: Option<(&T, f64)> = None;
    for item in items {
        let distance = (price(item) - target).abs();
        match best {
            Some((_, d)) if distance >= d => {}
            _ => best = Some((item, distance)),
        }
    }
    best.map(|(item, _)| item)
}

/// Run the full detection-and-scoring pipeline on one snapshot
pub fn analyze(snapshot: &MarketSnapshot, config: &AnalysisConfig, clock: &dyn Clock) -> AnalysisResult {
    let now = clock.now();
    let symbol = snapshot.symbol.as_deref().unwrap_or("-");
    let kill_zone = classify_session(now, config);

    if let Some(empty) = snapshot.series.iter().find(|s| s.is_empty()) {
        warn!(symbol, timeframe = %empty.timeframe, "Empty candle series, returning HOLD");
        let reason = format!("No {} data available", empty.timeframe);
        return AnalysisResult::missing_data(snapshot, kill_zone, now, &reason);
    }

    let Some(execution) = snapshot.series_for(&config.execution_timeframe) else {
        warn!(symbol, timeframe = %config.execution_timeframe, "No execution candles, returning HOLD");
        return AnalysisResult::missing_data(snapshot, kill_zone, now, "No execution timeframe data available");
    };
    let Some(reference) = snapshot.series_for(&config.reference_timeframe) else {
        warn!(symbol, timeframe = %config.reference_timeframe, "No reference candles, returning HOLD");
        return AnalysisResult::missing_data(snapshot, kill_zone, now, "No reference timeframe data available");
    };

    let current_price = match (snapshot.current_price, execution.last()) {
        (Some(price), _) => price,
        (None, Some(last)) => last.close,
        (None, None) => 0.0,
    };

    let candles = &execution.candles;
    let swings = detect_swings(candles, config.swing_period);
    debug!(symbol, highs = swings.highs.len(), lows = swings.lows.len(), "Swings detected");

    let mut levels = aggregate_liquidity(&swings.all, config.liquidity_tolerance, config.max_freshness_minutes, now);
    let order_blocks = detect_order_blocks(candles, config, now);
    let gaps = detect_fair_value_gaps(candles, config, now);
    let sweeps = detect_sweeps(&mut levels, candles, config.sweep_lookback, config.max_freshness_minutes, now);
    debug!(
        symbol,
        liquidity = levels.len(),
        order_blocks = order_blocks.len(),
        fvgs = gaps.len(),
        sweeps = sweeps.len(),
        "Levels detected"
    );

    let structure_1min = classify_structure(candles, &swings);
    let structure: BTreeMap<String, MarketStructure> = snapshot
        .series
        .par_iter()
        .map(|series| {
            let swings = detect_swings(&series.candles, config.swing_period);
            (series.timeframe.clone(), classify_structure(&series.candles, &swings))
        })
        .collect();

    let reference_swings = detect_swings(&reference.candles, config.swing_period);
    let zones = calculate_zones(&reference_swings, config.zone_swing_count, current_price);
    debug!(symbol, zone = %zones.current_zone, kill_zone_active = kill_zone.is_active, "Context classified");

    let ctx = ScoringContext {
        kill_zone: &kill_zone,
        zones: &zones,
        current_price,
    };
    let candidates = collect_candidates(&levels, &order_blocks, &gaps, &sweeps, config);
    let candidate_count = candidates.len();
    let reaction_levels = rank_reaction_levels(candidates, &ctx, config);
    let recommendation = generate_recommendation(&reaction_levels);

    let closest_elements = ClosestElements {
        closest_order_block: nearest(&order_blocks, current_price, |b| b.price).cloned(),
        closest_fvg: nearest(&gaps, current_price, |g| g.midpoint()).cloned(),
        closest_liquidity: nearest(&levels, current_price, |l| l.price).cloned(),
        closest_sweep: nearest(&sweeps, current_price, |s| s.level_price).cloned(),
        market_structure_shift: MarketStructureShift::from_structure(&structure_1min),
    };

    info!(
        symbol,
        price = current_price,
        candidates = candidate_count,
        reaction_levels = reaction_levels.len(),
        action = %recommendation.action,
        confidence = recommendation.confidence,
        "Analysis complete"
    );

    AnalysisResult {
        symbol: snapshot.symbol.clone(),
        analysis_time: now,
        current_price,
        structure_1min,
        structure,
        active_kill_zone: kill_zone,
        premium_discount_zones: zones,
        closest_elements,
        reaction_levels,
        recommendation,
    }
}

/// Analyze independent snapshots in parallel; results keep the input order
pub fn analyze_many(snapshots: &[MarketSnapshot], config: &AnalysisConfig, clock: &dyn Clock) -> Vec<AnalysisResult> {
    snapshots
        .par_iter()
        .map(|snapshot| analyze(snapshot, config, clock))
        .collect()
}
