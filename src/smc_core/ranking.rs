//! Reaction-level candidates, distance filter and ranking

use super::confluence::{confluence_score, Candidate, LevelSource, ScoringContext};
use super::fvg::FairValueGap;
use super::liquidity::LiquidityLevel;
use super::order_blocks::OrderBlock;
use super::premium_discount::ZonePosition;
use super::sweeps::{Sweep, SweepKind};
use super::swings::SwingKind;
use crate::config::AnalysisConfig;
use crate::types::{to_pips, Side};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Confidence at which the rationale gains session and zone context
const CONTEXT_RATIONALE_THRESHOLD: u8 = 70;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EntryZone {
    pub min: f64,
    pub max: f64,
}

impl std::fmt::Display for EntryZone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.5} - {:.5}", self.min, self.max)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactionLevel {
    pub action: Side,
    pub price: f64,
    pub entry_zone: EntryZone,
    pub distance_pips: f64,
    pub confidence: u8,
    pub source: LevelSource,
    /// Source candle time: anchor, gap middle, sweeping candle, or latest liquidity touch
    pub time: DateTime<Utc>,
    pub freshness: f64,
    pub rationale: String,
}

/// Merge every detector's output into one candidate list.
///
/// Order is liquidity levels, order blocks, fair value gaps, sweeps; ranking ties
/// keep this order.
pub fn collect_candidates(
    levels: &[LiquidityLevel],
    order_blocks: &[OrderBlock],
    gaps: &[FairValueGap],
    sweeps: &[Sweep],
    config: &AnalysisConfig,
) -> Vec<Candidate> {
    let pad = config.liquidity_tolerance;
    let mut candidates = Vec::with_capacity(levels.len() + order_blocks.len() + gaps.len() + sweeps.len());

    for level in levels {
        let (action, side_name) = match level.kind {
            SwingKind::Low => (Side::Buy, "Sell-side liquidity below lows"),
            SwingKind::High => (Side::Sell, "Buy-side liquidity above highs"),
        };
        let swept = if level.swept { ", swept" } else { "" };
        candidates.push(Candidate {
            action,
            source: LevelSource::Liquidity,
            price: level.price,
            entry_min: level.price - pad,
            entry_max: level.price + pad,
            time: level.last_touch().unwrap_or_default(),
            touch_count: level.touch_count,
            strength: level.strength,
            freshness: level.freshness,
            swept: level.swept,
            description: format!("{} ({} touches{})", side_name, level.touch_count, swept),
        });
    }

    for block in order_blocks {
        candidates.push(Candidate {
            action: block.kind.side(),
            source: LevelSource::OrderBlock,
            price: block.price,
            entry_min: block.zone_min,
            entry_max: block.zone_max,
            time: block.time,
            touch_count: 1,
            strength: block.strength,
            freshness: block.freshness,
            swept: false,
            description: format!("{} Order Block, {:.1} pip body", block.kind, block.size),
        });
    }

    for gap in gaps {
        candidates.push(Candidate {
            action: gap.kind.side(),
            source: LevelSource::FairValueGap,
            price: gap.midpoint(),
            entry_min: gap.zone_min,
            entry_max: gap.zone_max,
            time: gap.time,
            touch_count: 1,
            strength: gap.strength,
            freshness: gap.freshness,
            swept: false,
            description: format!("{} Fair Value Gap, {:.1} pips unfilled", gap.kind, gap.size),
        });
    }

    for sweep in sweeps {
        let (action, what) = match sweep.kind {
            SweepKind::BullishSweep => (Side::Buy, "Bullish sweep of sell-side liquidity"),
            SweepKind::BearishSweep => (Side::Sell, "Bearish sweep of buy-side liquidity"),
        };
        candidates.push(Candidate {
            action,
            source: LevelSource::LiquiditySweep,
            price: sweep.level_price,
            entry_min: sweep.level_price - pad,
            entry_max: sweep.level_price + pad,
            time: sweep.time,
            touch_count: sweep.touch_count,
            strength: sweep.level_strength,
            freshness: sweep.freshness,
            swept: true,
            description: what.to_string(),
        });
    }

    candidates
}

fn build_rationale(candidate: &Candidate, confidence: u8, ctx: &ScoringContext<'_>) -> String {
    let mut rationale = format!("{}, {:.1} min old", candidate.description, candidate.freshness);

    if confidence >= CONTEXT_RATIONALE_THRESHOLD {
        match &ctx.kill_zone.name {
            Some(name) if ctx.kill_zone.is_active => {
                rationale.push_str(&format!("; {} kill zone active", name));
            }
            _ => rationale.push_str("; outside kill zones"),
        }
        match ctx.zones.current_zone {
            ZonePosition::Unknown => {}
            position => {
                let aligned = if ctx.bias_aligned(candidate.action) { " (aligned)" } else { "" };
                rationale.push_str(&format!("; price in {} zone{}", position, aligned));
            }
        }
    }

    rationale
}

/// Filter by distance, score, drop anything under `min_confluence_score`, and sort by
/// confidence (descending, stable).
pub fn rank_reaction_levels(
    candidates: Vec<Candidate>,
    ctx: &ScoringContext<'_>,
    config: &AnalysisConfig,
) -> Vec<ReactionLevel> {
    let mut ranked: Vec<ReactionLevel> = candidates
        .into_iter()
        .filter_map(|candidate| {
            let distance_pips = to_pips(candidate.price - ctx.current_price, config.price_multiplier);
            if distance_pips > config.max_distance_pips {
                return None;
            }

            let confidence = confluence_score(&candidate, ctx);
            if confidence < config.min_confluence_score {
                return None;
            }

            let rationale = build_rationale(&candidate, confidence, ctx);
            Some(ReactionLevel {
                action: candidate.action,
                price: candidate.price,
                entry_zone: EntryZone {
                    min: candidate.entry_min,
                    max: candidate.entry_max,
                },
                distance_pips,
                confidence,
                source: candidate.source,
                time: candidate.time,
                freshness: candidate.freshness,
                rationale,
            })
        })
        .collect();

    ranked.sort_by(|a, b| b.confidence.cmp(&a.confidence));
    ranked
}
