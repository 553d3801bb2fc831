//! Confluence scoring
//!
//! Additive and capped: start at 40, add weights for session, premium/discount
//! alignment, touches, freshness, strength and sweeps, clamp to [0, 100]. The
//! thresholds and weights below are part of the output contract.

use super::kill_zone::KillZone;
use super::premium_discount::{PremiumDiscountZone, ZonePosition};
use crate::config::Priority;
use crate::types::Side;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const BASE_SCORE: i32 = 40;

/// Detector a reaction level came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LevelSource {
    #[serde(rename = "Liquidity")]
    Liquidity,
    #[serde(rename = "Order Block")]
    OrderBlock,
    #[serde(rename = "Fair Value Gap")]
    FairValueGap,
    #[serde(rename = "Liquidity Sweep")]
    LiquiditySweep,
}

impl std::fmt::Display for LevelSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LevelSource::Liquidity => write!(f, "Liquidity"),
            LevelSource::OrderBlock => write!(f, "Order Block"),
            LevelSource::FairValueGap => write!(f, "Fair Value Gap"),
            LevelSource::LiquiditySweep => write!(f, "Liquidity Sweep"),
        }
    }
}

/// A level from any detector, normalized for scoring and ranking
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub action: Side,
    pub source: LevelSource,
    pub price: f64,
    pub entry_min: f64,
    pub entry_max: f64,
    pub time: DateTime<Utc>,
    pub touch_count: u32,
    pub strength: f64,
    pub freshness: f64,
    pub swept: bool,
    /// Detector-specific description, the start of the rationale
    pub description: String,
}

/// Session and range context shared by every candidate of one analysis
#[derive(Debug, Clone, Copy)]
pub struct ScoringContext<'a> {
    pub kill_zone: &'a KillZone,
    pub zones: &'a PremiumDiscountZone,
    pub current_price: f64,
}

impl ScoringContext<'_> {
    /// Buy-bias levels in discount or sell-bias levels in premium
    pub fn bias_aligned(&self, action: Side) -> bool {
        matches!(
            (action, self.zones.current_zone),
            (Side::Buy, ZonePosition::Discount) | (Side::Sell, ZonePosition::Premium)
        )
    }
}

pub fn confluence_score(candidate: &Candidate, ctx: &ScoringContext<'_>) -> u8 {
    let mut score = BASE_SCORE;

    if ctx.kill_zone.is_active {
        score += match ctx.kill_zone.priority {
            Priority::High => 30,
            Priority::Medium => 20,
            Priority::Low => 0,
        };
    }

    if ctx.bias_aligned(candidate.action) {
        score += 25;
    }

    score += match candidate.touch_count {
        t if t >= 3 => 20,
        2 => 10,
        _ => 0,
    };

    let freshness = candidate.freshness;
    score += if freshness <= 15.0 {
        15
    } else if freshness <= 30.0 {
        10
    } else if freshness <= 60.0 {
        5
    } else {
        0
    };

    let strength = candidate.strength;
    score += if strength >= 80.0 {
        10
    } else if strength >= 60.0 {
        7
    } else if strength >= 40.0 {
        5
    } else {
        0
    };

    if candidate.swept && candidate.source != LevelSource::Liquidity {
        score += 10;
    }

    score.clamp(0, 100) as u8
}
