//! Final trade recommendation from the ranked reaction levels

use super::confluence::LevelSource;
use super::ranking::{EntryZone, ReactionLevel};
use crate::types::Side;
use serde::{Deserialize, Serialize};

/// Confidence at which BUY/SELL becomes STRONG BUY/STRONG SELL
const STRONG_THRESHOLD: u8 = 90;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    #[serde(rename = "HOLD")]
    Hold,
    #[serde(rename = "BUY")]
    Buy,
    #[serde(rename = "SELL")]
    Sell,
    #[serde(rename = "STRONG BUY")]
    StrongBuy,
    #[serde(rename = "STRONG SELL")]
    StrongSell,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Action::Hold => write!(f, "HOLD"),
            Action::Buy => write!(f, "BUY"),
            Action::Sell => write!(f, "SELL"),
            Action::StrongBuy => write!(f, "STRONG BUY"),
            Action::StrongSell => write!(f, "STRONG SELL"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub action: Action,
    pub confidence: u8,
    pub entry_zone: Option<EntryZone>,
    pub primary_source: Option<LevelSource>,
    pub rationale: String,
}

impl Recommendation {
    pub fn hold(rationale: &str) -> Self {
        Self {
            action: Action::Hold,
            confidence: 0,
            entry_zone: None,
            primary_source: None,
            rationale: rationale.to_string(),
        }
    }
}

/// Turn the top-ranked level into a recommendation
pub fn generate_recommendation(levels: &[ReactionLevel]) -> Recommendation {
    let Some(top) = levels.first() else {
        return Recommendation::hold("No reaction level near price reached the minimum confluence score");
    };

    let strong = top.confidence >= STRONG_THRESHOLD;
    let action = match (top.action, strong) {
        (Side::Buy, true) => Action::StrongBuy,
        (Side::Buy, false) => Action::Buy,
        (Side::Sell, true) => Action::StrongSell,
        (Side::Sell, false) => Action::Sell,
    };

    Recommendation {
        action,
        confidence: top.confidence,
        entry_zone: Some(top.entry_zone),
        primary_source: Some(top.source),
        rationale: top.rationale.clone(),
    }
}
