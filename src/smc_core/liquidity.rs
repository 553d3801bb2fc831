//! Liquidity level aggregation
//!
//! Swings are clustered greedily in arrival order: each swing joins the first
//! existing cluster whose running-average price is within `tolerance`, otherwise
//! it opens a new cluster. First-fit is order-dependent; that is part of the
//! output contract and must not be replaced by an optimal clustering.

use super::swings::{SwingKind, SwingPoint};
use crate::types::minutes_since;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A price where several swings clustered, read as resting orders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiquidityLevel {
    /// Running average of member swing prices
    pub price: f64,
    pub kind: SwingKind,
    /// Member swings in arrival order
    pub members: Vec<SwingPoint>,
    pub touch_count: u32,
    /// Minutes since the most recent member
    pub freshness: f64,
    /// 10 per touch, capped at 100
    pub strength: f64,
    pub swept: bool,
}

impl LiquidityLevel {
    pub fn last_touch(&self) -> Option<DateTime<Utc>> {
        self.members.iter().map(|m| m.timestamp).max()
    }
}

/// Mutable accumulator used only while one aggregation call runs
struct ClusterBuilder {
    price_sum: f64,
    members: Vec<SwingPoint>,
    latest: DateTime<Utc>,
}

impl ClusterBuilder {
    fn new(swing: &SwingPoint) -> Self {
        Self {
            price_sum: swing.price,
            members: vec![swing.clone()],
            latest: swing.timestamp,
        }
    }

    fn average(&self) -> f64 {
        self.price_sum / self.members.len() as f64
    }

    fn absorb(&mut self, swing: &SwingPoint) {
        self.price_sum += swing.price;
        self.latest = self.latest.max(swing.timestamp);
        self.members.push(swing.clone());
    }

    /// Majority vote over member kinds; ties go to `Low`
    fn majority_kind(&self) -> SwingKind {
        let highs = self.members.iter().filter(|m| m.kind == SwingKind::High).count();
        let lows = self.members.len() - highs;
        if highs > lows {
            SwingKind::High
        } else {
            SwingKind::Low
        }
    }

    fn finalize(self, now: DateTime<Utc>) -> LiquidityLevel {
        let touch_count = self.members.len() as u32;
        LiquidityLevel {
            price: self.average(),
            kind: self.majority_kind(),
            touch_count,
            freshness: minutes_since(self.latest, now),
            strength: (touch_count as f64 * 10.0).min(100.0),
            swept: false,
            members: self.members,
        }
    }
}

/// Cluster swings into liquidity levels.
///
/// Levels staler than `max_freshness_minutes` are dropped; the rest are sorted by
/// strength (descending) then freshness (ascending). The sort is stable.
pub fn aggregate_liquidity(
    swings: &[SwingPoint],
    tolerance: f64,
    max_freshness_minutes: f64,
    now: DateTime<Utc>,
) -> Vec<LiquidityLevel> {
    let mut clusters: Vec<ClusterBuilder> = Vec::new();

    for swing in swings {
        match clusters
            .iter_mut()
            .find(|c| (c.average() - swing.price).abs() <= tolerance)
        {
            Some(cluster) => cluster.absorb(swing),
            None => clusters.push(ClusterBuilder::new(swing)),
        }
    }

    let mut levels: Vec<LiquidityLevel> = clusters
        .into_iter()
        .map(|c| c.finalize(now))
        .filter(|l| l.freshness <= max_freshness_minutes)
        .collect();

    levels.sort_by(|a, b| {
        b.strength
            .partial_cmp(&a.strength)
            .unwrap_or(Ordering::Equal)
            .then(a.freshness.partial_cmp(&b.freshness).unwrap_or(Ordering::Equal))
    });

    levels
}
