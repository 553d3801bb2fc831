//! Premium/discount zones from the recent trading range

use super::swings::{SwingKind, SwingSet};
use serde::{Deserialize, Serialize};

/// Fraction of the range above/below equilibrium that stays "equilibrium"
const ZONE_BAND: f64 = 0.25;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ZonePosition {
    Premium,
    Discount,
    Equilibrium,
    Unknown,
}

impl std::fmt::Display for ZonePosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ZonePosition::Premium => write!(f, "PREMIUM"),
            ZonePosition::Discount => write!(f, "DISCOUNT"),
            ZonePosition::Equilibrium => write!(f, "EQUILIBRIUM"),
            ZonePosition::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PremiumDiscountZone {
    pub equilibrium: Option<f64>,
    pub premium_start: Option<f64>,
    pub discount_end: Option<f64>,
    pub range_high: Option<f64>,
    pub range_low: Option<f64>,
    pub current_zone: ZonePosition,
}

impl PremiumDiscountZone {
    pub fn unknown() -> Self {
        Self {
            equilibrium: None,
            premium_start: None,
            discount_end: None,
            range_high: None,
            range_low: None,
            current_zone: ZonePosition::Unknown,
        }
    }

    /// Where `price` sits relative to these zones
    pub fn position_of(&self, price: f64) -> ZonePosition {
        match (self.premium_start, self.discount_end) {
            (Some(premium_start), _) if price > premium_start => ZonePosition::Premium,
            (_, Some(discount_end)) if price < discount_end => ZonePosition::Discount,
            (Some(_), Some(_)) => ZonePosition::Equilibrium,
            _ => ZonePosition::Unknown,
        }
    }
}

/// Build zones from the last `lookback` swings (typically on a higher timeframe)
pub fn calculate_zones(swings: &SwingSet, lookback: usize, current_price: f64) -> PremiumDiscountZone {
    let recent = &swings.all[swings.all.len().saturating_sub(lookback)..];

    let highs: Vec<f64> = recent.iter().filter(|s| s.kind == SwingKind::High).map(|s| s.price).collect();
    let lows: Vec<f64> = recent.iter().filter(|s| s.kind == SwingKind::Low).map(|s| s.price).collect();

    if highs.len() < 2 || lows.len() < 2 {
        return PremiumDiscountZone::unknown();
    }

    let range_high = highs.iter().copied().fold(f64::MIN, f64::max);
    let range_low = lows.iter().copied().fold(f64::MAX, f64::min);
    let range = range_high - range_low;
    let equilibrium = (range_high + range_low) / 2.0;

    let mut zones = PremiumDiscountZone {
        equilibrium: Some(equilibrium),
        premium_start: Some(equilibrium + ZONE_BAND * range),
        discount_end: Some(equilibrium - ZONE_BAND * range),
        range_high: Some(range_high),
        range_low: Some(range_low),
        current_zone: ZonePosition::Unknown,
    };
    zones.current_zone = zones.position_of(current_price);
    zones
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::smc_core::swings::detect_swings;
    use crate::test_support::discount_reference;

    #[test]
    fn test_reference_range() {
        let series = discount_reference();
        let swings = detect_swings(&series.candles, 5);
        let zones = calculate_zones(&swings, 20, 1.1002);

        assert!((zones.range_high.unwrap() - 1.1101).abs() < 1e-9);
        assert!((zones.range_low.unwrap() - 1.0989).abs() < 1e-9);
        assert!((zones.equilibrium.unwrap() - 1.1045).abs() < 1e-9);
        assert!((zones.premium_start.unwrap() - 1.1073).abs() < 1e-9);
        assert!((zones.discount_end.unwrap() - 1.1017).abs() < 1e-9);
        assert_eq!(zones.current_zone, ZonePosition::Discount);
    }

    #[test]
    fn test_positions() {
        let series = discount_reference();
        let swings = detect_swings(&series.candles, 5);

        assert_eq!(calculate_zones(&swings, 20, 1.1090).current_zone, ZonePosition::Premium);
        assert_eq!(calculate_zones(&swings, 20, 1.1045).current_zone, ZonePosition::Equilibrium);
    }

    #[test]
    fn test_insufficient_swings_is_unknown() {
        let zones = calculate_zones(&SwingSet::default(), 20, 1.1);
        assert_eq!(zones, PremiumDiscountZone::unknown());
        assert_eq!(zones.position_of(1.1), ZonePosition::Unknown);
    }

    #[test]
    fn test_lookback_limits_range() {
        let series = discount_reference();
        let swings = detect_swings(&series.candles, 5);
        // Last three swings only: one trough and two peaks is not enough
        let zones = calculate_zones(&swings, 3, 1.1);
        assert_eq!(zones.current_zone, ZonePosition::Unknown);
    }
}
