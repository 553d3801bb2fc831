//! SMC Core - Detection and scoring stages of the reaction-level engine
//!
//! Every stage is a pure function over immutable candles:
//! - Swing point detection
//! - Liquidity level clustering
//! - Order block and fair value gap detection
//! - Liquidity sweep detection
//! - Market structure (trend, BOS, CHoCH)
//! - Kill zone and premium/discount context
//! - Confluence scoring, ranking and the final recommendation

pub mod swings;
pub mod liquidity;
pub mod order_blocks;
pub mod fvg;
pub mod sweeps;
pub mod structure;
pub mod kill_zone;
pub mod premium_discount;
pub mod confluence;
pub mod ranking;
pub mod recommendation;

// Re-export commonly used types
pub use swings::{detect_swings, SwingKind, SwingPoint, SwingSet};
pub use liquidity::{aggregate_liquidity, LiquidityLevel};
pub use order_blocks::{detect_order_blocks, OrderBlock};
pub use fvg::{detect_fair_value_gaps, FairValueGap};
pub use sweeps::{detect_sweeps, Sweep, SweepKind};
pub use structure::{classify_structure, MarketStructure, StructureStatus, Trend};
pub use kill_zone::{classify_session, KillZone};
pub use premium_discount::{calculate_zones, PremiumDiscountZone, ZonePosition};
pub use confluence::{confluence_score, Candidate, LevelSource, ScoringContext};
pub use ranking::{collect_candidates, rank_reaction_levels, EntryZone, ReactionLevel};
pub use recommendation::{generate_recommendation, Action, Recommendation};
