// Library crate - SMC reaction-level engine and its data boundary

pub mod types;
pub mod clock;
pub mod config;
pub mod smc_core;
pub mod engine;
pub mod feed;

#[cfg(test)]
mod test_support;

// Re-export commonly used types
pub use types::*;
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{AnalysisConfig, Priority, SessionWindow};
pub use engine::{analyze, analyze_many, AnalysisResult, ClosestElements, MarketSnapshot, MarketStructureShift};
pub use feed::{fetch_with_timeout, latest_price, CandleSource, CsvCandleSource, FetchOutcome};
