use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use smc_levels::feed::{fetch_with_timeout, is_valid_symbol, latest_price, parse_timestamp, CandleSource, CsvCandleSource};
use smc_levels::{analyze, analyze_many, AnalysisConfig, AnalysisResult, Clock, FixedClock, MarketSnapshot, SystemClock};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "smc-levels")]
#[command(about = "Smart-money reaction levels and trade recommendation from candle files")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Print verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze one symbol and print the result as JSON
    Analyze {
        /// Symbol, e.g. EURUSD
        #[arg(short, long)]
        symbol: String,

        /// Use this price instead of the last execution close
        #[arg(long)]
        price: Option<f64>,

        /// Print a short human-readable report instead of JSON
        #[arg(long)]
        report: bool,

        #[command(flatten)]
        data: DataArgs,

        #[command(flatten)]
        tuning: TuningArgs,
    },

    /// Analyze several symbols in parallel and print a JSON array
    Batch {
        /// Comma-separated symbols
        #[arg(short, long, default_value = "EURUSD,GBPUSD")]
        symbols: String,

        #[command(flatten)]
        data: DataArgs,

        #[command(flatten)]
        tuning: TuningArgs,
    },

    /// Print the resolved configuration as JSON
    PrintConfig {
        #[command(flatten)]
        tuning: TuningArgs,
    },
}

#[derive(Args, Debug)]
struct DataArgs {
    /// Directory holding <SYMBOL>_<timeframe>.csv files
    #[arg(short, long, env = "SMC_DATA_DIR", default_value = "data")]
    data_dir: PathBuf,

    /// Newest candles to load per timeframe
    #[arg(long, default_value = "500")]
    limit: usize,

    /// Give up on a candle file after this many seconds
    #[arg(long, default_value = "5")]
    timeout_secs: u64,

    /// Analyze as of this instant (RFC 3339 or unix seconds) instead of now
    #[arg(long)]
    now: Option<String>,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,
}

#[derive(Args, Debug)]
struct TuningArgs {
    /// JSON config file; missing fields take defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Named preset (forex_major, jpy_pair)
    #[arg(long)]
    preset: Option<String>,

    #[arg(long)]
    swing_period: Option<usize>,

    #[arg(long)]
    tolerance: Option<f64>,

    #[arg(long)]
    max_distance_pips: Option<f64>,

    #[arg(long)]
    min_score: Option<u8>,

    #[arg(long)]
    multiplier: Option<f64>,

    #[arg(long)]
    max_freshness: Option<f64>,
}

impl TuningArgs {
    /// Preset or file first, then individual flag overrides
    fn resolve(&self) -> Result<AnalysisConfig> {
        let mut config = match (&self.config, &self.preset) {
            (Some(_), Some(_)) => bail!("--config and --preset are mutually exclusive"),
            (Some(path), None) => AnalysisConfig::from_json_file(path)?,
            (None, Some(name)) => {
                AnalysisConfig::preset(name).with_context(|| format!("Unknown preset: {}", name))?
            }
            (None, None) => AnalysisConfig::default(),
        };

        if let Some(v) = self.swing_period {
            config.swing_period = v;
        }
        if let Some(v) = self.tolerance {
            config.liquidity_tolerance = v;
        }
        if let Some(v) = self.max_distance_pips {
            config.max_distance_pips = v;
        }
        if let Some(v) = self.min_score {
            config.min_confluence_score = v;
        }
        if let Some(v) = self.multiplier {
            config.price_multiplier = v;
        }
        if let Some(v) = self.max_freshness {
            config.max_freshness_minutes = v;
        }

        config.validate().context("Invalid configuration")?;
        Ok(config)
    }
}

impl DataArgs {
    fn clock(&self) -> Result<Box<dyn Clock>> {
        let clock: Box<dyn Clock> = match &self.now {
            Some(raw) => Box::new(FixedClock(parse_timestamp(raw)?)),
            None => Box::new(SystemClock),
        };
        Ok(clock)
    }

    fn source(&self) -> Arc<dyn CandleSource> {
        Arc::new(CsvCandleSource::new(&self.data_dir))
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn check_symbol(symbol: &str) -> Result<()> {
    if !is_valid_symbol(symbol) {
        bail!("Invalid symbol format: {:?}", symbol);
    }
    Ok(())
}

/// Fetch execution and reference series concurrently
async fn load_snapshot(
    source: Arc<dyn CandleSource>,
    symbol: &str,
    config: &AnalysisConfig,
    data: &DataArgs,
    price: Option<f64>,
) -> MarketSnapshot {
    let (execution, reference) = futures::join!(
        fetch_with_timeout(source.clone(), symbol, &config.execution_timeframe, data.limit, data.timeout()),
        fetch_with_timeout(source, symbol, &config.reference_timeframe, data.limit, data.timeout()),
    );

    let mut snapshot = MarketSnapshot::new(symbol);
    if let Some(series) = execution.into_series() {
        snapshot = snapshot.with_series(series);
    }
    if let Some(series) = reference.into_series() {
        snapshot = snapshot.with_series(series);
    }

    let looked_up = snapshot
        .series_for(&config.execution_timeframe)
        .and_then(latest_price)
        .map(|(p, at)| {
            info!("{} last close {:.5} at {}", symbol, p, at);
            p
        });
    snapshot.current_price = price.or(looked_up);
    snapshot
}

fn print_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", out);
    Ok(())
}

fn print_report(result: &AnalysisResult) {
    let kz = &result.active_kill_zone;
    let session = match (&kz.name, kz.is_active) {
        (Some(name), true) => format!("{} ({} priority, {} min left)", name, kz.priority, kz.remaining_minutes),
        _ => format!("none (next in {} min)", kz.remaining_minutes),
    };

    println!("=== {} @ {:.5} ===", result.symbol.as_deref().unwrap_or("-"), result.current_price);
    println!("Time:        {}", result.analysis_time);
    println!("Structure:   {} ({:?})", result.structure_1min.trend, result.structure_1min.status);
    println!("Kill zone:   {}", session);
    println!("Zone:        {}", result.premium_discount_zones.current_zone);

    for level in &result.reaction_levels {
        println!(
            "  {:>4} {:<16} {} | {:>5.1} pips | conf {:>3} | {}",
            level.action.to_string(),
            level.source.to_string(),
            level.entry_zone,
            level.distance_pips,
            level.confidence,
            level.rationale
        );
    }

    let rec = &result.recommendation;
    println!("Recommendation: {} ({}) - {}", rec.action, rec.confidence, rec.rationale);
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let level = if cli.verbose { "smc_levels=debug" } else { "smc_levels=info" };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.parse()?))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Analyze { symbol, price, report, data, tuning } => {
            check_symbol(&symbol)?;
            let config = tuning.resolve()?;
            let clock = data.clock()?;

            let snapshot = load_snapshot(data.source(), &symbol, &config, &data, price).await;
            let result = analyze(&snapshot, &config, clock.as_ref());

            if report {
                print_report(&result);
            } else {
                print_json(&result, data.pretty)?;
            }
        }
        Commands::Batch { symbols, data, tuning } => {
            let symbols: Vec<String> = symbols
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
            for symbol in &symbols {
                check_symbol(symbol)?;
            }
            let config = tuning.resolve()?;
            let clock = data.clock()?;
            let source = data.source();

            info!("Loading {} symbols from {:?}", symbols.len(), data.data_dir);
            let snapshots = futures::future::join_all(
                symbols
                    .iter()
                    .map(|symbol| load_snapshot(source.clone(), symbol, &config, &data, None)),
            )
            .await;

            let missing = snapshots.iter().filter(|s| s.series.is_empty()).count();
            if missing > 0 {
                warn!("{} of {} symbols have no candle data", missing, snapshots.len());
            }

            let results = analyze_many(&snapshots, &config, clock.as_ref());
            print_json(&results, data.pretty)?;
        }
        Commands::PrintConfig { tuning } => {
            let config = tuning.resolve()?;
            print_json(&config, true)?;
        }
    }

    Ok(())
}
