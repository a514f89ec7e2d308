//! TrendSignal CLI — evaluate trend strategies over CSV candle files.
//!
//! Commands:
//! - `signal` — latest signal per symbol, symbols evaluated in parallel
//! - `indicators` — trailing indicator rows for one symbol
//! - `replay` — walk a file bar by bar as a live loop would, tracking position
//! - `strategies` — list registered strategy names
//!
//! Output is JSON lines on stdout; logs go to stderr (`RUST_LOG`, default `info`).

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use serde::Serialize;
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use trendsignal_core::{
    AppConfig, Candle, CandleSource, CsvCandleSource, IndicatorConfig, IndicatorEngine,
    IndicatorRow, SignalConfig, Strategy, StrategyParams, StrategyRegistry, SymbolContext,
};

#[derive(Parser)]
#[command(
    name = "trendsignal",
    about = "TrendSignal CLI — Supertrend crossover signals from CSV candles"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate the latest bar for each symbol and print one signal per line.
    Signal {
        /// Directory of `<SYMBOL>.csv` files, or a single CSV file.
        #[arg(long)]
        data: PathBuf,

        /// Symbols to evaluate (e.g., BTCUSDT ETHUSDT).
        #[arg(long = "symbol", required = true, num_args = 1..)]
        symbols: Vec<String>,

        /// Registered strategy name. Overrides the config file's `[strategy]`.
        #[arg(long)]
        strategy: Option<String>,

        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Most recent candles to load per symbol.
        #[arg(long, default_value_t = 500)]
        limit: usize,
    },
    /// Print the trailing indicator rows for one symbol.
    Indicators {
        #[arg(long)]
        data: PathBuf,

        #[arg(long)]
        symbol: String,

        #[arg(long)]
        config: Option<PathBuf>,

        /// Number of trailing rows to print.
        #[arg(long, default_value_t = 5)]
        tail: usize,
    },
    /// Replay a file bar by bar, printing every actionable signal.
    Replay {
        #[arg(long)]
        data: PathBuf,

        #[arg(long)]
        symbol: String,

        #[arg(long)]
        strategy: Option<String>,

        #[arg(long)]
        config: Option<PathBuf>,

        /// Candles visible to each evaluation, ending at the current bar.
        #[arg(long, default_value_t = 500)]
        window: usize,
    },
    /// List registered strategies.
    Strategies,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let registry = StrategyRegistry::with_builtins();

    match cli.command {
        Commands::Signal {
            data,
            symbols,
            strategy,
            config,
            limit,
        } => run_signal(&registry, &data, &symbols, strategy, config, limit),
        Commands::Indicators {
            data,
            symbol,
            config,
            tail,
        } => run_indicators(&data, &symbol, config, tail),
        Commands::Replay {
            data,
            symbol,
            strategy,
            config,
            window,
        } => run_replay(&registry, &data, &symbol, strategy, config, window),
        Commands::Strategies => {
            for name in registry.names() {
                println!("{name}");
            }
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    match path {
        Some(p) => AppConfig::load(p).with_context(|| format!("loading {}", p.display())),
        None => Ok(AppConfig::default()),
    }
}

/// `--strategy` wins, then the config's `[strategy]`, then the config's own
/// indicator and signal sections.
fn resolve_strategy(
    registry: &StrategyRegistry,
    config: &AppConfig,
    name: Option<String>,
) -> Result<Strategy> {
    let strategy = match (name, &config.strategy) {
        (Some(name), Some(sel)) if sel.name == name => registry.create_from(sel)?,
        (Some(name), _) => {
            if ignores_config_sections(config) {
                warn!(
                    strategy = %name,
                    "--strategy given without a matching [strategy] section; \
                     config [indicators] and [signal] are ignored"
                );
            }
            registry.create(&name, &StrategyParams::new())?
        }
        (None, Some(sel)) => registry.create_from(sel)?,
        (None, None) => Strategy::new("config", config.indicators.clone(), config.signal.clone())?,
    };
    info!(strategy = strategy.name(), "strategy ready");
    Ok(strategy)
}

/// True when the file sets `[indicators]` or `[signal]`, which a bare
/// `--strategy` name does not pick up.
fn ignores_config_sections(config: &AppConfig) -> bool {
    config.indicators != IndicatorConfig::default() || config.signal != SignalConfig::default()
}

fn run_signal(
    registry: &StrategyRegistry,
    data: &Path,
    symbols: &[String],
    strategy: Option<String>,
    config: Option<PathBuf>,
    limit: usize,
) -> Result<()> {
    let config = load_config(config.as_deref())?;
    let strategy = resolve_strategy(registry, &config, strategy)?;
    let source = CsvCandleSource::open(data);

    let results: Vec<(&String, Result<_>)> = symbols
        .par_iter()
        .map(|symbol| {
            let outcome = source
                .fetch(symbol, limit)
                .map_err(anyhow::Error::from)
                .and_then(|candles| {
                    strategy
                        .evaluate(&candles, &SymbolContext::new(symbol.as_str()))
                        .map_err(anyhow::Error::from)
                });
            (symbol, outcome)
        })
        .collect();

    let mut failed = 0;
    for (symbol, outcome) in results {
        match outcome {
            Ok(signal) => println!("{}", serde_json::to_string(&signal)?),
            Err(e) => {
                error!(%symbol, error = %e, "evaluation failed");
                failed += 1;
            }
        }
    }
    if failed > 0 {
        bail!("{failed} of {} symbols failed", symbols.len());
    }
    Ok(())
}

#[derive(Serialize)]
struct RowOut<'a> {
    timestamp: i64,
    time: Option<String>,
    close: f64,
    #[serde(flatten)]
    row: &'a IndicatorRow,
}

fn run_indicators(data: &Path, symbol: &str, config: Option<PathBuf>, tail: usize) -> Result<()> {
    let config = load_config(config.as_deref())?;
    let engine = IndicatorEngine::new(config.indicators)?;
    let candles = CsvCandleSource::open(data).load_all(symbol)?;
    let series = engine.compute(&candles)?;

    let start = candles.len().saturating_sub(tail);
    for (i, candle) in candles.iter().enumerate().skip(start) {
        let Some(row) = series.row(i) else {
            bail!("indicator series misaligned at bar {i}");
        };
        let out = RowOut {
            timestamp: candle.timestamp,
            time: candle.datetime().map(|t| t.to_rfc3339()),
            close: candle.close,
            row: &row,
        };
        println!("{}", serde_json::to_string(&out)?);
    }
    Ok(())
}

fn run_replay(
    registry: &StrategyRegistry,
    data: &Path,
    symbol: &str,
    strategy: Option<String>,
    config: Option<PathBuf>,
    window: usize,
) -> Result<()> {
    if window < 2 {
        bail!("--window must be at least 2");
    }
    let config = load_config(config.as_deref())?;
    let strategy = resolve_strategy(registry, &config, strategy)?;
    let candles: Vec<Candle> = CsvCandleSource::open(data).load_all(symbol)?;
    if candles.len() < 2 {
        warn!(symbol, candles = candles.len(), "not enough candles to replay");
        return Ok(());
    }

    let mut ctx = SymbolContext::new(symbol);
    let mut actionable = 0usize;
    for end in 2..=candles.len() {
        let visible = &candles[end.saturating_sub(window)..end];
        let signal = strategy.evaluate(visible, &ctx)?;
        if !signal.kind.is_actionable() {
            continue;
        }
        let from = ctx.record(&signal, strategy.allow_reversal());
        actionable += 1;
        let time = candles[end - 1].datetime().map(|t| t.to_rfc3339());
        println!(
            "{}",
            json!({
                "bar": end - 1,
                "time": time,
                "from": from,
                "to": ctx.position,
                "signal": signal,
            })
        );
    }

    info!(
        symbol,
        bars = candles.len(),
        signals = actionable,
        position = %ctx.position,
        "replay finished"
    );
    Ok(())
}
