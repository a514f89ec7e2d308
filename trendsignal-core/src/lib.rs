//! TrendSignal Core — indicator engine and signal generator for trend-following bots.
//!
//! - Domain types (candles, signals, per-symbol position context)
//! - Indicator engine: ATR, RSI, EMA, SMA, Supertrend, Fisher, MACD, Bollinger, Chandelier
//! - Supertrend crossover signal generator with pluggable confirmations
//! - Explicit strategy registry
//! - TOML configuration and CSV candle source

pub mod config;
pub mod data;
pub mod domain;
pub mod engine;
pub mod indicators;
pub mod signal;
pub mod strategy;

pub use config::{AppConfig, ConfigError, ConfirmationConfig, IndicatorConfig, SignalConfig};
pub use data::{CandleSource, CsvCandleSource, DataError};
pub use domain::{Candle, PositionState, Signal, SignalKind, SymbolContext};
pub use engine::{EngineError, IndicatorEngine, IndicatorRow, IndicatorSeries};
pub use signal::SignalGenerator;
pub use strategy::{FactoryError, Strategy, StrategyParams, StrategyRegistry};
