//! IndicatorEngine — computes the full indicator bundle from a candle window.
//!
//! Pure: the same candles and config always produce the same series. Each call
//! recomputes from the whole window; nothing is carried between calls.

use serde::Serialize;
use tracing::debug;

use crate::config::{ConfigError, IndicatorConfig};
use crate::domain::Candle;
use crate::indicators::{
    first_valid, Atr, Bollinger, Chandelier, Ema, FisherTransform, Indicator, Macd, Rsi, Sma,
    Supertrend, TrendDirection,
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("insufficient data: candle sequence is empty")]
    InsufficientData,
}

/// Parallel per-bar indicator arrays, one slot per input candle.
///
/// NaN (or `None` for direction) marks a slot inside an indicator's warm-up.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndicatorSeries {
    pub atr: Vec<f64>,
    pub rsi: Vec<f64>,
    pub ema_fast: Vec<f64>,
    pub ema_slow: Vec<f64>,
    pub sma: Vec<f64>,
    pub supertrend_value: Vec<f64>,
    pub supertrend_direction: Vec<Option<TrendDirection>>,
    pub supertrend_upper: Vec<f64>,
    pub supertrend_lower: Vec<f64>,
    pub fisher: Vec<f64>,
    pub fisher_signal: Vec<f64>,
    pub macd_line: Vec<f64>,
    pub macd_signal: Vec<f64>,
    pub macd_histogram: Vec<f64>,
    pub bb_upper: Vec<f64>,
    pub bb_middle: Vec<f64>,
    pub bb_lower: Vec<f64>,
    pub chandelier_long: Vec<f64>,
    pub chandelier_short: Vec<f64>,
}

/// Every indicator value at a single bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct IndicatorRow {
    pub index: usize,
    pub atr: f64,
    pub rsi: f64,
    pub ema_fast: f64,
    pub ema_slow: f64,
    pub sma: f64,
    pub supertrend_value: f64,
    pub supertrend_direction: Option<TrendDirection>,
    pub fisher: f64,
    pub fisher_signal: f64,
    pub macd_line: f64,
    pub macd_signal: f64,
    pub macd_histogram: f64,
    pub bb_upper: f64,
    pub bb_middle: f64,
    pub bb_lower: f64,
    pub chandelier_long: f64,
    pub chandelier_short: f64,
}

impl IndicatorSeries {
    /// A series of `n` slots, all in warm-up.
    pub fn with_len(n: usize) -> Self {
        let nan = || vec![f64::NAN; n];
        Self {
            atr: nan(),
            rsi: nan(),
            ema_fast: nan(),
            ema_slow: nan(),
            sma: nan(),
            supertrend_value: nan(),
            supertrend_direction: vec![None; n],
            supertrend_upper: nan(),
            supertrend_lower: nan(),
            fisher: nan(),
            fisher_signal: nan(),
            macd_line: nan(),
            macd_signal: nan(),
            macd_histogram: nan(),
            bb_upper: nan(),
            bb_middle: nan(),
            bb_lower: nan(),
            chandelier_long: nan(),
            chandelier_short: nan(),
        }
    }

    /// Number of bars (length of the supertrend series).
    pub fn len(&self) -> usize {
        self.supertrend_value.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// True when every field has the same length.
    pub fn is_aligned(&self) -> bool {
        let n = self.len();
        [
            &self.atr,
            &self.rsi,
            &self.ema_fast,
            &self.ema_slow,
            &self.sma,
            &self.supertrend_upper,
            &self.supertrend_lower,
            &self.fisher,
            &self.fisher_signal,
            &self.macd_line,
            &self.macd_signal,
            &self.macd_histogram,
            &self.bb_upper,
            &self.bb_middle,
            &self.bb_lower,
            &self.chandelier_long,
            &self.chandelier_short,
        ]
        .iter()
        .all(|v| v.len() == n)
            && self.supertrend_direction.len() == n
    }

    /// Snapshot of every indicator at `index`, `None` if out of range or misaligned.
    pub fn row(&self, index: usize) -> Option<IndicatorRow> {
        if index >= self.len() || !self.is_aligned() {
            return None;
        }
        Some(IndicatorRow {
            index,
            atr: self.atr[index],
            rsi: self.rsi[index],
            ema_fast: self.ema_fast[index],
            ema_slow: self.ema_slow[index],
            sma: self.sma[index],
            supertrend_value: self.supertrend_value[index],
            supertrend_direction: self.supertrend_direction[index],
            fisher: self.fisher[index],
            fisher_signal: self.fisher_signal[index],
            macd_line: self.macd_line[index],
            macd_signal: self.macd_signal[index],
            macd_histogram: self.macd_histogram[index],
            bb_upper: self.bb_upper[index],
            bb_middle: self.bb_middle[index],
            bb_lower: self.bb_lower[index],
            chandelier_long: self.chandelier_long[index],
            chandelier_short: self.chandelier_short[index],
        })
    }
}

/// Computes an `IndicatorSeries` from candles using a validated config.
#[derive(Debug, Clone)]
pub struct IndicatorEngine {
    config: IndicatorConfig,
}

impl IndicatorEngine {
    pub fn new(config: IndicatorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &IndicatorConfig {
        &self.config
    }

    /// Compute every indicator over `candles`.
    ///
    /// `candles` must be sorted ascending by timestamp; the engine does not
    /// check. Fails only on an empty slice. Too-short inputs give NaN series.
    pub fn compute(&self, candles: &[Candle]) -> Result<IndicatorSeries, EngineError> {
        if candles.is_empty() {
            return Err(EngineError::InsufficientData);
        }
        let c = &self.config;

        let supertrend = Supertrend::new(c.supertrend_period, c.supertrend_multiplier).compute(candles);
        let fisher = FisherTransform::new(c.fisher_period).compute(candles);
        let macd = Macd::new(c.macd_fast, c.macd_slow, c.macd_signal).compute(candles);
        let bollinger = Bollinger::new(c.bb_period, c.bb_std_dev).compute(candles);
        let chandelier = Chandelier::new(c.chandelier_period, c.chandelier_multiplier).compute(candles);

        let series = IndicatorSeries {
            atr: Atr::new(c.atr_period).compute(candles),
            rsi: Rsi::new(c.rsi_period).compute(candles),
            ema_fast: Ema::new(c.ema_fast_period).compute(candles),
            ema_slow: Ema::new(c.ema_slow_period).compute(candles),
            sma: Sma::new(c.sma_period).compute(candles),
            supertrend_value: supertrend.value,
            supertrend_direction: supertrend.direction,
            supertrend_upper: supertrend.upper,
            supertrend_lower: supertrend.lower,
            fisher: fisher.fisher,
            fisher_signal: fisher.signal,
            macd_line: macd.line,
            macd_signal: macd.signal,
            macd_histogram: macd.histogram,
            bb_upper: bollinger.upper,
            bb_middle: bollinger.middle,
            bb_lower: bollinger.lower,
            chandelier_long: chandelier.long,
            chandelier_short: chandelier.short,
        };

        debug!(
            candles = candles.len(),
            first_supertrend = ?first_valid(&series.supertrend_value),
            first_rsi = ?first_valid(&series.rsi),
            first_macd_signal = ?first_valid(&series.macd_signal),
            "computed indicator series"
        );

        Ok(series)
    }
}
