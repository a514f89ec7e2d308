//! Serializable configuration: indicator periods, signal thresholds, and the
//! optional strategy selection, loadable from TOML.
//!
//! Every struct uses `#[serde(default)]`, so a file only needs the keys it
//! overrides.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{field} must be >= 1, got {value}")]
    ZeroPeriod { field: &'static str, value: usize },
    #[error("{field} must be finite and > 0, got {value}")]
    NonPositive { field: &'static str, value: f64 },
    #[error("{field} must be within [0, 1], got {value}")]
    OutOfUnitRange { field: &'static str, value: f64 },
    #[error("macd_fast ({fast}) must be < macd_slow ({slow})")]
    MacdOrder { fast: usize, slow: usize },
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

fn check_period(field: &'static str, value: usize) -> Result<(), ConfigError> {
    if value == 0 {
        return Err(ConfigError::ZeroPeriod { field, value });
    }
    Ok(())
}

fn check_positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !(value.is_finite() && value > 0.0) {
        return Err(ConfigError::NonPositive { field, value });
    }
    Ok(())
}

fn check_unit(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ConfigError::OutOfUnitRange { field, value });
    }
    Ok(())
}

/// Lookback periods and multipliers for every indicator the engine computes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    pub atr_period: usize,
    pub rsi_period: usize,
    pub ema_fast_period: usize,
    pub ema_slow_period: usize,
    pub sma_period: usize,
    pub supertrend_period: usize,
    pub supertrend_multiplier: f64,
    pub fisher_period: usize,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub bb_period: usize,
    pub bb_std_dev: f64,
    pub chandelier_period: usize,
    pub chandelier_multiplier: f64,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            atr_period: 14,
            rsi_period: 14,
            ema_fast_period: 8,
            ema_slow_period: 21,
            sma_period: 20,
            supertrend_period: 10,
            supertrend_multiplier: 3.0,
            fisher_period: 10,
            macd_fast: 12,
            macd_slow: 26,
            macd_signal: 9,
            bb_period: 20,
            bb_std_dev: 2.0,
            chandelier_period: 22,
            chandelier_multiplier: 3.0,
        }
    }
}

impl IndicatorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_period("atr_period", self.atr_period)?;
        check_period("rsi_period", self.rsi_period)?;
        check_period("ema_fast_period", self.ema_fast_period)?;
        check_period("ema_slow_period", self.ema_slow_period)?;
        check_period("sma_period", self.sma_period)?;
        check_period("supertrend_period", self.supertrend_period)?;
        check_positive("supertrend_multiplier", self.supertrend_multiplier)?;
        check_period("fisher_period", self.fisher_period)?;
        check_period("macd_fast", self.macd_fast)?;
        check_period("macd_slow", self.macd_slow)?;
        check_period("macd_signal", self.macd_signal)?;
        if self.macd_fast >= self.macd_slow {
            return Err(ConfigError::MacdOrder {
                fast: self.macd_fast,
                slow: self.macd_slow,
            });
        }
        check_period("bb_period", self.bb_period)?;
        check_positive("bb_std_dev", self.bb_std_dev)?;
        check_period("chandelier_period", self.chandelier_period)?;
        check_positive("chandelier_multiplier", self.chandelier_multiplier)?;
        Ok(())
    }
}

/// A confirmation predicate selection (see `signal::confirm`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConfirmationConfig {
    /// Buy when RSI > threshold, Sell when RSI < 100 - threshold.
    Rsi { threshold: f64 },
    /// Buy when the MACD histogram is positive, Sell when negative.
    MacdHistogram,
    /// Buy when fisher is above its signal line, Sell when below.
    FisherCross,
    /// Buy when supertrend sits below the chandelier long line,
    /// Sell when it sits above the chandelier short line.
    ChandelierExit,
    /// Buy when the fast EMA is above the slow EMA, Sell when below.
    EmaTrend,
}

/// Thresholds and predicate selection for the signal generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalConfig {
    pub min_signal_strength: f64,
    pub min_signal_confidence: f64,
    /// Bars (current included) inspected for trend consistency.
    pub confidence_lookback: usize,
    /// Scales relative price distance into a [0, 1] score; 100 maps a 1% gap to 1.0.
    pub strength_scale: f64,
    /// Passing predicates required to accept a crossover, capped at the number configured.
    pub min_confirmations: usize,
    pub confirmations: Vec<ConfirmationConfig>,
    /// Whether an opposite signal reverses a position instead of flattening it.
    pub allow_reversal: bool,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            min_signal_strength: 0.3,
            min_signal_confidence: 0.6,
            confidence_lookback: 5,
            strength_scale: 100.0,
            min_confirmations: 1,
            confirmations: vec![ConfirmationConfig::Rsi { threshold: 50.0 }],
            allow_reversal: true,
        }
    }
}

impl SignalConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_unit("min_signal_strength", self.min_signal_strength)?;
        check_unit("min_signal_confidence", self.min_signal_confidence)?;
        check_period("confidence_lookback", self.confidence_lookback)?;
        check_positive("strength_scale", self.strength_scale)?;
        for c in &self.confirmations {
            if let ConfirmationConfig::Rsi { threshold } = c {
                if !(0.0..=100.0).contains(threshold) {
                    return Err(ConfigError::OutOfUnitRange {
                        field: "rsi threshold / 100",
                        value: threshold / 100.0,
                    });
                }
            }
        }
        Ok(())
    }
}

/// A named strategy from the registry plus parameter overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategySelection {
    pub name: String,
    #[serde(default)]
    pub params: BTreeMap<String, f64>,
}

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub indicators: IndicatorConfig,
    pub signal: SignalConfig,
    pub strategy: Option<StrategySelection>,
}

impl AppConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.indicators.validate()?;
        self.signal.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        AppConfig::default().validate().unwrap();
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg = AppConfig::from_toml_str(
            r#"
            [indicators]
            supertrend_period = 7
            supertrend_multiplier = 2.5

            [signal]
            min_signal_confidence = 0.8
            confirmations = [
                { type = "rsi", threshold = 55.0 },
                { type = "macd_histogram" },
            ]
            "#,
        )
        .unwrap();

        assert_eq!(cfg.indicators.supertrend_period, 7);
        assert_eq!(cfg.indicators.supertrend_multiplier, 2.5);
        assert_eq!(cfg.indicators.rsi_period, 14);
        assert_eq!(cfg.signal.min_signal_confidence, 0.8);
        assert_eq!(cfg.signal.min_signal_strength, 0.3);
        assert_eq!(
            cfg.signal.confirmations,
            vec![
                ConfirmationConfig::Rsi { threshold: 55.0 },
                ConfirmationConfig::MacdHistogram,
            ]
        );
        assert!(cfg.strategy.is_none());
    }

    #[test]
    fn strategy_selection_parses() {
        let cfg = AppConfig::from_toml_str(
            r#"
            [strategy]
            name = "ehlers_supertrend"
            params = { fisher_period = 8.0 }
            "#,
        )
        .unwrap();
        let sel = cfg.strategy.unwrap();
        assert_eq!(sel.name, "ehlers_supertrend");
        assert_eq!(sel.params["fisher_period"], 8.0);
    }

    #[test]
    fn rejects_zero_period() {
        let err = AppConfig::from_toml_str("[indicators]\nrsi_period = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::ZeroPeriod { field: "rsi_period", .. }));
    }

    #[test]
    fn rejects_inverted_macd() {
        let cfg = IndicatorConfig {
            macd_fast: 30,
            ..IndicatorConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::MacdOrder { .. })));
    }

    #[test]
    fn rejects_threshold_out_of_range() {
        let cfg = SignalConfig {
            min_signal_confidence: 1.5,
            ..SignalConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_bad_toml() {
        assert!(matches!(
            AppConfig::from_toml_str("indicators = 3"),
            Err(ConfigError::Parse(_))
        ));
    }
}
