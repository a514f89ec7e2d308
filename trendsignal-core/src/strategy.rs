//! Strategy registry — named constructors that bundle an indicator config, a
//! signal config, and a confirmation set into a runnable `Strategy`.
//!
//! Strategies are registered explicitly by name. `with_builtins()` installs the
//! five Supertrend variants; callers can `register` their own alongside them.

use std::collections::BTreeMap;
use std::fmt;

use tracing::debug;

use crate::config::{ConfigError, ConfirmationConfig, IndicatorConfig, SignalConfig, StrategySelection};
use crate::domain::{Candle, Signal, SymbolContext};
use crate::engine::{EngineError, IndicatorEngine};
use crate::signal::SignalGenerator;

/// Parameter overrides by name. Booleans are 0.0 / 1.0.
pub type StrategyParams = BTreeMap<String, f64>;

/// Builds a `Strategy` from parameter overrides.
pub type StrategyConstructor = fn(&StrategyParams) -> Result<Strategy, FactoryError>;

#[derive(Debug, thiserror::Error)]
pub enum FactoryError {
    #[error("unknown strategy: {0}")]
    UnknownStrategy(String),
    #[error("unknown parameter for {strategy}: {name}")]
    UnknownParam { strategy: String, name: String },
    #[error("parameter {name} must be a non-negative integer, got {value}")]
    InvalidParam { name: String, value: f64 },
    #[error(transparent)]
    Config(#[from] ConfigError),
}

// ─── Helpers ─────────────────────────────────────────────────────────

/// Named f64 parameter, falling back to `default`.
fn param(params: &StrategyParams, name: &str, default: f64) -> f64 {
    params.get(name).copied().unwrap_or(default)
}

/// Named integer parameter, falling back to `default`. Fractional or negative
/// values are rejected rather than truncated.
fn param_usize(params: &StrategyParams, name: &str, default: usize) -> Result<usize, FactoryError> {
    match params.get(name).copied() {
        None => Ok(default),
        Some(v) if v.is_finite() && v >= 0.0 && v.fract() == 0.0 => Ok(v as usize),
        Some(value) => Err(FactoryError::InvalidParam {
            name: name.to_string(),
            value,
        }),
    }
}

const INDICATOR_KEYS: &[&str] = &[
    "atr_period",
    "rsi_period",
    "ema_fast_period",
    "ema_slow_period",
    "sma_period",
    "supertrend_period",
    "supertrend_multiplier",
    "fisher_period",
    "macd_fast",
    "macd_slow",
    "macd_signal",
    "bb_period",
    "bb_std_dev",
    "chandelier_period",
    "chandelier_multiplier",
];

const SIGNAL_KEYS: &[&str] = &[
    "min_signal_strength",
    "min_signal_confidence",
    "confidence_lookback",
    "strength_scale",
    "min_confirmations",
    "allow_reversal",
];

fn check_keys(strategy: &str, params: &StrategyParams, extra: &[&str]) -> Result<(), FactoryError> {
    for name in params.keys() {
        let known = INDICATOR_KEYS
            .iter()
            .chain(SIGNAL_KEYS)
            .chain(extra)
            .any(|k| *k == name.as_str());
        if !known {
            return Err(FactoryError::UnknownParam {
                strategy: strategy.to_string(),
                name: name.clone(),
            });
        }
    }
    Ok(())
}

/// Apply indicator overrides on top of `base`.
pub fn indicator_config(
    params: &StrategyParams,
    base: IndicatorConfig,
) -> Result<IndicatorConfig, FactoryError> {
    Ok(IndicatorConfig {
        atr_period: param_usize(params, "atr_period", base.atr_period)?,
        rsi_period: param_usize(params, "rsi_period", base.rsi_period)?,
        ema_fast_period: param_usize(params, "ema_fast_period", base.ema_fast_period)?,
        ema_slow_period: param_usize(params, "ema_slow_period", base.ema_slow_period)?,
        sma_period: param_usize(params, "sma_period", base.sma_period)?,
        supertrend_period: param_usize(params, "supertrend_period", base.supertrend_period)?,
        supertrend_multiplier: param(params, "supertrend_multiplier", base.supertrend_multiplier),
        fisher_period: param_usize(params, "fisher_period", base.fisher_period)?,
        macd_fast: param_usize(params, "macd_fast", base.macd_fast)?,
        macd_slow: param_usize(params, "macd_slow", base.macd_slow)?,
        macd_signal: param_usize(params, "macd_signal", base.macd_signal)?,
        bb_period: param_usize(params, "bb_period", base.bb_period)?,
        bb_std_dev: param(params, "bb_std_dev", base.bb_std_dev),
        chandelier_period: param_usize(params, "chandelier_period", base.chandelier_period)?,
        chandelier_multiplier: param(params, "chandelier_multiplier", base.chandelier_multiplier),
    })
}

/// Apply signal-threshold overrides on top of `base`, replacing its confirmations.
pub fn signal_config(
    params: &StrategyParams,
    base: SignalConfig,
    confirmations: Vec<ConfirmationConfig>,
) -> Result<SignalConfig, FactoryError> {
    Ok(SignalConfig {
        min_signal_strength: param(params, "min_signal_strength", base.min_signal_strength),
        min_signal_confidence: param(params, "min_signal_confidence", base.min_signal_confidence),
        confidence_lookback: param_usize(params, "confidence_lookback", base.confidence_lookback)?,
        strength_scale: param(params, "strength_scale", base.strength_scale),
        min_confirmations: param_usize(params, "min_confirmations", base.min_confirmations)?,
        allow_reversal: param(params, "allow_reversal", if base.allow_reversal { 1.0 } else { 0.0 })
            != 0.0,
        confirmations,
    })
}

// ─── Strategy ────────────────────────────────────────────────────────

/// An indicator engine paired with a signal generator.
#[derive(Debug)]
pub struct Strategy {
    name: String,
    engine: IndicatorEngine,
    generator: SignalGenerator,
}

impl Strategy {
    pub fn new(
        name: impl Into<String>,
        indicators: IndicatorConfig,
        signal: SignalConfig,
    ) -> Result<Self, FactoryError> {
        Ok(Self {
            name: name.into(),
            engine: IndicatorEngine::new(indicators)?,
            generator: SignalGenerator::new(signal)?,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn engine(&self) -> &IndicatorEngine {
        &self.engine
    }

    pub fn generator(&self) -> &SignalGenerator {
        &self.generator
    }

    pub fn allow_reversal(&self) -> bool {
        self.generator.config().allow_reversal
    }

    /// Compute indicators over `candles` and decide on the last bar.
    pub fn evaluate(&self, candles: &[Candle], ctx: &SymbolContext) -> Result<Signal, EngineError> {
        let series = self.engine.compute(candles)?;
        Ok(self.generator.generate(&series, candles, ctx))
    }
}

// ─── Built-in strategies ─────────────────────────────────────────────

fn build(
    name: &str,
    params: &StrategyParams,
    extra_keys: &[&str],
    indicators: IndicatorConfig,
    confirmations: Vec<ConfirmationConfig>,
) -> Result<Strategy, FactoryError> {
    check_keys(name, params, extra_keys)?;
    let indicators = indicator_config(params, indicators)?;
    let signal = signal_config(params, SignalConfig::default(), confirmations)?;
    Strategy::new(name, indicators, signal)
}

fn supertrend_rsi(params: &StrategyParams) -> Result<Strategy, FactoryError> {
    let threshold = param(params, "rsi_threshold", 50.0);
    build(
        "supertrend_rsi",
        params,
        &["rsi_threshold"],
        IndicatorConfig::default(),
        vec![ConfirmationConfig::Rsi { threshold }],
    )
}

fn supertrend_macd(params: &StrategyParams) -> Result<Strategy, FactoryError> {
    build(
        "supertrend_macd",
        params,
        &[],
        IndicatorConfig::default(),
        vec![ConfirmationConfig::MacdHistogram],
    )
}

fn ehlers_supertrend(params: &StrategyParams) -> Result<Strategy, FactoryError> {
    build(
        "ehlers_supertrend",
        params,
        &[],
        IndicatorConfig::default(),
        vec![ConfirmationConfig::FisherCross],
    )
}

fn chandelier_supertrend(params: &StrategyParams) -> Result<Strategy, FactoryError> {
    let indicators = IndicatorConfig {
        chandelier_multiplier: 1.85,
        ..IndicatorConfig::default()
    };
    build(
        "chandelier_supertrend",
        params,
        &[],
        indicators,
        vec![ConfirmationConfig::ChandelierExit],
    )
}

fn supertrend_ema(params: &StrategyParams) -> Result<Strategy, FactoryError> {
    build(
        "supertrend_ema",
        params,
        &[],
        IndicatorConfig::default(),
        vec![ConfirmationConfig::EmaTrend],
    )
}

// ─── Registry ────────────────────────────────────────────────────────

/// Name → constructor map. Iteration order is alphabetical.
#[derive(Clone, Default)]
pub struct StrategyRegistry {
    constructors: BTreeMap<String, StrategyConstructor>,
}

impl fmt::Debug for StrategyRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.constructors.keys()).finish()
    }
}

impl StrategyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register("supertrend_rsi", supertrend_rsi);
        registry.register("supertrend_macd", supertrend_macd);
        registry.register("ehlers_supertrend", ehlers_supertrend);
        registry.register("chandelier_supertrend", chandelier_supertrend);
        registry.register("supertrend_ema", supertrend_ema);
        debug!(strategies = registry.len(), "registered built-in strategies");
        registry
    }

    /// Register `constructor` under `name`, returning any constructor it replaces.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        constructor: StrategyConstructor,
    ) -> Option<StrategyConstructor> {
        self.constructors.insert(name.into(), constructor)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.constructors.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }

    pub fn create(&self, name: &str, params: &StrategyParams) -> Result<Strategy, FactoryError> {
        let constructor = self
            .constructors
            .get(name)
            .ok_or_else(|| FactoryError::UnknownStrategy(name.to_string()))?;
        constructor(params)
    }

    pub fn create_from(&self, selection: &StrategySelection) -> Result<Strategy, FactoryError> {
        self.create(&selection.name, &selection.params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, f64)]) -> StrategyParams {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn param_returns_value_if_present() {
        let p = params(&[("supertrend_multiplier", 2.0)]);
        assert_eq!(param(&p, "supertrend_multiplier", 3.0), 2.0);
        assert_eq!(param(&p, "bb_std_dev", 2.5), 2.5);
    }

    #[test]
    fn param_usize_rejects_fractions() {
        let p = params(&[("atr_period", 7.5)]);
        assert!(matches!(
            param_usize(&p, "atr_period", 14),
            Err(FactoryError::InvalidParam { .. })
        ));
        let p = params(&[("atr_period", 7.0)]);
        assert_eq!(param_usize(&p, "atr_period", 14).unwrap(), 7);
    }

    #[test]
    fn builtins_registered() {
        let reg = StrategyRegistry::with_builtins();
        let names: Vec<&str> = reg.names().collect();
        assert_eq!(
            names,
            [
                "chandelier_supertrend",
                "ehlers_supertrend",
                "supertrend_ema",
                "supertrend_macd",
                "supertrend_rsi",
            ]
        );
        for name in names {
            let s = reg.create(name, &StrategyParams::new()).unwrap();
            assert_eq!(s.name(), name);
        }
    }

    #[test]
    fn each_builtin_has_its_confirmation() {
        let reg = StrategyRegistry::with_builtins();
        let empty = StrategyParams::new();
        let conf = |name: &str| {
            reg.create(name, &empty)
                .unwrap()
                .generator()
                .confirmation_names()
                .iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>()
        };
        assert_eq!(conf("supertrend_rsi"), ["rsi"]);
        assert_eq!(conf("supertrend_macd"), ["macd_histogram"]);
        assert_eq!(conf("ehlers_supertrend"), ["fisher_cross"]);
        assert_eq!(conf("chandelier_supertrend"), ["chandelier_exit"]);
        assert_eq!(conf("supertrend_ema"), ["ema_trend"]);
    }

    #[test]
    fn params_override_defaults() {
        let reg = StrategyRegistry::with_builtins();
        let p = params(&[
            ("supertrend_period", 7.0),
            ("rsi_threshold", 55.0),
            ("allow_reversal", 0.0),
        ]);
        let s = reg.create("supertrend_rsi", &p).unwrap();
        assert_eq!(s.engine().config().supertrend_period, 7);
        assert!(!s.allow_reversal());
        assert_eq!(
            s.generator().config().confirmations,
            vec![ConfirmationConfig::Rsi { threshold: 55.0 }]
        );
    }

    #[test]
    fn unknown_strategy() {
        let reg = StrategyRegistry::with_builtins();
        assert!(matches!(
            reg.create("nope", &StrategyParams::new()),
            Err(FactoryError::UnknownStrategy(n)) if n == "nope"
        ));
    }

    #[test]
    fn unknown_param_rejected() {
        let reg = StrategyRegistry::with_builtins();
        let p = params(&[("rsi_threshold", 55.0)]);
        assert!(matches!(
            reg.create("supertrend_macd", &p),
            Err(FactoryError::UnknownParam { .. })
        ));
    }

    #[test]
    fn invalid_config_surfaces() {
        let reg = StrategyRegistry::with_builtins();
        let p = params(&[("macd_fast", 30.0)]);
        assert!(matches!(
            reg.create("supertrend_macd", &p),
            Err(FactoryError::Config(ConfigError::MacdOrder { .. }))
        ));
    }

    #[test]
    fn custom_registration() {
        fn quiet(params: &StrategyParams) -> Result<Strategy, FactoryError> {
            build("quiet", params, &[], IndicatorConfig::default(), vec![])
        }
        let mut reg = StrategyRegistry::new();
        assert!(reg.is_empty());
        assert!(reg.register("quiet", quiet).is_none());
        assert!(reg.contains("quiet"));
        assert!(reg.register("quiet", quiet).is_some());
        assert_eq!(reg.len(), 1);
        let s = reg.create("quiet", &StrategyParams::new()).unwrap();
        assert!(s.generator().confirmation_names().is_empty());
    }
}
