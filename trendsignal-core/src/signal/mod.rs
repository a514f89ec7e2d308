//! SignalGenerator — turns the latest indicator rows into a Buy/Sell/Hold
//! decision.
//!
//! A signal starts as a fresh Supertrend crossover on the last bar, then has to
//! get past the confirmation predicates, the strength threshold, and the
//! confidence threshold. Any failure along the way yields `Hold` with the
//! rejection reason. Garbage input (NaN prices, misaligned series) is always
//! `Hold`, never a trade.

pub mod confirm;

use std::fmt;

use tracing::debug;

use crate::config::{ConfigError, SignalConfig};
use crate::domain::{Candle, Signal, SignalKind, SymbolContext};
use crate::engine::IndicatorSeries;
use crate::indicators::TrendDirection;

pub use confirm::{create_confirmation, BarView, Confirmation, Confirmed};

pub const INSUFFICIENT_HISTORY: &str = "insufficient history";
pub const INVALID_DATA: &str = "invalid indicator data";
pub const NO_CROSSOVER: &str = "no supertrend crossover";

fn valid_price(p: f64) -> bool {
    p.is_finite() && p > 0.0
}

/// Evaluates crossover signals against a fixed `SignalConfig`.
pub struct SignalGenerator {
    config: SignalConfig,
    confirmations: Vec<Box<dyn Confirmation>>,
}

impl fmt::Debug for SignalGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.confirmations.iter().map(|c| c.name()).collect();
        f.debug_struct("SignalGenerator")
            .field("config", &self.config)
            .field("confirmations", &names)
            .finish()
    }
}

impl SignalGenerator {
    /// Build the predicates named in `config.confirmations`.
    pub fn new(config: SignalConfig) -> Result<Self, ConfigError> {
        let confirmations = config.confirmations.iter().map(create_confirmation).collect();
        Self::with_confirmations(config, confirmations)
    }

    /// Use caller-supplied predicates instead of `config.confirmations`.
    pub fn with_confirmations(
        config: SignalConfig,
        confirmations: Vec<Box<dyn Confirmation>>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            confirmations,
        })
    }

    pub fn config(&self) -> &SignalConfig {
        &self.config
    }

    pub fn confirmation_names(&self) -> Vec<&str> {
        self.confirmations.iter().map(|c| c.name()).collect()
    }

    fn required_confirmations(&self) -> usize {
        self.config.min_confirmations.min(self.confirmations.len())
    }

    /// Decide on the last bar of `candles`.
    ///
    /// `series` must have been computed from `candles`. `ctx` is only read;
    /// applying the result is up to the caller (`SymbolContext::record`).
    pub fn generate(
        &self,
        series: &IndicatorSeries,
        candles: &[Candle],
        ctx: &SymbolContext,
    ) -> Signal {
        let (price, timestamp) = candles
            .last()
            .map(|c| (c.close, c.timestamp))
            .unwrap_or((f64::NAN, 0));
        let hold = |reason: String| {
            debug!(symbol = %ctx.symbol, %reason, "hold");
            Signal::hold(ctx.symbol.clone(), price, timestamp, reason)
        };

        let n = candles.len();
        if series.len() != n || !series.is_aligned() {
            return hold(format!(
                "{INVALID_DATA}: {} indicator rows for {n} candles",
                series.len()
            ));
        }
        if n < 2 {
            return hold(INSUFFICIENT_HISTORY.to_string());
        }

        let prev_close = candles[n - 2].close;
        if !valid_price(price) || !valid_price(prev_close) {
            return hold(format!("{INVALID_DATA}: non-finite or non-positive price"));
        }
        // A bad high/low blanks ATR and supertrend at that bar; report the
        // data fault rather than warm-up.
        if !candles[n - 1].is_finite() || !candles[n - 2].is_finite() {
            return hold(format!("{INVALID_DATA}: non-finite candle"));
        }

        let st = series.supertrend_value[n - 1];
        let prev_st = series.supertrend_value[n - 2];
        if st.is_nan() || prev_st.is_nan() {
            return hold(INSUFFICIENT_HISTORY.to_string());
        }
        if !st.is_finite() || !prev_st.is_finite() {
            return hold(format!("{INVALID_DATA}: non-finite supertrend"));
        }

        let (side, kind, word) = if price > st && prev_close <= prev_st {
            (TrendDirection::Up, SignalKind::Buy, "above")
        } else if price < st && prev_close >= prev_st {
            (TrendDirection::Down, SignalKind::Sell, "below")
        } else {
            return hold(NO_CROSSOVER.to_string());
        };

        let Some(row) = series.row(n - 1) else {
            return hold(INVALID_DATA.to_string());
        };
        let view = BarView {
            price,
            supertrend: st,
            row,
            strength_scale: self.config.strength_scale,
        };

        let mut reasons = vec![format!("price {price:.4} crossed {word} supertrend {st:.4}")];
        let mut scores = vec![view.normalized_distance(price, st).unwrap_or(0.0)];
        for predicate in &self.confirmations {
            if let Some(c) = predicate.check(side, &view) {
                scores.push(c.score.clamp(0.0, 1.0));
                reasons.push(c.reason);
            }
        }

        let passed = scores.len() - 1;
        let required = self.required_confirmations();
        if passed < required {
            return hold(format!(
                "insufficient confirmation: {passed}/{} predicates passed (need {required})",
                self.confirmations.len()
            ));
        }

        let strength = scores.iter().sum::<f64>() / scores.len() as f64;
        if strength < self.config.min_signal_strength {
            return hold(format!(
                "strength below threshold: {strength:.2} < {:.2}",
                self.config.min_signal_strength
            ));
        }

        let confidence = self.confidence(candles, &series.supertrend_value, side);
        if confidence < self.config.min_signal_confidence {
            return hold(format!(
                "confidence below threshold: {confidence:.2} < {:.2}",
                self.config.min_signal_confidence
            ));
        }

        if ctx.position.same_direction() == Some(kind) {
            return hold(format!("already {}", ctx.position));
        }

        debug!(symbol = %ctx.symbol, %kind, strength, confidence, "signal accepted");
        Signal {
            kind,
            strength,
            confidence,
            reasons,
            symbol: ctx.symbol.clone(),
            price_at_signal: price,
            timestamp,
        }
    }

    /// Share of the last `confidence_lookback` bars whose close sits on the
    /// signal's side of that bar's own supertrend, divided by the full
    /// lookback. A sentinel supertrend slot counts against.
    fn confidence(&self, candles: &[Candle], supertrend: &[f64], side: TrendDirection) -> f64 {
        let k = self.config.confidence_lookback;
        let start = candles.len().saturating_sub(k);
        let agreeing = candles[start..]
            .iter()
            .zip(&supertrend[start..])
            .filter(|&(c, &st)| match side {
                TrendDirection::Up => c.close > st,
                TrendDirection::Down => c.close < st,
            })
            .count();
        agreeing as f64 / k as f64
    }
}
