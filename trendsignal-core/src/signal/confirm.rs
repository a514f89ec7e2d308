//! Confirmation predicates — secondary indicators that must agree with a
//! Supertrend crossover before it becomes a trade signal.
//!
//! Each predicate sees the current bar's indicator row and the candidate side.
//! A passing predicate returns a score in [0, 1] and a human-readable reason.
//! Sentinel or non-finite inputs never pass.

use crate::config::ConfirmationConfig;
use crate::engine::IndicatorRow;
use crate::indicators::TrendDirection;

/// Everything a predicate may look at for the bar being evaluated.
#[derive(Debug, Clone, Copy)]
pub struct BarView {
    pub price: f64,
    pub supertrend: f64,
    pub row: IndicatorRow,
    pub strength_scale: f64,
}

impl BarView {
    /// `min(1, |a - b| / price * strength_scale)`, `None` on non-finite input.
    pub fn normalized_distance(&self, a: f64, b: f64) -> Option<f64> {
        let d = (a - b).abs() / self.price * self.strength_scale;
        d.is_finite().then(|| d.min(1.0))
    }
}

/// A passing predicate's contribution.
#[derive(Debug, Clone, PartialEq)]
pub struct Confirmed {
    pub score: f64,
    pub reason: String,
}

/// Pluggable confirmation predicate.
pub trait Confirmation: Send + Sync {
    fn name(&self) -> &str;

    /// `Some` if the predicate agrees with `side` on this bar.
    fn check(&self, side: TrendDirection, view: &BarView) -> Option<Confirmed>;
}

fn all_finite(values: &[f64]) -> bool {
    values.iter().all(|v| v.is_finite())
}

/// RSI above `threshold` for buys, below `100 - threshold` for sells.
#[derive(Debug, Clone)]
pub struct RsiConfirmation {
    pub threshold: f64,
}

impl Confirmation for RsiConfirmation {
    fn name(&self) -> &str {
        "rsi"
    }

    fn check(&self, side: TrendDirection, view: &BarView) -> Option<Confirmed> {
        let rsi = view.row.rsi;
        if !rsi.is_finite() {
            return None;
        }
        let room = 100.0 - self.threshold;
        match side {
            TrendDirection::Up if rsi > self.threshold => Some(Confirmed {
                score: ((rsi - self.threshold) / room).min(1.0),
                reason: format!("RSI {rsi:.2} above {:.2}", self.threshold),
            }),
            TrendDirection::Down if rsi < room => Some(Confirmed {
                score: ((room - rsi) / room).min(1.0),
                reason: format!("RSI {rsi:.2} below {room:.2}"),
            }),
            _ => None,
        }
    }
}

/// MACD histogram on the side of zero matching the trade.
#[derive(Debug, Clone)]
pub struct MacdHistogramConfirmation;

impl Confirmation for MacdHistogramConfirmation {
    fn name(&self) -> &str {
        "macd_histogram"
    }

    fn check(&self, side: TrendDirection, view: &BarView) -> Option<Confirmed> {
        let hist = view.row.macd_histogram;
        if !hist.is_finite() {
            return None;
        }
        let agrees = match side {
            TrendDirection::Up => hist > 0.0,
            TrendDirection::Down => hist < 0.0,
        };
        if !agrees {
            return None;
        }
        Some(Confirmed {
            score: view.normalized_distance(hist, 0.0)?,
            reason: format!(
                "MACD histogram {hist:.4} {} 0",
                if hist > 0.0 { ">" } else { "<" }
            ),
        })
    }
}

/// Fisher line above (buy) or below (sell) its one-bar-lagged signal line.
#[derive(Debug, Clone)]
pub struct FisherCrossConfirmation;

impl Confirmation for FisherCrossConfirmation {
    fn name(&self) -> &str {
        "fisher_cross"
    }

    fn check(&self, side: TrendDirection, view: &BarView) -> Option<Confirmed> {
        let (fisher, signal) = (view.row.fisher, view.row.fisher_signal);
        if !all_finite(&[fisher, signal]) {
            return None;
        }
        let (agrees, word) = match side {
            TrendDirection::Up => (fisher > signal, "above"),
            TrendDirection::Down => (fisher < signal, "below"),
        };
        agrees.then(|| Confirmed {
            score: (fisher - signal).abs().min(1.0),
            reason: format!("Fisher {fisher:.3} {word} signal {signal:.3}"),
        })
    }
}

/// Supertrend inside the chandelier exit: below the long line for buys,
/// above the short line for sells.
#[derive(Debug, Clone)]
pub struct ChandelierConfirmation;

impl Confirmation for ChandelierConfirmation {
    fn name(&self) -> &str {
        "chandelier_exit"
    }

    fn check(&self, side: TrendDirection, view: &BarView) -> Option<Confirmed> {
        let st = view.supertrend;
        let (level, agrees, word, label) = match side {
            TrendDirection::Up => (view.row.chandelier_long, st < view.row.chandelier_long, "below", "long"),
            TrendDirection::Down => (view.row.chandelier_short, st > view.row.chandelier_short, "above", "short"),
        };
        if !all_finite(&[st, level]) || !agrees {
            return None;
        }
        Some(Confirmed {
            score: view.normalized_distance(level, st)?,
            reason: format!("supertrend {st:.4} {word} chandelier {label} {level:.4}"),
        })
    }
}

/// Fast EMA above (buy) or below (sell) the slow EMA.
#[derive(Debug, Clone)]
pub struct EmaTrendConfirmation;

impl Confirmation for EmaTrendConfirmation {
    fn name(&self) -> &str {
        "ema_trend"
    }

    fn check(&self, side: TrendDirection, view: &BarView) -> Option<Confirmed> {
        let (fast, slow) = (view.row.ema_fast, view.row.ema_slow);
        if !all_finite(&[fast, slow]) {
            return None;
        }
        let (agrees, word) = match side {
            TrendDirection::Up => (fast > slow, "above"),
            TrendDirection::Down => (fast < slow, "below"),
        };
        if !agrees {
            return None;
        }
        Some(Confirmed {
            score: view.normalized_distance(fast, slow)?,
            reason: format!("EMA fast {fast:.4} {word} EMA slow {slow:.4}"),
        })
    }
}

/// Build a predicate from its config.
pub fn create_confirmation(config: &ConfirmationConfig) -> Box<dyn Confirmation> {
    match config {
        ConfirmationConfig::Rsi { threshold } => Box::new(RsiConfirmation {
            threshold: *threshold,
        }),
        ConfirmationConfig::MacdHistogram => Box::new(MacdHistogramConfirmation),
        ConfirmationConfig::FisherCross => Box::new(FisherCrossConfirmation),
        ConfirmationConfig::ChandelierExit => Box::new(ChandelierConfirmation),
        ConfirmationConfig::EmaTrend => Box::new(EmaTrendConfirmation),
    }
}
