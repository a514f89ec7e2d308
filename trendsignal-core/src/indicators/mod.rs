//! Concrete indicator implementations.
//!
//! Single-series indicators (ATR, RSI, EMA, SMA) implement the `Indicator`
//! trait. Multi-series indicators (Supertrend, Fisher, MACD, Bollinger,
//! Chandelier) return their own output struct from `compute`.
//!
//! Every output has one slot per input candle. Slots that precede the warm-up
//! window hold `f64::NAN`. When the input is shorter than `warmup()` the whole
//! output is NaN, not just the leading bars.

pub mod atr;
pub mod bollinger;
pub mod chandelier;
pub mod ema;
pub mod fisher;
pub mod macd;
pub mod rolling;
pub mod rsi;
pub mod sma;
pub mod supertrend;

pub use atr::Atr;
pub use bollinger::{Bollinger, BollingerOutput};
pub use chandelier::{Chandelier, ChandelierOutput};
pub use ema::Ema;
pub use fisher::{FisherOutput, FisherTransform};
pub use macd::{Macd, MacdOutput};
pub use rsi::Rsi;
pub use sma::Sma;
pub use supertrend::{Supertrend, SupertrendOutput, TrendDirection};

use crate::domain::Candle;

/// A pure function from candle history to a numeric series of equal length.
///
/// # Look-ahead guard
/// The value at bar t may only depend on candles `0..=t`.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "rsi_14", "atr_10").
    fn name(&self) -> &str;

    /// Minimum number of candles before any slot is valid.
    fn warmup(&self) -> usize;

    /// Compute the indicator for the entire candle series.
    fn compute(&self, candles: &[Candle]) -> Vec<f64>;
}

/// Close prices of a candle slice.
pub fn closes(candles: &[Candle]) -> Vec<f64> {
    candles.iter().map(|c| c.close).collect()
}

/// Index of the first non-NaN value, if any.
pub fn first_valid(values: &[f64]) -> Option<usize> {
    values.iter().position(|v| !v.is_nan())
}

/// Create synthetic candles from close prices for testing.
///
/// open = prev_close (or close for the first candle),
/// high = max(open,close) + 1.0, low = min(open,close) - 1.0, volume = 1000,
/// one-minute spacing.
#[cfg(test)]
pub fn make_candles(closes: &[f64]) -> Vec<Candle> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Candle {
                timestamp: 1_700_000_000_000 + i as i64 * 60_000,
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1000.0,
            }
        })
        .collect()
}

/// Create candles from explicit (high, low, close) triples; open = close.
#[cfg(test)]
pub fn make_hlc_candles(data: &[(f64, f64, f64)]) -> Vec<Candle> {
    data.iter()
        .enumerate()
        .map(|(i, &(high, low, close))| Candle {
            timestamp: 1_700_000_000_000 + i as i64 * 60_000,
            open: close,
            high,
            low,
            close,
            volume: 1000.0,
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
