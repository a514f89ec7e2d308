//! Average true range: Wilder-smoothed `max(high-low, |high-prev_close|,
//! |low-prev_close|)`. First valid value at index `period - 1`.

use super::ema::seeded_recursion;
use super::Indicator;
use crate::domain::Candle;

#[derive(Debug, Clone)]
pub struct Atr {
    period: usize,
    name: String,
}

impl Atr {
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "atr period must be positive");
        let name = format!("atr_{period}");
        Self { period, name }
    }
}

/// True range per bar. The first bar has no previous close, so its range is
/// just `high - low`. A NaN input leaves that bar NaN.
pub fn true_range(candles: &[Candle]) -> Vec<f64> {
    let Some(first) = candles.first() else {
        return Vec::new();
    };
    let mut tr = Vec::with_capacity(candles.len());
    tr.push(first.high - first.low);
    tr.extend(candles.windows(2).map(|pair| {
        let (prev_close, bar) = (pair[0].close, &pair[1]);
        if [bar.high, bar.low, prev_close].iter().any(|v| v.is_nan()) {
            // f64::max would drop the NaN
            return f64::NAN;
        }
        let span = bar.high - bar.low;
        span.max((bar.high - prev_close).abs())
            .max((bar.low - prev_close).abs())
    }));
    tr
}

/// Wilder's running average (alpha = 1/period), seeded with the mean of the
/// first `period` usable values.
pub fn wilder_smooth(values: &[f64], period: usize) -> Vec<f64> {
    seeded_recursion(values, period, 1.0 / period as f64)
}

impl Indicator for Atr {
    fn name(&self) -> &str {
        &self.name
    }

    fn warmup(&self) -> usize {
        self.period
    }

    fn compute(&self, candles: &[Candle]) -> Vec<f64> {
        wilder_smooth(&true_range(candles), self.period)
    }
}
