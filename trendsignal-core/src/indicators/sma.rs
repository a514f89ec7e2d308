//! Simple moving average of closes. First valid value at index `period - 1`.

use super::Indicator;
use crate::domain::Candle;

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    name: String,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "sma period must be positive");
        let name = format!("sma_{period}");
        Self { period, name }
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn warmup(&self) -> usize {
        self.period
    }

    fn compute(&self, candles: &[Candle]) -> Vec<f64> {
        sma_of_series(&super::closes(candles), self.period)
    }
}

/// Rolling mean of an arbitrary series; any window holding a NaN is NaN.
///
/// Keeps a running sum over the finite values plus a count of NaNs in the
/// window, so a single bad bar only blanks the windows that contain it.
pub fn sma_of_series(values: &[f64], period: usize) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    if period == 0 {
        return out;
    }

    let mut sum = 0.0;
    let mut nans = 0usize;
    for (i, &x) in values.iter().enumerate() {
        if x.is_nan() {
            nans += 1;
        } else {
            sum += x;
        }
        if i >= period {
            match values[i - period] {
                old if old.is_nan() => nans -= 1,
                old => sum -= old,
            }
        }
        if i + 1 >= period && nans == 0 {
            out[i] = sum / period as f64;
        }
    }
    out
}
