//! Exponential moving average over closes, seeded with a simple mean.

use super::Indicator;
use crate::domain::Candle;

#[derive(Debug, Clone)]
pub struct Ema {
    period: usize,
    name: String,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "ema period must be positive");
        let name = format!("ema_{period}");
        Self { period, name }
    }
}

impl Indicator for Ema {
    fn name(&self) -> &str {
        &self.name
    }

    fn warmup(&self) -> usize {
        self.period
    }

    fn compute(&self, candles: &[Candle]) -> Vec<f64> {
        ema_of_series(&super::closes(candles), self.period)
    }
}

/// EMA of an arbitrary series, alpha = 2/(period+1).
///
/// Leading NaNs are skipped so derived series with their own warm-up (the
/// MACD line) can be smoothed directly.
pub fn ema_of_series(values: &[f64], period: usize) -> Vec<f64> {
    seeded_recursion(values, period, 2.0 / (period as f64 + 1.0))
}

/// Shared recursion behind EMA and Wilder RMA:
/// `out[t] = alpha * x[t] + (1 - alpha) * out[t-1]`.
///
/// The seed is the mean of the first `period` values after any leading NaNs
/// and lands on the last slot of that window. A NaN inside the seed window
/// leaves the whole output NaN; a NaN after it ends the series there.
pub(crate) fn seeded_recursion(values: &[f64], period: usize, alpha: f64) -> Vec<f64> {
    let mut out = vec![f64::NAN; values.len()];
    if period == 0 {
        return out;
    }
    let Some(start) = super::first_valid(values) else {
        return out;
    };
    let Some(seed_window) = values.get(start..start + period) else {
        return out;
    };
    if seed_window.iter().any(|v| v.is_nan()) {
        return out;
    }

    let mut acc = seed_window.iter().sum::<f64>() / period as f64;
    let seed_at = start + period - 1;
    out[seed_at] = acc;

    for (slot, &x) in out[seed_at + 1..].iter_mut().zip(&values[seed_at + 1..]) {
        if x.is_nan() {
            break;
        }
        acc += alpha * (x - acc);
        *slot = acc;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_candles, DEFAULT_EPSILON};

    #[test]
    fn unit_period_follows_close() {
        let closes = [100.0, 200.0, 300.0];
        let ema = Ema::new(1).compute(&make_candles(&closes));
        for (got, want) in ema.iter().zip(closes) {
            assert_approx(*got, want, DEFAULT_EPSILON);
        }
    }

    #[test]
    fn seeds_with_mean_then_recurses() {
        // alpha 0.5; seed mean(10, 11, 12) = 11 at index 2
        let ema = Ema::new(3).compute(&make_candles(&[10.0, 11.0, 12.0, 13.0, 14.0]));
        assert!(ema[..2].iter().all(|v| v.is_nan()));
        assert_approx(ema[2], 11.0, DEFAULT_EPSILON);
        assert_approx(ema[3], 12.0, DEFAULT_EPSILON);
        assert_approx(ema[4], 13.0, DEFAULT_EPSILON);
    }

    #[test]
    fn shorter_than_period_is_all_nan() {
        let ema = Ema::new(3).compute(&make_candles(&[10.0, 11.0]));
        assert!(ema.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn derived_series_warmup_is_skipped() {
        let ema = ema_of_series(&[f64::NAN, f64::NAN, 10.0, 11.0, 12.0, 13.0], 3);
        assert!(ema[..4].iter().all(|v| v.is_nan()));
        assert_approx(ema[4], 11.0, DEFAULT_EPSILON);
        assert_approx(ema[5], 12.0, DEFAULT_EPSILON);
    }

    #[test]
    fn nan_in_seed_window_blanks_everything() {
        let ema = ema_of_series(&[10.0, f64::NAN, 12.0, 13.0, 14.0], 3);
        assert!(ema.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn nan_after_seed_ends_the_series() {
        let ema = ema_of_series(&[10.0, 11.0, 12.0, f64::NAN, 14.0], 3);
        assert_approx(ema[2], 11.0, DEFAULT_EPSILON);
        assert!(ema[3..].iter().all(|v| v.is_nan()));
    }

    #[test]
    fn warmup_is_period() {
        assert_eq!(Ema::new(20).warmup(), 20);
    }
}
