//! Ehlers Fisher Transform.
//!
//! Over a rolling `period` window of median price (high+low)/2:
//! - raw[i]   = 2 * (price - window_low) / (window_high - window_low) - 1
//!   (a flat window reuses the previous raw value, starting from 0.0)
//! - value[i] = 0.33 * raw[i] + 0.67 * value[i-1], clamped to [-0.999, 0.999]
//! - fisher[i] = 0.5 * ln((1 + value) / (1 - value)) + 0.5 * fisher[i-1]
//! - signal[i] = fisher[i-1]
//!
//! First fisher value at index period-1, first signal value one bar later.

use super::rolling::{rolling_max, rolling_min};
use crate::domain::Candle;

const VALUE_CLAMP: f64 = 0.999;

/// Fisher line and its one-bar-lagged signal line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FisherOutput {
    pub fisher: Vec<f64>,
    pub signal: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct FisherTransform {
    period: usize,
    name: String,
}

impl FisherTransform {
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "fisher period must be positive");
        Self {
            period,
            name: format!("fisher_{period}"),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn warmup(&self) -> usize {
        self.period
    }

    pub fn compute(&self, candles: &[Candle]) -> FisherOutput {
        let n = candles.len();
        let mut fisher = vec![f64::NAN; n];
        let mut signal = vec![f64::NAN; n];

        if n < self.period {
            return FisherOutput { fisher, signal };
        }

        let prices: Vec<f64> = candles.iter().map(Candle::mid).collect();
        let highs = rolling_max(&prices, self.period);
        let lows = rolling_min(&prices, self.period);

        let mut prev_raw = 0.0;
        let mut prev_value = 0.0;
        let mut prev_fisher = 0.0;
        let mut seeded = false;

        for i in (self.period - 1)..n {
            let (hi, lo, price) = (highs[i], lows[i], prices[i]);
            if !(hi.is_finite() && lo.is_finite() && price.is_finite()) {
                continue;
            }

            let range = hi - lo;
            let raw = if range > 0.0 {
                2.0 * ((price - lo) / range) - 1.0
            } else {
                prev_raw
            };
            prev_raw = raw;

            let value = (0.33 * raw + 0.67 * prev_value).clamp(-VALUE_CLAMP, VALUE_CLAMP);
            prev_value = value;

            let f = 0.5 * ((1.0 + value) / (1.0 - value)).ln() + 0.5 * prev_fisher;
            if seeded {
                signal[i] = prev_fisher;
            }
            fisher[i] = f;
            prev_fisher = f;
            seeded = true;
        }

        FisherOutput { fisher, signal }
    }
}
