//! Bollinger Bands — moving average +/- standard deviation multiplier.
//!
//! - Middle: SMA(close, period)
//! - Upper: middle + mult * stddev(close, period)
//! - Lower: middle - mult * stddev(close, period)
//!
//! Population stddev (divide by N). First valid value at index period-1.

use super::sma::sma_of_series;
use crate::domain::Candle;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BollingerOutput {
    pub upper: Vec<f64>,
    pub middle: Vec<f64>,
    pub lower: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct Bollinger {
    period: usize,
    multiplier: f64,
    name: String,
}

impl Bollinger {
    pub fn new(period: usize, multiplier: f64) -> Self {
        assert!(period > 0, "bollinger period must be positive");
        Self {
            period,
            multiplier,
            name: format!("bollinger_{period}_{multiplier}"),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn warmup(&self) -> usize {
        self.period
    }

    pub fn compute(&self, candles: &[Candle]) -> BollingerOutput {
        let closes = super::closes(candles);
        let middle = sma_of_series(&closes, self.period);
        let n = closes.len();
        let mut upper = vec![f64::NAN; n];
        let mut lower = vec![f64::NAN; n];

        for i in 0..n {
            let mean = middle[i];
            if mean.is_nan() {
                continue;
            }
            let window = &closes[(i + 1 - self.period)..=i];
            let variance = window
                .iter()
                .map(|c| {
                    let diff = c - mean;
                    diff * diff
                })
                .sum::<f64>()
                / self.period as f64;
            let stddev = variance.sqrt();
            upper[i] = mean + self.multiplier * stddev;
            lower[i] = mean - self.multiplier * stddev;
        }

        BollingerOutput {
            upper,
            middle,
            lower,
        }
    }
}
