//! Relative Strength Index (RSI).
//!
//! Bar-over-bar deltas split into gains and losses (bar 0 has no prior close
//! and contributes a zero delta), each Wilder-smoothed over `period`.
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss), and exactly 100 when
//! avg_loss == 0.
//!
//! Needs period+1 candles; below that the whole series is NaN. Otherwise the
//! first valid value sits at index period-1.

use super::atr::wilder_smooth;
use super::Indicator;
use crate::domain::Candle;

#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    name: String,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "rsi period must be positive");
        Self {
            period,
            name: format!("rsi_{period}"),
        }
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn warmup(&self) -> usize {
        self.period + 1
    }

    fn compute(&self, candles: &[Candle]) -> Vec<f64> {
        let n = candles.len();
        if n < self.warmup() {
            return vec![f64::NAN; n];
        }

        let mut gains = vec![0.0; n];
        let mut losses = vec![0.0; n];
        for i in 1..n {
            let change = candles[i].close - candles[i - 1].close;
            if change.is_nan() {
                gains[i] = f64::NAN;
                losses[i] = f64::NAN;
            } else if change > 0.0 {
                gains[i] = change;
            } else {
                losses[i] = -change;
            }
        }
        if candles[0].close.is_nan() {
            gains[0] = f64::NAN;
            losses[0] = f64::NAN;
        }

        let avg_gain = wilder_smooth(&gains, self.period);
        let avg_loss = wilder_smooth(&losses, self.period);

        avg_gain
            .iter()
            .zip(&avg_loss)
            .map(|(&g, &l)| compute_rsi(g, l))
            .collect()
    }
}

fn compute_rsi(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_gain.is_nan() || avg_loss.is_nan() {
        f64::NAN
    } else if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_candles};

    #[test]
    fn rsi_all_gains_is_exactly_100() {
        let candles = make_candles(&[100.0, 101.0, 102.0, 103.0, 104.0]);
        let result = Rsi::new(3).compute(&candles);
        assert!(result[0].is_nan());
        assert!(result[1].is_nan());
        for v in &result[2..] {
            assert_eq!(*v, 100.0);
        }
    }

    #[test]
    fn rsi_all_losses() {
        let candles = make_candles(&[105.0, 104.0, 103.0, 102.0, 101.0, 100.0]);
        let result = Rsi::new(3).compute(&candles);
        assert_approx(result[3], 0.0, 1e-9);
    }

    #[test]
    fn rsi_mixed_known_value() {
        // Changes: 0 (bar 0), +0.34, -0.25, -0.48, +0.72
        // Seed over bars 0..=2: gains = 0.34/3, losses = 0.25/3
        let candles = make_candles(&[44.0, 44.34, 44.09, 43.61, 44.33]);
        let result = Rsi::new(3).compute(&candles);

        let g = 0.34 / 3.0;
        let l = 0.25 / 3.0;
        assert_approx(result[2], 100.0 - 100.0 / (1.0 + g / l), 1e-9);

        let g3 = (2.0 / 3.0) * g;
        let l3 = 0.48 / 3.0 + (2.0 / 3.0) * l;
        assert_approx(result[3], 100.0 - 100.0 / (1.0 + g3 / l3), 1e-9);
    }

    #[test]
    fn rsi_bounds() {
        let candles = make_candles(&[100.0, 105.0, 98.0, 110.0, 95.0, 115.0, 90.0, 120.0]);
        let result = Rsi::new(3).compute(&candles);
        for (i, &v) in result.iter().enumerate() {
            if !v.is_nan() {
                assert!((0.0..=100.0).contains(&v), "RSI out of bounds at bar {i}: {v}");
            }
        }
    }

    #[test]
    fn rsi_needs_period_plus_one() {
        let candles = make_candles(&[100.0, 101.0, 102.0]);
        let result = Rsi::new(3).compute(&candles);
        assert!(result.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn rsi_nan_in_seed_is_all_nan() {
        let mut candles = make_candles(&[100.0, 101.0, 102.0, 103.0, 104.0]);
        candles[1].close = f64::NAN;
        let result = Rsi::new(3).compute(&candles);
        assert!(result.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn rsi_warmup() {
        assert_eq!(Rsi::new(14).warmup(), 15);
    }
}
