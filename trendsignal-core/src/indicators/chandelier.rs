//! Chandelier Exit — ATR stop hung from the recent extreme.
//!
//! long  = highest_high(period) - multiplier * ATR(period)
//! short = lowest_low(period)  + multiplier * ATR(period)
//!
//! ATR is the Wilder ATR, so both lines are valid from index period-1.

use super::atr::{true_range, wilder_smooth};
use super::rolling::{rolling_max, rolling_min};
use crate::domain::Candle;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChandelierOutput {
    pub long: Vec<f64>,
    pub short: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct Chandelier {
    period: usize,
    multiplier: f64,
    name: String,
}

impl Chandelier {
    pub fn new(period: usize, multiplier: f64) -> Self {
        assert!(period > 0, "chandelier period must be positive");
        assert!(multiplier > 0.0, "chandelier multiplier must be positive");
        Self {
            period,
            multiplier,
            name: format!("chandelier_{period}_{multiplier}"),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn warmup(&self) -> usize {
        self.period
    }

    pub fn compute(&self, candles: &[Candle]) -> ChandelierOutput {
        let atr = wilder_smooth(&true_range(candles), self.period);
        let highs: Vec<f64> = candles.iter().map(|c| c.high).collect();
        let lows: Vec<f64> = candles.iter().map(|c| c.low).collect();
        let highest = rolling_max(&highs, self.period);
        let lowest = rolling_min(&lows, self.period);

        let long = highest
            .iter()
            .zip(&atr)
            .map(|(h, a)| h - self.multiplier * a)
            .collect();
        let short = lowest
            .iter()
            .zip(&atr)
            .map(|(l, a)| l + self.multiplier * a)
            .collect();

        ChandelierOutput { long, short }
    }
}
