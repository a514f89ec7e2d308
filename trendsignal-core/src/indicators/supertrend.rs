//! Supertrend — ATR-based directional overlay.
//!
//! Inherently sequential: each bar's final bands depend on the previous bar's
//! committed bands and direction. Computed in a single chronological pass.
//!
//! basic_upper = mid + multiplier * ATR, basic_lower = mid - multiplier * ATR,
//! mid = (high + low) / 2.
//!
//! Ratchet:
//! - final_upper = basic_upper if basic_upper < prev_upper or prev_close > prev_upper,
//!   else prev_upper.
//! - final_lower = basic_lower if basic_lower > prev_lower or prev_close < prev_lower,
//!   else prev_lower.
//!
//! Direction flips Up -> Down when close < final_lower, Down -> Up when
//! close > final_upper. The first valid bar seeds both bands from the basic
//! bands and starts Up. Emitted value: final_lower while Up, final_upper while Down.

use serde::{Deserialize, Serialize};

use super::atr::{true_range, wilder_smooth};
use crate::domain::Candle;

/// Trend side reported by Supertrend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
}

/// Carried bar to bar within one computation.
#[derive(Debug, Clone, Copy, PartialEq)]
struct SupertrendState {
    final_upper_band: f64,
    final_lower_band: f64,
    direction: TrendDirection,
}

impl SupertrendState {
    fn seed(basic_upper: f64, basic_lower: f64) -> Self {
        Self {
            final_upper_band: basic_upper,
            final_lower_band: basic_lower,
            direction: TrendDirection::Up,
        }
    }

    fn advance(&self, basic_upper: f64, basic_lower: f64, prev_close: f64, close: f64) -> Self {
        let final_upper_band =
            if basic_upper < self.final_upper_band || prev_close > self.final_upper_band {
                basic_upper
            } else {
                self.final_upper_band
            };

        let final_lower_band =
            if basic_lower > self.final_lower_band || prev_close < self.final_lower_band {
                basic_lower
            } else {
                self.final_lower_band
            };

        let direction = match self.direction {
            TrendDirection::Up if close < final_lower_band => TrendDirection::Down,
            TrendDirection::Down if close > final_upper_band => TrendDirection::Up,
            d => d,
        };

        Self {
            final_upper_band,
            final_lower_band,
            direction,
        }
    }

    fn value(&self) -> f64 {
        match self.direction {
            TrendDirection::Up => self.final_lower_band,
            TrendDirection::Down => self.final_upper_band,
        }
    }
}

/// Per-bar Supertrend output. All vectors have one slot per candle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SupertrendOutput {
    pub value: Vec<f64>,
    pub direction: Vec<Option<TrendDirection>>,
    pub upper: Vec<f64>,
    pub lower: Vec<f64>,
}

impl SupertrendOutput {
    fn empty(n: usize) -> Self {
        Self {
            value: vec![f64::NAN; n],
            direction: vec![None; n],
            upper: vec![f64::NAN; n],
            lower: vec![f64::NAN; n],
        }
    }
}

#[derive(Debug, Clone)]
pub struct Supertrend {
    period: usize,
    multiplier: f64,
    name: String,
}

impl Supertrend {
    pub fn new(period: usize, multiplier: f64) -> Self {
        assert!(period > 0, "supertrend period must be positive");
        assert!(multiplier > 0.0, "Supertrend multiplier must be > 0");
        Self {
            period,
            multiplier,
            name: format!("supertrend_{period}_{multiplier}"),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn warmup(&self) -> usize {
        self.period
    }

    pub fn compute(&self, candles: &[Candle]) -> SupertrendOutput {
        let n = candles.len();
        let mut out = SupertrendOutput::empty(n);

        let atr = wilder_smooth(&true_range(candles), self.period);
        let start = match super::first_valid(&atr) {
            Some(idx) => idx,
            None => return out,
        };

        let bands = |i: usize| {
            let mid = candles[i].mid();
            (
                mid + self.multiplier * atr[i],
                mid - self.multiplier * atr[i],
            )
        };

        let (basic_upper, basic_lower) = bands(start);
        let mut state = SupertrendState::seed(basic_upper, basic_lower);
        write_slot(&mut out, start, &state);

        for i in (start + 1)..n {
            if atr[i].is_nan() || !candles[i].is_finite() {
                continue;
            }
            let (basic_upper, basic_lower) = bands(i);
            state = state.advance(basic_upper, basic_lower, candles[i - 1].close, candles[i].close);
            write_slot(&mut out, i, &state);
        }

        out
    }
}

fn write_slot(out: &mut SupertrendOutput, i: usize, state: &SupertrendState) {
    out.value[i] = state.value();
    out.direction[i] = Some(state.direction);
    out.upper[i] = state.final_upper_band;
    out.lower[i] = state.final_lower_band;
}
