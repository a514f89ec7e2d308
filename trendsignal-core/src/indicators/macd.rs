//! MACD — Moving Average Convergence Divergence.
//!
//! line = EMA(close, fast) - EMA(close, slow)
//! signal = EMA(line, signal_period)
//! histogram = line - signal
//!
//! The line is valid from index slow-1, signal and histogram from
//! slow + signal_period - 2.

use super::ema::ema_of_series;
use crate::domain::Candle;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MacdOutput {
    pub line: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct Macd {
    fast: usize,
    slow: usize,
    signal: usize,
    name: String,
}

impl Macd {
    pub fn new(fast: usize, slow: usize, signal: usize) -> Self {
        assert!(fast >= 1 && slow >= 1 && signal >= 1, "MACD periods must be >= 1");
        assert!(fast < slow, "MACD fast period must be < slow period");
        Self {
            fast,
            slow,
            signal,
            name: format!("macd_{fast}_{slow}_{signal}"),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Candles needed before the signal line and histogram are valid.
    pub fn warmup(&self) -> usize {
        self.slow + self.signal - 1
    }

    pub fn compute(&self, candles: &[Candle]) -> MacdOutput {
        let closes = super::closes(candles);
        let fast = ema_of_series(&closes, self.fast);
        let slow = ema_of_series(&closes, self.slow);

        let line: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
        let signal = ema_of_series(&line, self.signal);
        let histogram = line.iter().zip(&signal).map(|(l, s)| l - s).collect();

        MacdOutput {
            line,
            signal,
            histogram,
        }
    }
}
