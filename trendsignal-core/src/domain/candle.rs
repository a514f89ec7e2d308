//! Candle — one OHLCV bar as delivered by the candle source.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// OHLCV bar for a single symbol over one kline interval.
///
/// `timestamp` is the bar open time in milliseconds since the Unix epoch and
/// increases monotonically within a series. The engine never sorts or
/// deduplicates; the candle source owns that.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    pub fn new(timestamp: i64, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Returns true if every OHLCV field is a finite number.
    pub fn is_finite(&self) -> bool {
        self.open.is_finite()
            && self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite()
            && self.volume.is_finite()
    }

    /// `low <= min(open, close) <= max(open, close) <= high`, all fields
    /// finite and non-negative.
    pub fn is_sane(&self) -> bool {
        if !self.is_finite() {
            return false;
        }
        self.low >= 0.0
            && self.volume >= 0.0
            && self.low <= self.open.min(self.close)
            && self.open.max(self.close) <= self.high
    }

    /// Median price `(high + low) / 2`, the Supertrend and Fisher input.
    pub fn mid(&self) -> f64 {
        (self.high + self.low) / 2.0
    }

    /// Bar open time as a UTC datetime, `None` if the timestamp is out of range.
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.timestamp).single()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_candle() -> Candle {
        Candle::new(1_700_000_000_000, 100.0, 105.0, 98.0, 103.0, 1_250.5)
    }

    #[test]
    fn candle_is_sane() {
        assert!(sample_candle().is_sane());
    }

    #[test]
    fn candle_detects_non_finite() {
        let mut candle = sample_candle();
        candle.close = f64::NAN;
        assert!(!candle.is_finite());
        assert!(!candle.is_sane());

        let mut candle = sample_candle();
        candle.volume = f64::INFINITY;
        assert!(!candle.is_sane());
    }

    #[test]
    fn candle_detects_high_below_body() {
        let mut candle = sample_candle();
        candle.high = 102.0; // below close
        assert!(!candle.is_sane());
    }

    #[test]
    fn candle_detects_low_above_body() {
        let mut candle = sample_candle();
        candle.low = 101.0; // above open
        assert!(!candle.is_sane());
    }

    #[test]
    fn flat_candle_is_sane() {
        assert!(Candle::new(0, 100.0, 100.0, 100.0, 100.0, 0.0).is_sane());
    }

    #[test]
    fn mid_is_high_low_average() {
        assert_eq!(sample_candle().mid(), 101.5);
    }

    #[test]
    fn datetime_from_millis() {
        let dt = sample_candle().datetime().unwrap();
        assert_eq!(dt.timestamp_millis(), 1_700_000_000_000);
    }

    #[test]
    fn candle_serialization_roundtrip() {
        let candle = sample_candle();
        let json = serde_json::to_string(&candle).unwrap();
        let deser: Candle = serde_json::from_str(&json).unwrap();
        assert_eq!(candle, deser);
    }
}
