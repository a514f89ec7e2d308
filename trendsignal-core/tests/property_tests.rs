//! Property tests for indicator and signal invariants.
//!
//! Uses proptest to verify:
//! 1. RSI bounds — every valid RSI value lies in [0, 100]
//! 2. Supertrend consistency — the emitted value is the band of the active direction
//! 3. Determinism — identical input gives bit-identical output
//! 4. Warm-up sentinel — short input is all sentinel, long input leads with period-1 sentinels
//! 5. Signal safety — fewer than two bars or a bad price never yields Buy/Sell

use proptest::prelude::*;
use trendsignal_core::indicators::{Atr, Indicator, Rsi, Supertrend, TrendDirection};
use trendsignal_core::{
    Candle, IndicatorConfig, IndicatorEngine, SignalConfig, SignalGenerator, SymbolContext,
};

// ── Strategies (proptest) ────────────────────────────────────────────

/// Random-walk candles around 1000 with a random intrabar range.
fn arb_candles(max_len: usize) -> impl Strategy<Value = Vec<Candle>> {
    prop::collection::vec((-20.0..20.0_f64, 0.0..5.0_f64), 1..max_len).prop_map(|steps| {
        let mut close = 1000.0;
        steps
            .into_iter()
            .enumerate()
            .map(|(i, (step, range))| {
                let open = close;
                close = (close + step).max(50.0);
                Candle::new(
                    1_700_000_000_000 + i as i64 * 60_000,
                    open,
                    open.max(close) + range,
                    open.min(close) - range,
                    close,
                    1_000.0,
                )
            })
            .collect()
    })
}

fn arb_unit() -> impl Strategy<Value = f64> {
    0.0..=1.0_f64
}

// ── 1. RSI bounds ────────────────────────────────────────────────────

proptest! {
    #[test]
    fn rsi_stays_within_bounds(candles in arb_candles(200), period in 1usize..30) {
        let rsi = Rsi::new(period).compute(&candles);
        prop_assert_eq!(rsi.len(), candles.len());
        for v in rsi.iter().filter(|v| !v.is_nan()) {
            prop_assert!((0.0..=100.0).contains(v), "rsi out of range: {}", v);
        }
    }
}

// ── 2. Supertrend direction consistency ──────────────────────────────

proptest! {
    #[test]
    fn supertrend_value_tracks_active_band(
        candles in arb_candles(200),
        period in 1usize..20,
        multiplier in 0.5..5.0_f64,
    ) {
        let out = Supertrend::new(period, multiplier).compute(&candles);
        for i in 0..candles.len() {
            match out.direction[i] {
                Some(TrendDirection::Up) => prop_assert_eq!(out.value[i], out.lower[i]),
                Some(TrendDirection::Down) => prop_assert_eq!(out.value[i], out.upper[i]),
                None => prop_assert!(out.value[i].is_nan()),
            }
        }
    }
}

// ── 3. Determinism ───────────────────────────────────────────────────

proptest! {
    #[test]
    fn engine_is_deterministic(candles in arb_candles(150)) {
        let engine = IndicatorEngine::new(IndicatorConfig::default()).unwrap();
        let a = engine.compute(&candles).unwrap();
        let b = engine.compute(&candles).unwrap();
        let bits = |v: &[f64]| v.iter().map(|x| x.to_bits()).collect::<Vec<_>>();

        prop_assert_eq!(bits(&a.rsi), bits(&b.rsi));
        prop_assert_eq!(bits(&a.supertrend_value), bits(&b.supertrend_value));
        prop_assert_eq!(bits(&a.fisher), bits(&b.fisher));
        prop_assert_eq!(bits(&a.macd_histogram), bits(&b.macd_histogram));
        prop_assert_eq!(bits(&a.bb_upper), bits(&b.bb_upper));
        prop_assert_eq!(bits(&a.chandelier_long), bits(&b.chandelier_long));
        prop_assert_eq!(a.supertrend_direction, b.supertrend_direction);
    }
}

// ── 4. Warm-up sentinel ──────────────────────────────────────────────

proptest! {
    #[test]
    fn atr_warmup_is_strict(candles in arb_candles(60), period in 1usize..40) {
        let atr = Atr::new(period).compute(&candles);
        if candles.len() < period {
            prop_assert!(atr.iter().all(|v| v.is_nan()));
        } else {
            prop_assert!(atr[..period - 1].iter().all(|v| v.is_nan()));
            prop_assert!(atr[period - 1..].iter().all(|v| v.is_finite()));
        }
    }

    #[test]
    fn rsi_warmup_is_strict(candles in arb_candles(60), period in 1usize..40) {
        let rsi = Rsi::new(period).compute(&candles);
        if candles.len() < period + 1 {
            prop_assert!(rsi.iter().all(|v| v.is_nan()));
        } else {
            prop_assert!(rsi[..period - 1].iter().all(|v| v.is_nan()));
            prop_assert!(rsi[period - 1..].iter().all(|v| v.is_finite()));
        }
    }
}

// ── 5. Signal safety ─────────────────────────────────────────────────

proptest! {
    #[test]
    fn under_two_bars_is_always_hold(
        candles in arb_candles(2),
        strength in arb_unit(),
        confidence in arb_unit(),
    ) {
        let engine = IndicatorEngine::new(IndicatorConfig::default()).unwrap();
        let generator = SignalGenerator::new(SignalConfig {
            min_signal_strength: strength,
            min_signal_confidence: confidence,
            min_confirmations: 0,
            ..SignalConfig::default()
        })
        .unwrap();

        let series = engine.compute(&candles).unwrap();
        let sig = generator.generate(&series, &candles, &SymbolContext::new("X"));
        prop_assert!(sig.is_hold());
    }

    #[test]
    fn bad_last_price_is_never_actionable(
        candles in arb_candles(120),
        bad in prop::sample::select(vec![f64::NAN, f64::INFINITY, -1.0, 0.0]),
    ) {
        let mut candles = candles;
        if let Some(last) = candles.last_mut() {
            last.close = bad;
        }
        let engine = IndicatorEngine::new(IndicatorConfig::default()).unwrap();
        let generator = SignalGenerator::new(SignalConfig {
            min_signal_strength: 0.0,
            min_signal_confidence: 0.0,
            min_confirmations: 0,
            ..SignalConfig::default()
        })
        .unwrap();

        let series = engine.compute(&candles).unwrap();
        let sig = generator.generate(&series, &candles, &SymbolContext::new("X"));
        prop_assert!(sig.is_hold());
    }

    #[test]
    fn accepted_signals_have_unit_scores(candles in arb_candles(200)) {
        let engine = IndicatorEngine::new(IndicatorConfig::default()).unwrap();
        let generator = SignalGenerator::new(SignalConfig {
            min_signal_strength: 0.0,
            min_signal_confidence: 0.0,
            min_confirmations: 0,
            ..SignalConfig::default()
        })
        .unwrap();

        let series = engine.compute(&candles).unwrap();
        let sig = generator.generate(&series, &candles, &SymbolContext::new("X"));
        prop_assert!((0.0..=1.0).contains(&sig.strength));
        prop_assert!((0.0..=1.0).contains(&sig.confidence));
        if sig.kind.is_actionable() {
            prop_assert!(sig.reasons[0].contains("crossed"));
        }
    }
}
