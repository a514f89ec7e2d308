//! Signal — the decision artifact handed to the execution layer.

use serde::{Deserialize, Serialize};
use std::fmt;

/// What the execution layer should do with this symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalKind {
    Buy,
    Sell,
    Hold,
}

impl SignalKind {
    pub fn is_actionable(self) -> bool {
        !matches!(self, Self::Hold)
    }
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
            Self::Hold => write!(f, "HOLD"),
        }
    }
}

/// One evaluation result for one symbol.
///
/// Immutable once emitted. `reasons` is ordered: the crossover first, then each
/// confirming predicate in evaluation order. A `Hold` carries the reason it was
/// not actionable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub kind: SignalKind,
    /// 0.0 to 1.0. Always 0.0 for `Hold`.
    pub strength: f64,
    /// 0.0 to 1.0. Always 0.0 for `Hold`.
    pub confidence: f64,
    pub reasons: Vec<String>,
    pub symbol: String,
    pub price_at_signal: f64,
    /// Millisecond timestamp of the bar the signal was evaluated on.
    pub timestamp: i64,
}

impl Signal {
    pub fn hold(
        symbol: impl Into<String>,
        price_at_signal: f64,
        timestamp: i64,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            kind: SignalKind::Hold,
            strength: 0.0,
            confidence: 0.0,
            reasons: vec![reason.into()],
            symbol: symbol.into(),
            price_at_signal,
            timestamp,
        }
    }

    pub fn is_hold(&self) -> bool {
        self.kind == SignalKind::Hold
    }

    /// True if any reason contains `needle`.
    pub fn has_reason(&self, needle: &str) -> bool {
        self.reasons.iter().any(|r| r.contains(needle))
    }
}
