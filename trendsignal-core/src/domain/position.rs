//! Per-symbol position state, owned by the caller and passed into the
//! signal generator by reference.
//!
//! One `SymbolContext` per traded symbol. Nothing here is global, so several
//! symbols can be evaluated concurrently without coordination.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::signal::{Signal, SignalKind};

/// Position held for one symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionState {
    #[default]
    Flat,
    Long,
    Short,
}

impl PositionState {
    /// Transition on an accepted signal.
    ///
    /// - Flat: Buy -> Long, Sell -> Short.
    /// - Long: Sell -> Short when reversal is allowed, else Flat.
    /// - Short: Buy -> Long when reversal is allowed, else Flat.
    /// - Hold and same-direction signals leave the state unchanged.
    pub fn apply(self, kind: SignalKind, allow_reversal: bool) -> Self {
        match (self, kind) {
            (_, SignalKind::Hold) => self,
            (Self::Flat, SignalKind::Buy) => Self::Long,
            (Self::Flat, SignalKind::Sell) => Self::Short,
            (Self::Long, SignalKind::Buy) | (Self::Short, SignalKind::Sell) => self,
            (Self::Long, SignalKind::Sell) => {
                if allow_reversal {
                    Self::Short
                } else {
                    Self::Flat
                }
            }
            (Self::Short, SignalKind::Buy) => {
                if allow_reversal {
                    Self::Long
                } else {
                    Self::Flat
                }
            }
        }
    }

    /// The signal kind that would add to this position rather than change it.
    pub fn same_direction(self) -> Option<SignalKind> {
        match self {
            Self::Flat => None,
            Self::Long => Some(SignalKind::Buy),
            Self::Short => Some(SignalKind::Sell),
        }
    }
}

impl fmt::Display for PositionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Flat => write!(f, "flat"),
            Self::Long => write!(f, "long"),
            Self::Short => write!(f, "short"),
        }
    }
}

/// Caller-held state for one symbol: position and the last actionable signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolContext {
    pub symbol: String,
    pub position: PositionState,
    pub last_signal: Option<SignalKind>,
}

impl SymbolContext {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            position: PositionState::Flat,
            last_signal: None,
        }
    }

    pub fn with_position(mut self, position: PositionState) -> Self {
        self.position = position;
        self
    }

    /// Apply an emitted signal. Returns the previous position.
    ///
    /// `Hold` signals are ignored.
    pub fn record(&mut self, signal: &Signal, allow_reversal: bool) -> PositionState {
        let previous = self.position;
        if signal.kind.is_actionable() {
            self.position = previous.apply(signal.kind, allow_reversal);
            self.last_signal = Some(signal.kind);
        }
        previous
    }
}
