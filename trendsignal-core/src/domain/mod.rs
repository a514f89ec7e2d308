//! Domain types: candles in, signals out, per-symbol position state.

pub mod candle;
pub mod position;
pub mod signal;

pub use candle::Candle;
pub use position::{PositionState, SymbolContext};
pub use signal::{Signal, SignalKind};
