//! Candle source boundary: the trait the trading loop pulls bars through, and
//! a CSV-backed implementation.
//!
//! The engine trusts its input to be sorted and sane, so this is where that
//! gets checked. CSV files carry a header row
//! `timestamp,open,high,low,close,volume` with millisecond timestamps.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::domain::Candle;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("row {row}: timestamp {timestamp} is not after previous {previous}")]
    Unsorted {
        row: usize,
        previous: i64,
        timestamp: i64,
    },

    #[error("row {row}: duplicate timestamp {timestamp}")]
    DuplicateTimestamp { row: usize, timestamp: i64 },

    #[error("row {row}: inconsistent OHLCV values at {timestamp}")]
    InvalidBar { row: usize, timestamp: i64 },
}

/// Supplies candles for a symbol, oldest first.
pub trait CandleSource: Send + Sync {
    /// Human-readable name of this source.
    fn name(&self) -> &str;

    /// At most `limit` of the most recent candles for `symbol`.
    fn fetch(&self, symbol: &str, limit: usize) -> Result<Vec<Candle>, DataError>;
}

/// Parse and validate candles from CSV text.
///
/// Rejects unsorted or duplicate timestamps and bars that fail
/// `Candle::is_sane`. Row numbers in errors are 1-based data rows.
pub fn read_candles<R: Read>(reader: R) -> Result<Vec<Candle>, DataError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut candles: Vec<Candle> = Vec::new();
    for (i, record) in rdr.deserialize::<Candle>().enumerate() {
        let candle = record?;
        let row = i + 1;
        if let Some(prev) = candles.last() {
            if candle.timestamp == prev.timestamp {
                return Err(DataError::DuplicateTimestamp {
                    row,
                    timestamp: candle.timestamp,
                });
            }
            if candle.timestamp < prev.timestamp {
                return Err(DataError::Unsorted {
                    row,
                    previous: prev.timestamp,
                    timestamp: candle.timestamp,
                });
            }
        }
        if !candle.is_sane() {
            return Err(DataError::InvalidBar {
                row,
                timestamp: candle.timestamp,
            });
        }
        candles.push(candle);
    }
    Ok(candles)
}

#[derive(Debug, Clone)]
enum Location {
    /// `<dir>/<SYMBOL>.csv`
    Dir(PathBuf),
    /// One file regardless of symbol.
    File(PathBuf),
}

/// Reads candles from CSV files on disk.
#[derive(Debug, Clone)]
pub struct CsvCandleSource {
    location: Location,
}

impl CsvCandleSource {
    /// One file per symbol, named `<SYMBOL>.csv`, under `dir`.
    pub fn from_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            location: Location::Dir(dir.into()),
        }
    }

    /// A single file served for every symbol.
    pub fn from_file(path: impl Into<PathBuf>) -> Self {
        Self {
            location: Location::File(path.into()),
        }
    }

    /// Directory if `path` is one, single file otherwise.
    pub fn open(path: &Path) -> Self {
        if path.is_dir() {
            Self::from_dir(path)
        } else {
            Self::from_file(path)
        }
    }

    pub fn path_for(&self, symbol: &str) -> PathBuf {
        match &self.location {
            Location::Dir(dir) => dir.join(format!("{symbol}.csv")),
            Location::File(path) => path.clone(),
        }
    }

    /// Every candle in the symbol's file.
    pub fn load_all(&self, symbol: &str) -> Result<Vec<Candle>, DataError> {
        let path = self.path_for(symbol);
        let file = File::open(&path).map_err(|source| DataError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let candles = read_candles(file)?;
        debug!(symbol, path = %path.display(), rows = candles.len(), "loaded candles");
        Ok(candles)
    }
}

impl CandleSource for CsvCandleSource {
    fn name(&self) -> &str {
        "csv"
    }

    fn fetch(&self, symbol: &str, limit: usize) -> Result<Vec<Candle>, DataError> {
        let mut candles = self.load_all(symbol)?;
        let skip = candles.len().saturating_sub(limit);
        candles.drain(..skip);
        Ok(candles)
    }
}
