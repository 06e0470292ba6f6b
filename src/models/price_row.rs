use serde::{Deserialize, Serialize};

/// One dated OHLCV row of a price series
///
/// A row is identified by its position in the series, not by its date.
/// Dates are kept as the raw token from the source file and written back verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRow {
    /// Raw date token (not parsed or validated)
    pub date: String,

    /// Opening price
    pub open: f64,

    /// Highest price
    pub high: f64,

    /// Lowest price
    pub low: f64,

    /// Closing price, 0.0 when the source had no price for the day
    pub close: f64,

    /// Trading volume, never rewritten
    pub volume: u64,
}

impl PriceRow {
    /// Create a new price row
    pub fn new(date: impl Into<String>, open: f64, high: f64, low: f64, close: f64, volume: u64) -> Self {
        Self {
            date: date.into(),
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// True when the close is a zero/missing placeholder
    pub fn has_missing_close(&self) -> bool {
        self.close == 0.0
    }

    /// Same row with open/high/low/close multiplied by `factor`
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            date: self.date.clone(),
            open: self.open * factor,
            high: self.high * factor,
            low: self.low * factor,
            close: self.close * factor,
            volume: self.volume,
        }
    }

    /// Same row with open/high/low/close taken from `source`
    pub fn with_prices_from(&self, source: &PriceRow) -> Self {
        Self {
            date: self.date.clone(),
            open: source.open,
            high: source.high,
            low: source.low,
            close: source.close,
            volume: self.volume,
        }
    }
}
