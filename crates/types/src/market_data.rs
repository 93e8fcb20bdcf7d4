//! Market data types.
//!
//! Daily OHLCV bars are the sole input to the pipeline. Bars are expected
//! to be ordered from oldest to newest with strictly positive prices.

use serde::{Deserialize, Serialize};
use time::Date;

use crate::Symbol;

/// Daily OHLCV bar for a single trading day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    /// Stock symbol.
    pub symbol: Symbol,
    /// Trading day.
    pub date: Date,
    /// Opening price.
    pub open: f64,
    /// Highest price during the day.
    pub high: f64,
    /// Lowest price during the day.
    pub low: f64,
    /// Closing price.
    pub close: f64,
    /// Shares traded during the day.
    pub volume: f64,
}

impl PriceBar {
    /// Create a new bar.
    pub fn new(
        symbol: impl Into<Symbol>,
        date: Date,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            date,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Intraday range (high - low).
    #[inline]
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    /// Check if this is a bullish bar (close > open).
    #[inline]
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    /// Check if this is a bearish bar (close < open).
    #[inline]
    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }
}

/// Extract closing prices from a bar series.
pub fn closes(bars: &[PriceBar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}

/// Extract volumes from a bar series.
pub fn volumes(bars: &[PriceBar]) -> Vec<f64> {
    bars.iter().map(|b| b.volume).collect()
}
