//! Average True Range (ATR) indicator.

use super::Indicator;
use types::{IndicatorType, PriceBar};

/// Average True Range indicator.
///
/// Measures market volatility by decomposing the entire range of price movement.
/// True Range is max of: High-Low, |High-PrevClose|, |Low-PrevClose|
#[derive(Debug, Clone)]
pub struct Atr {
    period: usize,
}

impl Atr {
    /// Create a new ATR indicator with the given period.
    ///
    /// # Panics
    /// Panics if period is 0.
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "ATR period must be > 0");
        Self { period }
    }

    /// Calculate True Range for a bar given the previous close.
    fn true_range(bar: &PriceBar, prev_close: f64) -> f64 {
        let hl = bar.high - bar.low;
        let hpc = (bar.high - prev_close).abs();
        let lpc = (bar.low - prev_close).abs();

        hl.max(hpc).max(lpc)
    }
}

impl Indicator for Atr {
    fn indicator_type(&self) -> IndicatorType {
        IndicatorType::Atr(self.period)
    }

    fn calculate(&self, bars: &[PriceBar]) -> Option<f64> {
        // Need period + 1 bars for period true ranges
        if bars.len() < self.period + 1 {
            return None;
        }

        // Calculate true ranges
        let mut true_ranges: Vec<f64> = Vec::with_capacity(bars.len() - 1);
        for i in 1..bars.len() {
            let prev_close = bars[i - 1].close;
            true_ranges.push(Self::true_range(&bars[i], prev_close));
        }

        // Calculate initial ATR as simple average
        let initial_atr: f64 =
            true_ranges.iter().take(self.period).sum::<f64>() / self.period as f64;

        // Apply Wilder's smoothing (same as RSI)
        let atr = true_ranges
            .iter()
            .skip(self.period)
            .fold(initial_atr, |prev_atr, &tr| {
                (prev_atr * (self.period as f64 - 1.0) + tr) / self.period as f64
            });

        Some(atr)
    }

    fn required_periods(&self) -> usize {
        self.period + 1
    }
}
