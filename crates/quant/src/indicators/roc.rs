//! Rate of Change (ROC) indicator.

use super::Indicator;
use types::{IndicatorType, PriceBar};

/// Rate of Change indicator.
///
/// Percentage change of the closing price versus the close `period`
/// bars ago: (close - close[-period]) / close[-period] * 100.
#[derive(Debug, Clone)]
pub struct Roc {
    period: usize,
}

impl Roc {
    /// Create a new ROC indicator with the given period.
    ///
    /// # Panics
    /// Panics if period is 0.
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "ROC period must be > 0");
        Self { period }
    }

    /// Calculate ROC from a slice of closing prices.
    pub fn calculate_from_prices(prices: &[f64], period: usize) -> Option<f64> {
        if prices.len() < period + 1 || period == 0 {
            return None;
        }

        let current = *prices.last()?;
        let past = prices[prices.len() - 1 - period];
        if past == 0.0 {
            return None;
        }

        Some((current - past) / past * 100.0)
    }
}

impl Indicator for Roc {
    fn indicator_type(&self) -> IndicatorType {
        IndicatorType::Roc(self.period)
    }

    fn calculate(&self, bars: &[PriceBar]) -> Option<f64> {
        if bars.len() < self.period + 1 {
            return None;
        }

        let prices: Vec<f64> = bars.iter().map(|b| b.close).collect();
        Self::calculate_from_prices(&prices, self.period)
    }

    fn required_periods(&self) -> usize {
        self.period + 1
    }
}
