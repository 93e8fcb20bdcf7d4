//! Bollinger Bands indicator.

use super::Indicator;
use types::{BollingerOutput, IndicatorType, PriceBar};

/// Bollinger Bands indicator.
///
/// Volatility bands placed above and below a moving average.
/// Default is 20-period SMA with 2 standard deviations.
#[derive(Debug, Clone)]
pub struct BollingerBands {
    period: usize,
    std_dev_multiplier: f64,
}

impl BollingerBands {
    /// Create new Bollinger Bands with custom parameters.
    ///
    /// # Arguments
    /// * `period` - SMA period for middle band
    /// * `std_dev_multiplier` - Number of standard deviations for bands (typically 2.0)
    ///
    /// # Panics
    /// Panics if period is 0.
    pub fn new(period: usize, std_dev_multiplier: f64) -> Self {
        assert!(period > 0, "Bollinger period must be > 0");
        Self {
            period,
            std_dev_multiplier,
        }
    }

    /// Create Bollinger Bands with standard (20, 2.0) configuration.
    pub fn standard() -> Self {
        Self::new(20, 2.0)
    }

    fn std_dev_bp(&self) -> u32 {
        (self.std_dev_multiplier * 100.0) as u32
    }

    /// Snapshot key for the upper band.
    pub fn upper_type(&self) -> IndicatorType {
        IndicatorType::BollingerUpper {
            period: self.period,
            std_dev_bp: self.std_dev_bp(),
        }
    }

    /// Snapshot key for the middle band.
    pub fn middle_type(&self) -> IndicatorType {
        IndicatorType::BollingerMiddle {
            period: self.period,
            std_dev_bp: self.std_dev_bp(),
        }
    }

    /// Snapshot key for the lower band.
    pub fn lower_type(&self) -> IndicatorType {
        IndicatorType::BollingerLower {
            period: self.period,
            std_dev_bp: self.std_dev_bp(),
        }
    }

    /// Calculate full Bollinger Bands output.
    pub fn calculate_full(&self, bars: &[PriceBar]) -> Option<BollingerOutput> {
        if bars.len() < self.period {
            return None;
        }
        let prices: Vec<f64> = bars.iter().map(|b| b.close).collect();
        self.calculate_full_from_prices(&prices)
    }

    /// Calculate full Bollinger Bands output from price data.
    ///
    /// The last price in the slice is treated as the current price for %B.
    pub fn calculate_full_from_prices(&self, prices: &[f64]) -> Option<BollingerOutput> {
        if prices.len() < self.period {
            return None;
        }

        let window: Vec<f64> = prices.iter().rev().take(self.period).copied().collect();

        let mean = window.iter().sum::<f64>() / self.period as f64;

        let variance = window.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / self.period as f64;
        let std_dev = variance.sqrt();

        let upper = mean + (std_dev * self.std_dev_multiplier);
        let lower = mean - (std_dev * self.std_dev_multiplier);
        let current_price = *prices.last()?;

        // Band width as percentage of middle band
        let bandwidth = if mean != 0.0 {
            (upper - lower) / mean * 100.0
        } else {
            0.0
        };

        // %B: where is price relative to bands (0 = lower, 1 = upper).
        // Collapsed bands (flat window) read as mid-band.
        let percent_b = if upper != lower {
            (current_price - lower) / (upper - lower)
        } else {
            0.5
        };

        Some(BollingerOutput {
            upper,
            middle: mean,
            lower,
            bandwidth,
            percent_b,
        })
    }
}

impl Indicator for BollingerBands {
    fn indicator_type(&self) -> IndicatorType {
        // Middle band is the primary component for trait consumers
        self.middle_type()
    }

    fn calculate(&self, bars: &[PriceBar]) -> Option<f64> {
        self.calculate_full(bars).map(|b| b.middle)
    }

    fn required_periods(&self) -> usize {
        self.period
    }
}
