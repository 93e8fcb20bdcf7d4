//! Technical indicators for market analysis.
//!
//! This module provides a trait-based interface for computing technical
//! indicators on daily price bar data. All indicators work on [`PriceBar`]
//! slices ordered oldest to newest and produce f64 values suitable for
//! statistical analysis.
//!
//! # Supported Indicators
//! - **SMA** - Simple Moving Average
//! - **EMA** - Exponential Moving Average
//! - **RSI** - Relative Strength Index
//! - **MACD** - Moving Average Convergence Divergence
//! - **Bollinger Bands** - Volatility bands around SMA
//! - **ROC** - Rate of Change
//! - **ATR** - Average True Range
//! - **Volume SMA** - Moving average of traded volume
//!
//! # Example
//! ```
//! use quant::indicators::{Indicator, Sma};
//! use types::PriceBar;
//!
//! let bars: Vec<PriceBar> = vec![/* ... */];
//! let sma = Sma::new(20);
//! if let Some(value) = sma.calculate(&bars) {
//!     println!("SMA(20) = {:.2}", value);
//! }
//! ```

use types::{IndicatorType, PriceBar};

// =============================================================================
// Indicator Modules
// =============================================================================

mod atr;
mod bollinger;
mod ema;
mod macd;
mod roc;
mod rsi;
mod sma;
mod volume;

// =============================================================================
// Re-exports
// =============================================================================

pub use atr::Atr;
pub use bollinger::BollingerBands;
pub use ema::Ema;
pub use macd::Macd;
pub use roc::Roc;
pub use rsi::Rsi;
pub use sma::Sma;
pub use volume::{VolumeLevel, VolumeSma, volume_ratio};

// =============================================================================
// Indicator Trait
// =============================================================================

/// Trait for technical indicators.
///
/// Indicators consume bar data and produce a single f64 value.
/// They declare their type (for snapshot keys) and minimum required
/// data periods.
pub trait Indicator: Send + Sync {
    /// The type of this indicator (for snapshot keys and identification).
    fn indicator_type(&self) -> IndicatorType;

    /// Calculate the indicator value from bar data.
    ///
    /// Returns `None` if there's insufficient data.
    /// Bars are expected to be ordered from oldest to newest.
    fn calculate(&self, bars: &[PriceBar]) -> Option<f64>;

    /// Minimum number of bars required for a valid calculation.
    fn required_periods(&self) -> usize;
}

// =============================================================================
// Factory Function
// =============================================================================

/// Create an indicator from its type specification.
///
/// MACD and Bollinger component types all map to their shared underlying
/// computation; `calculate` returns the primary component (MACD line,
/// middle band).
pub fn create_indicator(indicator_type: IndicatorType) -> Box<dyn Indicator> {
    match indicator_type {
        IndicatorType::Sma(p) => Box::new(Sma::new(p)),
        IndicatorType::Ema(p) => Box::new(Ema::new(p)),
        IndicatorType::Rsi(p) => Box::new(Rsi::new(p)),
        IndicatorType::Roc(p) => Box::new(Roc::new(p)),
        IndicatorType::Atr(p) => Box::new(Atr::new(p)),
        IndicatorType::VolumeSma(p) => Box::new(VolumeSma::new(p)),
        IndicatorType::MacdLine { fast, slow, signal }
        | IndicatorType::MacdSignal { fast, slow, signal }
        | IndicatorType::MacdHistogram { fast, slow, signal } => {
            Box::new(Macd::new(fast, slow, signal))
        }
        IndicatorType::BollingerUpper { period, std_dev_bp }
        | IndicatorType::BollingerMiddle { period, std_dev_bp }
        | IndicatorType::BollingerLower { period, std_dev_bp } => {
            Box::new(BollingerBands::new(period, std_dev_bp as f64 / 100.0))
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use time::{Date, Duration};

    /// Helper to create test bars with given close prices.
    fn make_bars(closes: &[f64]) -> Vec<PriceBar> {
        let start = Date::from_ordinal_date(2024, 1).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PriceBar {
                symbol: "TEST".to_string(),
                date: start + Duration::days(i as i64),
                open: close,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 1000.0,
            })
            .collect()
    }

    #[test]
    fn test_sma_calculation() {
        let bars = make_bars(&[10.0, 11.0, 12.0, 13.0, 14.0]);
        let sma = Sma::new(3);

        // SMA(3) of last 3 values: (12 + 13 + 14) / 3 = 13
        let result = sma.calculate(&bars);
        assert!((result.unwrap() - 13.0).abs() < 0.001);
    }

    #[test]
    fn test_sma_insufficient_data() {
        let bars = make_bars(&[10.0, 11.0]);
        let sma = Sma::new(5);
        assert!(sma.calculate(&bars).is_none());
    }

    #[test]
    fn test_ema_calculation() {
        let bars = make_bars(&[
            22.27, 22.19, 22.08, 22.17, 22.18, 22.13, 22.23, 22.43, 22.24, 22.29,
        ]);
        let ema = Ema::new(10);

        let result = ema.calculate(&bars);
        // EMA(10) with these values should be around 22.22
        assert!(result.is_some());
        assert!((result.unwrap() - 22.221).abs() < 0.01);
    }

    #[test]
    fn test_rsi_boundaries() {
        // Only gains: RSI should be 100
        let increasing = make_bars(&[
            1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0,
        ]);
        let rsi = Rsi::new(14);
        let result = rsi.calculate(&increasing);
        assert!((result.unwrap() - 100.0).abs() < 0.001);
    }

    #[test]
    fn test_rsi_flat_series_is_neutral() {
        // No gains and no losses: neutral 50, not the no-loss 100 branch
        let flat = make_bars(&[5.0; 20]);
        let rsi = Rsi::new(14);
        assert!((rsi.calculate(&flat).unwrap() - 50.0).abs() < 0.001);
    }

    #[test]
    fn test_macd_standard() {
        // Need at least 26 + 9 = 35 bars
        let prices: Vec<f64> = (0..40)
            .map(|i| 100.0 + (i as f64 * 0.5).sin() * 5.0)
            .collect();
        let bars = make_bars(&prices);
        let macd = Macd::standard();

        let output = macd.calculate_full(&bars).unwrap();
        // Histogram should be MACD - Signal
        assert!((output.histogram - (output.macd_line - output.signal_line)).abs() < 0.0001);
    }

    #[test]
    fn test_bollinger_bands() {
        let bars = make_bars(&[
            44.34, 44.09, 44.15, 43.61, 44.33, 44.83, 45.10, 45.42, 45.84, 46.08, 45.89, 46.03,
            45.61, 46.28, 46.28, 46.00, 46.03, 46.41, 46.22, 45.64,
        ]);
        let bb = BollingerBands::standard();

        let output = bb.calculate_full(&bars).unwrap();
        // Upper band should be > middle > lower
        assert!(output.upper > output.middle);
        assert!(output.middle > output.lower);
        // %B should be near [0, 1] for price within bands
        assert!(output.percent_b >= -0.5 && output.percent_b <= 1.5);
    }

    #[test]
    fn test_bollinger_collapse_on_flat_series() {
        let bars = make_bars(&[50.0; 25]);
        let output = BollingerBands::standard().calculate_full(&bars).unwrap();
        assert!((output.upper - output.lower).abs() < 1e-12);
        assert!((output.percent_b - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_roc_calculation() {
        // 10 bars ago close was 100, current is 110: ROC = +10%
        let mut prices = vec![100.0; 11];
        prices[10] = 110.0;
        let bars = make_bars(&prices);
        let roc = Roc::new(10);
        assert!((roc.calculate(&bars).unwrap() - 10.0).abs() < 0.001);
    }

    #[test]
    fn test_atr_calculation() {
        let prices: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        let bars = make_bars(&prices);

        let atr = Atr::new(14);
        let result = atr.calculate(&bars);
        // ATR should be positive with non-degenerate ranges
        assert!(result.unwrap() > 0.0);
    }

    #[test]
    fn test_volume_sma_and_ratio() {
        let mut bars = make_bars(&[10.0; 25]);
        for bar in bars.iter_mut() {
            bar.volume = 1000.0;
        }
        // Spike on the last day
        if let Some(last) = bars.last_mut() {
            last.volume = 2000.0;
        }

        let vsma = VolumeSma::new(20).calculate(&bars).unwrap();
        assert!((vsma - 1050.0).abs() < 0.001);

        let ratio = volume_ratio(&bars, 20).unwrap();
        assert!((ratio - 2000.0 / 1050.0).abs() < 0.001);
    }

    #[test]
    fn test_volume_level_classification() {
        assert_eq!(VolumeLevel::classify(2.0), VolumeLevel::High);
        assert_eq!(VolumeLevel::classify(1.0), VolumeLevel::Normal);
        assert_eq!(VolumeLevel::classify(1.5), VolumeLevel::Normal);
        assert_eq!(VolumeLevel::classify(0.3), VolumeLevel::Low);
        assert_eq!(VolumeLevel::classify_with(1.3, 1.2, 0.5), VolumeLevel::High);
    }

    #[test]
    fn test_indicator_factory() {
        let sma = create_indicator(IndicatorType::Sma(20));
        assert_eq!(sma.required_periods(), 20);

        let macd = create_indicator(IndicatorType::MACD_LINE_STANDARD);
        assert_eq!(macd.required_periods(), 35);

        let bb = create_indicator(IndicatorType::BOLLINGER_MIDDLE_STANDARD);
        assert_eq!(bb.required_periods(), 20);
    }
}
