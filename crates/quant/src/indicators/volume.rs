//! Volume-based indicators.

use super::Indicator;
use types::{IndicatorType, PriceBar};

/// Simple Moving Average of traded volume.
#[derive(Debug, Clone)]
pub struct VolumeSma {
    period: usize,
}

impl VolumeSma {
    /// Create a new volume SMA with the given period.
    ///
    /// # Panics
    /// Panics if period is 0.
    pub fn new(period: usize) -> Self {
        assert!(period > 0, "Volume SMA period must be > 0");
        Self { period }
    }
}

impl Indicator for VolumeSma {
    fn indicator_type(&self) -> IndicatorType {
        IndicatorType::VolumeSma(self.period)
    }

    fn calculate(&self, bars: &[PriceBar]) -> Option<f64> {
        if bars.len() < self.period {
            return None;
        }

        let sum: f64 = bars.iter().rev().take(self.period).map(|b| b.volume).sum();

        Some(sum / self.period as f64)
    }

    fn required_periods(&self) -> usize {
        self.period
    }
}

/// Ratio of the latest volume to its `period`-day average.
///
/// Returns `None` with insufficient data or a non-positive average.
pub fn volume_ratio(bars: &[PriceBar], period: usize) -> Option<f64> {
    let avg = VolumeSma::new(period).calculate(bars)?;
    if avg <= 0.0 {
        return None;
    }
    bars.last().map(|b| b.volume / avg)
}

/// Default multiple of average volume considered elevated.
pub const HIGH_VOLUME_RATIO: f64 = 1.5;

/// Default multiple of average volume considered anemic.
pub const LOW_VOLUME_RATIO: f64 = 0.5;

/// Classification of a volume ratio against its rolling average.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeLevel {
    /// Above the elevated threshold.
    High,
    /// Between the thresholds.
    Normal,
    /// Below the anemic threshold.
    Low,
}

impl VolumeLevel {
    /// Classify with the default 1.5x / 0.5x thresholds.
    pub fn classify(ratio: f64) -> Self {
        Self::classify_with(ratio, HIGH_VOLUME_RATIO, LOW_VOLUME_RATIO)
    }

    /// Classify with explicit thresholds.
    pub fn classify_with(ratio: f64, high: f64, low: f64) -> Self {
        if ratio > high {
            Self::High
        } else if ratio < low {
            Self::Low
        } else {
            Self::Normal
        }
    }
}
