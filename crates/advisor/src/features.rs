//! Feature engineering: turning bar series and indicator snapshots
//! into supervised training matrices.
//!
//! Every feature row is built strictly from data at or before its own
//! bar; the label is the close `label_horizon` days later. Rows where
//! any indicator is still warming up are dropped rather than imputed,
//! so the matrix starts at the first bar where the slowest indicator
//! (SMA 50) is defined.
//!
//! The column layout is versioned: a model trained on one schema
//! version refuses feature vectors from another.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use time::Date;
use types::{IndicatorType, PriceBar};

use quant::IndicatorSnapshot;

use crate::error::{AdvisorError, Result};

// =============================================================================
// Schema
// =============================================================================

/// Version of the feature column layout below.
pub const FEATURE_SCHEMA_VERSION: u16 = 1;

/// Minimum bars needed before any feature row exists (SMA 50 warmup).
pub const MIN_BARS: usize = 50;

/// Feature column names, in column order.
pub const FEATURE_NAMES: [&str; 33] = [
    "open",
    "high",
    "low",
    "volume",
    "sma_20",
    "sma_50",
    "ema_12",
    "ema_26",
    "rsi_14",
    "macd",
    "macd_signal",
    "macd_histogram",
    "bb_upper",
    "bb_middle",
    "bb_lower",
    "roc_10",
    "atr_14",
    "price_range",
    "price_change",
    "close_lag_1",
    "close_lag_2",
    "close_lag_3",
    "close_lag_4",
    "close_lag_5",
    "volume_lag_1",
    "volume_lag_2",
    "volume_lag_3",
    "volume_lag_4",
    "volume_lag_5",
    "close_sma20_ratio",
    "close_sma50_ratio",
    "bb_position",
    "volume_ratio_20",
];

/// Column indices into a feature vector.
///
/// Must stay in sync with [`FEATURE_NAMES`]; bump
/// [`FEATURE_SCHEMA_VERSION`] when either changes.
pub mod fidx {
    pub const OPEN: usize = 0;
    pub const HIGH: usize = 1;
    pub const LOW: usize = 2;
    pub const VOLUME: usize = 3;
    pub const SMA_20: usize = 4;
    pub const SMA_50: usize = 5;
    pub const EMA_12: usize = 6;
    pub const EMA_26: usize = 7;
    pub const RSI_14: usize = 8;
    pub const MACD: usize = 9;
    pub const MACD_SIGNAL: usize = 10;
    pub const MACD_HISTOGRAM: usize = 11;
    pub const BB_UPPER: usize = 12;
    pub const BB_MIDDLE: usize = 13;
    pub const BB_LOWER: usize = 14;
    pub const ROC_10: usize = 15;
    pub const ATR_14: usize = 16;
    pub const PRICE_RANGE: usize = 17;
    pub const PRICE_CHANGE: usize = 18;
    pub const CLOSE_LAG_1: usize = 19;
    pub const CLOSE_LAG_5: usize = 23;
    pub const VOLUME_LAG_1: usize = 24;
    pub const VOLUME_LAG_5: usize = 28;
    pub const CLOSE_SMA20_RATIO: usize = 29;
    pub const CLOSE_SMA50_RATIO: usize = 30;
    pub const BB_POSITION: usize = 31;
    pub const VOLUME_RATIO_20: usize = 32;
}

/// Number of lagged closes / volumes carried as features.
pub const LAG_DAYS: usize = 5;

/// A single feature row. Sized so rows stay on the stack.
pub type FeatureVec = SmallVec<[f64; 40]>;

/// Identifies a feature column layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSchema {
    /// Layout version.
    pub version: u16,
    /// Number of columns.
    pub n_features: usize,
}

impl FeatureSchema {
    /// The schema produced by this build of the crate.
    pub fn current() -> Self {
        Self {
            version: FEATURE_SCHEMA_VERSION,
            n_features: FEATURE_NAMES.len(),
        }
    }

    /// Check that another schema is identical to this one.
    pub fn check_compatible(&self, other: &FeatureSchema) -> Result<()> {
        if self != other {
            return Err(AdvisorError::SchemaMismatch {
                expected_version: self.version,
                expected_len: self.n_features,
                actual_version: other.version,
                actual_len: other.n_features,
            });
        }
        Ok(())
    }

    /// Check that a raw vector has this schema's width.
    pub fn check_vector(&self, v: &[f64]) -> Result<()> {
        if v.len() != self.n_features {
            return Err(AdvisorError::SchemaMismatch {
                expected_version: self.version,
                expected_len: self.n_features,
                actual_version: self.version,
                actual_len: v.len(),
            });
        }
        Ok(())
    }
}

impl Default for FeatureSchema {
    fn default() -> Self {
        Self::current()
    }
}

// =============================================================================
// Feature Set
// =============================================================================

/// Everything the predictor needs: training matrix, labels, and the
/// inference row for the most recent bar.
#[derive(Debug, Clone)]
pub struct FeatureSet {
    /// Training rows, chronological.
    pub matrix: Vec<FeatureVec>,
    /// Label per row: close `label_horizon` days after the row's bar.
    pub labels: Vec<f64>,
    /// Feature row for the latest bar (no label yet).
    pub inference: FeatureVec,
    /// Column layout of all rows.
    pub schema: FeatureSchema,
    /// Full close series, for forecast feedback.
    pub closes: Vec<f64>,
    /// First bar date in the series.
    pub data_start: Date,
    /// Last bar date in the series.
    pub data_end: Date,
}

// =============================================================================
// Feature Builder
// =============================================================================

/// Builds [`FeatureSet`]s from bar series and their indicator snapshots.
#[derive(Debug, Clone)]
pub struct FeatureBuilder {
    label_horizon: usize,
}

impl FeatureBuilder {
    /// Create a builder labeling each row with the close `label_horizon`
    /// days ahead.
    ///
    /// # Panics
    /// Panics if label_horizon is 0.
    pub fn new(label_horizon: usize) -> Self {
        assert!(label_horizon > 0, "label horizon must be > 0");
        Self { label_horizon }
    }

    /// Build the feature set for a series.
    ///
    /// `snapshots` must be the per-bar snapshots of `series`, as produced
    /// by [`quant::compute_indicators`].
    pub fn build(&self, series: &[PriceBar], snapshots: &[IndicatorSnapshot]) -> Result<FeatureSet> {
        assert_eq!(
            series.len(),
            snapshots.len(),
            "one snapshot per bar required"
        );

        let n = series.len();
        if n < MIN_BARS {
            return Err(AdvisorError::InsufficientData {
                required: MIN_BARS,
                actual: n,
            });
        }

        let mut matrix = Vec::new();
        let mut labels = Vec::new();
        for i in 0..n - self.label_horizon {
            if let Some(row) = build_row(series, snapshots, i) {
                matrix.push(row);
                labels.push(series[i + self.label_horizon].close);
            }
        }

        let inference = build_row(series, snapshots, n - 1).ok_or(
            AdvisorError::InsufficientData {
                required: MIN_BARS,
                actual: n,
            },
        )?;

        Ok(FeatureSet {
            matrix,
            labels,
            inference,
            schema: FeatureSchema::current(),
            closes: types::market_data::closes(series),
            data_start: series[0].date,
            data_end: series[n - 1].date,
        })
    }
}

/// Build the feature row for bar `i`, or `None` while indicators warm up.
fn build_row(
    series: &[PriceBar],
    snapshots: &[IndicatorSnapshot],
    i: usize,
) -> Option<FeatureVec> {
    if i < LAG_DAYS {
        return None;
    }

    let bar = &series[i];
    let snap = &snapshots[i];

    let sma_20 = snap.get(IndicatorType::Sma(20))?;
    let sma_50 = snap.get(IndicatorType::Sma(50))?;
    let ema_12 = snap.get(IndicatorType::Ema(12))?;
    let ema_26 = snap.get(IndicatorType::Ema(26))?;
    let rsi_14 = snap.get(IndicatorType::Rsi(14))?;
    let macd = snap.get(IndicatorType::MACD_LINE_STANDARD)?;
    let macd_signal = snap.get(IndicatorType::MACD_SIGNAL_STANDARD)?;
    let macd_histogram = snap.get(IndicatorType::MACD_HISTOGRAM_STANDARD)?;
    let bb_upper = snap.get(IndicatorType::BOLLINGER_UPPER_STANDARD)?;
    let bb_middle = snap.get(IndicatorType::BOLLINGER_MIDDLE_STANDARD)?;
    let bb_lower = snap.get(IndicatorType::BOLLINGER_LOWER_STANDARD)?;
    let roc_10 = snap.get(IndicatorType::Roc(10))?;
    let atr_14 = snap.get(IndicatorType::Atr(14))?;
    let volume_sma_20 = snap.get(IndicatorType::VolumeSma(20))?;

    let price_change = if bar.open != 0.0 {
        (bar.close - bar.open) / bar.open
    } else {
        0.0
    };

    // Collapsed bands (flat window) read as mid-band
    let bb_position = if bb_upper > bb_lower {
        ((bar.close - bb_lower) / (bb_upper - bb_lower)).clamp(0.0, 1.0)
    } else {
        0.5
    };

    let volume_ratio = if volume_sma_20 > 0.0 {
        bar.volume / volume_sma_20
    } else {
        1.0
    };

    if sma_20 == 0.0 || sma_50 == 0.0 {
        return None;
    }

    let mut row = FeatureVec::new();
    row.push(bar.open);
    row.push(bar.high);
    row.push(bar.low);
    row.push(bar.volume);
    row.push(sma_20);
    row.push(sma_50);
    row.push(ema_12);
    row.push(ema_26);
    row.push(rsi_14);
    row.push(macd);
    row.push(macd_signal);
    row.push(macd_histogram);
    row.push(bb_upper);
    row.push(bb_middle);
    row.push(bb_lower);
    row.push(roc_10);
    row.push(atr_14);
    row.push(bar.range());
    row.push(price_change);
    for lag in 1..=LAG_DAYS {
        row.push(series[i - lag].close);
    }
    for lag in 1..=LAG_DAYS {
        row.push(series[i - lag].volume);
    }
    row.push(bar.close / sma_20);
    row.push(bar.close / sma_50);
    row.push(bb_position);
    row.push(volume_ratio);

    debug_assert_eq!(row.len(), FEATURE_NAMES.len());
    Some(row)
}

// =============================================================================
// Tests
// =============================================================================
