//! Indicator engine: per-bar snapshot computation.
//!
//! The engine owns a set of registered indicators and evaluates all of
//! them for every bar of a series. Each bar's snapshot is computed from
//! the slice prefix ending at that bar, so a snapshot never sees data
//! newer than its own row. Multi-output indicators (MACD, Bollinger)
//! are computed once per bar and stored as separate component entries.

use std::collections::HashMap;

use types::{IndicatorType, PriceBar};

use crate::indicators::{
    Atr, BollingerBands, Ema, Indicator, Macd, Roc, Rsi, Sma, VolumeSma,
};

// =============================================================================
// Indicator Snapshot
// =============================================================================

/// All indicator values computed for a single bar.
///
/// Indicators without enough history at that bar are simply absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndicatorSnapshot {
    values: HashMap<IndicatorType, f64>,
}

impl IndicatorSnapshot {
    /// Create an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a computed value.
    pub fn insert(&mut self, indicator: IndicatorType, value: f64) {
        self.values.insert(indicator, value);
    }

    /// Look up a computed value.
    pub fn get(&self, indicator: IndicatorType) -> Option<f64> {
        self.values.get(&indicator).copied()
    }

    /// Check whether an indicator produced a value at this bar.
    pub fn is_defined(&self, indicator: IndicatorType) -> bool {
        self.values.contains_key(&indicator)
    }

    /// Number of defined values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over (indicator, value) pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (IndicatorType, f64)> + '_ {
        self.values.iter().map(|(k, v)| (*k, *v))
    }
}

// =============================================================================
// Indicator Engine
// =============================================================================

/// Engine that computes registered indicators over a bar series.
pub struct IndicatorEngine {
    simple: Vec<Box<dyn Indicator>>,
    macd: Macd,
    bollinger: BollingerBands,
}

impl IndicatorEngine {
    /// Create an engine with the default indicator set:
    /// SMA(20/50/200), EMA(12/26), RSI(14), ROC(10), ATR(14),
    /// volume SMA(20), MACD(12,26,9), Bollinger(20, 2.0).
    pub fn with_default_indicators() -> Self {
        let simple: Vec<Box<dyn Indicator>> = vec![
            Box::new(Sma::new(20)),
            Box::new(Sma::new(50)),
            Box::new(Sma::new(200)),
            Box::new(Ema::new(12)),
            Box::new(Ema::new(26)),
            Box::new(Rsi::new(14)),
            Box::new(Roc::new(10)),
            Box::new(Atr::new(14)),
            Box::new(VolumeSma::new(20)),
        ];
        Self {
            simple,
            macd: Macd::standard(),
            bollinger: BollingerBands::standard(),
        }
    }

    /// Register an additional single-output indicator.
    pub fn register(&mut self, indicator: Box<dyn Indicator>) {
        self.simple.push(indicator);
    }

    /// Compute a snapshot for the bar at the end of `bars`.
    ///
    /// `bars` is the prefix of the series up to and including that bar.
    pub fn compute_row(&self, bars: &[PriceBar]) -> IndicatorSnapshot {
        let mut snapshot = IndicatorSnapshot::new();

        for indicator in &self.simple {
            if let Some(value) = indicator.calculate(bars) {
                snapshot.insert(indicator.indicator_type(), value);
            }
        }

        // MACD components: compute once, store all three
        if let Some(output) = self.macd.calculate_full(bars) {
            snapshot.insert(self.macd.line_type(), output.macd_line);
            snapshot.insert(self.macd.signal_type(), output.signal_line);
            snapshot.insert(self.macd.histogram_type(), output.histogram);
        }

        // Bollinger components: compute once, store all three
        if let Some(output) = self.bollinger.calculate_full(bars) {
            snapshot.insert(self.bollinger.upper_type(), output.upper);
            snapshot.insert(self.bollinger.middle_type(), output.middle);
            snapshot.insert(self.bollinger.lower_type(), output.lower);
        }

        snapshot
    }

    /// Compute one snapshot per bar of the series.
    ///
    /// Snapshot `i` is computed from `series[..=i]` only.
    pub fn compute_snapshots(&self, series: &[PriceBar]) -> Vec<IndicatorSnapshot> {
        (0..series.len())
            .map(|i| self.compute_row(&series[..=i]))
            .collect()
    }
}

/// Compute all standard indicators for every bar of a series.
///
/// Convenience wrapper around [`IndicatorEngine::with_default_indicators`].
pub fn compute_indicators(series: &[PriceBar]) -> Vec<IndicatorSnapshot> {
    IndicatorEngine::with_default_indicators().compute_snapshots(series)
}

// =============================================================================
// Tests
// =============================================================================
