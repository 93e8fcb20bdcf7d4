//! Technical indicator types.
//!
//! This module defines the identifiers used for technical analysis
//! indicators including moving averages, RSI, MACD, Bollinger Bands,
//! ATR, ROC, and volume averages. Multi-output indicators (MACD,
//! Bollinger) get one identifier per component so each component can
//! be stored and looked up independently in a snapshot.

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Indicator Type Enum
// =============================================================================

/// Type of technical indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndicatorType {
    /// Simple Moving Average with period.
    Sma(usize),
    /// Exponential Moving Average with period.
    Ema(usize),
    /// Relative Strength Index with period.
    Rsi(usize),
    /// Rate of Change with period (percentage).
    Roc(usize),
    /// Average True Range with period.
    Atr(usize),
    /// Simple Moving Average of volume with period.
    VolumeSma(usize),
    /// MACD line (fast EMA - slow EMA).
    MacdLine {
        fast: usize,
        slow: usize,
        signal: usize,
    },
    /// MACD signal line (EMA of MACD line).
    MacdSignal {
        fast: usize,
        slow: usize,
        signal: usize,
    },
    /// MACD histogram (line - signal).
    MacdHistogram {
        fast: usize,
        slow: usize,
        signal: usize,
    },
    /// Upper Bollinger band.
    BollingerUpper {
        period: usize,
        /// Standard deviation multiplier * 100 (e.g., 200 = 2.0 std devs).
        std_dev_bp: u32,
    },
    /// Middle Bollinger band (SMA).
    BollingerMiddle { period: usize, std_dev_bp: u32 },
    /// Lower Bollinger band.
    BollingerLower { period: usize, std_dev_bp: u32 },
}

impl IndicatorType {
    /// Standard MACD line (12, 26, 9).
    pub const MACD_LINE_STANDARD: Self = Self::MacdLine {
        fast: 12,
        slow: 26,
        signal: 9,
    };

    /// Standard MACD signal line (12, 26, 9).
    pub const MACD_SIGNAL_STANDARD: Self = Self::MacdSignal {
        fast: 12,
        slow: 26,
        signal: 9,
    };

    /// Standard MACD histogram (12, 26, 9).
    pub const MACD_HISTOGRAM_STANDARD: Self = Self::MacdHistogram {
        fast: 12,
        slow: 26,
        signal: 9,
    };

    /// Standard upper Bollinger band (20 period, 2 std devs).
    pub const BOLLINGER_UPPER_STANDARD: Self = Self::BollingerUpper {
        period: 20,
        std_dev_bp: 200,
    };

    /// Standard middle Bollinger band (20 period, 2 std devs).
    pub const BOLLINGER_MIDDLE_STANDARD: Self = Self::BollingerMiddle {
        period: 20,
        std_dev_bp: 200,
    };

    /// Standard lower Bollinger band (20 period, 2 std devs).
    pub const BOLLINGER_LOWER_STANDARD: Self = Self::BollingerLower {
        period: 20,
        std_dev_bp: 200,
    };

    /// Get the number of bars required for this indicator to produce valid output.
    pub fn required_periods(&self) -> usize {
        match self {
            Self::Sma(p) | Self::Ema(p) | Self::VolumeSma(p) => *p,
            Self::Rsi(p) | Self::Roc(p) | Self::Atr(p) => p + 1,
            Self::MacdLine { slow, signal, .. }
            | Self::MacdSignal { slow, signal, .. }
            | Self::MacdHistogram { slow, signal, .. } => slow + signal,
            Self::BollingerUpper { period, .. }
            | Self::BollingerMiddle { period, .. }
            | Self::BollingerLower { period, .. } => *period,
        }
    }
}

impl fmt::Display for IndicatorType {
    /// Wire name used in serialized snapshots and feature schemas
    /// (e.g., `sma_20`, `rsi_14`, `macd_signal`, `bb_upper`).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sma(p) => write!(f, "sma_{p}"),
            Self::Ema(p) => write!(f, "ema_{p}"),
            Self::Rsi(p) => write!(f, "rsi_{p}"),
            Self::Roc(p) => write!(f, "roc_{p}"),
            Self::Atr(p) => write!(f, "atr_{p}"),
            Self::VolumeSma(p) => write!(f, "volume_sma_{p}"),
            Self::MacdLine { .. } => write!(f, "macd"),
            Self::MacdSignal { .. } => write!(f, "macd_signal"),
            Self::MacdHistogram { .. } => write!(f, "macd_histogram"),
            Self::BollingerUpper { .. } => write!(f, "bb_upper"),
            Self::BollingerMiddle { .. } => write!(f, "bb_middle"),
            Self::BollingerLower { .. } => write!(f, "bb_lower"),
        }
    }
}

// =============================================================================
// MACD Output
// =============================================================================

/// MACD output values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct MacdOutput {
    /// MACD line (fast EMA - slow EMA).
    pub macd_line: f64,
    /// Signal line (EMA of MACD line).
    pub signal_line: f64,
    /// Histogram (MACD - Signal).
    pub histogram: f64,
}

// =============================================================================
// Bollinger Bands Output
// =============================================================================

/// Bollinger Bands output values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct BollingerOutput {
    /// Upper band.
    pub upper: f64,
    /// Middle band (SMA).
    pub middle: f64,
    /// Lower band.
    pub lower: f64,
    /// Band width as percentage of middle.
    pub bandwidth: f64,
    /// %B: where price is relative to bands (0 = lower, 1 = upper).
    pub percent_b: f64,
}
