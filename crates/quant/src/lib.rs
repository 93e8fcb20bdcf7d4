//! Quantitative analysis crate for the stock advisor.
//!
//! This crate provides technical indicators and statistical utilities
//! for daily OHLCV bar analysis.
//!
//! # Modules
//!
//! - [`indicators`] - Technical indicators (SMA, EMA, RSI, MACD, Bollinger, ROC, ATR, volume)
//! - [`engine`] - Per-bar indicator snapshot computation
//! - [`stats`] - Statistical utilities
//!
//! # Example
//!
//! ```
//! use quant::compute_indicators;
//! use types::{IndicatorType, PriceBar};
//!
//! let bars: Vec<PriceBar> = vec![/* ... */];
//! let snapshots = compute_indicators(&bars);
//! if let Some(last) = snapshots.last() {
//!     if let Some(rsi) = last.get(IndicatorType::Rsi(14)) {
//!         println!("RSI(14) = {rsi:.1}");
//!     }
//! }
//! ```
//!
//! # Design Notes
//!
//! - All indicator calculations use `f64` for statistical precision
//! - Snapshots are computed per bar from the prefix ending at that bar,
//!   so no value ever looks ahead of its own row
//! - Indicators are designed to be thread-safe (`Send + Sync`)

pub mod engine;
pub mod indicators;
pub mod stats;

// Re-export main types at crate root for convenience
pub use engine::{IndicatorEngine, IndicatorSnapshot, compute_indicators};
pub use indicators::{
    Atr, BollingerBands, Ema, Indicator, Macd, Roc, Rsi, Sma, VolumeLevel, VolumeSma,
    create_indicator, volume_ratio,
};
