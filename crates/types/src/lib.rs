//! Core types for the stock advisor pipeline.
//!
//! This crate provides all shared data types used across the analysis
//! pipeline: daily price bars, indicator identifiers, predictor and
//! scoring configuration, and the recommendation output types.

pub mod config;
pub mod indicators;
pub mod market_data;
pub mod recommendation;

// Re-export main types at crate root for convenience
pub use config::{PredictorConfig, RetrainPolicy, ScoringWeights, StalenessPolicy};
pub use indicators::{BollingerOutput, IndicatorType, MacdOutput};
pub use market_data::PriceBar;
pub use recommendation::{
    CategoryKind, ConfidenceLabel, Forecast, ForecastPoint, Recommendation, SignalCategory,
    Verdict,
};

// =============================================================================
// Symbol Type
// =============================================================================

/// Stock ticker symbol (e.g., "AAPL", "GOOGL").
pub type Symbol = String;
