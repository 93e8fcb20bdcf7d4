//! Recommendation and forecast output types.
//!
//! These are the serializable end products of the pipeline: a multi-day
//! price forecast and a weighted multi-factor recommendation.

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// Verdict
// =============================================================================

/// Final recommendation verdict derived from the composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    StrongBuy,
    Buy,
    Hold,
    Sell,
    StrongSell,
}

impl Verdict {
    /// Display label used in summaries and API responses.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::StrongBuy => "STRONG BUY",
            Self::Buy => "BUY",
            Self::Hold => "HOLD",
            Self::Sell => "SELL",
            Self::StrongSell => "STRONG SELL",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Qualitative confidence attached to a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConfidenceLabel {
    High,
    Medium,
    Low,
}

impl fmt::Display for ConfidenceLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::High => write!(f, "High"),
            Self::Medium => write!(f, "Medium"),
            Self::Low => write!(f, "Low"),
        }
    }
}

// =============================================================================
// Signal Categories
// =============================================================================

/// The four factor categories feeding the composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CategoryKind {
    Technical,
    Prediction,
    Trend,
    Volume,
}

impl CategoryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Technical => "technical",
            Self::Prediction => "prediction",
            Self::Trend => "trend",
            Self::Volume => "volume",
        }
    }
}

/// One scored factor category with its human-readable signals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalCategory {
    /// Which category this is.
    pub kind: CategoryKind,
    /// Category score on a 0-100 scale (50 = neutral).
    pub score: f64,
    /// Signals that fired, in evaluation order.
    pub signals: Vec<String>,
}

// =============================================================================
// Forecast
// =============================================================================

/// A single forecasted trading day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    /// Days ahead of the last observed bar (1-based).
    pub offset: usize,
    /// Predicted closing price.
    pub predicted_close: f64,
    /// Confidence in [0, 1], decaying with the offset.
    pub confidence: f64,
}

/// Multi-day price forecast produced by the predictor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Forecast {
    /// Requested horizon in trading days.
    pub horizon: usize,
    /// One point per forecasted day, ordered by offset.
    pub points: Vec<ForecastPoint>,
}

impl Forecast {
    /// Last forecasted point (the horizon-day prediction).
    pub fn last(&self) -> Option<&ForecastPoint> {
        self.points.last()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

// =============================================================================
// Recommendation
// =============================================================================

/// Weighted multi-factor recommendation for a symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    /// Final verdict.
    pub verdict: Verdict,
    /// Weighted composite score on a 0-100 scale.
    pub composite: f64,
    /// Qualitative confidence in the verdict.
    pub confidence: ConfidenceLabel,
    /// Per-category scores and signals.
    pub categories: Vec<SignalCategory>,
    /// One-line human-readable summary.
    pub summary: String,
}

impl Recommendation {
    /// Look up a category by kind.
    pub fn category(&self, kind: CategoryKind) -> Option<&SignalCategory> {
        self.categories.iter().find(|c| c.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_labels() {
        assert_eq!(Verdict::StrongBuy.to_string(), "STRONG BUY");
        assert_eq!(Verdict::Hold.to_string(), "HOLD");
        assert_eq!(Verdict::StrongSell.as_str(), "STRONG SELL");
    }

    #[test]
    fn test_forecast_last() {
        let forecast = Forecast {
            horizon: 2,
            points: vec![
                ForecastPoint {
                    offset: 1,
                    predicted_close: 101.0,
                    confidence: 0.9,
                },
                ForecastPoint {
                    offset: 2,
                    predicted_close: 102.0,
                    confidence: 0.87,
                },
            ],
        };
        assert_eq!(forecast.len(), 2);
        assert_eq!(forecast.last().map(|p| p.offset), Some(2));
    }
}
