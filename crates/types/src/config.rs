//! Pipeline configuration types.
//!
//! Defaults match the tuned production settings; every knob is plain
//! data so configurations can be serialized alongside trained models.

use serde::{Deserialize, Serialize};
use time::{Date, Duration, OffsetDateTime};

// =============================================================================
// Scoring Weights
// =============================================================================

/// Weights applied to the four recommendation categories.
///
/// Weights are expected to sum to 1.0 so the composite stays on the
/// same 0-100 scale as the category scores.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoringWeights {
    /// Weight of the technical signal category.
    pub technical: f64,
    /// Weight of the model prediction category.
    pub prediction: f64,
    /// Weight of the recent trend category.
    pub trend: f64,
    /// Weight of the volume category.
    pub volume: f64,
}

impl ScoringWeights {
    /// Check that all weights are non-negative and sum to 1.0.
    pub fn is_valid(&self) -> bool {
        let parts = [self.technical, self.prediction, self.trend, self.volume];
        parts.iter().all(|w| *w >= 0.0)
            && (parts.iter().sum::<f64>() - 1.0).abs() < 1e-9
    }
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            technical: 0.40,
            prediction: 0.35,
            trend: 0.15,
            volume: 0.10,
        }
    }
}

// =============================================================================
// Predictor Configuration
// =============================================================================

/// Configuration for feature labeling, forest training, and forecasting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictorConfig {
    /// Days ahead the training label looks (label = close at t + horizon).
    pub label_horizon: usize,
    /// Number of trees in the forest.
    pub n_trees: usize,
    /// Maximum tree depth.
    pub max_depth: usize,
    /// Minimum samples required to split an internal node.
    pub min_samples_split: usize,
    /// Minimum samples required in each leaf.
    pub min_samples_leaf: usize,
    /// Features considered per split (None = n_features / 3).
    pub max_features: Option<usize>,
    /// Base RNG seed; tree i uses seed + i.
    pub seed: u64,
    /// Fraction of rows held out (chronologically last) for evaluation.
    pub test_fraction: f64,
    /// Minimum usable training rows before training is refused.
    pub min_training_rows: usize,
    /// Per-step multiplicative confidence decay for multi-day forecasts.
    pub confidence_decay: f64,
    /// Wall-clock budget for a single training run.
    pub train_timeout: std::time::Duration,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            label_horizon: 1,
            n_trees: 100,
            max_depth: 12,
            min_samples_split: 5,
            min_samples_leaf: 2,
            max_features: None,
            seed: 42,
            test_fraction: 0.2,
            min_training_rows: 60,
            confidence_decay: 0.97,
            train_timeout: std::time::Duration::from_secs(30),
        }
    }
}

// =============================================================================
// Model Staleness
// =============================================================================

/// Policy deciding when a cached model must be retrained.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StalenessPolicy {
    /// Maximum wall-clock age of a trained model.
    pub max_age: Duration,
    /// Number of trading days past the model's data window that triggers retrain.
    pub max_new_days: i64,
}

impl StalenessPolicy {
    /// Check whether a model trained at `trained_at` on data ending at
    /// `data_end` is stale given the current time and the latest bar date.
    pub fn is_stale(
        &self,
        trained_at: OffsetDateTime,
        data_end: Date,
        now: OffsetDateTime,
        latest_bar: Date,
    ) -> bool {
        now - trained_at > self.max_age || (latest_bar - data_end).whole_days() >= self.max_new_days
    }
}

impl Default for StalenessPolicy {
    fn default() -> Self {
        Self {
            max_age: Duration::hours(24),
            max_new_days: 1,
        }
    }
}

/// How the predictor should treat the model cache for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RetrainPolicy {
    /// Retrain only when the cached model is missing or stale.
    #[default]
    Auto,
    /// Always retrain, ignoring any cached model.
    Force,
    /// Serve the cached model even if stale; train only when nothing is cached.
    ForceCache,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{date, datetime};

    #[test]
    fn test_default_weights_valid() {
        assert!(ScoringWeights::default().is_valid());
    }

    #[test]
    fn test_unbalanced_weights_invalid() {
        let w = ScoringWeights {
            technical: 0.5,
            prediction: 0.5,
            trend: 0.5,
            volume: 0.5,
        };
        assert!(!w.is_valid());
    }

    #[test]
    fn test_staleness_by_age() {
        let policy = StalenessPolicy::default();
        let trained_at = datetime!(2024-01-01 12:00 UTC);
        let data_end = date!(2024 - 01 - 01);

        // 23h later, no new bars: fresh
        assert!(!policy.is_stale(
            trained_at,
            data_end,
            datetime!(2024-01-02 11:00 UTC),
            data_end
        ));
        // 25h later: stale regardless of data
        assert!(policy.is_stale(
            trained_at,
            data_end,
            datetime!(2024-01-02 13:00 UTC),
            data_end
        ));
    }

    #[test]
    fn test_staleness_by_new_days() {
        let policy = StalenessPolicy::default();
        let trained_at = datetime!(2024-01-01 12:00 UTC);
        let now = datetime!(2024-01-01 18:00 UTC);

        // A bar newer than the training window makes the model stale
        assert!(policy.is_stale(trained_at, date!(2024 - 01 - 01), now, date!(2024 - 01 - 02)));
        assert!(!policy.is_stale(trained_at, date!(2024 - 01 - 01), now, date!(2024 - 01 - 01)));
    }
}
