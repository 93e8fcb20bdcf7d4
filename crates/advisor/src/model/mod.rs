//! Regression models and evaluation metrics.
//!
//! The predictor trains a bagged forest of CART regression trees on the
//! feature matrix. Models are plain serde-serializable data so trained
//! models can be persisted and reloaded.

mod decision_tree;
mod random_forest;

pub use decision_tree::{DecisionTree, TreeConfig};
pub use random_forest::{ForestConfig, RandomForest};

use serde::{Deserialize, Serialize};

// =============================================================================
// Regressor Trait
// =============================================================================

/// A fitted regression model.
pub trait Regressor: Send + Sync {
    /// Predict the target for a single feature vector.
    fn predict_one(&self, features: &[f64]) -> f64;
}

// =============================================================================
// Metrics
// =============================================================================

/// Holdout evaluation metrics for a trained model.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelMetrics {
    /// Mean absolute error on the holdout rows.
    pub mae: f64,
    /// Root mean squared error on the holdout rows.
    pub rmse: f64,
    /// R² (coefficient of determination) on the holdout rows.
    pub r2: f64,
    /// Rows the forest was fitted on.
    pub train_rows: usize,
    /// Chronologically-last rows held out for evaluation.
    pub test_rows: usize,
}

/// Mean Absolute Error: (1/n) * Σ|y_true - y_pred|
pub fn mean_absolute_error(y_true: &[f64], y_pred: &[f64]) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| (t - p).abs())
        .sum::<f64>()
        / y_true.len() as f64
}

/// Root Mean Squared Error.
pub fn root_mean_squared_error(y_true: &[f64], y_pred: &[f64]) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let mse = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| (t - p).powi(2))
        .sum::<f64>()
        / y_true.len() as f64;
    mse.sqrt()
}

/// R² (coefficient of determination): 1 - SS_res / SS_tot.
///
/// Defined as 0.0 when the labels have no variance.
pub fn r_squared(y_true: &[f64], y_pred: &[f64]) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let y_mean = y_true.iter().sum::<f64>() / y_true.len() as f64;

    let ss_res: f64 = y_true
        .iter()
        .zip(y_pred.iter())
        .map(|(t, p)| (t - p).powi(2))
        .sum();
    let ss_tot: f64 = y_true.iter().map(|t| (t - y_mean).powi(2)).sum();

    if ss_tot < 1e-10 {
        return 0.0;
    }

    1.0 - ss_res / ss_tot
}

// =============================================================================
// Tests
// =============================================================================
