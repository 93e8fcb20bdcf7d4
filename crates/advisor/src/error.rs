//! Error types for the advisor pipeline.

use thiserror::Error;

/// Errors produced by feature building, training, and forecasting.
#[derive(Debug, Error)]
pub enum AdvisorError {
    /// Not enough bars or feature rows to proceed.
    #[error("insufficient data: need {required}, have {actual}")]
    InsufficientData { required: usize, actual: usize },

    /// A model was asked to score features from a different schema.
    #[error(
        "feature schema mismatch: model expects v{expected_version} ({expected_len} features), \
         got v{actual_version} ({actual_len} features)"
    )]
    SchemaMismatch {
        expected_version: u16,
        expected_len: usize,
        actual_version: u16,
        actual_len: usize,
    },

    /// Training exceeded its wall-clock budget.
    #[error("training timed out after {timeout:?}")]
    TrainingTimeout { timeout: std::time::Duration },

    /// Model (de)serialization failed.
    #[error("model serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience result alias for advisor operations.
pub type Result<T> = std::result::Result<T, AdvisorError>;
