//! In-memory model cache.
//!
//! Trained models are shared behind `Arc` so readers never block on a
//! retrain. Per-symbol training locks serialize concurrent retrains of
//! the same symbol while leaving other symbols untouched.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use time::{Date, Duration, OffsetDateTime};
use types::Symbol;

use crate::error::Result;
use crate::features::FeatureSchema;
use crate::model::{ModelMetrics, RandomForest};

// =============================================================================
// Trained Model
// =============================================================================

/// A trained forest plus everything needed to judge its freshness.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainedModel {
    /// Symbol the model was trained for.
    pub symbol: Symbol,
    /// The fitted forest.
    pub forest: RandomForest,
    /// Feature layout the forest expects.
    pub schema: FeatureSchema,
    /// First bar date in the training window.
    pub data_start: Date,
    /// Last bar date in the training window.
    pub data_end: Date,
    /// Holdout evaluation metrics.
    pub metrics: ModelMetrics,
    /// When training finished (UTC).
    pub trained_at: OffsetDateTime,
}

impl TrainedModel {
    /// Wall-clock age of the model.
    pub fn age(&self, now: OffsetDateTime) -> Duration {
        now - self.trained_at
    }

    /// Serialize to JSON for persistence.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserialize a persisted model.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

// =============================================================================
// Model Cache
// =============================================================================

/// Thread-safe per-symbol cache of trained models.
#[derive(Default)]
pub struct ModelCache {
    models: RwLock<HashMap<Symbol, Arc<TrainedModel>>>,
    train_locks: Mutex<HashMap<Symbol, Arc<Mutex<()>>>>,
}

impl ModelCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the cached model for a symbol, if any.
    pub fn get(&self, symbol: &str) -> Option<Arc<TrainedModel>> {
        self.models.read().get(symbol).cloned()
    }

    /// Insert a model, replacing any previous one for the symbol.
    /// Returns the shared handle to the inserted model.
    pub fn insert(&self, model: TrainedModel) -> Arc<TrainedModel> {
        let shared = Arc::new(model);
        self.models
            .write()
            .insert(shared.symbol.clone(), Arc::clone(&shared));
        shared
    }

    /// Remove and return the cached model for a symbol.
    pub fn evict(&self, symbol: &str) -> Option<Arc<TrainedModel>> {
        self.models.write().remove(symbol)
    }

    /// Drop all cached models.
    pub fn clear(&self) {
        self.models.write().clear();
    }

    /// Number of cached models.
    pub fn len(&self) -> usize {
        self.models.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.read().is_empty()
    }

    /// Symbols currently cached, in unspecified order.
    pub fn symbols(&self) -> Vec<Symbol> {
        self.models.read().keys().cloned().collect()
    }

    /// Get (or create) the training lock for a symbol.
    ///
    /// Callers hold this lock across check-train-insert so only one
    /// thread trains a given symbol at a time.
    pub fn train_lock(&self, symbol: &str) -> Arc<Mutex<()>> {
        let mut locks = self.train_locks.lock();
        Arc::clone(
            locks
                .entry(symbol.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(()))),
        )
    }
}

// =============================================================================
// Tests
// =============================================================================
