//! Model training, caching, and multi-day forecasting.
//!
//! The predictor owns the model cache and enforces the staleness policy:
//! a cached model is reused until it ages out or new trading days arrive
//! past its training window. Training runs under a wall-clock budget; on
//! timeout the most recent cached model is served instead when one
//! exists.
//!
//! Multi-day forecasts feed each prediction back into the feature row:
//! close-derived columns (lags, moving averages, RSI, MACD, Bollinger,
//! ROC) are recomputed against the synthetic close history, while
//! OHLC, volume, and range columns stay frozen at the last observed bar.

use std::sync::Arc;

use time::OffsetDateTime;

use quant::indicators::{BollingerBands, Ema, Macd, Roc, Rsi, Sma};
use quant::stats;
use types::{Forecast, ForecastPoint, PredictorConfig, RetrainPolicy, StalenessPolicy};

use crate::cache::{ModelCache, TrainedModel};
use crate::error::{AdvisorError, Result};
use crate::features::{FeatureSet, FeatureVec, fidx};
use crate::model::{
    ForestConfig, ModelMetrics, RandomForest, Regressor, mean_absolute_error, r_squared,
    root_mean_squared_error,
};

/// Confidence floor/ceiling for the importance-dispersion heuristic.
const CONFIDENCE_FLOOR: f64 = 0.60;
const CONFIDENCE_CEILING: f64 = 0.95;

// =============================================================================
// Predictor
// =============================================================================

/// Trains, caches, and queries per-symbol price models.
pub struct Predictor {
    config: PredictorConfig,
    staleness: StalenessPolicy,
    cache: ModelCache,
}

impl Predictor {
    /// Create a predictor with the given configuration and an empty cache.
    pub fn new(config: PredictorConfig, staleness: StalenessPolicy) -> Self {
        Self {
            config,
            staleness,
            cache: ModelCache::new(),
        }
    }

    /// Access the model cache.
    pub fn cache(&self) -> &ModelCache {
        &self.cache
    }

    /// Configured label horizon, for building matching feature sets.
    pub fn label_horizon(&self) -> usize {
        self.config.label_horizon
    }

    // =========================================================================
    // Training
    // =========================================================================

    /// Train a model on the feature set and insert it into the cache.
    ///
    /// Takes the symbol's training lock first, so direct callers
    /// serialize against each other and against `ensure_model` retrains
    /// of the same symbol.
    ///
    /// Metrics come from an evaluation fit on the chronologically-first
    /// rows, scored on the held-out trailing `test_fraction`. Rows are
    /// never shuffled, so evaluation is always on data that fit has not
    /// seen in time order. The deployed forest is then refitted on the
    /// full matrix so forecasts see the most recent price levels.
    pub fn train(&self, symbol: &str, features: &FeatureSet) -> Result<Arc<TrainedModel>> {
        let lock = self.cache.train_lock(symbol);
        let _guard = lock.lock();
        self.train_locked(symbol, features)
    }

    /// Training body. The caller must hold the symbol's train lock.
    fn train_locked(&self, symbol: &str, features: &FeatureSet) -> Result<Arc<TrainedModel>> {
        let rows = features.matrix.len();
        if rows < self.config.min_training_rows {
            return Err(AdvisorError::InsufficientData {
                required: self.config.min_training_rows,
                actual: rows,
            });
        }

        let test_rows =
            ((rows as f64 * self.config.test_fraction).round() as usize).clamp(1, rows - 1);
        let train_rows = rows - test_rows;

        let eval_forest = self.fit_with_timeout(
            &features.matrix[..train_rows],
            &features.labels[..train_rows],
        )?;

        let holdout = &features.labels[train_rows..];
        let predictions: Vec<f64> = features.matrix[train_rows..]
            .iter()
            .map(|row| eval_forest.predict_one(row))
            .collect();
        let metrics = ModelMetrics {
            mae: mean_absolute_error(holdout, &predictions),
            rmse: root_mean_squared_error(holdout, &predictions),
            r2: r_squared(holdout, &predictions),
            train_rows,
            test_rows,
        };

        let forest = self.fit_with_timeout(&features.matrix, &features.labels)?;

        tracing::debug!(
            symbol,
            train_rows,
            test_rows,
            r2 = metrics.r2,
            mae = metrics.mae,
            "trained forecast model"
        );

        let model = TrainedModel {
            symbol: symbol.to_string(),
            forest,
            schema: features.schema,
            data_start: features.data_start,
            data_end: features.data_end,
            metrics,
            trained_at: OffsetDateTime::now_utc(),
        };
        Ok(self.cache.insert(model))
    }

    /// Fit a forest on a worker thread, bounded by the training timeout.
    ///
    /// A timed-out fit keeps running detached; its result is discarded.
    fn fit_with_timeout(&self, rows: &[FeatureVec], labels: &[f64]) -> Result<RandomForest> {
        let (tx, rx) = crossbeam_channel::bounded(1);
        let forest_config = ForestConfig::from(&self.config);
        let rows = rows.to_vec();
        let labels = labels.to_vec();

        std::thread::spawn(move || {
            let mut forest = RandomForest::new(forest_config);
            forest.fit(&rows, &labels);
            let _ = tx.send(forest);
        });

        rx.recv_timeout(self.config.train_timeout)
            .map_err(|_| AdvisorError::TrainingTimeout {
                timeout: self.config.train_timeout,
            })
    }

    // =========================================================================
    // Cache Policy
    // =========================================================================

    /// Get a usable model for the symbol, training if the policy demands it.
    ///
    /// Returns the model and whether a stale model was knowingly served
    /// (cache-only policy, or training timed out with a cached fallback).
    pub fn ensure_model(
        &self,
        symbol: &str,
        features: &FeatureSet,
        policy: RetrainPolicy,
    ) -> Result<(Arc<TrainedModel>, bool)> {
        let latest_bar = features.data_end;

        if policy != RetrainPolicy::Force {
            if let Some(model) = self.cache.get(symbol) {
                let now = OffsetDateTime::now_utc();
                let stale = self
                    .staleness
                    .is_stale(model.trained_at, model.data_end, now, latest_bar);
                if !stale {
                    return Ok((model, false));
                }
                if policy == RetrainPolicy::ForceCache {
                    tracing::warn!(symbol, "serving stale cached model (cache-only policy)");
                    return Ok((model, true));
                }
            }
            // ForceCache with nothing cached falls through to training
        }

        let lock = self.cache.train_lock(symbol);
        let _guard = lock.lock();

        // Another thread may have retrained while we waited on the lock
        if policy != RetrainPolicy::Force {
            if let Some(model) = self.cache.get(symbol) {
                let now = OffsetDateTime::now_utc();
                if !self
                    .staleness
                    .is_stale(model.trained_at, model.data_end, now, latest_bar)
                {
                    return Ok((model, false));
                }
            }
        }

        match self.train_locked(symbol, features) {
            Ok(model) => Ok((model, false)),
            Err(AdvisorError::TrainingTimeout { timeout }) => {
                if let Some(stale) = self.cache.get(symbol) {
                    tracing::warn!(
                        symbol,
                        ?timeout,
                        "training timed out, serving stale cached model"
                    );
                    Ok((stale, true))
                } else {
                    Err(AdvisorError::TrainingTimeout { timeout })
                }
            }
            Err(e) => Err(e),
        }
    }

    // =========================================================================
    // Forecasting
    // =========================================================================

    /// Forecast `horizon` trading days ahead of the latest bar.
    ///
    /// Point confidence is the model's base confidence decayed
    /// multiplicatively per day ahead.
    pub fn forecast(
        &self,
        model: &TrainedModel,
        features: &FeatureSet,
        horizon: usize,
    ) -> Result<Forecast> {
        model.schema.check_compatible(&features.schema)?;
        model.schema.check_vector(&features.inference)?;

        let base = base_confidence(model.forest.feature_importances());
        let mut row = features.inference.clone();
        let mut closes = features.closes.clone();
        let mut points = Vec::with_capacity(horizon);

        for offset in 1..=horizon {
            let predicted = model.forest.predict_one(&row);
            let confidence = base * self.config.confidence_decay.powi(offset as i32);
            points.push(ForecastPoint {
                offset,
                predicted_close: predicted,
                confidence,
            });
            if offset < horizon {
                advance_row(&mut row, &mut closes, predicted);
            }
        }

        Ok(Forecast { horizon, points })
    }
}

/// Base confidence from importance dispersion: a forest leaning on a
/// few features is treated as less trustworthy than a balanced one.
fn base_confidence(importances: &[f64]) -> f64 {
    let dispersion = stats::std_dev(importances).unwrap_or(0.0);
    (1.0 - dispersion).clamp(CONFIDENCE_FLOOR, CONFIDENCE_CEILING)
}

/// Advance the inference row one synthetic day: `predicted` becomes the
/// newest close, lags shift, and close-derived indicators recompute.
fn advance_row(row: &mut FeatureVec, closes: &mut Vec<f64>, predicted: f64) {
    let prev_close = closes.last().copied().unwrap_or(predicted);

    for k in (fidx::CLOSE_LAG_1 + 1..=fidx::CLOSE_LAG_5).rev() {
        row[k] = row[k - 1];
    }
    row[fidx::CLOSE_LAG_1] = prev_close;
    closes.push(predicted);

    if let Some(sma) = Sma::calculate_from_prices(closes, 20) {
        row[fidx::SMA_20] = sma;
        if sma != 0.0 {
            row[fidx::CLOSE_SMA20_RATIO] = predicted / sma;
        }
    }
    if let Some(sma) = Sma::calculate_from_prices(closes, 50) {
        row[fidx::SMA_50] = sma;
        if sma != 0.0 {
            row[fidx::CLOSE_SMA50_RATIO] = predicted / sma;
        }
    }
    if let Some(ema) = Ema::calculate_from_prices(closes, 12) {
        row[fidx::EMA_12] = ema;
    }
    if let Some(ema) = Ema::calculate_from_prices(closes, 26) {
        row[fidx::EMA_26] = ema;
    }
    if let Some(rsi) = Rsi::calculate_from_prices(closes, 14) {
        row[fidx::RSI_14] = rsi;
    }
    if let Some(roc) = Roc::calculate_from_prices(closes, 10) {
        row[fidx::ROC_10] = roc;
    }
    if let Some(macd) = Macd::standard().calculate_full_from_prices(closes) {
        row[fidx::MACD] = macd.macd_line;
        row[fidx::MACD_SIGNAL] = macd.signal_line;
        row[fidx::MACD_HISTOGRAM] = macd.histogram;
    }
    if let Some(bb) = BollingerBands::standard().calculate_full_from_prices(closes) {
        row[fidx::BB_UPPER] = bb.upper;
        row[fidx::BB_MIDDLE] = bb.middle;
        row[fidx::BB_LOWER] = bb.lower;
        row[fidx::BB_POSITION] = bb.percent_b.clamp(0.0, 1.0);
    }
    // OHLC, volume, volume lags, price range/change, ATR, and the volume
    // ratio have no synthetic future values; they stay frozen at the
    // last observed bar.
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FeatureBuilder;
    use quant::compute_indicators;
    use time::{Date, Duration};
    use types::PriceBar;

    fn fast_config() -> PredictorConfig {
        PredictorConfig {
            n_trees: 20,
            max_depth: 8,
            ..PredictorConfig::default()
        }
    }

    /// A training budget no fit can meet.
    fn stalled_config() -> PredictorConfig {
        PredictorConfig {
            train_timeout: std::time::Duration::from_nanos(1),
            ..fast_config()
        }
    }

    fn make_series(closes: &[f64]) -> Vec<PriceBar> {
        let start = Date::from_ordinal_date(2024, 1).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PriceBar {
                symbol: "TEST".to_string(),
                date: start + Duration::days(i as i64),
                open: close * 0.995,
                high: close * 1.01,
                low: close * 0.99,
                close,
                volume: 1_000_000.0,
            })
            .collect()
    }

    fn wavy_closes(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| 100.0 + (i as f64 * 0.3).sin() * 5.0 + i as f64 * 0.05)
            .collect()
    }

    fn feature_set(closes: &[f64]) -> FeatureSet {
        let series = make_series(closes);
        let snapshots = compute_indicators(&series);
        FeatureBuilder::new(1).build(&series, &snapshots).unwrap()
    }

    #[test]
    fn test_min_training_rows_enforced() {
        let predictor = Predictor::new(fast_config(), StalenessPolicy::default());

        // 105 bars yield 55 rows: under the 60-row floor
        let short = feature_set(&wavy_closes(105));
        assert!(matches!(
            predictor.train("TEST", &short),
            Err(AdvisorError::InsufficientData { required: 60, actual: 55 })
        ));

        // 110 bars yield exactly 60 rows
        let enough = feature_set(&wavy_closes(110));
        assert!(predictor.train("TEST", &enough).is_ok());
    }

    #[test]
    fn test_metrics_split_is_chronological() {
        let predictor = Predictor::new(fast_config(), StalenessPolicy::default());
        let features = feature_set(&wavy_closes(150));
        let model = predictor.train("TEST", &features).unwrap();

        let rows = features.matrix.len();
        assert_eq!(model.metrics.test_rows, (rows as f64 * 0.2).round() as usize);
        assert_eq!(model.metrics.train_rows + model.metrics.test_rows, rows);
        assert!(model.metrics.mae >= 0.0);
        assert!(model.metrics.rmse >= model.metrics.mae);
    }

    #[test]
    fn test_forecast_deterministic() {
        let predictor = Predictor::new(fast_config(), StalenessPolicy::default());
        let features = feature_set(&wavy_closes(200));
        let model = predictor.train("TEST", &features).unwrap();

        let a = predictor.forecast(&model, &features, 5).unwrap();
        let b = predictor.forecast(&model, &features, 5).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.len(), 5);
    }

    #[test]
    fn test_flat_series_forecasts_current_close() {
        let predictor = Predictor::new(fast_config(), StalenessPolicy::default());
        let features = feature_set(&vec![100.0; 150]);
        let model = predictor.train("TEST", &features).unwrap();

        // All labels identical: every tree is a single leaf at 100
        let forecast = predictor.forecast(&model, &features, 3).unwrap();
        for point in &forecast.points {
            assert!((point.predicted_close - 100.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_forecast_confidence_decays() {
        let predictor = Predictor::new(fast_config(), StalenessPolicy::default());
        let features = feature_set(&wavy_closes(150));
        let model = predictor.train("TEST", &features).unwrap();

        let forecast = predictor.forecast(&model, &features, 7).unwrap();
        for pair in forecast.points.windows(2) {
            assert!(pair[1].confidence < pair[0].confidence);
        }
        // Base confidence heuristic stays within its clamp
        let first = forecast.points[0].confidence / 0.97;
        assert!((0.60..=0.95).contains(&first));
    }

    #[test]
    fn test_ensure_model_reuses_fresh_cache() {
        let predictor = Predictor::new(fast_config(), StalenessPolicy::default());
        let features = feature_set(&wavy_closes(150));

        let (first, stale1) = predictor
            .ensure_model("TEST", &features, RetrainPolicy::Auto)
            .unwrap();
        let (second, stale2) = predictor
            .ensure_model("TEST", &features, RetrainPolicy::Auto)
            .unwrap();

        assert!(!stale1 && !stale2);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_force_always_retrains() {
        let predictor = Predictor::new(fast_config(), StalenessPolicy::default());
        let features = feature_set(&wavy_closes(150));

        let (first, _) = predictor
            .ensure_model("TEST", &features, RetrainPolicy::Auto)
            .unwrap();
        let (second, _) = predictor
            .ensure_model("TEST", &features, RetrainPolicy::Force)
            .unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_stale_model_retrained_or_served_by_policy() {
        let predictor = Predictor::new(fast_config(), StalenessPolicy::default());
        let features = feature_set(&wavy_closes(150));

        let fresh = predictor.train("TEST", &features).unwrap();

        // Backdate the cached model past the age limit
        let mut backdated = (*fresh).clone();
        backdated.trained_at = OffsetDateTime::now_utc() - Duration::hours(25);
        let backdated = predictor.cache().insert(backdated);

        // Cache-only policy serves it, flagged stale
        let (served, was_stale) = predictor
            .ensure_model("TEST", &features, RetrainPolicy::ForceCache)
            .unwrap();
        assert!(was_stale);
        assert!(Arc::ptr_eq(&served, &backdated));

        // Auto retrains and replaces it
        let (retrained, was_stale) = predictor
            .ensure_model("TEST", &features, RetrainPolicy::Auto)
            .unwrap();
        assert!(!was_stale);
        assert!(!Arc::ptr_eq(&retrained, &backdated));
        assert!(retrained.trained_at > backdated.trained_at);
    }

    #[test]
    fn test_training_timeout_surfaces_without_cache() {
        let stalled = Predictor::new(stalled_config(), StalenessPolicy::default());
        let features = feature_set(&wavy_closes(150));

        assert!(matches!(
            stalled.train("TEST", &features),
            Err(AdvisorError::TrainingTimeout { .. })
        ));
        assert!(matches!(
            stalled.ensure_model("TEST", &features, RetrainPolicy::Auto),
            Err(AdvisorError::TrainingTimeout { .. })
        ));
        assert!(stalled.cache().is_empty());
    }

    #[test]
    fn test_training_timeout_serves_stale_cached_model() {
        let features = feature_set(&wavy_closes(150));
        let trainer = Predictor::new(fast_config(), StalenessPolicy::default());
        let trained = trainer.train("TEST", &features).unwrap();

        let stalled = Predictor::new(stalled_config(), StalenessPolicy::default());
        let mut backdated = (*trained).clone();
        backdated.trained_at = OffsetDateTime::now_utc() - Duration::hours(25);
        let backdated = stalled.cache().insert(backdated);

        // The stale cache entry forces a retrain; the retrain times out
        // and the cached model is served instead, flagged stale
        let (served, was_stale) = stalled
            .ensure_model("TEST", &features, RetrainPolicy::Auto)
            .unwrap();
        assert!(was_stale);
        assert!(Arc::ptr_eq(&served, &backdated));
    }

    #[test]
    fn test_concurrent_ensure_model_trains_once() {
        let predictor = Predictor::new(fast_config(), StalenessPolicy::default());
        let features = feature_set(&wavy_closes(150));

        let (a, b) = std::thread::scope(|s| {
            let first =
                s.spawn(|| predictor.ensure_model("TEST", &features, RetrainPolicy::Auto));
            let second =
                s.spawn(|| predictor.ensure_model("TEST", &features, RetrainPolicy::Auto));
            (
                first.join().unwrap().unwrap(),
                second.join().unwrap().unwrap(),
            )
        });

        // The loser of the train-lock race reuses the winner's model
        assert!(Arc::ptr_eq(&a.0, &b.0));
        assert!(!a.1 && !b.1);
        assert_eq!(predictor.cache().len(), 1);
    }

    #[test]
    fn test_concurrent_direct_train_is_serialized() {
        let predictor = Predictor::new(fast_config(), StalenessPolicy::default());
        let features = feature_set(&wavy_closes(150));

        let (a, b) = std::thread::scope(|s| {
            let first = s.spawn(|| predictor.train("TEST", &features));
            let second = s.spawn(|| predictor.train("TEST", &features));
            (
                first.join().unwrap().unwrap(),
                second.join().unwrap().unwrap(),
            )
        });

        // Both trains run under the symbol lock; the cache keeps the
        // later insert and both handles stay usable
        assert_eq!(predictor.cache().len(), 1);
        let cached = predictor.cache().get("TEST").unwrap();
        assert!(Arc::ptr_eq(&cached, &a) || Arc::ptr_eq(&cached, &b));
    }

    #[test]
    fn test_schema_mismatch_rejected_at_forecast() {
        let predictor = Predictor::new(fast_config(), StalenessPolicy::default());
        let features = feature_set(&wavy_closes(150));
        let model = predictor.train("TEST", &features).unwrap();

        let mut wrong = (*model).clone();
        wrong.schema.version += 1;
        assert!(matches!(
            predictor.forecast(&wrong, &features, 3),
            Err(AdvisorError::SchemaMismatch { .. })
        ));
    }
}
