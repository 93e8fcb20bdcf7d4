//! Stock advisor pipeline: features, forecasting, and recommendations.
//!
//! This crate turns a daily OHLCV bar series into a multi-day price
//! forecast and a weighted multi-factor recommendation:
//!
//! 1. [`features`] builds a supervised matrix from the bars and their
//!    indicator snapshots (computed by the `quant` crate).
//! 2. [`model`] fits a bagged forest of CART regression trees on it.
//! 3. [`predictor`] caches trained models per symbol, enforces the
//!    staleness policy, and rolls forecasts forward day by day.
//! 4. [`scorer`] blends technical rules, the forecast, trend, and
//!    volume into a 0-100 composite and a verdict.
//!
//! [`Advisor`] wires the stages together for the common case.
//!
//! # Example
//!
//! ```no_run
//! use advisor::Advisor;
//! use types::{PriceBar, RetrainPolicy};
//!
//! let advisor = Advisor::with_defaults();
//! let bars: Vec<PriceBar> = vec![/* ... */];
//! let analysis = advisor.analyze("AAPL", &bars, 5, RetrainPolicy::Auto)?;
//! println!("{}: {}", analysis.symbol, analysis.recommendation.summary);
//! # Ok::<(), advisor::AdvisorError>(())
//! ```

pub mod cache;
pub mod error;
pub mod features;
pub mod model;
pub mod predictor;
pub mod scorer;

pub use cache::{ModelCache, TrainedModel};
pub use error::{AdvisorError, Result};
pub use features::{FeatureBuilder, FeatureSchema, FeatureSet, FeatureVec};
pub use model::{ForestConfig, ModelMetrics, RandomForest, Regressor};
pub use predictor::Predictor;
pub use scorer::RecommendationScorer;

use quant::IndicatorEngine;
use types::{
    Forecast, PredictorConfig, Recommendation, RetrainPolicy, ScoringWeights, StalenessPolicy,
    Symbol,
};

// =============================================================================
// Advisor
// =============================================================================

/// Full analysis output for one symbol.
#[derive(Debug, Clone)]
pub struct Analysis {
    /// Symbol analyzed.
    pub symbol: Symbol,
    /// Multi-day price forecast.
    pub forecast: Forecast,
    /// Weighted multi-factor recommendation.
    pub recommendation: Recommendation,
    /// Holdout metrics of the model behind the forecast.
    pub metrics: ModelMetrics,
    /// Whether a stale cached model was knowingly served.
    pub used_stale_model: bool,
}

/// End-to-end pipeline: indicators, features, model, forecast, score.
pub struct Advisor {
    engine: IndicatorEngine,
    builder: FeatureBuilder,
    predictor: Predictor,
    scorer: RecommendationScorer,
}

impl Advisor {
    /// Create an advisor with explicit configuration.
    pub fn new(
        config: PredictorConfig,
        staleness: StalenessPolicy,
        weights: ScoringWeights,
    ) -> Self {
        Self {
            engine: IndicatorEngine::with_default_indicators(),
            builder: FeatureBuilder::new(config.label_horizon),
            predictor: Predictor::new(config, staleness),
            scorer: RecommendationScorer::new(weights),
        }
    }

    /// Create an advisor with default configuration everywhere.
    pub fn with_defaults() -> Self {
        Self::new(
            PredictorConfig::default(),
            StalenessPolicy::default(),
            ScoringWeights::default(),
        )
    }

    /// Access the model cache.
    pub fn cache(&self) -> &ModelCache {
        self.predictor.cache()
    }

    /// Analyze a symbol: forecast `horizon` days ahead and score it.
    ///
    /// Bars must be ordered oldest to newest. The cached model for the
    /// symbol is reused or retrained according to `policy`.
    pub fn analyze(
        &self,
        symbol: &str,
        series: &[types::PriceBar],
        horizon: usize,
        policy: RetrainPolicy,
    ) -> Result<Analysis> {
        let snapshots = self.engine.compute_snapshots(series);
        let features = self.builder.build(series, &snapshots)?;

        let (model, used_stale) = self.predictor.ensure_model(symbol, &features, policy)?;
        let forecast = self.predictor.forecast(&model, &features, horizon)?;

        // build() guarantees a non-empty series here
        let latest = snapshots.last().cloned().unwrap_or_default();
        let recommendation =
            self.scorer
                .score(&latest, &forecast, series, Some(model.metrics.r2));

        tracing::info!(
            symbol,
            verdict = %recommendation.verdict,
            composite = recommendation.composite,
            used_stale,
            "analysis complete"
        );

        Ok(Analysis {
            symbol: symbol.to_string(),
            forecast,
            recommendation,
            metrics: model.metrics,
            used_stale_model: used_stale,
        })
    }
}
