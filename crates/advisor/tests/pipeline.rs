//! End-to-end pipeline tests: bars in, recommendation out.

use advisor::{Advisor, AdvisorError};
use time::{Date, Duration};
use types::{
    CategoryKind, PredictorConfig, PriceBar, RetrainPolicy, ScoringWeights, StalenessPolicy,
    Verdict,
};

fn fast_advisor() -> Advisor {
    Advisor::new(
        PredictorConfig {
            n_trees: 25,
            max_depth: 8,
            ..PredictorConfig::default()
        },
        StalenessPolicy::default(),
        ScoringWeights::default(),
    )
}

fn make_series(closes: &[f64]) -> Vec<PriceBar> {
    let start = Date::from_ordinal_date(2024, 1).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PriceBar {
            symbol: "TEST".to_string(),
            date: start + Duration::days(i as i64),
            open: close * 0.997,
            high: close * 1.008,
            low: close * 0.993,
            close,
            volume: 1_000_000.0,
        })
        .collect()
}

/// Geometric zigzag with net upward drift: +1.1% on odd days,
/// -0.8% on even days, ending on an up day.
fn uptrend_closes(n: usize) -> Vec<f64> {
    let mut closes = Vec::with_capacity(n);
    let mut price = 100.0;
    closes.push(price);
    for i in 1..n {
        price *= if i % 2 == 1 { 1.011 } else { 0.992 };
        closes.push(price);
    }
    closes
}

#[test]
fn uptrend_series_scores_bullish() {
    let advisor = fast_advisor();
    let series = make_series(&uptrend_closes(300));

    let analysis = advisor
        .analyze("UPTREND", &series, 5, RetrainPolicy::Auto)
        .unwrap();

    // Technical stack is firmly bullish: MACD above signal and price
    // above both moving averages, with RSI in its neutral band
    let technical = analysis
        .recommendation
        .category(CategoryKind::Technical)
        .unwrap();
    assert!(
        technical.score >= 70.0,
        "technical score: {}",
        technical.score
    );
    assert!(
        technical
            .signals
            .iter()
            .any(|s| s.contains("MACD above signal"))
    );
    assert!(
        technical
            .signals
            .iter()
            .any(|s| s.contains("Price above 20 & 50-day SMA"))
    );

    // Composite must land on the buy side of the scale
    assert!(
        analysis.recommendation.composite >= 55.0,
        "composite: {}",
        analysis.recommendation.composite
    );
    assert!(matches!(
        analysis.recommendation.verdict,
        Verdict::Buy | Verdict::StrongBuy
    ));

    assert_eq!(analysis.forecast.len(), 5);
    for pair in analysis.forecast.points.windows(2) {
        assert!(pair[1].confidence < pair[0].confidence);
    }
    assert!(!analysis.used_stale_model);
}

#[test]
fn flat_series_scores_hold() {
    let advisor = fast_advisor();
    let series = make_series(&vec![100.0; 200]);

    let analysis = advisor
        .analyze("FLAT", &series, 3, RetrainPolicy::Auto)
        .unwrap();

    // Every tree collapses to a single leaf at 100
    for point in &analysis.forecast.points {
        assert!((point.predicted_close - 100.0).abs() < 1e-9);
    }

    // Neutral RSI (50), collapsed bands, flat MAs: technical is exactly neutral
    let technical = analysis
        .recommendation
        .category(CategoryKind::Technical)
        .unwrap();
    assert!((technical.score - 50.0).abs() < 1e-9);

    assert_eq!(analysis.recommendation.verdict, Verdict::Hold);
    assert!(analysis.recommendation.composite > 45.0);
    assert!(analysis.recommendation.composite < 55.0);

    // Zero label variance pins holdout R² at its defined floor
    assert_eq!(analysis.metrics.r2, 0.0);
}

#[test]
fn analysis_is_deterministic() {
    let series = make_series(&uptrend_closes(200));

    let a = fast_advisor()
        .analyze("DET", &series, 5, RetrainPolicy::Auto)
        .unwrap();
    let b = fast_advisor()
        .analyze("DET", &series, 5, RetrainPolicy::Auto)
        .unwrap();

    assert_eq!(a.forecast, b.forecast);
    assert_eq!(a.recommendation.composite, b.recommendation.composite);
    assert_eq!(a.recommendation.verdict, b.recommendation.verdict);
    assert_eq!(a.metrics, b.metrics);
}

#[test]
fn short_history_is_rejected() {
    let advisor = fast_advisor();

    // 80 bars survive feature building (30 rows) but not the 60-row floor
    let series = make_series(&uptrend_closes(80));
    let err = advisor
        .analyze("SHORT", &series, 5, RetrainPolicy::Auto)
        .unwrap_err();
    assert!(matches!(
        err,
        AdvisorError::InsufficientData {
            required: 60,
            actual: 30
        }
    ));

    // 40 bars don't even reach the indicator warmup
    let series = make_series(&uptrend_closes(40));
    let err = advisor
        .analyze("SHORT", &series, 5, RetrainPolicy::Auto)
        .unwrap_err();
    assert!(matches!(
        err,
        AdvisorError::InsufficientData { required: 50, .. }
    ));
}

#[test]
fn cached_model_is_reused_across_calls() {
    let advisor = fast_advisor();
    let series = make_series(&uptrend_closes(200));

    advisor
        .analyze("CACHED", &series, 3, RetrainPolicy::Auto)
        .unwrap();
    assert_eq!(advisor.cache().len(), 1);
    let first = advisor.cache().get("CACHED").unwrap();

    advisor
        .analyze("CACHED", &series, 3, RetrainPolicy::Auto)
        .unwrap();
    let second = advisor.cache().get("CACHED").unwrap();
    assert!(std::sync::Arc::ptr_eq(&first, &second));

    // Cache-only policy with a fresh model serves it without flagging
    let analysis = advisor
        .analyze("CACHED", &series, 3, RetrainPolicy::ForceCache)
        .unwrap();
    assert!(!analysis.used_stale_model);

    // Force retrains into a new handle
    advisor
        .analyze("CACHED", &series, 3, RetrainPolicy::Force)
        .unwrap();
    let third = advisor.cache().get("CACHED").unwrap();
    assert!(!std::sync::Arc::ptr_eq(&first, &third));
}

#[test]
fn symbols_are_cached_independently() {
    let advisor = fast_advisor();
    let series_a = make_series(&uptrend_closes(200));
    let series_b = make_series(&vec![100.0; 200]);

    advisor
        .analyze("AAA", &series_a, 3, RetrainPolicy::Auto)
        .unwrap();
    advisor
        .analyze("BBB", &series_b, 3, RetrainPolicy::Auto)
        .unwrap();

    assert_eq!(advisor.cache().len(), 2);
    let mut symbols = advisor.cache().symbols();
    symbols.sort();
    assert_eq!(symbols, vec!["AAA".to_string(), "BBB".to_string()]);
}
