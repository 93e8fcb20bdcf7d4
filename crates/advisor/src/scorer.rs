//! Multi-factor recommendation scoring.
//!
//! Four categories each score 0-100 around a neutral 50: technical
//! indicator rules, the model forecast, the recent price trend, and
//! volume behavior. The composite is their weighted sum (weights default
//! to 0.40 / 0.35 / 0.15 / 0.10) and maps to a verdict by fixed
//! thresholds.
//!
//! Technical rules are grouped per indicator; within a group only the
//! first matching rule fires, so "RSI < 30" shadows the weaker
//! "RSI < 40" nudge.

use quant::stats;
use quant::{IndicatorSnapshot, VolumeLevel};
use types::{
    CategoryKind, ConfidenceLabel, Forecast, IndicatorType, PriceBar, Recommendation,
    ScoringWeights, SignalCategory, Verdict,
};

// =============================================================================
// Thresholds
// =============================================================================

/// Verdict boundaries on the composite scale, descending.
const VERDICT_BOUNDARIES: [f64; 4] = [70.0, 55.0, 45.0, 30.0];

/// Composite distance to the nearest boundary for High/Medium confidence.
const HIGH_CONFIDENCE_MARGIN: f64 = 15.0;
const MEDIUM_CONFIDENCE_MARGIN: f64 = 5.0;

/// Minimum holdout R² for a High-confidence verdict.
const HIGH_CONFIDENCE_MIN_R2: f64 = 0.3;

/// Predicted move below this magnitude (percent) is treated as flat.
const FLAT_PREDICTION_PCT: f64 = 1.0;

/// Points of prediction score per percent of predicted move, and its cap.
const PREDICTION_POINTS_PER_PCT: f64 = 4.0;
const PREDICTION_POINTS_CAP: f64 = 20.0;

/// Trend slope buckets, in percent of mean price per day.
const STRONG_TREND_PCT: f64 = 0.5;
const MODERATE_TREND_PCT: f64 = 0.2;

/// Volatility bands on the coefficient of variation of recent closes.
const HIGH_VOLATILITY_CV: f64 = 0.05;
const LOW_VOLATILITY_CV: f64 = 0.02;

/// Bars considered by the trend and volume categories.
const LOOKBACK_DAYS: usize = 20;

// =============================================================================
// Technical Reading
// =============================================================================

/// Indicator values extracted from the latest snapshot.
///
/// Any indicator still warming up is `None` and its rules simply
/// don't fire.
#[derive(Debug, Clone, Default)]
struct TechnicalReading {
    close: f64,
    rsi: Option<f64>,
    macd_line: Option<f64>,
    macd_signal: Option<f64>,
    sma_20: Option<f64>,
    sma_50: Option<f64>,
    bb_upper: Option<f64>,
    bb_lower: Option<f64>,
}

impl TechnicalReading {
    fn from_snapshot(snapshot: &IndicatorSnapshot, close: f64) -> Self {
        Self {
            close,
            rsi: snapshot.get(IndicatorType::Rsi(14)),
            macd_line: snapshot.get(IndicatorType::MACD_LINE_STANDARD),
            macd_signal: snapshot.get(IndicatorType::MACD_SIGNAL_STANDARD),
            sma_20: snapshot.get(IndicatorType::Sma(20)),
            sma_50: snapshot.get(IndicatorType::Sma(50)),
            bb_upper: snapshot.get(IndicatorType::BOLLINGER_UPPER_STANDARD),
            bb_lower: snapshot.get(IndicatorType::BOLLINGER_LOWER_STANDARD),
        }
    }
}

// =============================================================================
// Technical Rules
// =============================================================================

struct Rule {
    label: &'static str,
    delta: f64,
    applies: fn(&TechnicalReading) -> bool,
}

fn rsi_oversold(r: &TechnicalReading) -> bool {
    r.rsi.is_some_and(|v| v < 30.0)
}
fn rsi_overbought(r: &TechnicalReading) -> bool {
    r.rsi.is_some_and(|v| v > 70.0)
}
fn rsi_leaning_oversold(r: &TechnicalReading) -> bool {
    r.rsi.is_some_and(|v| v < 40.0)
}
fn rsi_leaning_overbought(r: &TechnicalReading) -> bool {
    r.rsi.is_some_and(|v| v > 60.0)
}

fn macd_bullish(r: &TechnicalReading) -> bool {
    matches!((r.macd_line, r.macd_signal), (Some(m), Some(s)) if m > s)
}
fn macd_bearish(r: &TechnicalReading) -> bool {
    matches!((r.macd_line, r.macd_signal), (Some(m), Some(s)) if m < s)
}

fn above_both_smas(r: &TechnicalReading) -> bool {
    matches!(
        (r.sma_20, r.sma_50),
        (Some(s20), Some(s50)) if r.close > s20 && s20 > s50
    )
}
fn below_both_smas(r: &TechnicalReading) -> bool {
    matches!(
        (r.sma_20, r.sma_50),
        (Some(s20), Some(s50)) if r.close < s20 && s20 < s50
    )
}
fn above_sma20(r: &TechnicalReading) -> bool {
    r.sma_20.is_some_and(|s| r.close > s)
}
fn below_sma20(r: &TechnicalReading) -> bool {
    r.sma_20.is_some_and(|s| r.close < s)
}

fn below_lower_band(r: &TechnicalReading) -> bool {
    r.bb_lower.is_some_and(|b| r.close < b)
}
fn above_upper_band(r: &TechnicalReading) -> bool {
    r.bb_upper.is_some_and(|b| r.close > b)
}

static RSI_RULES: [Rule; 4] = [
    Rule {
        label: "RSI oversold (potential bounce)",
        delta: 15.0,
        applies: rsi_oversold,
    },
    Rule {
        label: "RSI overbought (potential pullback)",
        delta: -15.0,
        applies: rsi_overbought,
    },
    Rule {
        label: "RSI leaning oversold",
        delta: 8.0,
        applies: rsi_leaning_oversold,
    },
    Rule {
        label: "RSI leaning overbought",
        delta: -8.0,
        applies: rsi_leaning_overbought,
    },
];

static MACD_RULES: [Rule; 2] = [
    Rule {
        label: "MACD above signal line (bullish)",
        delta: 10.0,
        applies: macd_bullish,
    },
    Rule {
        label: "MACD below signal line (bearish)",
        delta: -10.0,
        applies: macd_bearish,
    },
];

static MOVING_AVERAGE_RULES: [Rule; 4] = [
    Rule {
        label: "Price above 20 & 50-day SMA (uptrend)",
        delta: 10.0,
        applies: above_both_smas,
    },
    Rule {
        label: "Price below 20 & 50-day SMA (downtrend)",
        delta: -10.0,
        applies: below_both_smas,
    },
    Rule {
        label: "Price above 20-day SMA",
        delta: 5.0,
        applies: above_sma20,
    },
    Rule {
        label: "Price below 20-day SMA",
        delta: -5.0,
        applies: below_sma20,
    },
];

static BOLLINGER_RULES: [Rule; 2] = [
    Rule {
        label: "Price below lower Bollinger band (oversold)",
        delta: 8.0,
        applies: below_lower_band,
    },
    Rule {
        label: "Price above upper Bollinger band (overbought)",
        delta: -8.0,
        applies: above_upper_band,
    },
];

// =============================================================================
// Scorer
// =============================================================================

/// Produces weighted multi-factor recommendations.
pub struct RecommendationScorer {
    weights: ScoringWeights,
}

impl Default for RecommendationScorer {
    fn default() -> Self {
        Self::new(ScoringWeights::default())
    }
}

impl RecommendationScorer {
    /// Create a scorer with the given category weights.
    ///
    /// # Panics
    /// Panics if the weights don't sum to 1.0.
    pub fn new(weights: ScoringWeights) -> Self {
        assert!(weights.is_valid(), "scoring weights must sum to 1.0");
        Self { weights }
    }

    /// Score a symbol from its latest snapshot, forecast, and bar series.
    ///
    /// `model_r2` is the holdout R² of the model behind the forecast;
    /// it gates High confidence only.
    ///
    /// # Panics
    /// Panics on an empty series.
    pub fn score(
        &self,
        latest: &IndicatorSnapshot,
        forecast: &Forecast,
        series: &[PriceBar],
        model_r2: Option<f64>,
    ) -> Recommendation {
        assert!(!series.is_empty(), "cannot score an empty series");
        let close = series[series.len() - 1].close;

        let categories = vec![
            technical_category(latest, close),
            prediction_category(forecast, close),
            trend_category(series),
            volume_category(series),
        ];

        let composite = self.composite(&categories);
        let verdict = verdict_for(composite);
        let confidence = confidence_for(composite, model_r2);
        let summary = summarize(verdict, &categories);

        Recommendation {
            verdict,
            composite,
            confidence,
            categories,
            summary,
        }
    }

    /// Weighted composite of category scores, clamped to 0-100.
    pub fn composite(&self, categories: &[SignalCategory]) -> f64 {
        categories
            .iter()
            .map(|c| {
                let weight = match c.kind {
                    CategoryKind::Technical => self.weights.technical,
                    CategoryKind::Prediction => self.weights.prediction,
                    CategoryKind::Trend => self.weights.trend,
                    CategoryKind::Volume => self.weights.volume,
                };
                weight * c.score
            })
            .sum::<f64>()
            .clamp(0.0, 100.0)
    }
}

/// Map a composite score to its verdict.
pub fn verdict_for(composite: f64) -> Verdict {
    if composite >= 70.0 {
        Verdict::StrongBuy
    } else if composite >= 55.0 {
        Verdict::Buy
    } else if composite > 45.0 {
        Verdict::Hold
    } else if composite > 30.0 {
        Verdict::Sell
    } else {
        Verdict::StrongSell
    }
}

/// Confidence from boundary distance, gated by model quality.
pub fn confidence_for(composite: f64, model_r2: Option<f64>) -> ConfidenceLabel {
    let margin = VERDICT_BOUNDARIES
        .iter()
        .map(|b| (composite - b).abs())
        .fold(f64::INFINITY, f64::min);

    if margin >= HIGH_CONFIDENCE_MARGIN && model_r2.is_some_and(|r2| r2 >= HIGH_CONFIDENCE_MIN_R2) {
        ConfidenceLabel::High
    } else if margin >= MEDIUM_CONFIDENCE_MARGIN {
        ConfidenceLabel::Medium
    } else {
        ConfidenceLabel::Low
    }
}

// =============================================================================
// Categories
// =============================================================================

fn technical_category(snapshot: &IndicatorSnapshot, close: f64) -> SignalCategory {
    let reading = TechnicalReading::from_snapshot(snapshot, close);

    let mut score = 50.0;
    let mut signals = Vec::new();
    let groups: [&[Rule]; 4] = [
        &RSI_RULES,
        &MACD_RULES,
        &MOVING_AVERAGE_RULES,
        &BOLLINGER_RULES,
    ];
    for group in groups {
        if let Some(rule) = group.iter().find(|r| (r.applies)(&reading)) {
            score += rule.delta;
            signals.push(rule.label.to_string());
        }
    }

    SignalCategory {
        kind: CategoryKind::Technical,
        score: score.clamp(0.0, 100.0),
        signals,
    }
}

fn prediction_category(forecast: &Forecast, current_close: f64) -> SignalCategory {
    let mut score = 50.0;
    let mut signals = Vec::new();

    match forecast.last() {
        Some(point) if current_close > 0.0 => {
            let change_pct = (point.predicted_close - current_close) / current_close * 100.0;
            if change_pct.abs() >= FLAT_PREDICTION_PCT {
                score += (PREDICTION_POINTS_PER_PCT * change_pct)
                    .clamp(-PREDICTION_POINTS_CAP, PREDICTION_POINTS_CAP);
                let direction = if change_pct > 0.0 { "gain" } else { "drop" };
                signals.push(format!(
                    "Model projects {change_pct:+.2}% {direction} over {} day(s)",
                    forecast.horizon
                ));
            } else {
                signals.push("Model projects a roughly flat close".to_string());
            }
        }
        _ => signals.push("Prediction unavailable".to_string()),
    }

    SignalCategory {
        kind: CategoryKind::Prediction,
        score: score.clamp(0.0, 100.0),
        signals,
    }
}

fn trend_category(series: &[PriceBar]) -> SignalCategory {
    let mut score: f64 = 50.0;
    let mut signals = Vec::new();

    let window = &series[series.len().saturating_sub(LOOKBACK_DAYS)..];
    let closes = types::market_data::closes(window);

    match (stats::linear_slope(&closes), stats::mean(&closes)) {
        (Some(slope), Some(mean)) if mean > 0.0 => {
            let slope_pct = slope / mean * 100.0;
            if slope_pct > STRONG_TREND_PCT {
                score += 15.0;
                signals.push("Strong recent uptrend".to_string());
            } else if slope_pct > MODERATE_TREND_PCT {
                score += 10.0;
                signals.push("Moderate recent uptrend".to_string());
            } else if slope_pct < -STRONG_TREND_PCT {
                score -= 15.0;
                signals.push("Strong recent downtrend".to_string());
            } else if slope_pct < -MODERATE_TREND_PCT {
                score -= 10.0;
                signals.push("Moderate recent downtrend".to_string());
            } else {
                signals.push("Sideways price action".to_string());
            }

            // Volatility is commentary only; it never moves the score
            if let Some(std) = stats::std_dev(&closes) {
                let cv = std / mean;
                if cv > HIGH_VOLATILITY_CV {
                    signals.push("High volatility (risky)".to_string());
                } else if cv < LOW_VOLATILITY_CV {
                    signals.push("Low volatility (stable)".to_string());
                }
            }
        }
        _ => signals.push("Trend unavailable".to_string()),
    }

    SignalCategory {
        kind: CategoryKind::Trend,
        score: score.clamp(0.0, 100.0),
        signals,
    }
}

fn volume_category(series: &[PriceBar]) -> SignalCategory {
    let mut score: f64 = 50.0;
    let mut signals = Vec::new();

    let window = &series[series.len().saturating_sub(LOOKBACK_DAYS)..];
    let volumes = types::market_data::volumes(window);
    let latest_volume = window.last().map_or(0.0, |b| b.volume);

    let ratio = match stats::mean(&volumes) {
        Some(avg) if avg > 0.0 => latest_volume / avg,
        _ => 1.0,
    };

    let price_change = if series.len() >= 2 {
        let prev = series[series.len() - 2].close;
        let last = series[series.len() - 1].close;
        if prev != 0.0 { (last - prev) / prev } else { 0.0 }
    } else {
        0.0
    };

    match VolumeLevel::classify(ratio) {
        VolumeLevel::High if price_change > 0.0 => {
            score += 10.0;
            signals.push("High volume on up move (bullish)".to_string());
        }
        VolumeLevel::High if price_change < 0.0 => {
            score -= 10.0;
            signals.push("High volume on down move (bearish)".to_string());
        }
        VolumeLevel::Low => {
            score -= 5.0;
            signals.push("Low volume (weak conviction)".to_string());
        }
        _ => signals.push("Normal volume".to_string()),
    }

    SignalCategory {
        kind: CategoryKind::Volume,
        score: score.clamp(0.0, 100.0),
        signals,
    }
}

/// One-line summary from the verdict and the leading signals.
fn summarize(verdict: Verdict, categories: &[SignalCategory]) -> String {
    let leading: Vec<&str> = categories
        .iter()
        .filter(|c| {
            matches!(
                c.kind,
                CategoryKind::Technical | CategoryKind::Prediction | CategoryKind::Trend
            )
        })
        .filter_map(|c| c.signals.first())
        .map(|s| s.as_str())
        .collect();

    if leading.is_empty() {
        format!("{verdict} recommendation")
    } else {
        format!("{verdict} recommendation based on: {}", leading.join("; "))
    }
}

// =============================================================================
// Tests
// =============================================================================
