use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::indicators::{IndicatorSet, Trend};
use super::levels::SupportResistance;
use super::patterns::Pattern;

/// Threshold on a [-1, 1] model value separating a call from neutral.
pub const MODEL_DIRECTION_THRESHOLD: f64 = 0.15;

/// Direction of a trading signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SignalDirection {
    Bullish,
    Bearish,
    #[default]
    Neutral,
}

impl SignalDirection {
    /// Create direction from a signed value in [-1, 1].
    pub fn from_value(value: f64) -> Self {
        if value > MODEL_DIRECTION_THRESHOLD {
            SignalDirection::Bullish
        } else if value < -MODEL_DIRECTION_THRESHOLD {
            SignalDirection::Bearish
        } else {
            SignalDirection::Neutral
        }
    }

    /// Get display label for this direction.
    pub fn label(&self) -> &'static str {
        match self {
            SignalDirection::Bullish => "bullish",
            SignalDirection::Bearish => "bearish",
            SignalDirection::Neutral => "neutral",
        }
    }
}

/// Output of one ensemble heuristic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelScore {
    /// Heuristic identifier (e.g. "trend_momentum").
    pub source: String,
    /// Signed score in [-1, 1].
    pub value: f64,
    /// Self-reported confidence in [0, 1].
    pub confidence: f64,
    pub direction: SignalDirection,
    pub rationale: String,
}

/// Confidence-weighted combination of all model scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnsembleScore {
    pub value: f64,
    pub confidence: f64,
    pub direction: SignalDirection,
    pub models: Vec<ModelScore>,
}

impl Default for EnsembleScore {
    fn default() -> Self {
        Self {
            value: 0.0,
            confidence: 0.0,
            direction: SignalDirection::Neutral,
            models: Vec::new(),
        }
    }
}

/// Suggested entry, stop and target for the fused call.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskLevels {
    pub entry: f64,
    pub stop_loss: f64,
    pub target: f64,
    pub risk_reward: f64,
}

/// How much history backed the result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataQuality {
    pub bars: usize,
    pub sufficient: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Final fused signal for one symbol and series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakoutStrategy {
    pub symbol: String,
    pub current_price: f64,
    pub signal: SignalDirection,
    /// Probability of the call playing out, in [0.5, 0.9].
    pub probability: f64,
    /// Score-derived confidence on a 0-100 scale.
    pub confidence: f64,
    /// Trend of the latest bar, mirrored from the indicators.
    pub current_trend: Trend,
    pub indicators: IndicatorSet,
    pub patterns: Vec<Pattern>,
    pub support_resistance: SupportResistance,
    pub ensemble: EnsembleScore,
    pub risk_levels: RiskLevels,
    pub bullish_score: u32,
    pub bearish_score: u32,
    /// Names of the signals that contributed points.
    pub reasons: Vec<String>,
    pub recommendation: String,
    pub data_quality: DataQuality,
    pub last_calculated: DateTime<Utc>,
}
