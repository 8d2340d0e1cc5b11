//! Heuristic ensemble.
//!
//! Independent scoring heuristics read a shared feature vector and each emit
//! a signed score in [-1, 1] with a self-assessed confidence. The combiner
//! weights every score by its confidence.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::indicators::{closes, daily_returns};
use super::patterns::pattern_bias;
use crate::types::{EnsembleScore, IndicatorSet, ModelScore, Pattern, PriceBar, SignalDirection};

/// Returns the attention heuristic looks back over.
const ATTENTION_WINDOW: usize = 10;
/// Closes the up/down ratio looks back over.
const BREADTH_WINDOW: usize = 10;

fn unit(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator - 1.0
    } else {
        0.0
    }
}

/// Normalized inputs shared by every heuristic. Scalar features are in
/// [-1, 1] (volatility in [0, 1]).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureVector {
    pub rsi: f64,
    /// Close relative to SMA20.
    pub trend_short: f64,
    /// Close relative to SMA50.
    pub trend_long: f64,
    /// 10-bar rate of change.
    pub momentum: f64,
    /// Change in the 5-bar rate of change.
    pub acceleration: f64,
    pub volatility: f64,
    pub volume: f64,
    /// Close relative to the Bollinger middle, in half-band widths.
    pub band_position: f64,
    pub macd: f64,
    /// Net share of up closes over the last 10 changes.
    pub up_ratio: f64,
    pub pattern_bias: f64,
    pub pattern_count: usize,
    /// Most recent daily returns, oldest first.
    pub recent_returns: Vec<f64>,
}

impl FeatureVector {
    pub fn extract(bars: &[PriceBar], indicators: &IndicatorSet, patterns: &[Pattern]) -> Self {
        let closes = closes(bars);
        let Some(&close) = closes.last() else {
            return Self::default();
        };
        let n = closes.len();

        let momentum = if n > 10 {
            unit(ratio(close, closes[n - 11]) * 10.0)
        } else {
            0.0
        };
        let acceleration = if n > 10 {
            let current = ratio(close, closes[n - 6]);
            let previous = ratio(closes[n - 6], closes[n - 11]);
            unit((current - previous) * 20.0)
        } else {
            0.0
        };

        let band = &indicators.bollinger;
        let half_width = band.upper - band.middle;
        let band_position = if half_width > 0.0 {
            unit((close - band.middle) / half_width)
        } else {
            0.0
        };

        let macd = if close > 0.0 {
            unit(indicators.macd.histogram / close * 500.0)
        } else {
            0.0
        };

        let recent = &closes[n.saturating_sub(BREADTH_WINDOW + 1)..];
        let (ups, downs) = recent.windows(2).fold((0usize, 0usize), |(u, d), pair| {
            if pair[1] > pair[0] {
                (u + 1, d)
            } else if pair[1] < pair[0] {
                (u, d + 1)
            } else {
                (u, d)
            }
        });
        let changes = recent.len().saturating_sub(1);
        let up_ratio = if changes > 0 {
            (ups as f64 - downs as f64) / changes as f64
        } else {
            0.0
        };

        let returns = daily_returns(&closes);
        let recent_returns = returns[returns.len().saturating_sub(ATTENTION_WINDOW)..].to_vec();

        Self {
            rsi: unit((indicators.rsi - 50.0) / 50.0),
            trend_short: unit(ratio(close, indicators.sma20) * 10.0),
            trend_long: unit(ratio(close, indicators.sma50) * 5.0),
            momentum,
            acceleration,
            volatility: indicators.volatility.clamp(0.0, 1.0),
            volume: unit(indicators.volume_ratio - 1.0),
            band_position,
            macd,
            up_ratio,
            pattern_bias: pattern_bias(patterns),
            pattern_count: patterns.len(),
            recent_returns,
        }
    }
}

/// A scoring heuristic over the shared features.
pub trait ScoringHeuristic: Send + Sync {
    /// Stable identifier, reported as the score's source.
    fn id(&self) -> &'static str;

    fn name(&self) -> &'static str;

    fn score(&self, features: &FeatureVector) -> ModelScore;
}

fn model_score(source: &str, value: f64, confidence: f64, rationale: String) -> ModelScore {
    let value = unit(value);
    ModelScore {
        source: source.to_string(),
        value,
        confidence: confidence.clamp(0.0, 1.0),
        direction: SignalDirection::from_value(value),
        rationale,
    }
}

/// Follows price: momentum, trend and breadth push in the direction of travel.
pub struct TrendMomentum;

impl ScoringHeuristic for TrendMomentum {
    fn id(&self) -> &'static str {
        "trend_momentum"
    }

    fn name(&self) -> &'static str {
        "Trend Momentum"
    }

    fn score(&self, features: &FeatureVector) -> ModelScore {
        let raw = 0.5 * features.rsi
            + 0.8 * features.trend_short
            + 0.6 * features.trend_long
            + 1.0 * features.momentum
            + 0.4 * features.acceleration
            + 0.9 * features.up_ratio
            + 0.5 * features.macd;
        let value = raw.tanh();
        let confidence = (0.35 + 0.5 * value.abs()) * (1.0 - 0.5 * features.volatility);
        model_score(
            self.id(),
            value,
            confidence,
            format!(
                "momentum {:+.2}, trend {:+.2}, breadth {:+.2}",
                features.momentum, features.trend_short, features.up_ratio
            ),
        )
    }
}

/// Fades stretched prices; loses confidence when a strong trend is running.
///
/// A stretch that every recent close has extended is a persistent run, not an
/// overreaction, so both the fade and its confidence shrink with breadth in
/// the direction of the stretch.
pub struct MeanReversion;

impl MeanReversion {
    /// Share of recent closes moving the same way as the RSI stretch, in [0, 1].
    fn persistence(features: &FeatureVector) -> f64 {
        if features.rsi == 0.0 {
            return 0.0;
        }
        (features.up_ratio * features.rsi.signum()).clamp(0.0, 1.0)
    }
}

impl ScoringHeuristic for MeanReversion {
    fn id(&self) -> &'static str {
        "mean_reversion"
    }

    fn name(&self) -> &'static str {
        "Mean Reversion"
    }

    fn score(&self, features: &FeatureVector) -> ModelScore {
        let raw = -0.9 * features.rsi - 0.7 * features.band_position - 0.4 * features.trend_short;
        let persistence = Self::persistence(features);
        let value = raw.tanh() * (1.0 - 0.9 * persistence);
        let trend_strength = (features.trend_short.abs() + features.trend_long.abs()).min(1.0);
        let confidence = (0.2 + 0.6 * (1.0 - trend_strength)) * (1.0 - 0.75 * persistence);
        model_score(
            self.id(),
            value,
            confidence,
            format!(
                "rsi {:+.2}, band position {:+.2}, trend strength {:.2}, persistence {:.2}",
                features.rsi, features.band_position, trend_strength, persistence
            ),
        )
    }
}

/// Recency-weighted attention over recent returns, blended with the pattern
/// bias. Confidence grows with the number of detected patterns.
pub struct PatternAttention;

impl PatternAttention {
    /// Softmax weights favouring the most recent entries.
    fn attention_weights(len: usize) -> Vec<f64> {
        if len == 0 {
            return Vec::new();
        }
        let scores: Vec<f64> = (0..len).map(|i| 2.0 * (i + 1) as f64 / len as f64).collect();
        let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let exps: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
        let total: f64 = exps.iter().sum();
        exps.into_iter().map(|e| e / total).collect()
    }
}

impl ScoringHeuristic for PatternAttention {
    fn id(&self) -> &'static str {
        "pattern_attention"
    }

    fn name(&self) -> &'static str {
        "Pattern Attention"
    }

    fn score(&self, features: &FeatureVector) -> ModelScore {
        let weights = Self::attention_weights(features.recent_returns.len());
        let attention: f64 = features
            .recent_returns
            .iter()
            .zip(&weights)
            .map(|(r, w)| w * (r * 100.0).tanh())
            .sum();

        let volume_push = 0.3 * features.volume * attention.signum();
        let value = (1.5 * attention + 0.8 * features.pattern_bias + volume_push).tanh();
        let confidence = 0.3 + 0.5 * (features.pattern_count as f64 / 3.0).min(1.0);
        model_score(
            self.id(),
            value,
            confidence,
            format!(
                "attention {:+.2} over {} returns, pattern bias {:+.2} from {} patterns",
                attention,
                features.recent_returns.len(),
                features.pattern_bias,
                features.pattern_count
            ),
        )
    }
}

/// Every heuristic the ensemble runs.
pub fn all_heuristics() -> Vec<Box<dyn ScoringHeuristic>> {
    vec![
        Box::new(TrendMomentum),
        Box::new(MeanReversion),
        Box::new(PatternAttention),
    ]
}

/// Source of per-model perturbation.
pub trait Entropy {
    /// Offset added to one model value.
    fn jitter(&mut self) -> f64;
}

/// Deterministic: adds nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoJitter;

impl Entropy for NoJitter {
    fn jitter(&mut self) -> f64 {
        0.0
    }
}

/// Uniform noise in `[-amplitude, amplitude]` from a seeded generator.
#[derive(Debug, Clone)]
pub struct LiveJitter {
    rng: StdRng,
    amplitude: f64,
}

impl LiveJitter {
    pub const DEFAULT_AMPLITUDE: f64 = 0.05;

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            amplitude: Self::DEFAULT_AMPLITUDE,
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            amplitude: Self::DEFAULT_AMPLITUDE,
        }
    }
}

impl Entropy for LiveJitter {
    fn jitter(&mut self) -> f64 {
        self.rng.gen_range(-self.amplitude..=self.amplitude)
    }
}

/// Confidence-weighted combination of model scores.
pub fn combine(models: Vec<ModelScore>) -> EnsembleScore {
    let total: f64 = models.iter().map(|m| m.confidence).sum();
    if total <= 0.0 {
        return EnsembleScore {
            models,
            ..EnsembleScore::default()
        };
    }

    let value = unit(models.iter().map(|m| m.value * m.confidence).sum::<f64>() / total);
    let confidence = models.iter().map(|m| m.confidence * m.confidence).sum::<f64>() / total;

    EnsembleScore {
        value,
        confidence: confidence.clamp(0.0, 1.0),
        direction: SignalDirection::from_value(value),
        models,
    }
}

/// Score every heuristic, perturb through `entropy`, and combine.
pub fn run_ensemble(
    heuristics: &[Box<dyn ScoringHeuristic>],
    features: &FeatureVector,
    entropy: &mut dyn Entropy,
) -> EnsembleScore {
    let models = heuristics
        .iter()
        .map(|heuristic| {
            let mut score = heuristic.score(features);
            let jitter = entropy.jitter();
            if jitter != 0.0 {
                score.value = unit(score.value + jitter);
                score.direction = SignalDirection::from_value(score.value);
            }
            score
        })
        .collect();
    combine(models)
}
