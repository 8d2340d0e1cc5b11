//! Breakout signal engine.
//!
//! Turns one ordered bar series into a fused [`BreakoutStrategy`]: indicators
//! feed the pattern detector, the support/resistance analyzer and the
//! heuristic ensemble, and the fusion scorer tallies everything into a call.
//! The engine is synchronous and holds no mutable state.

pub mod ensemble;
pub mod fusion;
pub mod indicators;
pub mod levels;
pub mod patterns;
pub mod pivots;

pub use ensemble::{all_heuristics, Entropy, FeatureVector, LiveJitter, NoJitter, ScoringHeuristic};
pub use indicators::compute_indicators;
pub use levels::SupportResistanceAnalyzer;
pub use patterns::detect_patterns;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use tracing::debug;

use crate::config::EngineConfig;
use crate::types::{
    BreakoutStrategy, DataQuality, EnsembleScore, PriceBar, SignalDirection,
};

/// Note attached to results computed from too little history.
pub const INSUFFICIENT_DATA_NOTE: &str = "Insufficient historical data";

/// Confidence (0-100) reported for neutral fallbacks.
const DEFAULT_CONFIDENCE: f64 = 10.0;

/// The analysis pipeline with its heuristics.
pub struct BreakoutEngine {
    config: EngineConfig,
    heuristics: Vec<Box<dyn ScoringHeuristic>>,
}

impl Default for BreakoutEngine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl BreakoutEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            heuristics: all_heuristics(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Deterministic analysis: no jitter, timestamp from the last bar.
    pub fn analyze(&self, symbol: &str, bars: &[PriceBar], current_price: f64) -> BreakoutStrategy {
        self.analyze_with(symbol, bars, current_price, &mut NoJitter, None)
    }

    /// Full analysis with an explicit entropy source and optional timestamp.
    ///
    /// A non-positive `current_price` falls back to the last close.
    pub fn analyze_with(
        &self,
        symbol: &str,
        bars: &[PriceBar],
        current_price: f64,
        entropy: &mut dyn Entropy,
        as_of: Option<DateTime<Utc>>,
    ) -> BreakoutStrategy {
        let price = resolve_price(bars, current_price);
        let last_calculated = as_of.unwrap_or_else(|| timestamp_of(bars.last().map(|b| b.date)));

        debug!(symbol, bars = bars.len(), price, "analyzing series");

        if bars.len() < self.config.min_bars {
            debug!(symbol, bars = bars.len(), min = self.config.min_bars, "insufficient history");
            return self.neutral_strategy(symbol, bars, price, last_calculated);
        }

        let indicators = compute_indicators(bars);
        let patterns = detect_patterns(bars, price);
        let support_resistance = self.config.levels.analyze(bars, price);

        let features = FeatureVector::extract(bars, &indicators, &patterns);
        let ensemble = ensemble::run_ensemble(&self.heuristics, &features, entropy);

        let card = fusion::score(price, &indicators, &patterns, &ensemble);
        let signal = card.direction();
        let risk_levels =
            fusion::risk_levels(signal, price, indicators.atr.value, &support_resistance);

        debug!(
            symbol,
            signal = signal.label(),
            bullish = card.bullish,
            bearish = card.bearish,
            patterns = patterns.len(),
            "analysis complete"
        );

        BreakoutStrategy {
            symbol: symbol.to_string(),
            current_price: price,
            signal,
            probability: card.probability(),
            confidence: card.confidence(),
            current_trend: indicators.trend,
            indicators,
            patterns,
            support_resistance,
            ensemble,
            risk_levels,
            bullish_score: card.bullish,
            bearish_score: card.bearish,
            recommendation: fusion::recommendation(signal, &card.reasons),
            reasons: card.reasons,
            data_quality: DataQuality {
                bars: bars.len(),
                sufficient: true,
                note: None,
            },
            last_calculated,
        }
    }

    /// Neutral result for a series too short to analyze. Indicators are
    /// still computed best-effort from whatever bars there are.
    pub fn neutral_strategy(
        &self,
        symbol: &str,
        bars: &[PriceBar],
        price: f64,
        last_calculated: DateTime<Utc>,
    ) -> BreakoutStrategy {
        let indicators = compute_indicators(bars);
        let support_resistance = self.config.levels.analyze(bars, price);
        let risk_levels = fusion::risk_levels(
            SignalDirection::Neutral,
            price,
            indicators.atr.value,
            &support_resistance,
        );
        let reasons = vec![INSUFFICIENT_DATA_NOTE.to_string()];

        BreakoutStrategy {
            symbol: symbol.to_string(),
            current_price: price,
            signal: SignalDirection::Neutral,
            probability: 0.5,
            confidence: DEFAULT_CONFIDENCE,
            current_trend: indicators.trend,
            indicators,
            patterns: Vec::new(),
            support_resistance,
            ensemble: EnsembleScore::default(),
            risk_levels,
            bullish_score: 0,
            bearish_score: 0,
            recommendation: fusion::recommendation(SignalDirection::Neutral, &reasons),
            reasons,
            data_quality: DataQuality {
                bars: bars.len(),
                sufficient: false,
                note: Some(INSUFFICIENT_DATA_NOTE.to_string()),
            },
            last_calculated,
        }
    }
}

/// Analyze with a default engine.
pub fn analyze(symbol: &str, bars: &[PriceBar], current_price: f64) -> BreakoutStrategy {
    BreakoutEngine::default().analyze(symbol, bars, current_price)
}

fn resolve_price(bars: &[PriceBar], current_price: f64) -> f64 {
    match bars.last() {
        Some(last) if current_price <= 0.0 => last.close,
        _ => current_price.max(0.0),
    }
}

/// Midnight UTC of `date`, or the epoch when there is no bar.
pub fn timestamp_of(date: Option<NaiveDate>) -> DateTime<Utc> {
    date.and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Trend;

    fn bars(closes: &[f64]) -> Vec<PriceBar> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| {
                PriceBar::new(start + chrono::Days::new(i as u64), c, c * 1.01, c * 0.99, c, 1e5)
            })
            .collect()
    }

    #[test]
    fn test_short_series_is_neutral() {
        let series = bars(&[10.0, 10.5, 11.0, 10.8, 11.2]);
        let result = analyze("TEST", &series, 11.2);
        assert_eq!(result.signal, SignalDirection::Neutral);
        assert_eq!(result.indicators.rsi, 50.0);
        assert_eq!(result.confidence, 10.0);
        assert_eq!(result.probability, 0.5);
        assert!(!result.data_quality.sufficient);
        assert_eq!(result.data_quality.note.as_deref(), Some(INSUFFICIENT_DATA_NOTE));
        assert_eq!(result.current_trend, Trend::Sideways);
    }

    #[test]
    fn test_short_series_keeps_best_effort_indicators() {
        let closes: Vec<f64> = (0..19).map(|i| 10.0 + (i % 4) as f64 * 0.5 + i as f64 * 0.2).collect();
        let series = bars(&closes);
        let last = closes[18];
        let result = analyze("TEST", &series, 0.0);

        assert!(!result.data_quality.sufficient);
        assert_eq!(result.signal, SignalDirection::Neutral);
        assert_eq!(result.confidence, 10.0);
        assert_eq!(result.indicators.sma20, last);
        assert_ne!(result.indicators.rsi, 50.0);
        assert!(result.indicators.atr.value > 0.0);
        assert_eq!(result.indicators, compute_indicators(&series));
        assert!(result.risk_levels.stop_loss < result.risk_levels.entry);
    }

    #[test]
    fn test_price_falls_back_to_last_close() {
        let series = bars(&[10.0, 10.5, 11.0]);
        assert_eq!(analyze("TEST", &series, 0.0).current_price, 11.0);
        assert_eq!(analyze("TEST", &series, -3.0).current_price, 11.0);
        let empty = analyze("TEST", &[], -3.0);
        assert_eq!(empty.current_price, 0.0);
        assert!(empty.support_resistance.support.is_empty());
        assert!(empty.support_resistance.resistance.is_empty());
    }

    #[test]
    fn test_timestamp_from_last_bar() {
        let series = bars(&vec![100.0; 30]);
        let result = analyze("TEST", &series, 100.0);
        assert_eq!(result.last_calculated.date_naive(), series[29].date);

        let as_of = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();
        let explicit =
            BreakoutEngine::default().analyze_with("TEST", &series, 100.0, &mut NoJitter, Some(as_of));
        assert_eq!(explicit.last_calculated, as_of);
        assert_eq!(timestamp_of(None), DateTime::<Utc>::default());
    }

    #[test]
    fn test_custom_min_bars() {
        let engine = BreakoutEngine::new(EngineConfig {
            min_bars: 3,
            ..EngineConfig::default()
        });
        let result = engine.analyze("TEST", &bars(&[10.0, 10.5, 11.0, 11.5]), 11.5);
        assert!(result.data_quality.sufficient);
    }
}
