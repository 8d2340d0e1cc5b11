//! Pattern detection over a bar series.

pub mod candlestick;
pub mod chart;

pub use candlestick::detect_candlestick_patterns;
pub use chart::detect_chart_patterns;

use crate::types::{Pattern, PriceBar, SignalDirection};

/// Candlestick formations followed by chart formations.
pub fn detect_patterns(bars: &[PriceBar], current_price: f64) -> Vec<Pattern> {
    let mut patterns = detect_candlestick_patterns(bars);
    patterns.extend(detect_chart_patterns(bars, current_price));
    patterns
}

/// Confidence-weighted net direction of a pattern set, in [-1, 1].
pub fn pattern_bias(patterns: &[Pattern]) -> f64 {
    let total: f64 = patterns.iter().map(Pattern::confidence).sum();
    if total <= 0.0 {
        return 0.0;
    }
    let net: f64 = patterns
        .iter()
        .map(|p| match p.direction() {
            SignalDirection::Bullish => p.confidence(),
            SignalDirection::Bearish => -p.confidence(),
            SignalDirection::Neutral => 0.0,
        })
        .sum();
    (net / total).clamp(-1.0, 1.0)
}
