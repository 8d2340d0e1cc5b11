//! Trend classification from price versus its moving averages.

use crate::types::Trend;

/// Classify the latest bar.
///
/// - Upward: close > SMA20 > SMA50 and close rose vs the previous bar
/// - Downward: close < SMA20 < SMA50 and close fell vs the previous bar
/// - Sideways otherwise, including series shorter than two bars
pub fn classify_trend(closes: &[f64], sma20: f64, sma50: f64) -> Trend {
    let [.., previous, close] = closes else {
        return Trend::Sideways;
    };

    if *close > sma20 && sma20 > sma50 && close > previous {
        Trend::Upward
    } else if *close < sma20 && sma20 < sma50 && close < previous {
        Trend::Downward
    } else {
        Trend::Sideways
    }
}
