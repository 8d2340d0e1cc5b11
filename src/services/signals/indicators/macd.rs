//! MACD (Moving Average Convergence Divergence) indicator.

use super::ema::{ema, ema_series};
use crate::types::MacdValue;

/// MACD indicator.
///
/// Shows the relationship between two EMAs:
/// - MACD Line = EMA(12) - EMA(26)
/// - Signal Line = EMA(9) of MACD Line
/// - Histogram = MACD Line - Signal Line
///
/// The MACD line series holds, for every prefix of at least `slow_period`
/// closes, the MACD of that prefix. Because each EMA is seeded from the start
/// of the series, that equals the streaming EMA difference at each index.
pub struct Macd {
    fast_period: usize,
    slow_period: usize,
    signal_period: usize,
}

impl Default for Macd {
    fn default() -> Self {
        Self {
            fast_period: 12,
            slow_period: 26,
            signal_period: 9,
        }
    }
}

impl Macd {
    pub fn new(fast_period: usize, slow_period: usize, signal_period: usize) -> Self {
        Self {
            fast_period: fast_period.min(slow_period),
            slow_period: slow_period.max(fast_period),
            signal_period,
        }
    }

    pub fn min_periods(&self) -> usize {
        self.slow_period
    }

    /// MACD line value at every prefix of at least `slow_period` closes.
    pub fn line_series(&self, closes: &[f64]) -> Vec<f64> {
        let fast = ema_series(closes, self.fast_period);
        let slow = ema_series(closes, self.slow_period);
        if fast.is_empty() || slow.is_empty() {
            return Vec::new();
        }

        // Align the EMAs (fast starts earlier)
        let offset = self.slow_period - self.fast_period;
        fast.iter()
            .skip(offset)
            .zip(slow.iter())
            .map(|(f, s)| f - s)
            .collect()
    }

    /// Returns all zeros with fewer than `slow_period` closes.
    pub fn calculate(&self, closes: &[f64]) -> MacdValue {
        let lines = self.line_series(closes);
        let Some(&line) = lines.last() else {
            return MacdValue::default();
        };

        let signal = ema(&lines, self.signal_period);

        MacdValue {
            line,
            signal,
            histogram: line - signal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_macd_insufficient_data() {
        let closes: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        assert_eq!(Macd::default().calculate(&closes), MacdValue::default());
    }

    #[test]
    fn test_macd_line_series_length() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
        assert_eq!(Macd::default().line_series(&closes).len(), 60 - 26 + 1);
    }

    #[test]
    fn test_macd_linear_series_is_constant_spread() {
        // For a linear series both EMAs lag by (period - 1) / 2 * slope.
        let closes: Vec<f64> = (0..80).map(|i| 100.0 + 2.0 * i as f64).collect();
        let macd = Macd::default().calculate(&closes);
        assert!((macd.line - 14.0).abs() < 1e-9, "line was {}", macd.line);
        assert!(macd.histogram.abs() < 1e-9);
    }

    #[test]
    fn test_macd_matches_prefix_recomputation() {
        let closes: Vec<f64> = (0..70)
            .map(|i| 100.0 + (i as f64 * 0.7).sin() * 5.0 + i as f64 * 0.3)
            .collect();
        let macd = Macd::default();
        let series = macd.line_series(&closes);
        for (j, value) in series.iter().enumerate() {
            let prefix = &closes[..26 + j];
            let expected = ema(prefix, 12) - ema(prefix, 26);
            assert!((value - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn test_macd_accelerating_series_is_positive() {
        let closes: Vec<f64> = (0..120).map(|i| 100.0 * 1.01f64.powi(i)).collect();
        let macd = Macd::default().calculate(&closes);
        assert!(macd.line > 0.0);
        assert!(macd.histogram > 0.0);
    }
}
