//! Stochastic Oscillator indicator.

use crate::types::{OscillatorSignal, PriceBar, StochasticValue};

/// Stochastic Oscillator.
///
/// Compares closing price to price range over a period:
/// %K = (Current Close - Lowest Low) / (Highest High - Lowest Low) * 100
/// %D = SMA(%K, d_period)
///
/// Signals:
/// - Both below 20: Oversold
/// - Both above 80: Overbought
pub struct Stochastic {
    k_period: usize,
    d_period: usize,
}

impl Default for Stochastic {
    fn default() -> Self {
        Self {
            k_period: 14,
            d_period: 3,
        }
    }
}

impl Stochastic {
    pub fn new(k_period: usize, d_period: usize) -> Self {
        Self {
            k_period: k_period.max(1),
            d_period: d_period.max(1),
        }
    }

    /// Bars needed for `d_period` full %K windows.
    pub fn min_periods(&self) -> usize {
        self.k_period + self.d_period - 1
    }

    /// %K for the window ending at `end` (inclusive).
    fn percent_k(&self, bars: &[PriceBar], end: usize) -> f64 {
        let window = &bars[(end + 1 - self.k_period)..=end];

        let lowest_low = window.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
        let highest_high = window
            .iter()
            .map(|b| b.high)
            .fold(f64::NEG_INFINITY, f64::max);

        let range = highest_high - lowest_low;
        if range > 0.0 {
            ((bars[end].close - lowest_low) / range * 100.0).clamp(0.0, 100.0)
        } else {
            50.0
        }
    }

    /// Returns `{50, 50, neutral}` when there are too few bars.
    pub fn calculate(&self, bars: &[PriceBar]) -> StochasticValue {
        if bars.len() < self.min_periods() {
            return StochasticValue::default();
        }

        let first_end = bars.len() - self.d_period;
        let k_values: Vec<f64> = (first_end..bars.len())
            .map(|end| self.percent_k(bars, end))
            .collect();

        let k = k_values.last().copied().unwrap_or(50.0);
        let d = k_values.iter().sum::<f64>() / k_values.len() as f64;

        let signal = if k > 80.0 && d > 80.0 {
            OscillatorSignal::Overbought
        } else if k < 20.0 && d < 20.0 {
            OscillatorSignal::Oversold
        } else {
            OscillatorSignal::Neutral
        };

        StochasticValue { k, d, signal }
    }
}
