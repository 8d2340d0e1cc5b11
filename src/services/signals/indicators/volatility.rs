//! Return volatility and volatility-regime classification.

use super::sma::{mean, std_dev};
use crate::types::{VolatilityClass, VolatilityRegime};

/// Trading sessions per year used for annualization.
pub const TRADING_DAYS: f64 = 252.0;

/// Daily simple returns; pairs with a non-positive base are skipped.
pub fn daily_returns(closes: &[f64]) -> Vec<f64> {
    closes
        .windows(2)
        .filter(|pair| pair[0] > 0.0)
        .map(|pair| pair[1] / pair[0] - 1.0)
        .collect()
}

/// Annualized standard deviation of the trailing `period` daily returns.
///
/// Uses whatever returns are available when the series is short; fewer than
/// two returns yields zero.
pub fn annualized_volatility(closes: &[f64], period: usize) -> f64 {
    let returns = daily_returns(closes);
    let recent = &returns[returns.len().saturating_sub(period)..];
    if recent.len() < 2 {
        return 0.0;
    }
    std_dev(recent, mean(recent)) * TRADING_DAYS.sqrt()
}

/// Classifies short-window volatility against its own recent history.
pub struct VolatilityRegimeClassifier {
    short_period: usize,
    history: usize,
}

impl Default for VolatilityRegimeClassifier {
    fn default() -> Self {
        Self {
            short_period: 10,
            history: 50,
        }
    }
}

impl VolatilityRegimeClassifier {
    /// Minimum number of rolling volatility samples needed for a rank.
    const MIN_SAMPLES: usize = 10;

    pub fn new(short_period: usize, history: usize) -> Self {
        Self {
            short_period: short_period.max(2),
            history: history.max(Self::MIN_SAMPLES),
        }
    }

    /// Rank (0-100) of the current short-window volatility among the rolling
    /// values of the last `history` sessions. Ties count half.
    pub fn calculate(&self, closes: &[f64]) -> VolatilityRegime {
        // A full window ends at index `short_period` or later.
        if closes.len() <= self.short_period {
            return VolatilityRegime::default();
        }

        let first_end = (self.short_period).max(closes.len().saturating_sub(self.history));
        let samples: Vec<f64> = (first_end..closes.len())
            .map(|end| {
                annualized_volatility(&closes[end - self.short_period..=end], self.short_period)
            })
            .collect();

        if samples.len() < Self::MIN_SAMPLES {
            return VolatilityRegime::default();
        }

        let Some(&current) = samples.last() else {
            return VolatilityRegime::default();
        };
        let below = samples.iter().filter(|v| **v < current).count() as f64;
        let equal = samples.iter().filter(|v| **v == current).count() as f64;
        let rank = (below + 0.5 * equal) / samples.len() as f64 * 100.0;

        let class = if rank < 25.0 {
            VolatilityClass::Low
        } else if rank > 75.0 {
            VolatilityClass::High
        } else {
            VolatilityClass::Normal
        };

        VolatilityRegime { rank, class }
    }
}
