//! Relative Strength Index (RSI) indicator.

/// Neutral reading returned when there is not enough data.
pub const RSI_NEUTRAL: f64 = 50.0;

/// RSI (Relative Strength Index) indicator.
///
/// Compares the simple average of gains to the simple average of losses over
/// the trailing `period` changes (not Wilder-smoothed).
/// Values range from 0-100:
/// - Below 30: Oversold
/// - Above 70: Overbought
pub struct Rsi {
    period: usize,
}

impl Default for Rsi {
    fn default() -> Self {
        Self { period: 14 }
    }
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        Self { period }
    }

    pub fn min_periods(&self) -> usize {
        self.period + 1
    }

    /// Calculate RSI from a close series.
    ///
    /// Returns 50 with fewer than `period + 1` closes or when the window
    /// contains no movement at all.
    pub fn calculate(&self, closes: &[f64]) -> f64 {
        if self.period == 0 || closes.len() < self.min_periods() {
            return RSI_NEUTRAL;
        }

        let window = &closes[closes.len() - self.period - 1..];
        let (gains, losses) = window.windows(2).fold((0.0, 0.0), |(g, l), pair| {
            let change = pair[1] - pair[0];
            if change > 0.0 {
                (g + change, l)
            } else {
                (g, l - change)
            }
        });

        let avg_gain = gains / self.period as f64;
        let avg_loss = losses / self.period as f64;

        if avg_loss == 0.0 {
            return if avg_gain == 0.0 { RSI_NEUTRAL } else { 100.0 };
        }

        let rs = avg_gain / avg_loss;
        (100.0 - (100.0 / (1.0 + rs))).clamp(0.0, 100.0)
    }
}
