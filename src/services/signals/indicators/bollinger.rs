//! Bollinger Bands indicator.

use super::sma::{mean, sma, std_dev};
use crate::types::BollingerValue;

/// Bollinger Bands indicator.
///
/// Consists of:
/// - Middle band: SMA(20)
/// - Upper band: SMA + 2 * StdDev
/// - Lower band: SMA - 2 * StdDev
///
/// With fewer closes than the period all three bands collapse onto the SMA
/// default (the last close).
pub struct BollingerBands {
    period: usize,
    std_dev_multiplier: f64,
}

impl Default for BollingerBands {
    fn default() -> Self {
        Self {
            period: 20,
            std_dev_multiplier: 2.0,
        }
    }
}

impl BollingerBands {
    pub fn new(period: usize, std_dev_multiplier: f64) -> Self {
        Self {
            period,
            std_dev_multiplier,
        }
    }

    pub fn min_periods(&self) -> usize {
        self.period
    }

    pub fn calculate(&self, closes: &[f64]) -> BollingerValue {
        if self.period == 0 || closes.len() < self.period {
            let middle = sma(closes, self.period);
            return BollingerValue {
                upper: middle,
                middle,
                lower: middle,
            };
        }

        let window = &closes[closes.len() - self.period..];
        let middle = mean(window);
        let deviation = std_dev(window, middle);

        BollingerValue {
            upper: middle + self.std_dev_multiplier * deviation,
            middle,
            lower: middle - self.std_dev_multiplier * deviation,
        }
    }
}
