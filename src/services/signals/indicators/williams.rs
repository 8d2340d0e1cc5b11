//! Williams %R indicator.

use crate::types::{OscillatorSignal, PriceBar, WilliamsRValue};

/// Williams %R.
///
/// %R = (Highest High - Close) / (Highest High - Lowest Low) * -100
///
/// Ranges from -100 to 0: above -20 is overbought, below -80 oversold.
pub struct WilliamsR {
    period: usize,
}

impl Default for WilliamsR {
    fn default() -> Self {
        Self { period: 14 }
    }
}

impl WilliamsR {
    pub fn new(period: usize) -> Self {
        Self {
            period: period.max(1),
        }
    }

    pub fn min_periods(&self) -> usize {
        self.period
    }

    /// Returns `-50, neutral` when there are too few bars or no range.
    pub fn calculate(&self, bars: &[PriceBar]) -> WilliamsRValue {
        if bars.len() < self.period {
            return WilliamsRValue::default();
        }

        let window = &bars[bars.len() - self.period..];
        let highest_high = window
            .iter()
            .map(|b| b.high)
            .fold(f64::NEG_INFINITY, f64::max);
        let lowest_low = window.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
        let range = highest_high - lowest_low;

        let Some(last) = window.last() else {
            return WilliamsRValue::default();
        };
        if range <= 0.0 {
            return WilliamsRValue::default();
        }

        let value = ((highest_high - last.close) / range * -100.0).clamp(-100.0, 0.0);
        let signal = if value > -20.0 {
            OscillatorSignal::Overbought
        } else if value < -80.0 {
            OscillatorSignal::Oversold
        } else {
            OscillatorSignal::Neutral
        };

        WilliamsRValue { value, signal }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn bars(closes: &[f64]) -> Vec<PriceBar> {
        let start = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &c)| {
                PriceBar::new(start + chrono::Days::new(i as u64), c, c + 0.5, c - 0.5, c, 500.0)
            })
            .collect()
    }

    #[test]
    fn test_williams_insufficient_data() {
        assert_eq!(WilliamsR::default().calculate(&bars(&[1.0, 2.0])), WilliamsRValue::default());
    }

    #[test]
    fn test_williams_flat_has_no_range() {
        let flat: Vec<PriceBar> = bars(&[100.0; 20])
            .into_iter()
            .map(|mut b| {
                b.high = b.close;
                b.low = b.close;
                b
            })
            .collect();
        assert_eq!(WilliamsR::default().calculate(&flat).value, -50.0);
    }

    #[test]
    fn test_williams_overbought_and_oversold() {
        let up: Vec<f64> = (0..20).map(|i| 50.0 + i as f64).collect();
        let value = WilliamsR::default().calculate(&bars(&up));
        assert_eq!(value.signal, OscillatorSignal::Overbought);
        assert!((-100.0..=0.0).contains(&value.value));

        let down: Vec<f64> = (0..20).map(|i| 80.0 - i as f64).collect();
        let value = WilliamsR::default().calculate(&bars(&down));
        assert_eq!(value.signal, OscillatorSignal::Oversold);
        assert!((-100.0..=0.0).contains(&value.value));
    }
}
