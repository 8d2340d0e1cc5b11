//! Average True Range (ATR) indicator.

use crate::types::{AtrValue, PriceBar};

/// ATR (Average True Range) indicator.
///
/// Simple average of true ranges over the trailing period:
/// TR = max(High-Low, |High-PrevClose|, |Low-PrevClose|)
///
/// With fewer than `period` true ranges the available ones are averaged;
/// fewer than two bars yields zero.
pub struct Atr {
    period: usize,
}

impl Default for Atr {
    fn default() -> Self {
        Self { period: 14 }
    }
}

impl Atr {
    pub fn new(period: usize) -> Self {
        Self {
            period: period.max(1),
        }
    }

    pub fn min_periods(&self) -> usize {
        self.period + 1
    }

    /// Calculate True Range.
    pub fn true_range(current: &PriceBar, previous: &PriceBar) -> f64 {
        let hl = current.high - current.low;
        let hc = (current.high - previous.close).abs();
        let lc = (current.low - previous.close).abs();
        hl.max(hc).max(lc)
    }

    pub fn calculate(&self, bars: &[PriceBar]) -> AtrValue {
        if bars.len() < 2 {
            return AtrValue::default();
        }

        let true_ranges: Vec<f64> = bars
            .windows(2)
            .map(|pair| Self::true_range(&pair[1], &pair[0]))
            .collect();
        let recent = &true_ranges[true_ranges.len().saturating_sub(self.period)..];
        let value = recent.iter().sum::<f64>() / recent.len() as f64;

        let close = bars.last().map(|b| b.close).unwrap_or(0.0);
        let normalized = if close > 0.0 { value / close * 100.0 } else { 0.0 };

        AtrValue { value, normalized }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn create_uptrend_candles(count: usize) -> Vec<PriceBar> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        (0..count)
            .map(|i| {
                let base = 100.0 + i as f64 * 1.5;
                PriceBar::new(
                    start + chrono::Days::new(i as u64),
                    base,
                    base + 2.0,
                    base - 1.0,
                    base + 1.0,
                    1000.0,
                )
            })
            .collect()
    }

    #[test]
    fn test_atr_min_periods() {
        assert_eq!(Atr::default().min_periods(), 15);
    }

    #[test]
    fn test_atr_single_bar_is_zero() {
        assert_eq!(Atr::default().calculate(&create_uptrend_candles(1)), AtrValue::default());
    }

    #[test]
    fn test_atr_value() {
        // Each bar: high - low = 3, gap from previous close is 0.5 up.
        let atr = Atr::default().calculate(&create_uptrend_candles(30));
        assert!((atr.value - 3.0).abs() < 1e-9, "ATR was {}", atr.value);
        let close = 100.0 + 29.0 * 1.5 + 1.0;
        assert!((atr.normalized - 3.0 / close * 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_true_range_uses_gap() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let prev = PriceBar::new(start, 10.0, 10.5, 9.5, 10.0, 1.0);
        let gap_up = PriceBar::new(start, 12.0, 12.5, 11.5, 12.0, 1.0);
        assert_eq!(Atr::true_range(&gap_up, &prev), 2.5);
    }
}
