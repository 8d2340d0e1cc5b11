//! Relative volume.

use super::sma::sma;
use crate::types::PriceBar;

/// Last session's volume over its trailing average.
///
/// Returns 1.0 (no information) for an empty series or a zero average.
pub fn volume_ratio(bars: &[PriceBar], period: usize) -> f64 {
    let volumes: Vec<f64> = bars.iter().map(|b| b.volume).collect();
    let Some(&last) = volumes.last() else {
        return 1.0;
    };
    let average = sma(&volumes, period);
    if average <= 0.0 {
        return 1.0;
    }
    last / average
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn bars(volumes: &[f64]) -> Vec<PriceBar> {
        let day = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        volumes
            .iter()
            .map(|&v| PriceBar::new(day, 10.0, 10.0, 10.0, 10.0, v))
            .collect()
    }

    #[test]
    fn test_volume_ratio_constant_is_one() {
        assert_eq!(volume_ratio(&bars(&[1_000_000.0; 30]), 20), 1.0);
    }

    #[test]
    fn test_volume_ratio_spike() {
        let mut volumes = vec![100.0; 19];
        volumes.push(290.0);
        // average = (1900 + 290) / 20 = 109.5
        assert!((volume_ratio(&bars(&volumes), 20) - 290.0 / 109.5).abs() < 1e-12);
    }

    #[test]
    fn test_volume_ratio_guards() {
        assert_eq!(volume_ratio(&[], 20), 1.0);
        assert_eq!(volume_ratio(&bars(&[0.0; 25]), 20), 1.0);
    }
}
