//! Simple Moving Average (SMA) and the shared window statistics.

/// SMA (Simple Moving Average) indicator.
///
/// Trailing mean of the last `period` values. With fewer values than the
/// period the last available value is returned (0 for an empty series).
pub struct Sma {
    period: usize,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        Self { period }
    }

    pub fn min_periods(&self) -> usize {
        self.period
    }

    pub fn calculate(&self, values: &[f64]) -> f64 {
        sma(values, self.period)
    }
}

/// Trailing mean of `values` over `period`.
pub fn sma(values: &[f64], period: usize) -> f64 {
    if period == 0 || values.len() < period {
        return values.last().copied().unwrap_or(0.0);
    }
    values[values.len() - period..].iter().sum::<f64>() / period as f64
}

/// Arithmetic mean, 0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation around `mean`.
pub fn std_dev(values: &[f64], mean: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let variance: f64 =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sma_trailing_window() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(sma(&values, 3), 4.0);
        assert_eq!(Sma::new(5).calculate(&values), 3.0);
    }

    #[test]
    fn test_sma_insufficient_data_returns_last_value() {
        let values = [10.0, 11.0, 12.0];
        assert_eq!(sma(&values, 20), 12.0);
        assert_eq!(sma(&[], 20), 0.0);
    }

    #[test]
    fn test_std_dev() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let m = mean(&values);
        assert_eq!(m, 5.0);
        assert!((std_dev(&values, m) - 2.0).abs() < 1e-12);
        assert_eq!(std_dev(&[], 0.0), 0.0);
    }
}
