//! Exponential Moving Average (EMA) indicator.

/// EMA (Exponential Moving Average) indicator.
///
/// Seeded with the SMA of the first `period` values, then smoothed forward
/// with multiplier `2 / (period + 1)`.
pub struct Ema {
    period: usize,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        Self { period }
    }

    pub fn min_periods(&self) -> usize {
        self.period
    }

    pub fn calculate(&self, values: &[f64]) -> f64 {
        ema(values, self.period)
    }
}

/// EMA at every index from `period - 1` onwards.
///
/// Returns an empty vector when there are fewer than `period` values.
pub fn ema_series(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 || values.len() < period {
        return Vec::new();
    }

    let multiplier = 2.0 / (period as f64 + 1.0);
    let mut series = Vec::with_capacity(values.len() - period + 1);

    // First EMA is SMA
    let mut current = values[..period].iter().sum::<f64>() / period as f64;
    series.push(current);

    for value in &values[period..] {
        current = (value - current) * multiplier + current;
        series.push(current);
    }

    series
}

/// Latest EMA value; the last available value when the series is too short.
pub fn ema(values: &[f64], period: usize) -> f64 {
    match ema_series(values, period).last() {
        Some(value) => *value,
        None => values.last().copied().unwrap_or(0.0),
    }
}
