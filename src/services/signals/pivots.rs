//! Local price extrema shared by the level analyzer and chart detectors.

use chrono::NaiveDate;

use crate::types::PriceBar;

/// A bar whose high (or low) dominates its neighbourhood.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pivot {
    pub index: usize,
    pub price: f64,
    pub date: NaiveDate,
}

/// Pivot highs: highs strictly greater than every high within `window` bars
/// on both sides. Bars without a full window on each side never qualify.
pub fn pivot_highs(bars: &[PriceBar], window: usize) -> Vec<Pivot> {
    find_pivots(bars, window, |b| b.high, |candidate, other| candidate > other)
}

/// Pivot lows: lows strictly less than every low within `window` bars on
/// both sides.
pub fn pivot_lows(bars: &[PriceBar], window: usize) -> Vec<Pivot> {
    find_pivots(bars, window, |b| b.low, |candidate, other| candidate < other)
}

fn find_pivots(
    bars: &[PriceBar],
    window: usize,
    price: impl Fn(&PriceBar) -> f64,
    dominates: impl Fn(f64, f64) -> bool,
) -> Vec<Pivot> {
    if window == 0 || bars.len() < 2 * window + 1 {
        return Vec::new();
    }

    (window..bars.len() - window)
        .filter_map(|i| {
            let candidate = price(&bars[i]);
            let dominant = bars[i - window..=i + window]
                .iter()
                .enumerate()
                .filter(|(offset, _)| *offset != window)
                .all(|(_, other)| dominates(candidate, price(other)));

            dominant.then(|| Pivot {
                index: i,
                price: candidate,
                date: bars[i].date,
            })
        })
        .collect()
}
