//! Support and resistance analysis.
//!
//! Pivot extremes are clustered into price levels, scored by how often price
//! turned there, and split around the current price. Classic floor-trader
//! pivots come from the most recent bar.

use chrono::NaiveDate;

use super::pivots::{pivot_highs, pivot_lows};
use crate::types::{
    LevelType, PivotPoints, PriceBar, PriceZone, Strength, SupportResistance,
    SupportResistanceLevel,
};

/// Half-width of the zone drawn around each level.
const ZONE_WIDTH: f64 = 0.005;
const FALLBACK_OFFSET: f64 = 0.05;
const FALLBACK_CONFIDENCE: f64 = 0.1;
const KEY_ZONE_CONFIDENCE: f64 = 0.7;

#[derive(Debug, Clone)]
pub struct SupportResistanceAnalyzer {
    pub pivot_window: usize,
    /// Relative distance within which a pivot joins an existing cluster.
    pub cluster_tolerance: f64,
    pub max_levels: usize,
    pub max_key_zones: usize,
}

impl Default for SupportResistanceAnalyzer {
    fn default() -> Self {
        Self {
            pivot_window: 5,
            cluster_tolerance: 0.01,
            max_levels: 5,
            max_key_zones: 8,
        }
    }
}

impl SupportResistanceAnalyzer {
    /// Analyze `bars` relative to `current_price` (last close when not
    /// positive).
    pub fn analyze(&self, bars: &[PriceBar], current_price: f64) -> SupportResistance {
        let price = match bars.last() {
            Some(last) if current_price <= 0.0 => last.close,
            _ => current_price,
        };

        let mut pivots = pivot_highs(bars, self.pivot_window);
        pivots.extend(pivot_lows(bars, self.pivot_window));
        pivots.sort_by(|a, b| a.price.total_cmp(&b.price));

        let clusters = cluster(pivots, |p| p.price, self.cluster_tolerance);

        let mut support = Vec::new();
        let mut resistance = Vec::new();
        for group in &clusters {
            let level_price = group.iter().map(|p| p.price).sum::<f64>() / group.len() as f64;
            let last_tested = group.iter().map(|p| p.date).max();
            if level_price < price {
                support.push(level(level_price, LevelType::Support, group.len(), last_tested));
            } else if level_price > price {
                resistance.push(level(level_price, LevelType::Resistance, group.len(), last_tested));
            }
        }

        let mut key_zones: Vec<SupportResistanceLevel> = support
            .iter()
            .chain(resistance.iter())
            .filter(|l| l.strength == Strength::Strong || l.confidence > KEY_ZONE_CONFIDENCE)
            .cloned()
            .collect();
        key_zones.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        key_zones.truncate(self.max_key_zones);

        support.sort_by(|a, b| b.price.total_cmp(&a.price));
        support.truncate(self.max_levels);
        resistance.sort_by(|a, b| a.price.total_cmp(&b.price));
        resistance.truncate(self.max_levels);

        // No price to anchor a fallback level to
        if price > 0.0 {
            if support.is_empty() {
                support.push(fallback(price * (1.0 - FALLBACK_OFFSET), LevelType::Support));
            }
            if resistance.is_empty() {
                resistance.push(fallback(price * (1.0 + FALLBACK_OFFSET), LevelType::Resistance));
            }
        }

        SupportResistance {
            support,
            resistance,
            pivot_points: bars.last().map(pivot_points).unwrap_or_default(),
            key_zones,
        }
    }
}

/// Greedy clustering over values sorted ascending: each value joins the first
/// group whose running average it is within `tolerance` of.
fn cluster<T>(sorted: Vec<T>, price: impl Fn(&T) -> f64, tolerance: f64) -> Vec<Vec<T>> {
    let mut groups: Vec<(f64, Vec<T>)> = Vec::new();

    for item in sorted {
        let value = price(&item);
        let home = groups.iter_mut().find(|(average, _)| {
            *average > 0.0 && ((value - *average) / *average).abs() <= tolerance
        });
        match home {
            Some((average, members)) => {
                *average = (*average * members.len() as f64 + value) / (members.len() + 1) as f64;
                members.push(item);
            }
            None => groups.push((value, vec![item])),
        }
    }

    groups.into_iter().map(|(_, members)| members).collect()
}

/// Cluster raw prices. Input must be sorted ascending.
pub fn cluster_prices(sorted: &[f64], tolerance: f64) -> Vec<Vec<f64>> {
    cluster(sorted.to_vec(), |p| *p, tolerance)
}

fn strength_for(touches: usize) -> Strength {
    match touches {
        0 | 1 => Strength::Weak,
        2 => Strength::Moderate,
        _ => Strength::Strong,
    }
}

fn zone(price: f64) -> PriceZone {
    PriceZone {
        upper: price * (1.0 + ZONE_WIDTH),
        lower: price * (1.0 - ZONE_WIDTH),
    }
}

fn level(
    price: f64,
    level_type: LevelType,
    touches: usize,
    last_tested: Option<NaiveDate>,
) -> SupportResistanceLevel {
    SupportResistanceLevel {
        price,
        strength: strength_for(touches),
        level_type,
        touches: touches as u32,
        confidence: (0.2 * touches as f64).min(1.0),
        zone: zone(price),
        last_tested,
    }
}

fn fallback(price: f64, level_type: LevelType) -> SupportResistanceLevel {
    SupportResistanceLevel {
        price,
        strength: Strength::Weak,
        level_type,
        touches: 0,
        confidence: FALLBACK_CONFIDENCE,
        zone: zone(price),
        last_tested: None,
    }
}

/// Classic floor-trader pivots from one bar.
pub fn pivot_points(bar: &PriceBar) -> PivotPoints {
    let (high, low, close) = (bar.high, bar.low, bar.close);
    let pivot = (high + low + close) / 3.0;
    PivotPoints {
        pivot,
        r1: 2.0 * pivot - low,
        r2: pivot + (high - low),
        r3: high + 2.0 * (pivot - low),
        s1: 2.0 * pivot - high,
        s2: pivot - (high - low),
        s3: low - 2.0 * (high - pivot),
    }
}
