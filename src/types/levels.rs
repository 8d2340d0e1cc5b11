use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::patterns::Strength;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LevelType {
    Support,
    Resistance,
}

/// Price band around a level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceZone {
    pub upper: f64,
    pub lower: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportResistanceLevel {
    pub price: f64,
    pub strength: Strength,
    #[serde(rename = "type")]
    pub level_type: LevelType,
    pub touches: u32,
    pub confidence: f64,
    pub zone: PriceZone,
    /// Most recent session that touched the level. None for fallback levels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_tested: Option<NaiveDate>,
}

/// Classic floor-trader pivot levels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PivotPoints {
    pub pivot: f64,
    pub r1: f64,
    pub r2: f64,
    pub r3: f64,
    pub s1: f64,
    pub s2: f64,
    pub s3: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SupportResistance {
    /// Closest first.
    pub support: Vec<SupportResistanceLevel>,
    /// Closest first.
    pub resistance: Vec<SupportResistanceLevel>,
    pub pivot_points: PivotPoints,
    pub key_zones: Vec<SupportResistanceLevel>,
}

impl SupportResistance {
    pub fn nearest_support(&self) -> Option<&SupportResistanceLevel> {
        self.support.first()
    }

    pub fn nearest_resistance(&self) -> Option<&SupportResistanceLevel> {
        self.resistance.first()
    }
}
