use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::signals::SignalDirection;

/// Qualitative strength shared by patterns and price levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strength {
    Weak,
    Moderate,
    Strong,
}

/// How often a pattern historically plays out as described.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reliability {
    Low,
    Medium,
    High,
}

/// Horizon a pattern speaks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PatternTimeframe {
    ShortTerm,
    MediumTerm,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandlestickKind {
    Doji,
    Hammer,
    HangingMan,
    BullishEngulfing,
    BearishEngulfing,
    MorningStar,
    EveningStar,
}

impl CandlestickKind {
    pub fn name(&self) -> &'static str {
        match self {
            CandlestickKind::Doji => "Doji",
            CandlestickKind::Hammer => "Hammer",
            CandlestickKind::HangingMan => "Hanging Man",
            CandlestickKind::BullishEngulfing => "Bullish Engulfing",
            CandlestickKind::BearishEngulfing => "Bearish Engulfing",
            CandlestickKind::MorningStar => "Morning Star",
            CandlestickKind::EveningStar => "Evening Star",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    DoubleTop,
    DoubleBottom,
    HeadAndShoulders,
    InverseHeadAndShoulders,
    AscendingTriangle,
    DescendingTriangle,
    SymmetricalTriangle,
    RisingWedge,
    FallingWedge,
    BullFlag,
    BearFlag,
    Pennant,
}

impl ChartKind {
    pub fn name(&self) -> &'static str {
        match self {
            ChartKind::DoubleTop => "Double Top",
            ChartKind::DoubleBottom => "Double Bottom",
            ChartKind::HeadAndShoulders => "Head and Shoulders",
            ChartKind::InverseHeadAndShoulders => "Inverse Head and Shoulders",
            ChartKind::AscendingTriangle => "Ascending Triangle",
            ChartKind::DescendingTriangle => "Descending Triangle",
            ChartKind::SymmetricalTriangle => "Symmetrical Triangle",
            ChartKind::RisingWedge => "Rising Wedge",
            ChartKind::FallingWedge => "Falling Wedge",
            ChartKind::BullFlag => "Bull Flag",
            ChartKind::BearFlag => "Bear Flag",
            ChartKind::Pennant => "Pennant",
        }
    }
}

/// Single- or multi-bar candle formation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandlestickPattern {
    #[serde(rename = "type")]
    pub kind: CandlestickKind,
    pub confidence: f64,
    pub direction: SignalDirection,
    pub significance: Strength,
    pub timeframe: PatternTimeframe,
    /// Session of the bar that completed the formation.
    pub date: NaiveDate,
    pub description: String,
    pub reliability: Reliability,
}

/// Multi-week chart formation with projected levels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartPattern {
    #[serde(rename = "type")]
    pub kind: ChartKind,
    pub confidence: f64,
    pub direction: SignalDirection,
    pub strength: Strength,
    pub timeframe: PatternTimeframe,
    pub target_price: f64,
    pub stop_loss: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breakout_level: Option<f64>,
    pub description: String,
    pub reliability: Reliability,
}

/// A detected pattern. Variants carry only the fields relevant to them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "lowercase")]
pub enum Pattern {
    Candlestick(CandlestickPattern),
    Chart(ChartPattern),
}

impl Pattern {
    pub fn name(&self) -> &'static str {
        match self {
            Pattern::Candlestick(p) => p.kind.name(),
            Pattern::Chart(p) => p.kind.name(),
        }
    }

    pub fn direction(&self) -> SignalDirection {
        match self {
            Pattern::Candlestick(p) => p.direction,
            Pattern::Chart(p) => p.direction,
        }
    }

    pub fn confidence(&self) -> f64 {
        match self {
            Pattern::Candlestick(p) => p.confidence,
            Pattern::Chart(p) => p.confidence,
        }
    }
}
