use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// History lookback window requested from a data provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum LookbackPeriod {
    #[serde(rename = "1m")]
    OneMonth,
    #[serde(rename = "3m")]
    ThreeMonths,
    #[serde(rename = "6m")]
    SixMonths,
    #[serde(rename = "1y")]
    #[default]
    OneYear,
    #[serde(rename = "2y")]
    TwoYears,
}

impl LookbackPeriod {
    /// Get the period from a string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "1m" => Some(LookbackPeriod::OneMonth),
            "3m" => Some(LookbackPeriod::ThreeMonths),
            "6m" => Some(LookbackPeriod::SixMonths),
            "1y" => Some(LookbackPeriod::OneYear),
            "2y" => Some(LookbackPeriod::TwoYears),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LookbackPeriod::OneMonth => "1m",
            LookbackPeriod::ThreeMonths => "3m",
            LookbackPeriod::SixMonths => "6m",
            LookbackPeriod::OneYear => "1y",
            LookbackPeriod::TwoYears => "2y",
        }
    }

    /// Approximate number of trading sessions in this period.
    pub fn trading_days(&self) -> usize {
        match self {
            LookbackPeriod::OneMonth => 21,
            LookbackPeriod::ThreeMonths => 63,
            LookbackPeriod::SixMonths => 126,
            LookbackPeriod::OneYear => 252,
            LookbackPeriod::TwoYears => 504,
        }
    }
}

/// Daily OHLCV bar. Series are ordered oldest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl PriceBar {
    pub fn new(date: NaiveDate, open: f64, high: f64, low: f64, close: f64, volume: f64) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Absolute size of the candle body.
    pub fn body(&self) -> f64 {
        (self.close - self.open).abs()
    }

    /// High-low range of the bar.
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    pub fn upper_shadow(&self) -> f64 {
        self.high - self.open.max(self.close)
    }

    pub fn lower_shadow(&self) -> f64 {
        self.open.min(self.close) - self.low
    }

    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }

    /// Check the OHLC ordering invariant and that prices/volume are sane.
    pub fn is_valid(&self) -> bool {
        let prices = [self.open, self.high, self.low, self.close];
        prices.iter().all(|p| p.is_finite() && *p > 0.0)
            && self.volume.is_finite()
            && self.volume >= 0.0
            && self.high >= self.open.max(self.close)
            && self.open.min(self.close) >= self.low
    }
}

/// Drop bars that violate the OHLC invariant.
///
/// This is the ingestion-boundary filter; the engine itself never calls it.
pub fn sanitize_bars(bars: Vec<PriceBar>) -> Vec<PriceBar> {
    bars.into_iter().filter(PriceBar::is_valid).collect()
}
