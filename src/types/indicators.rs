use serde::{Deserialize, Serialize};

/// Overbought/oversold reading of an oscillator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OscillatorSignal {
    Overbought,
    Oversold,
    #[default]
    Neutral,
}

/// Trend classification of the most recent bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Upward,
    Downward,
    #[default]
    Sideways,
}

impl Trend {
    pub fn label(&self) -> &'static str {
        match self {
            Trend::Upward => "upward",
            Trend::Downward => "downward",
            Trend::Sideways => "sideways",
        }
    }
}

/// Volatility regime relative to the instrument's own history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum VolatilityClass {
    Low,
    #[default]
    Normal,
    High,
}

/// Where the close sits inside the Bollinger envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BollingerPosition {
    Upper,
    #[default]
    Middle,
    Lower,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MacdValue {
    pub line: f64,
    pub signal: f64,
    pub histogram: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BollingerValue {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
}

impl BollingerValue {
    /// Classify a price against the bands. Collapsed bands read as middle.
    pub fn position(&self, price: f64) -> BollingerPosition {
        let width = self.upper - self.lower;
        if width <= 0.0 {
            return BollingerPosition::Middle;
        }
        let percent_b = (price - self.lower) / width;
        if percent_b > 0.8 {
            BollingerPosition::Upper
        } else if percent_b < 0.2 {
            BollingerPosition::Lower
        } else {
            BollingerPosition::Middle
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StochasticValue {
    pub k: f64,
    pub d: f64,
    pub signal: OscillatorSignal,
}

impl Default for StochasticValue {
    fn default() -> Self {
        Self {
            k: 50.0,
            d: 50.0,
            signal: OscillatorSignal::Neutral,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WilliamsRValue {
    pub value: f64,
    pub signal: OscillatorSignal,
}

impl Default for WilliamsRValue {
    fn default() -> Self {
        Self {
            value: -50.0,
            signal: OscillatorSignal::Neutral,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtrValue {
    pub value: f64,
    /// ATR as a percentage of the close.
    pub normalized: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolatilityRegime {
    /// Percentile rank (0-100) of current short-window volatility.
    pub rank: f64,
    pub class: VolatilityClass,
}

impl Default for VolatilityRegime {
    fn default() -> Self {
        Self {
            rank: 50.0,
            class: VolatilityClass::Normal,
        }
    }
}

/// Every indicator the engine derives from one series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndicatorSet {
    pub rsi: f64,
    pub sma20: f64,
    pub sma50: f64,
    pub sma200: f64,
    pub ema9: f64,
    pub ema12: f64,
    pub ema26: f64,
    pub macd: MacdValue,
    pub bollinger: BollingerValue,
    pub bollinger_position: BollingerPosition,
    pub stochastic: StochasticValue,
    pub williams_r: WilliamsRValue,
    pub atr: AtrValue,
    /// Annualized volatility of daily returns.
    pub volatility: f64,
    pub volatility_regime: VolatilityRegime,
    pub trend: Trend,
    /// Last volume over its 20-bar average.
    pub volume_ratio: f64,
}

impl Default for IndicatorSet {
    fn default() -> Self {
        Self {
            rsi: 50.0,
            sma20: 0.0,
            sma50: 0.0,
            sma200: 0.0,
            ema9: 0.0,
            ema12: 0.0,
            ema26: 0.0,
            macd: MacdValue::default(),
            bollinger: BollingerValue::default(),
            bollinger_position: BollingerPosition::Middle,
            stochastic: StochasticValue::default(),
            williams_r: WilliamsRValue::default(),
            atr: AtrValue::default(),
            volatility: 0.0,
            volatility_regime: VolatilityRegime::default(),
            trend: Trend::Sideways,
            volume_ratio: 1.0,
        }
    }
}
