//! Point-based fusion of indicators, patterns and the ensemble into one call.

use crate::types::{
    EnsembleScore, IndicatorSet, Pattern, RiskLevels, SignalDirection, SupportResistance, Trend,
};

const RSI_OVERSOLD: f64 = 30.0;
const RSI_OVERBOUGHT: f64 = 70.0;
const VOLUME_SPIKE: f64 = 1.2;
const ENSEMBLE_THRESHOLD: f64 = 0.6;
/// MACD line/signal gaps within this share of price are ties.
const MACD_TIE_TOLERANCE: f64 = 1e-9;
const MIN_DIRECTIONAL_SCORE: u32 = 3;

/// Tallied points and the call they produce.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreCard {
    pub bullish: u32,
    pub bearish: u32,
    pub reasons: Vec<String>,
}

impl ScoreCard {
    fn new() -> Self {
        Self {
            bullish: 0,
            bearish: 0,
            reasons: Vec::new(),
        }
    }

    fn bull(&mut self, points: u32, reason: impl Into<String>) {
        self.bullish += points;
        self.reasons.push(reason.into());
    }

    fn bear(&mut self, points: u32, reason: impl Into<String>) {
        self.bearish += points;
        self.reasons.push(reason.into());
    }

    pub fn direction(&self) -> SignalDirection {
        if self.bullish > self.bearish && self.bullish >= MIN_DIRECTIONAL_SCORE {
            SignalDirection::Bullish
        } else if self.bearish > self.bullish && self.bearish >= MIN_DIRECTIONAL_SCORE {
            SignalDirection::Bearish
        } else {
            SignalDirection::Neutral
        }
    }

    /// In [0.5, 0.9]; 0.5 when neutral.
    pub fn probability(&self) -> f64 {
        if self.direction() == SignalDirection::Neutral {
            return 0.5;
        }
        let delta = self.bullish.abs_diff(self.bearish) as f64;
        (0.5 + 0.1 * delta).min(0.9)
    }

    /// 0-100 scale.
    pub fn confidence(&self) -> f64 {
        (10.0 * (self.bullish + self.bearish) as f64).min(100.0)
    }
}

/// Tally points from every analysis stage.
pub fn score(
    price: f64,
    indicators: &IndicatorSet,
    patterns: &[Pattern],
    ensemble: &EnsembleScore,
) -> ScoreCard {
    let mut card = ScoreCard::new();

    if indicators.rsi < RSI_OVERSOLD {
        card.bull(2, format!("RSI oversold ({:.1})", indicators.rsi));
    } else if indicators.rsi > RSI_OVERBOUGHT {
        card.bear(2, format!("RSI overbought ({:.1})", indicators.rsi));
    }

    match indicators.trend {
        Trend::Upward => card.bull(2, "Upward trend"),
        Trend::Downward => card.bear(2, "Downward trend"),
        Trend::Sideways => {}
    }

    let macd = &indicators.macd;
    let gap = macd.line - macd.signal;
    if gap.abs() > MACD_TIE_TOLERANCE * price.abs() {
        if gap > 0.0 {
            card.bull(1, "MACD above signal");
        } else {
            card.bear(1, "MACD below signal");
        }
    }

    if indicators.volume_ratio > VOLUME_SPIKE {
        let reason = format!("Above-average volume ({:.2}x)", indicators.volume_ratio);
        if card.bullish > card.bearish {
            card.bull(1, reason);
        } else if card.bearish > card.bullish {
            card.bear(1, reason);
        }
    }

    if ensemble.value >= ENSEMBLE_THRESHOLD {
        card.bull(2, format!("Ensemble bullish ({:+.2})", ensemble.value));
    } else if ensemble.value <= -ENSEMBLE_THRESHOLD {
        card.bear(2, format!("Ensemble bearish ({:+.2})", ensemble.value));
    }

    let net: i64 = patterns
        .iter()
        .map(|p| match p.direction() {
            SignalDirection::Bullish => 1,
            SignalDirection::Bearish => -1,
            SignalDirection::Neutral => 0,
        })
        .sum();
    let aligned = |direction: SignalDirection| -> String {
        patterns
            .iter()
            .filter(|p| p.direction() == direction)
            .map(Pattern::name)
            .collect::<Vec<_>>()
            .join(", ")
    };
    if net > 0 {
        card.bull(net as u32, format!("Bullish patterns: {}", aligned(SignalDirection::Bullish)));
    } else if net < 0 {
        card.bear(
            net.unsigned_abs() as u32,
            format!("Bearish patterns: {}", aligned(SignalDirection::Bearish)),
        );
    }

    card
}

/// Human-readable recommendation from the call and its reasons.
pub fn recommendation(direction: SignalDirection, reasons: &[String]) -> String {
    let because = if reasons.is_empty() {
        "no decisive signals".to_string()
    } else {
        reasons.join("; ")
    };

    match direction {
        SignalDirection::Bullish => format!(
            "Bullish breakout setup ({because}). Consider long entries with a stop below support."
        ),
        SignalDirection::Bearish => format!(
            "Bearish breakdown setup ({because}). Consider reducing exposure or short entries with a stop above resistance."
        ),
        SignalDirection::Neutral => {
            format!("No clear edge ({because}). Wait for confirmation before acting.")
        }
    }
}

/// Entry, stop and target for the call, from nearby levels and ATR.
pub fn risk_levels(
    direction: SignalDirection,
    price: f64,
    atr: f64,
    levels: &SupportResistance,
) -> RiskLevels {
    let support = levels.nearest_support().map(|l| l.price);
    let resistance = levels.nearest_resistance().map(|l| l.price);

    let (stop_loss, target) = match direction {
        SignalDirection::Bullish => {
            let atr_stop = price - 2.0 * atr;
            let stop = support.map_or(atr_stop, |s| s.min(atr_stop));
            (stop, resistance.unwrap_or(price + 3.0 * atr))
        }
        SignalDirection::Bearish => {
            let atr_stop = price + 2.0 * atr;
            let stop = resistance.map_or(atr_stop, |r| r.max(atr_stop));
            (stop, support.unwrap_or(price - 3.0 * atr))
        }
        SignalDirection::Neutral => (price - 2.0 * atr, price + 2.0 * atr),
    };

    let risk = (price - stop_loss).abs();
    let reward = (target - price).abs();
    let risk_reward = if risk > 0.0 { reward / risk } else { 0.0 };

    RiskLevels {
        entry: price,
        stop_loss,
        target,
        risk_reward,
    }
}
