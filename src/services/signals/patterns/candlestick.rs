//! Single and multi-bar candlestick detectors.

use crate::types::{
    CandlestickKind, CandlestickPattern, Pattern, PatternTimeframe, PriceBar, Reliability,
    SignalDirection, Strength,
};

/// Number of trailing bars scanned for candle formations.
pub const CANDLESTICK_LOOKBACK: usize = 10;

/// Body share of the range below which a bar is a doji.
const DOJI_BODY_RATIO: f64 = 0.1;
/// Body share of the range for a "large" star bar.
const LARGE_BODY_RATIO: f64 = 0.6;
/// Middle star body relative to the first bar's body.
const STAR_BODY_RATIO: f64 = 0.3;

/// Scan the trailing bars and report the most recent occurrence of each
/// candlestick type.
pub fn detect_candlestick_patterns(bars: &[PriceBar]) -> Vec<Pattern> {
    let mut found: Vec<CandlestickPattern> = Vec::new();
    let start = bars.len().saturating_sub(CANDLESTICK_LOOKBACK);

    for i in start..bars.len() {
        let bar = &bars[i];
        let mut kinds = Vec::new();

        if is_doji(bar) {
            kinds.push(CandlestickKind::Doji);
        }
        if i >= 1 {
            let prev = &bars[i - 1];
            kinds.extend(hammer_kind(bar, prev));
            kinds.extend(engulfing_kind(bar, prev));
        }
        if i >= 2 {
            kinds.extend(star_kind(&bars[i - 2], &bars[i - 1], bar));
        }

        for kind in kinds {
            let pattern = build(kind, bar);
            match found.iter_mut().find(|p| p.kind == kind) {
                Some(existing) => *existing = pattern,
                None => found.push(pattern),
            }
        }
    }

    found.into_iter().map(Pattern::Candlestick).collect()
}

fn is_doji(bar: &PriceBar) -> bool {
    let range = bar.range();
    range > 0.0 && bar.body() < DOJI_BODY_RATIO * range
}

/// Long lower shadow, short upper shadow. The prior close decides which name
/// the bar takes.
fn hammer_kind(bar: &PriceBar, prev: &PriceBar) -> Option<CandlestickKind> {
    let body = bar.body();
    if bar.range() <= 0.0 || body <= 0.0 {
        return None;
    }
    if bar.lower_shadow() <= 2.0 * body || bar.upper_shadow() >= 0.5 * body {
        return None;
    }

    if prev.close > bar.close {
        Some(CandlestickKind::HangingMan)
    } else if prev.close < bar.close {
        Some(CandlestickKind::Hammer)
    } else {
        None
    }
}

/// Current body strictly contains and reverses the previous body.
fn engulfing_kind(bar: &PriceBar, prev: &PriceBar) -> Option<CandlestickKind> {
    if prev.is_bearish() && bar.is_bullish() && bar.open < prev.close && bar.close > prev.open {
        Some(CandlestickKind::BullishEngulfing)
    } else if prev.is_bullish()
        && bar.is_bearish()
        && bar.open > prev.close
        && bar.close < prev.open
    {
        Some(CandlestickKind::BearishEngulfing)
    } else {
        None
    }
}

fn is_large(bar: &PriceBar) -> bool {
    let range = bar.range();
    range > 0.0 && bar.body() >= LARGE_BODY_RATIO * range
}

fn star_kind(first: &PriceBar, middle: &PriceBar, last: &PriceBar) -> Option<CandlestickKind> {
    if !is_large(first) || !is_large(last) || middle.body() >= STAR_BODY_RATIO * first.body() {
        return None;
    }

    let midpoint = (first.open + first.close) / 2.0;
    if first.is_bearish() && last.is_bullish() && last.close > midpoint {
        Some(CandlestickKind::MorningStar)
    } else if first.is_bullish() && last.is_bearish() && last.close < midpoint {
        Some(CandlestickKind::EveningStar)
    } else {
        None
    }
}

fn build(kind: CandlestickKind, bar: &PriceBar) -> CandlestickPattern {
    let (confidence, direction, significance, reliability, description) = match kind {
        CandlestickKind::Doji => (
            0.6,
            SignalDirection::Neutral,
            Strength::Weak,
            Reliability::Low,
            "Open and close nearly equal; buyers and sellers in balance",
        ),
        CandlestickKind::Hammer => (
            0.7,
            SignalDirection::Bullish,
            Strength::Moderate,
            Reliability::Medium,
            "Long lower shadow closing above a lower prior close; sellers rejected",
        ),
        CandlestickKind::HangingMan => (
            0.65,
            SignalDirection::Bearish,
            Strength::Moderate,
            Reliability::Medium,
            "Long lower shadow below the prior close; selling pressure surfacing",
        ),
        CandlestickKind::BullishEngulfing => (
            0.75,
            SignalDirection::Bullish,
            Strength::Strong,
            Reliability::High,
            "Bullish body fully engulfs the prior bearish body",
        ),
        CandlestickKind::BearishEngulfing => (
            0.75,
            SignalDirection::Bearish,
            Strength::Strong,
            Reliability::High,
            "Bearish body fully engulfs the prior bullish body",
        ),
        CandlestickKind::MorningStar => (
            0.8,
            SignalDirection::Bullish,
            Strength::Strong,
            Reliability::High,
            "Three-bar bottom reversal closing above the first bar's midpoint",
        ),
        CandlestickKind::EveningStar => (
            0.8,
            SignalDirection::Bearish,
            Strength::Strong,
            Reliability::High,
            "Three-bar top reversal closing below the first bar's midpoint",
        ),
    };

    CandlestickPattern {
        kind,
        confidence,
        direction,
        significance,
        timeframe: PatternTimeframe::ShortTerm,
        date: bar.date,
        description: description.to_string(),
        reliability,
    }
}
