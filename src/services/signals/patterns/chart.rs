//! Multi-week chart formations.

use crate::services::signals::indicators::mean;
use crate::services::signals::pivots::{pivot_highs, pivot_lows, Pivot};
use crate::types::{
    ChartKind, ChartPattern, Pattern, PatternTimeframe, PriceBar, Reliability, SignalDirection,
    Strength,
};

/// Trailing bars the chart detectors look at.
pub const CHART_LOOKBACK: usize = 40;
/// Below this many bars no chart detector runs.
pub const CHART_MIN_BARS: usize = 12;

const PIVOT_WINDOW: usize = 2;
const DOUBLE_TOLERANCE: f64 = 0.03;
const DOUBLE_MIN_SEPARATION: usize = 5;
const SHOULDER_TOLERANCE: f64 = 0.05;
const TRENDLINE_BARS: usize = 20;
const FLAT_SLOPE: f64 = 0.001;
const WEDGE_RATE_RATIO: f64 = 1.2;
const POLE_BARS: usize = 10;
const CONSOLIDATION_BARS: usize = 5;

/// Fixed parameters per formation.
struct Profile {
    confidence: f64,
    target_pct: f64,
    stop_pct: f64,
    strength: Strength,
    reliability: Reliability,
    timeframe: PatternTimeframe,
}

fn profile(kind: ChartKind) -> Profile {
    let (confidence, target_pct, stop_pct, strength, reliability) = match kind {
        ChartKind::DoubleTop | ChartKind::DoubleBottom => {
            (0.7, 0.08, 0.03, Strength::Strong, Reliability::High)
        }
        ChartKind::HeadAndShoulders | ChartKind::InverseHeadAndShoulders => {
            (0.75, 0.10, 0.04, Strength::Strong, Reliability::High)
        }
        ChartKind::AscendingTriangle | ChartKind::DescendingTriangle => {
            (0.65, 0.06, 0.03, Strength::Moderate, Reliability::Medium)
        }
        ChartKind::SymmetricalTriangle => {
            (0.55, 0.05, 0.03, Strength::Moderate, Reliability::Medium)
        }
        ChartKind::RisingWedge | ChartKind::FallingWedge => {
            (0.6, 0.07, 0.03, Strength::Moderate, Reliability::Medium)
        }
        ChartKind::BullFlag | ChartKind::BearFlag => {
            (0.7, 0.08, 0.03, Strength::Strong, Reliability::Medium)
        }
        ChartKind::Pennant => (0.65, 0.06, 0.03, Strength::Moderate, Reliability::Medium),
    };

    let timeframe = match kind {
        ChartKind::BullFlag | ChartKind::BearFlag | ChartKind::Pennant => {
            PatternTimeframe::ShortTerm
        }
        _ => PatternTimeframe::MediumTerm,
    };

    Profile {
        confidence,
        target_pct,
        stop_pct,
        strength,
        reliability,
        timeframe,
    }
}

/// Run every chart detector over the trailing window.
///
/// A non-positive `current_price` falls back to the last close.
pub fn detect_chart_patterns(bars: &[PriceBar], current_price: f64) -> Vec<Pattern> {
    if bars.len() < CHART_MIN_BARS {
        return Vec::new();
    }
    let window = &bars[bars.len() - CHART_LOOKBACK.min(bars.len())..];
    let price = if current_price > 0.0 {
        current_price
    } else {
        window[window.len() - 1].close
    };

    let highs = pivot_highs(window, PIVOT_WINDOW);
    let lows = pivot_lows(window, PIVOT_WINDOW);

    let mut found = Vec::new();
    found.extend(double_top(window, &highs));
    found.extend(double_bottom(window, &lows));
    found.extend(head_and_shoulders(window, &highs));
    found.extend(inverse_head_and_shoulders(window, &lows));
    found.extend(trendline_formation(window));
    found.extend(flag_or_pennant(window));

    found
        .into_iter()
        .map(|(kind, direction, breakout, description)| {
            Pattern::Chart(build(kind, direction, price, breakout, description))
        })
        .collect()
}

type Detection = (ChartKind, SignalDirection, Option<f64>, String);

fn within(a: f64, b: f64, tolerance: f64) -> bool {
    let reference = a.abs().max(b.abs());
    reference > 0.0 && (a - b).abs() / reference <= tolerance
}

fn lowest_low(bars: &[PriceBar]) -> Option<f64> {
    bars.iter().map(|b| b.low).reduce(f64::min)
}

fn highest_high(bars: &[PriceBar]) -> Option<f64> {
    bars.iter().map(|b| b.high).reduce(f64::max)
}

fn double_top(bars: &[PriceBar], highs: &[Pivot]) -> Option<Detection> {
    let [.., first, second] = highs else {
        return None;
    };
    if second.index - first.index < DOUBLE_MIN_SEPARATION
        || !within(first.price, second.price, DOUBLE_TOLERANCE)
    {
        return None;
    }
    let neckline = lowest_low(&bars[first.index..=second.index]);
    Some((
        ChartKind::DoubleTop,
        SignalDirection::Bearish,
        neckline,
        format!(
            "Twin peaks near {:.2} and {:.2}; break of the trough targets lower prices",
            first.price, second.price
        ),
    ))
}

fn double_bottom(bars: &[PriceBar], lows: &[Pivot]) -> Option<Detection> {
    let [.., first, second] = lows else {
        return None;
    };
    if second.index - first.index < DOUBLE_MIN_SEPARATION
        || !within(first.price, second.price, DOUBLE_TOLERANCE)
    {
        return None;
    }
    let neckline = highest_high(&bars[first.index..=second.index]);
    Some((
        ChartKind::DoubleBottom,
        SignalDirection::Bullish,
        neckline,
        format!(
            "Twin troughs near {:.2} and {:.2}; break of the peak targets higher prices",
            first.price, second.price
        ),
    ))
}

fn head_and_shoulders(bars: &[PriceBar], highs: &[Pivot]) -> Option<Detection> {
    let [.., left, head, right] = highs else {
        return None;
    };
    if head.price <= left.price
        || head.price <= right.price
        || !within(left.price, right.price, SHOULDER_TOLERANCE)
    {
        return None;
    }
    let neckline = lowest_low(&bars[left.index..=right.index]);
    Some((
        ChartKind::HeadAndShoulders,
        SignalDirection::Bearish,
        neckline,
        format!(
            "Head at {:.2} above shoulders at {:.2} and {:.2}",
            head.price, left.price, right.price
        ),
    ))
}

fn inverse_head_and_shoulders(bars: &[PriceBar], lows: &[Pivot]) -> Option<Detection> {
    let [.., left, head, right] = lows else {
        return None;
    };
    if head.price >= left.price
        || head.price >= right.price
        || !within(left.price, right.price, SHOULDER_TOLERANCE)
    {
        return None;
    }
    let neckline = highest_high(&bars[left.index..=right.index]);
    Some((
        ChartKind::InverseHeadAndShoulders,
        SignalDirection::Bullish,
        neckline,
        format!(
            "Head at {:.2} below shoulders at {:.2} and {:.2}",
            head.price, left.price, right.price
        ),
    ))
}

/// Least-squares slope of `values` against their index.
pub fn regression_slope(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 2 {
        return 0.0;
    }
    let x_mean = (n - 1) as f64 / 2.0;
    let y_mean = mean(values);

    let (num, den) = values
        .iter()
        .enumerate()
        .fold((0.0, 0.0), |(num, den), (i, &y)| {
            let dx = i as f64 - x_mean;
            (num + dx * (y - y_mean), den + dx * dx)
        });

    if den == 0.0 {
        0.0
    } else {
        num / den
    }
}

/// Triangles and wedges from the trendline slopes of recent highs and lows.
fn trendline_formation(bars: &[PriceBar]) -> Option<Detection> {
    let recent = &bars[bars.len() - TRENDLINE_BARS.min(bars.len())..];
    let highs: Vec<f64> = recent.iter().map(|b| b.high).collect();
    let lows: Vec<f64> = recent.iter().map(|b| b.low).collect();
    let closes: Vec<f64> = recent.iter().map(|b| b.close).collect();

    let scale = mean(&closes);
    if scale <= 0.0 {
        return None;
    }
    let hs = regression_slope(&highs) / scale;
    let ls = regression_slope(&lows) / scale;

    let highs_flat = hs.abs() < FLAT_SLOPE;
    let lows_flat = ls.abs() < FLAT_SLOPE;
    let highs_up = hs >= FLAT_SLOPE;
    let highs_down = hs <= -FLAT_SLOPE;
    let lows_up = ls >= FLAT_SLOPE;
    let lows_down = ls <= -FLAT_SLOPE;

    let resistance = highest_high(recent);
    let support = lowest_low(recent);

    let detection = if highs_flat && lows_up {
        (
            ChartKind::AscendingTriangle,
            SignalDirection::Bullish,
            resistance,
            "Flat resistance with rising lows".to_string(),
        )
    } else if lows_flat && highs_down {
        (
            ChartKind::DescendingTriangle,
            SignalDirection::Bearish,
            support,
            "Flat support with falling highs".to_string(),
        )
    } else if highs_down && lows_up {
        (
            ChartKind::SymmetricalTriangle,
            SignalDirection::Neutral,
            None,
            "Converging trendlines; breakout direction undecided".to_string(),
        )
    } else if highs_up && lows_up && hs > ls * WEDGE_RATE_RATIO {
        (
            ChartKind::RisingWedge,
            SignalDirection::Bearish,
            support,
            "Both trendlines rising with highs outpacing lows".to_string(),
        )
    } else if highs_down && lows_down && ls.abs() > hs.abs() * WEDGE_RATE_RATIO {
        (
            ChartKind::FallingWedge,
            SignalDirection::Bullish,
            resistance,
            "Both trendlines falling with lows outpacing highs".to_string(),
        )
    } else {
        return None;
    };

    Some(detection)
}

fn relative_range(bars: &[PriceBar], reference: f64) -> f64 {
    match (highest_high(bars), lowest_low(bars)) {
        (Some(high), Some(low)) if reference > 0.0 => (high - low) / reference,
        _ => 0.0,
    }
}

/// A sharp pole followed by a tight consolidation.
fn flag_or_pennant(bars: &[PriceBar]) -> Option<Detection> {
    let n = bars.len();
    if n < POLE_BARS + CONSOLIDATION_BARS + 1 {
        return None;
    }
    let pole_start = bars[n - POLE_BARS - CONSOLIDATION_BARS - 1].close;
    let pole_end = bars[n - CONSOLIDATION_BARS - 1].close;
    if pole_start <= 0.0 {
        return None;
    }
    let pole = pole_end / pole_start - 1.0;

    let consolidation = &bars[n - CONSOLIDATION_BARS..];
    let range = relative_range(consolidation, pole_end);
    let narrowing = relative_range(&consolidation[2..], pole_end)
        < relative_range(&consolidation[..3], pole_end);

    let direction = if pole > 0.0 {
        SignalDirection::Bullish
    } else {
        SignalDirection::Bearish
    };
    let breakout = match direction {
        SignalDirection::Bullish => highest_high(consolidation),
        _ => lowest_low(consolidation),
    };
    let pole_pct = pole * 100.0;

    if pole.abs() > 0.03 && range < 0.02 && narrowing {
        return Some((
            ChartKind::Pennant,
            direction,
            breakout,
            format!("{pole_pct:+.1}% pole into a narrowing consolidation"),
        ));
    }
    if pole.abs() > 0.05 && range < 0.03 {
        let kind = if pole > 0.0 {
            ChartKind::BullFlag
        } else {
            ChartKind::BearFlag
        };
        return Some((
            kind,
            direction,
            breakout,
            format!("{pole_pct:+.1}% pole into a tight consolidation"),
        ));
    }
    None
}

fn build(
    kind: ChartKind,
    direction: SignalDirection,
    price: f64,
    breakout_level: Option<f64>,
    description: String,
) -> ChartPattern {
    let profile = profile(kind);
    let target_offset = profile.target_pct * (0.8 + 0.4 * profile.confidence);

    let (target_price, stop_loss) = match direction {
        SignalDirection::Bullish => (price * (1.0 + target_offset), price * (1.0 - profile.stop_pct)),
        SignalDirection::Bearish => (price * (1.0 - target_offset), price * (1.0 + profile.stop_pct)),
        SignalDirection::Neutral => (price, price * (1.0 - profile.stop_pct)),
    };

    ChartPattern {
        kind,
        confidence: profile.confidence,
        direction,
        strength: profile.strength,
        timeframe: profile.timeframe,
        target_price,
        stop_loss,
        breakout_level,
        description,
        reliability: profile.reliability,
    }
}
