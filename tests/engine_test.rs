//! End-to-end checks of the breakout engine on constructed series.

use breakout::services::signals::compute_indicators;
use breakout::{
    analyze, BollingerPosition, BreakoutEngine, LiveJitter, PriceBar, SignalDirection, Trend,
};
use chrono::{Days, NaiveDate};

fn start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

/// Bars opening at the previous close with a half-percent wick on each side.
fn series(closes: &[f64]) -> Vec<PriceBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            PriceBar::new(
                start() + Days::new(i as u64),
                open,
                open.max(close) * 1.005,
                open.min(close) * 0.995,
                close,
                1_000_000.0,
            )
        })
        .collect()
}

fn rising() -> Vec<PriceBar> {
    let closes: Vec<f64> = (0..252)
        .map(|i| 100.0 * 1.5f64.powf(i as f64 / 251.0))
        .collect();
    series(&closes)
}

#[test]
fn test_rising_series_is_bullish() {
    let bars = rising();
    let strategy = analyze("AAPL", &bars, 0.0);

    assert_eq!(strategy.signal, SignalDirection::Bullish);
    assert!(strategy.indicators.rsi > 50.0);
    assert_eq!(strategy.indicators.trend, Trend::Upward);
    assert_eq!(strategy.current_trend, Trend::Upward);
    assert!(strategy.bullish_score > strategy.bearish_score);
    assert!(strategy.data_quality.sufficient);
    assert_eq!(strategy.data_quality.bars, 252);
    assert!((strategy.current_price - 150.0).abs() < 1e-9);

    let bearish_weight: f64 = strategy
        .patterns
        .iter()
        .filter(|p| p.direction() == SignalDirection::Bearish)
        .map(|p| p.confidence())
        .sum();
    let bullish_weight: f64 = strategy
        .patterns
        .iter()
        .filter(|p| p.direction() == SignalDirection::Bullish)
        .map(|p| p.confidence())
        .sum();
    assert!(bearish_weight <= bullish_weight);

    // Bullish stop sits below the entry, target above it
    assert!(strategy.risk_levels.stop_loss < strategy.risk_levels.entry);
    assert!(strategy.risk_levels.target > strategy.risk_levels.entry);
}

#[test]
fn test_flat_series_is_neutral() {
    let bars: Vec<PriceBar> = (0..60)
        .map(|i| PriceBar::new(start() + Days::new(i), 100.0, 100.0, 100.0, 100.0, 5_000.0))
        .collect();
    let strategy = analyze("FLAT", &bars, 100.0);

    assert_eq!(strategy.signal, SignalDirection::Neutral);
    assert_eq!(strategy.indicators.bollinger_position, BollingerPosition::Middle);
    assert!(strategy.patterns.is_empty());
    assert!((strategy.indicators.rsi - 50.0).abs() < 1e-9);
    assert_eq!(strategy.support_resistance.support[0].price, 95.0);
    assert_eq!(strategy.support_resistance.resistance[0].price, 105.0);
}

#[test]
fn test_straight_line_rise_is_bullish() {
    // 252 bars from 100 to 150: RSI pins at 100 and MACD sits on its signal,
    // so the call rests on trend and ensemble agreement.
    let closes: Vec<f64> = (0..252).map(|i| 100.0 + 50.0 * i as f64 / 251.0).collect();
    let strategy = analyze("LIN", &series(&closes), 0.0);

    assert_eq!(strategy.signal, SignalDirection::Bullish);
    assert_eq!(strategy.current_trend, Trend::Upward);
    assert!((strategy.indicators.rsi - 100.0).abs() < 1e-9);
    assert!(strategy.ensemble.value >= 0.6);
    assert!(strategy.bullish_score > strategy.bearish_score);
    assert!(strategy.probability > 0.5);
}

#[test]
fn test_analysis_is_reproducible() {
    let bars = rising();
    let first = serde_json::to_string(&analyze("AAPL", &bars, 0.0)).unwrap();
    let second = serde_json::to_string(&analyze("AAPL", &bars, 0.0)).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_levels_bracket_price() {
    let closes: Vec<f64> = (0..200)
        .map(|i| 100.0 + 10.0 * (i as f64 * 0.3).sin() + 0.05 * i as f64)
        .collect();
    let strategy = analyze("WAVE", &series(&closes), 0.0);
    let price = strategy.current_price;
    let levels = &strategy.support_resistance;

    assert!(!levels.support.is_empty());
    assert!(!levels.resistance.is_empty());
    assert!(levels.support.iter().all(|l| l.price < price));
    assert!(levels.resistance.iter().all(|l| l.price > price));
    assert!(levels.support.windows(2).all(|w| w[0].price >= w[1].price));
    assert!(levels.resistance.windows(2).all(|w| w[0].price <= w[1].price));
}

#[test]
fn test_scores_stay_in_range() {
    let closes: Vec<f64> = (0..200)
        .map(|i| 50.0 + 5.0 * (i as f64 * 0.17).sin() - 0.03 * i as f64)
        .collect();
    let bars = series(&closes);
    let mut jitter = LiveJitter::seeded(11);
    let strategy = BreakoutEngine::default().analyze_with("MIX", &bars, 0.0, &mut jitter, None);

    assert!((0.5..=0.9).contains(&strategy.probability));
    assert!((0.0..=100.0).contains(&strategy.confidence));
    assert!((-1.0..=1.0).contains(&strategy.ensemble.value));
    assert!((0.0..=1.0).contains(&strategy.ensemble.confidence));
    assert!(strategy
        .patterns
        .iter()
        .all(|p| (0.0..=1.0).contains(&p.confidence())));
    assert!(strategy
        .support_resistance
        .support
        .iter()
        .chain(strategy.support_resistance.resistance.iter())
        .all(|l| (0.0..=1.0).contains(&l.confidence)));
    assert!((0.0..=100.0).contains(&strategy.indicators.rsi));
}

#[test]
fn test_short_series_reports_insufficient_data() {
    let bars = series(&[10.0, 11.0, 12.0, 11.5, 12.5]);
    let strategy = analyze("TINY", &bars, 0.0);

    assert_eq!(strategy.signal, SignalDirection::Neutral);
    assert!(!strategy.data_quality.sufficient);
    assert!(strategy.data_quality.note.is_some());
    assert_eq!(strategy.current_trend, Trend::Sideways);
    assert_eq!(strategy.indicators.sma20, 12.5);
    assert!((strategy.indicators.rsi - 50.0).abs() < 1e-9);
    assert_eq!(strategy.last_calculated.date_naive(), start() + Days::new(4));
}

#[test]
fn test_rsi_without_enough_history_is_neutral() {
    let indicators = compute_indicators(&series(&[10.0, 11.0, 12.0, 11.5, 12.5]));
    assert!((indicators.rsi - 50.0).abs() < 1e-9);
}

#[test]
fn test_strategy_serializes_camel_case() {
    let value = serde_json::to_value(analyze("AAPL", &rising(), 0.0)).unwrap();
    assert_eq!(value["symbol"], "AAPL");
    assert_eq!(value["signal"], "bullish");
    assert_eq!(value["currentTrend"], "upward");
    assert!(value["currentPrice"].is_number());
    assert!(value["supportResistance"]["keyZones"].is_array());
    assert!(value["riskLevels"]["stopLoss"].is_number());
    assert!(value["lastCalculated"].is_string());
}
