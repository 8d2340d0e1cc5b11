//! Runner behavior against stub history providers.

use breakout::error::AppError;
use breakout::services::historical::HistoryFuture;
use breakout::services::{
    BroadcastHub, FallbackHistory, HistoryProvider, MemoryHistory, MemoryStrategyStore,
    SignalRunner, SymbolRepository, SyntheticHistory,
};
use breakout::{Config, LookbackPeriod, SignalDirection};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

struct FailingHistory;

impl HistoryProvider for FailingHistory {
    fn name(&self) -> &str {
        "failing"
    }

    fn fetch<'a>(&'a self, symbol: &'a str, _lookback: LookbackPeriod) -> HistoryFuture<'a> {
        Box::pin(async move { Err(AppError::Provider(format!("{symbol} offline"))) })
    }
}

struct SlowHistory;

impl HistoryProvider for SlowHistory {
    fn name(&self) -> &str {
        "slow"
    }

    fn fetch<'a>(&'a self, _symbol: &'a str, _lookback: LookbackPeriod) -> HistoryFuture<'a> {
        Box::pin(async move {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(Vec::new())
        })
    }
}

fn config(symbols: &[&str]) -> Config {
    Config {
        symbols: symbols.iter().map(|s| s.to_string()).collect(),
        engine_timeout: Duration::from_secs(5),
        worker_concurrency: 2,
        ..Config::default()
    }
}

#[tokio::test]
async fn test_provider_failure_falls_back_to_synthetic() {
    let config = config(&["AAPL"]);
    let history = Arc::new(FallbackHistory::new(
        Arc::new(FailingHistory),
        SyntheticHistory::new(config.synthetic_seed),
    ));
    let store = MemoryStrategyStore::new();
    let runner = SignalRunner::new(&config, history, store.clone(), BroadcastHub::new());

    let strategy = runner.run_symbol("AAPL").await;
    assert!(strategy.data_quality.sufficient);
    assert_eq!(strategy.data_quality.bars, 252);
    assert!(strategy.current_price > 0.0);
    assert_eq!(store.get("AAPL"), Some(strategy));
}

#[tokio::test]
async fn test_timeout_yields_neutral_strategy() {
    let config = Config {
        engine_timeout: Duration::from_millis(50),
        ..config(&["SLOW"])
    };
    let runner = SignalRunner::new(
        &config,
        Arc::new(SlowHistory),
        MemoryStrategyStore::new(),
        BroadcastHub::new(),
    );

    let strategy = runner.run_symbol("SLOW").await;
    assert_eq!(strategy.signal, SignalDirection::Neutral);
    assert!(!strategy.data_quality.sufficient);
    assert_eq!(strategy.current_price, 0.0);
    assert_eq!(strategy.probability, 0.5);
}

#[tokio::test]
async fn test_missing_symbol_yields_neutral_strategy() {
    let config = config(&["NONE"]);
    let runner = SignalRunner::new(
        &config,
        Arc::new(MemoryHistory::new()),
        MemoryStrategyStore::new(),
        BroadcastHub::new(),
    );

    let strategy = runner.run_symbol("NONE").await;
    assert_eq!(strategy.signal, SignalDirection::Neutral);
    assert_eq!(strategy.data_quality.bars, 0);
}

#[tokio::test]
async fn test_run_all_stores_and_publishes() {
    let config = config(&["MSFT", "AAPL", "NVDA"]);
    let history = Arc::new(SyntheticHistory::new(config.synthetic_seed));
    let store = MemoryStrategyStore::new();
    let hub = BroadcastHub::new();
    let (tx, mut rx) = mpsc::unbounded_channel();
    hub.register_all(tx);

    let repository = SymbolRepository::from_symbols(&config.symbols);
    let runner = SignalRunner::new(&config, history, store.clone(), hub.clone());
    let results = runner.run_all(&repository).await;

    let symbols: Vec<&str> = results.iter().map(|s| s.symbol.as_str()).collect();
    assert_eq!(symbols, vec!["AAPL", "MSFT", "NVDA"]);
    assert_eq!(store.len(), 3);

    let mut published = Vec::new();
    while let Ok(message) = rx.try_recv() {
        let value: serde_json::Value = serde_json::from_str(&message).unwrap();
        assert_eq!(value["type"], "strategy");
        published.push(value["data"]["symbol"].as_str().unwrap().to_string());
    }
    published.sort();
    assert_eq!(published, vec!["AAPL", "MSFT", "NVDA"]);
}

#[tokio::test]
async fn test_tracked_run_uses_and_records_prices() {
    let config = config(&["SPY"]);
    let bars = SyntheticHistory::new(3).generate("SPY", 252);
    let last_close = bars[251].close;
    let memory = Arc::new(MemoryHistory::new());
    memory.insert("SPY", bars);

    let repository = SymbolRepository::from_symbols(&config.symbols);
    let runner = SignalRunner::new(&config, memory, MemoryStrategyStore::new(), BroadcastHub::new());

    // No live price yet: priced at the last close, which is then recorded
    let first = runner.run_tracked(&repository, "SPY").await;
    assert_eq!(first.current_price, last_close);
    assert_eq!(repository.price("SPY"), Some(last_close));

    // A live quote overrides the close for the next run
    repository.update_price("SPY", last_close * 1.1);
    let second = runner.run_tracked(&repository, "SPY").await;
    assert_eq!(second.current_price, last_close * 1.1);
    assert_eq!(second.risk_levels.entry, last_close * 1.1);
    assert_eq!(repository.price("SPY"), Some(last_close));
}

#[tokio::test]
async fn test_unavailable_symbol_keeps_repository_price() {
    let config = Config {
        engine_timeout: Duration::from_millis(50),
        ..config(&["SLOW"])
    };
    let repository = SymbolRepository::from_symbols(&config.symbols);
    repository.update_price("SLOW", 42.0);
    let runner = SignalRunner::new(
        &config,
        Arc::new(SlowHistory),
        MemoryStrategyStore::new(),
        BroadcastHub::new(),
    );

    let strategy = runner.run_tracked(&repository, "SLOW").await;
    assert_eq!(strategy.signal, SignalDirection::Neutral);
    assert_eq!(strategy.current_price, 42.0);
    assert!(strategy.support_resistance.support.iter().all(|l| l.price < 42.0));
    assert_eq!(repository.price("SLOW"), Some(42.0));
}

#[tokio::test]
async fn test_runs_are_deterministic_without_jitter() {
    let config = config(&["AMD"]);
    let history = Arc::new(SyntheticHistory::new(config.synthetic_seed));
    let runner = SignalRunner::new(&config, history, MemoryStrategyStore::new(), BroadcastHub::new());

    let first = runner.run_symbol("AMD").await;
    let second = runner.run_symbol("AMD").await;
    assert_eq!(first, second);
}

#[test]
fn test_synthetic_fetch_matches_lookback() {
    let history = SyntheticHistory::new(7);
    let bars = tokio_test::block_on(history.fetch("QQQ", LookbackPeriod::SixMonths)).unwrap();
    assert_eq!(bars.len(), 126);
    assert_eq!(bars, history.generate("QQQ", 126));
}
