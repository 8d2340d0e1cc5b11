//! Concurrent per-symbol analysis.
//!
//! Fetches history, runs the engine on the blocking pool under a bounded
//! number of workers, and hands each result to the store and the hub. A
//! fetch error or timeout yields the neutral strategy instead of failing.

use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::services::broadcast::StrategyBroadcaster;
use crate::services::historical::HistoryProvider;
use crate::services::repository::SymbolRepository;
use crate::services::signals::{BreakoutEngine, LiveJitter};
use crate::services::store::StrategySink;
use crate::types::{BreakoutStrategy, LookbackPeriod, SignalDirection};

pub struct SignalRunner {
    engine: Arc<BreakoutEngine>,
    history: Arc<dyn HistoryProvider>,
    sink: Arc<dyn StrategySink>,
    broadcaster: Arc<dyn StrategyBroadcaster>,
    workers: Arc<Semaphore>,
    timeout: Duration,
    lookback: LookbackPeriod,
    live_jitter: bool,
}

impl SignalRunner {
    pub fn new(
        config: &Config,
        history: Arc<dyn HistoryProvider>,
        sink: Arc<dyn StrategySink>,
        broadcaster: Arc<dyn StrategyBroadcaster>,
    ) -> Arc<Self> {
        Arc::new(Self {
            engine: Arc::new(BreakoutEngine::new(config.engine.clone())),
            history,
            sink,
            broadcaster,
            workers: Arc::new(Semaphore::new(config.worker_concurrency.max(1))),
            timeout: config.engine_timeout,
            lookback: config.lookback,
            live_jitter: config.live_jitter,
        })
    }

    /// Fetch and analyze one symbol at its last close, then store and
    /// publish the result.
    pub async fn run_symbol(&self, symbol: &str) -> BreakoutStrategy {
        self.run(symbol, None).await.0
    }

    /// Like [`run_symbol`](Self::run_symbol), but priced at the repository's
    /// latest price when one is recorded. The last close of the fetched
    /// series is written back to the repository.
    pub async fn run_tracked(&self, repository: &SymbolRepository, symbol: &str) -> BreakoutStrategy {
        let (strategy, last_close) = self.run(symbol, repository.price(symbol)).await;
        if let Some(close) = last_close {
            repository.update_price(symbol, close);
        }
        strategy
    }

    async fn run(&self, symbol: &str, price: Option<f64>) -> (BreakoutStrategy, Option<f64>) {
        let (strategy, last_close) = match self.compute(symbol, price).await {
            Ok(result) => result,
            Err(e) => {
                warn!("Analysis unavailable for {}: {}", symbol, e);
                (self.unavailable(symbol, price), None)
            }
        };

        if let Err(e) = self.sink.store(&strategy) {
            warn!("Failed to store strategy for {}: {}", symbol, e);
        }
        match self.broadcaster.publish(&strategy) {
            Ok(receivers) => debug!(symbol, receivers, "published strategy"),
            Err(e) => warn!("Failed to publish strategy for {}: {}", symbol, e),
        }

        (strategy, last_close)
    }

    async fn compute(
        &self,
        symbol: &str,
        price: Option<f64>,
    ) -> Result<(BreakoutStrategy, Option<f64>)> {
        let _permit = self
            .workers
            .acquire()
            .await
            .map_err(|e| AppError::Internal(e.to_string()))?;

        let work = async {
            let bars = self.history.fetch(symbol, self.lookback).await?;
            let last_close = bars.last().map(|b| b.close);
            let engine = Arc::clone(&self.engine);
            let symbol = symbol.to_string();
            let live_jitter = self.live_jitter;
            // a non-positive price makes the engine use the last close
            let price = price.unwrap_or(0.0);

            let strategy = tokio::task::spawn_blocking(move || {
                if live_jitter {
                    let mut jitter = LiveJitter::from_entropy();
                    engine.analyze_with(&symbol, &bars, price, &mut jitter, None)
                } else {
                    engine.analyze(&symbol, &bars, price)
                }
            })
            .await?;

            Ok::<_, AppError>((strategy, last_close))
        };

        tokio::time::timeout(self.timeout, work).await?
    }

    fn unavailable(&self, symbol: &str, price: Option<f64>) -> BreakoutStrategy {
        self.engine
            .neutral_strategy(symbol, &[], price.unwrap_or(0.0), Utc::now())
    }

    /// Analyze every tracked symbol concurrently. Results come back in
    /// symbol order.
    pub async fn run_all(
        self: &Arc<Self>,
        repository: &Arc<SymbolRepository>,
    ) -> Vec<BreakoutStrategy> {
        let symbols = repository.symbols();
        info!("Analyzing {} symbols", symbols.len());

        let handles: Vec<_> = symbols
            .into_iter()
            .map(|symbol| {
                let runner = Arc::clone(self);
                let repository = Arc::clone(repository);
                tokio::spawn(async move { runner.run_tracked(&repository, &symbol).await })
            })
            .collect();

        let mut results = Vec::with_capacity(handles.len());
        for handle in handles {
            match handle.await {
                Ok(strategy) => results.push(strategy),
                Err(e) => warn!("Symbol task failed: {}", e),
            }
        }
        results
    }

    /// Re-run every `interval` until the task is dropped.
    pub async fn run_forever(self: Arc<Self>, repository: Arc<SymbolRepository>, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            let results = self.run_all(&repository).await;
            let calls = results
                .iter()
                .filter(|s| s.signal != SignalDirection::Neutral)
                .count();
            info!("Pass complete: {} strategies, {} directional", results.len(), calls);
        }
    }
}
