//! Persistence of computed strategies.

use dashmap::DashMap;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::debug;

use crate::error::Result;
use crate::types::BreakoutStrategy;

/// Destination for computed strategies.
pub trait StrategySink: Send + Sync {
    fn store(&self, strategy: &BreakoutStrategy) -> Result<()>;
}

/// In-memory store keeping the latest strategy per symbol plus a bounded
/// history.
pub struct MemoryStrategyStore {
    latest: DashMap<String, BreakoutStrategy>,
    history: DashMap<String, VecDeque<BreakoutStrategy>>,
    max_history: usize,
}

impl MemoryStrategyStore {
    /// Results kept per symbol.
    pub const DEFAULT_HISTORY: usize = 100;

    pub fn new() -> Arc<Self> {
        Self::with_history(Self::DEFAULT_HISTORY)
    }

    pub fn with_history(max_history: usize) -> Arc<Self> {
        Arc::new(Self {
            latest: DashMap::new(),
            history: DashMap::new(),
            max_history: max_history.max(1),
        })
    }

    /// Latest strategy for a symbol.
    pub fn get(&self, symbol: &str) -> Option<BreakoutStrategy> {
        self.latest
            .get(&symbol.to_uppercase())
            .map(|s| s.value().clone())
    }

    /// Stored strategies for a symbol, oldest first.
    pub fn history(&self, symbol: &str) -> Vec<BreakoutStrategy> {
        self.history
            .get(&symbol.to_uppercase())
            .map(|h| h.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Latest strategy of every symbol, sorted by symbol.
    pub fn all(&self) -> Vec<BreakoutStrategy> {
        let mut all: Vec<BreakoutStrategy> = self.latest.iter().map(|s| s.value().clone()).collect();
        all.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        all
    }

    pub fn len(&self) -> usize {
        self.latest.len()
    }

    pub fn is_empty(&self) -> bool {
        self.latest.is_empty()
    }
}

impl StrategySink for MemoryStrategyStore {
    fn store(&self, strategy: &BreakoutStrategy) -> Result<()> {
        let key = strategy.symbol.to_uppercase();

        let mut history = self.history.entry(key.clone()).or_default();
        history.push_back(strategy.clone());
        while history.len() > self.max_history {
            history.pop_front();
        }
        drop(history);

        self.latest.insert(key, strategy.clone());
        debug!(symbol = %strategy.symbol, signal = strategy.signal.label(), "stored strategy");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::signals::analyze;

    fn strategy(symbol: &str) -> BreakoutStrategy {
        analyze(symbol, &[], 100.0)
    }

    #[test]
    fn test_store_and_get() {
        let store = MemoryStrategyStore::new();
        assert!(store.is_empty());
        store.store(&strategy("aapl")).unwrap();
        assert_eq!(store.get("AAPL").map(|s| s.symbol), Some("aapl".to_string()));
        assert_eq!(store.len(), 1);
        assert!(store.get("MSFT").is_none());
    }

    #[test]
    fn test_history_is_bounded() {
        let store = MemoryStrategyStore::with_history(3);
        for _ in 0..5 {
            store.store(&strategy("NVDA")).unwrap();
        }
        assert_eq!(store.history("nvda").len(), 3);
    }

    #[test]
    fn test_all_sorted() {
        let store = MemoryStrategyStore::new();
        store.store(&strategy("MSFT")).unwrap();
        store.store(&strategy("AAPL")).unwrap();
        let symbols: Vec<String> = store.all().into_iter().map(|s| s.symbol).collect();
        assert_eq!(symbols, vec!["AAPL", "MSFT"]);
    }
}
