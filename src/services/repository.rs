//! Tracked symbols and their latest known prices.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::Arc;

/// Symbols the runner analyzes on each pass, each with the last price seen
/// for it. Symbols are stored upper-case.
#[derive(Default)]
pub struct SymbolRepository {
    symbols: DashMap<String, Option<f64>>,
}

impl SymbolRepository {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn from_symbols<S: AsRef<str>>(symbols: &[S]) -> Arc<Self> {
        let repo = Self::default();
        for symbol in symbols {
            repo.add(symbol.as_ref());
        }
        Arc::new(repo)
    }

    fn key(symbol: &str) -> String {
        symbol.trim().to_uppercase()
    }

    /// Track a symbol. Returns false if it was already tracked or blank.
    pub fn add(&self, symbol: &str) -> bool {
        let symbol = Self::key(symbol);
        if symbol.is_empty() {
            return false;
        }
        match self.symbols.entry(symbol) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(None);
                true
            }
        }
    }

    pub fn remove(&self, symbol: &str) -> bool {
        self.symbols.remove(&Self::key(symbol)).is_some()
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.symbols.contains_key(&Self::key(symbol))
    }

    /// Record the latest price of a tracked symbol. Untracked symbols and
    /// non-positive prices are ignored.
    pub fn update_price(&self, symbol: &str, price: f64) -> bool {
        if !price.is_finite() || price <= 0.0 {
            return false;
        }
        match self.symbols.get_mut(&Self::key(symbol)) {
            Some(mut entry) => {
                *entry = Some(price);
                true
            }
            None => false,
        }
    }

    /// Latest price, if one has been recorded.
    pub fn price(&self, symbol: &str) -> Option<f64> {
        self.symbols.get(&Self::key(symbol)).and_then(|entry| *entry)
    }

    /// Sorted snapshot.
    pub fn symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self.symbols.iter().map(|s| s.key().clone()).collect();
        symbols.sort();
        symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}
