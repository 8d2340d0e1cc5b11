//! Historical bar providers.
//!
//! The engine only consumes bars; fetching them is behind [`HistoryProvider`].
//! [`FallbackHistory`] wraps any provider and substitutes seeded synthetic
//! history when the provider fails or returns nothing usable.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;

use chrono::{Datelike, Days, NaiveDate, Utc, Weekday};
use dashmap::DashMap;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};

use crate::error::{AppError, Result};
use crate::types::{sanitize_bars, LookbackPeriod, PriceBar};

/// Boxed future returned by providers.
pub type HistoryFuture<'a> = Pin<Box<dyn Future<Output = Result<Vec<PriceBar>>> + Send + 'a>>;

/// Source of daily bars, oldest first.
pub trait HistoryProvider: Send + Sync {
    /// Provider name for logs.
    fn name(&self) -> &str;

    /// Fetch bars for `symbol` covering `lookback`.
    fn fetch<'a>(&'a self, symbol: &'a str, lookback: LookbackPeriod) -> HistoryFuture<'a>;
}

/// In-memory bars keyed by upper-case symbol.
#[derive(Default)]
pub struct MemoryHistory {
    series: DashMap<String, Vec<PriceBar>>,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, symbol: &str, bars: Vec<PriceBar>) {
        self.series.insert(symbol.to_uppercase(), bars);
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

impl HistoryProvider for MemoryHistory {
    fn name(&self) -> &str {
        "memory"
    }

    fn fetch<'a>(&'a self, symbol: &'a str, lookback: LookbackPeriod) -> HistoryFuture<'a> {
        Box::pin(async move {
            let bars = self
                .series
                .get(&symbol.to_uppercase())
                .map(|entry| entry.value().clone())
                .ok_or_else(|| AppError::NotFound(format!("no history for {symbol}")))?;
            let keep = lookback.trading_days().min(bars.len());
            Ok(bars[bars.len() - keep..].to_vec())
        })
    }
}

/// Reads `<dir>/<SYMBOL>.json`, a JSON array of bars oldest first.
#[derive(Debug, Clone)]
pub struct JsonFileHistory {
    dir: PathBuf,
}

impl JsonFileHistory {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{}.json", symbol.to_uppercase()))
    }
}

impl HistoryProvider for JsonFileHistory {
    fn name(&self) -> &str {
        "json-file"
    }

    fn fetch<'a>(&'a self, symbol: &'a str, lookback: LookbackPeriod) -> HistoryFuture<'a> {
        Box::pin(async move {
            let path = self.path_for(symbol);
            let raw = match tokio::fs::read_to_string(&path).await {
                Ok(raw) => raw,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    return Err(AppError::NotFound(path.display().to_string()));
                }
                Err(e) => {
                    return Err(AppError::Provider(format!("{}: {}", path.display(), e)));
                }
            };
            let mut bars: Vec<PriceBar> = serde_json::from_str(&raw)?;
            bars.sort_by_key(|b| b.date);
            let keep = lookback.trading_days().min(bars.len());
            Ok(bars.split_off(bars.len() - keep))
        })
    }
}

/// Seeded random-walk history. The same seed, symbol and end date always
/// produce the same series.
#[derive(Debug, Clone)]
pub struct SyntheticHistory {
    seed: u64,
    end: NaiveDate,
}

impl SyntheticHistory {
    /// Daily return amplitude.
    const DAILY_MOVE: f64 = 0.02;
    /// Upward bias per session.
    const DRIFT: f64 = 0.0004;

    /// Series ending today.
    pub fn new(seed: u64) -> Self {
        Self::ending(seed, Utc::now().date_naive())
    }

    pub fn ending(seed: u64, end: NaiveDate) -> Self {
        Self { seed, end }
    }

    /// FNV-1a over the symbol, mixed with the seed.
    fn symbol_seed(&self, symbol: &str) -> u64 {
        let hash = symbol
            .to_uppercase()
            .bytes()
            .fold(0xcbf2_9ce4_8422_2325u64, |h, b| {
                (h ^ b as u64).wrapping_mul(0x0100_0000_01b3)
            });
        hash ^ self.seed
    }

    /// The last `sessions` weekdays up to and including the end date.
    fn session_dates(&self, sessions: usize) -> Vec<NaiveDate> {
        let mut dates = Vec::with_capacity(sessions);
        let mut day = self.end;
        while dates.len() < sessions {
            if !matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
                dates.push(day);
            }
            match day.checked_sub_days(Days::new(1)) {
                Some(prev) => day = prev,
                None => break,
            }
        }
        dates.reverse();
        dates
    }

    /// Generate `sessions` bars for `symbol`.
    pub fn generate(&self, symbol: &str, sessions: usize) -> Vec<PriceBar> {
        let mut rng = StdRng::seed_from_u64(self.symbol_seed(symbol));
        let mut close: f64 = rng.gen_range(20.0..400.0);
        let base_volume: f64 = rng.gen_range(5e5..5e6);

        self.session_dates(sessions)
            .into_iter()
            .map(|date| {
                let open = close;
                let change = Self::DRIFT + rng.gen_range(-Self::DAILY_MOVE..Self::DAILY_MOVE);
                close = (open * (1.0 + change)).max(0.01);
                let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
                let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
                let volume = base_volume * rng.gen_range(0.5..1.5);
                PriceBar::new(date, open, high, low, close, volume.round())
            })
            .collect()
    }
}

impl HistoryProvider for SyntheticHistory {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn fetch<'a>(&'a self, symbol: &'a str, lookback: LookbackPeriod) -> HistoryFuture<'a> {
        Box::pin(async move { Ok(self.generate(symbol, lookback.trading_days())) })
    }
}

/// Primary provider with a synthetic fallback.
///
/// Bars from the primary are sanitized; an error or an empty result switches
/// to synthetic history for that symbol.
pub struct FallbackHistory {
    primary: Arc<dyn HistoryProvider>,
    fallback: SyntheticHistory,
}

impl FallbackHistory {
    pub fn new(primary: Arc<dyn HistoryProvider>, fallback: SyntheticHistory) -> Self {
        Self { primary, fallback }
    }
}

impl HistoryProvider for FallbackHistory {
    fn name(&self) -> &str {
        "fallback"
    }

    fn fetch<'a>(&'a self, symbol: &'a str, lookback: LookbackPeriod) -> HistoryFuture<'a> {
        Box::pin(async move {
            match self.primary.fetch(symbol, lookback).await {
                Ok(bars) => {
                    let fetched = bars.len();
                    let clean = sanitize_bars(bars);
                    if clean.len() < fetched {
                        debug!(
                            symbol,
                            dropped = fetched - clean.len(),
                            "dropped malformed bars"
                        );
                    }
                    if !clean.is_empty() {
                        return Ok(clean);
                    }
                    warn!(
                        "[{}] returned no usable bars for {}, using synthetic history",
                        self.primary.name(),
                        symbol
                    );
                }
                Err(e) => {
                    warn!(
                        "[{}] failed for {}: {}, using synthetic history",
                        self.primary.name(),
                        symbol,
                        e
                    );
                }
            }
            self.fallback.fetch(symbol, lookback).await
        })
    }
}
