use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{AppError, Result};
use crate::services::signals::SupportResistanceAnalyzer;
use crate::types::LookbackPeriod;

/// Engine tuning shared by every analysis call.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Series shorter than this produce the neutral default.
    pub min_bars: usize,
    /// Support/resistance parameters.
    pub levels: SupportResistanceAnalyzer,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_bars: 20,
            levels: SupportResistanceAnalyzer::default(),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Symbols analyzed on every pass.
    pub symbols: Vec<String>,
    /// History window requested from the provider.
    pub lookback: LookbackPeriod,
    /// Directory of `<SYMBOL>.json` bar files; synthetic history when unset.
    pub history_dir: Option<PathBuf>,
    /// Per-symbol budget for fetch + analysis.
    pub engine_timeout: Duration,
    /// Maximum symbols analyzed at once.
    pub worker_concurrency: usize,
    /// Re-run interval; `None` runs a single pass.
    pub refresh_interval: Option<Duration>,
    /// Seed for synthetic fallback history.
    pub synthetic_seed: u64,
    /// Perturb ensemble scores with seeded noise.
    pub live_jitter: bool,
    pub engine: EngineConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            symbols: default_symbols(),
            lookback: LookbackPeriod::OneYear,
            history_dir: None,
            engine_timeout: Duration::from_millis(5_000),
            worker_concurrency: 4,
            refresh_interval: None,
            synthetic_seed: 42,
            live_jitter: false,
            engine: EngineConfig::default(),
        }
    }
}

fn default_symbols() -> Vec<String> {
    ["AAPL", "MSFT", "NVDA", "AMZN", "TSLA"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        // Format: "AAPL,MSFT,NVDA"
        let symbols: Vec<String> = env::var("BREAKOUT_SYMBOLS")
            .ok()
            .map(|s| {
                s.split(',')
                    .map(|sym| sym.trim().to_uppercase())
                    .filter(|sym| !sym.is_empty())
                    .collect()
            })
            .unwrap_or(defaults.symbols);

        let lookback = env::var("LOOKBACK_PERIOD")
            .ok()
            .and_then(|p| LookbackPeriod::from_str(p.trim()))
            .unwrap_or(defaults.lookback);

        let engine_timeout = env::var("ENGINE_TIMEOUT_MS")
            .ok()
            .and_then(|ms| ms.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.engine_timeout);

        let worker_concurrency = env::var("WORKER_CONCURRENCY")
            .ok()
            .and_then(|n| n.parse().ok())
            .unwrap_or(defaults.worker_concurrency);

        // 0 or unset runs a single pass
        let refresh_interval = env::var("REFRESH_INTERVAL_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        Self {
            symbols,
            lookback,
            history_dir: env::var("HISTORY_DIR").ok().map(PathBuf::from),
            engine_timeout,
            worker_concurrency,
            refresh_interval,
            synthetic_seed: env::var("SYNTHETIC_SEED")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.synthetic_seed),
            live_jitter: env::var("LIVE_JITTER")
                .map(|v| parse_flag(&v))
                .unwrap_or(defaults.live_jitter),
            engine: defaults.engine,
        }
    }

    /// Reject settings the runner cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.symbols.is_empty() {
            return Err(AppError::Config("no symbols configured".to_string()));
        }
        if self.worker_concurrency == 0 {
            return Err(AppError::Config(
                "WORKER_CONCURRENCY must be at least 1".to_string(),
            ));
        }
        if self.engine_timeout.is_zero() {
            return Err(AppError::Config(
                "ENGINE_TIMEOUT_MS must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.engine.min_bars, 20);
        assert_eq!(config.lookback.trading_days(), 252);
    }

    #[test]
    fn test_validate_rejects_bad_settings() {
        let no_workers = Config {
            worker_concurrency: 0,
            ..Config::default()
        };
        assert!(matches!(no_workers.validate(), Err(AppError::Config(_))));

        let no_symbols = Config {
            symbols: Vec::new(),
            ..Config::default()
        };
        assert!(no_symbols.validate().is_err());
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("true"));
        assert!(parse_flag(" 1 "));
        assert!(parse_flag("YES"));
        assert!(!parse_flag("false"));
        assert!(!parse_flag(""));
    }
}
