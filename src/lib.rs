//! Breakout - technical analysis and signal fusion for daily OHLCV series

pub mod config;
pub mod error;
pub mod services;
pub mod types;

// Re-export commonly used types
pub use config::{Config, EngineConfig};
pub use error::{AppError, Result};
pub use services::signals::{analyze, BreakoutEngine, Entropy, LiveJitter, NoJitter};
pub use types::*;
