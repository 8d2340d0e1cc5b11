//! Technical indicator implementations.
//!
//! Every indicator degrades to a documented default instead of failing when
//! the series is shorter than its window.

pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;
pub mod stochastic;
pub mod trend;
pub mod volatility;
pub mod volume;
pub mod williams;

pub use atr::Atr;
pub use bollinger::BollingerBands;
pub use ema::{ema, ema_series, Ema};
pub use macd::Macd;
pub use rsi::{Rsi, RSI_NEUTRAL};
pub use sma::{mean, sma, std_dev, Sma};
pub use stochastic::Stochastic;
pub use trend::classify_trend;
pub use volatility::{annualized_volatility, daily_returns, VolatilityRegimeClassifier};
pub use volume::volume_ratio;
pub use williams::WilliamsR;

use crate::types::{IndicatorSet, PriceBar};

/// Closing prices of a series.
pub fn closes(bars: &[PriceBar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}

/// Compute the full indicator bundle for a series.
pub fn compute_indicators(bars: &[PriceBar]) -> IndicatorSet {
    let closes = closes(bars);
    let Some(&close) = closes.last() else {
        return IndicatorSet::default();
    };

    let sma20 = Sma::new(20).calculate(&closes);
    let sma50 = Sma::new(50).calculate(&closes);
    let bollinger = BollingerBands::default().calculate(&closes);

    IndicatorSet {
        rsi: Rsi::default().calculate(&closes),
        sma20,
        sma50,
        sma200: Sma::new(200).calculate(&closes),
        ema9: Ema::new(9).calculate(&closes),
        ema12: Ema::new(12).calculate(&closes),
        ema26: Ema::new(26).calculate(&closes),
        macd: Macd::default().calculate(&closes),
        bollinger_position: bollinger.position(close),
        bollinger,
        stochastic: Stochastic::default().calculate(bars),
        williams_r: WilliamsR::default().calculate(bars),
        atr: Atr::default().calculate(bars),
        volatility: annualized_volatility(&closes, 20),
        volatility_regime: VolatilityRegimeClassifier::default().calculate(&closes),
        trend: classify_trend(&closes, sma20, sma50),
        volume_ratio: volume_ratio(bars, 20),
    }
}
