//! Technical indicator implementations.
//!
//! Every indicator here is a pure function over a window of close prices and
//! is recomputed from scratch on each call. None of them fail: a window that
//! is too short yields a neutral default instead.
//!
//! - `sma`: arithmetic mean of the most recent closes
//! - `ema`: full exponential moving average series
//! - `rsi`: simple-average RSI over the last `period` changes
//! - `macd`: MACD line, signal line and histogram at the latest close
//! - `bollinger_position`: where the latest close sits inside the bands
//! - `std_dev`: population standard deviation

pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;
pub mod stddev;

pub use bollinger::{DEFAULT_BOLLINGER_PERIOD, bollinger_bands, bollinger_position};
pub use ema::ema;
pub use macd::{MacdValue, macd};
pub use rsi::{DEFAULT_RSI_PERIOD, rsi};
pub use sma::sma;
pub use stddev::std_dev;

use crate::domain::price_bar::{PriceBar, closes};

/// Snapshot of the standard indicator set at the latest bar.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IndicatorSet {
    pub last_close: f64,
    pub rsi_14: f64,
    pub sma_20: f64,
    pub sma_50: f64,
    pub ema_12: f64,
    pub ema_26: f64,
    pub macd: MacdValue,
    pub bollinger_position: f64,
}

/// Compute the standard indicator set over the full bar history.
pub fn compute_indicators(bars: &[PriceBar]) -> IndicatorSet {
    let prices = closes(bars);
    IndicatorSet {
        last_close: prices.last().copied().unwrap_or(0.0),
        rsi_14: rsi(&prices, DEFAULT_RSI_PERIOD),
        sma_20: sma(&prices, 20),
        sma_50: sma(&prices, 50),
        ema_12: ema(&prices, 12).last().copied().unwrap_or(0.0),
        ema_26: ema(&prices, 26).last().copied().unwrap_or(0.0),
        macd: macd(&prices),
        bollinger_position: bollinger_position(&prices, DEFAULT_BOLLINGER_PERIOD),
    }
}
