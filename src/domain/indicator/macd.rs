//! MACD (Moving Average Convergence Divergence).
//!
//! MACD Line = EMA(12) - EMA(26)
//! Signal Line = EMA(9) of the last 9 MACD line values only
//! Histogram = MACD Line - Signal Line
//!
//! Fewer than 26 prices: all three values are zero.

use crate::domain::indicator::ema;

pub const MACD_FAST: usize = 12;
pub const MACD_SLOW: usize = 26;
pub const MACD_SIGNAL: usize = 9;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MacdValue {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

pub fn macd(prices: &[f64]) -> MacdValue {
    if prices.len() < MACD_SLOW {
        return MacdValue::default();
    }

    let fast = ema(prices, MACD_FAST);
    let slow = ema(prices, MACD_SLOW);
    let line: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();

    let tail = &line[line.len() - MACD_SIGNAL.min(line.len())..];
    let signal = ema(tail, MACD_SIGNAL).last().copied().unwrap_or(0.0);
    let macd = line.last().copied().unwrap_or(0.0);

    MacdValue {
        macd,
        signal,
        histogram: macd - signal,
    }
}
