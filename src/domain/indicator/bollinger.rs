//! Bollinger Bands.
//!
//! - Middle: SMA over n periods
//! - Upper: Middle + 2 × StdDev
//! - Lower: Middle - 2 × StdDev
//!
//! StdDev is population standard deviation (divides by N, not N-1).
//! Position = (current - lower) / (upper - lower), clamped to [0, 1].
//! Collapsed bands or fewer than n prices: position = 0.5.

use crate::domain::indicator::{sma, std_dev};

pub const DEFAULT_BOLLINGER_PERIOD: usize = 20;
pub const BOLLINGER_MULTIPLIER: f64 = 2.0;

const NEUTRAL_POSITION: f64 = 0.5;
/// Band width, relative to the middle, at or below which the bands count as
/// collapsed. Absorbs the rounding left in `std_dev` of a flat window.
const COLLAPSED_WIDTH: f64 = 1e-9;

/// (upper, middle, lower) over the trailing `period` prices.
pub fn bollinger_bands(prices: &[f64], period: usize) -> Option<(f64, f64, f64)> {
    if period == 0 || prices.len() < period {
        return None;
    }
    let window = &prices[prices.len() - period..];
    let middle = sma(window, period);
    let stddev = std_dev(window);
    Some((
        middle + BOLLINGER_MULTIPLIER * stddev,
        middle,
        middle - BOLLINGER_MULTIPLIER * stddev,
    ))
}

pub fn bollinger_position(prices: &[f64], period: usize) -> f64 {
    let Some((upper, middle, lower)) = bollinger_bands(prices, period) else {
        return NEUTRAL_POSITION;
    };
    if upper - lower <= COLLAPSED_WIDTH * middle.abs().max(1.0) {
        return NEUTRAL_POSITION;
    }
    let current = prices[prices.len() - 1];
    ((current - lower) / (upper - lower)).clamp(0.0, 1.0)
}
