//! Trade Timing Score: additive 0..=100 readiness score.
//!
//! | Component            | Points                                      |
//! |----------------------|---------------------------------------------|
//! | 20-bar volatility    | 25 in 0.1..=1.0%, 10 below, 5 above         |
//! | Trend (SMA5/SMA20)   | 20 above, 10 equal, 0 below                 |
//! | 50-bar range         | 20 near support, 10 mid-range, 0 near top   |
//! | Time of day          | 15 prime hours, 8 other open hours          |
//! | Market open          | +20 open, -30 closed                        |

use chrono::Timelike;

use super::{AnalysisTool, Signal, ToolInput, ToolResult, pct_returns};
use crate::domain::indicator::{sma, std_dev};

const MIN_BARS: usize = 50;
const VOLATILITY_WINDOW: usize = 20;
const RANGE_WINDOW: usize = 50;
/// Local hours when oil liquidity peaks around the US open.
const PRIME_HOURS: std::ops::Range<u32> = 14..18;

const BUY_THRESHOLD: f64 = 70.0;
const SELL_THRESHOLD: f64 = 30.0;

#[derive(Debug, Clone, PartialEq)]
pub struct TimingBreakdown {
    pub volatility: f64,
    pub trend: f64,
    pub range_position: f64,
    pub time_of_day: f64,
    pub market_open: f64,
}

impl TimingBreakdown {
    pub fn total(&self) -> f64 {
        (self.volatility + self.trend + self.range_position + self.time_of_day + self.market_open)
            .clamp(0.0, 100.0)
    }
}

pub fn breakdown(input: &ToolInput<'_>, price: f64) -> TimingBreakdown {
    let prices = &input.prices;

    let returns = pct_returns(&prices[prices.len().saturating_sub(VOLATILITY_WINDOW + 1)..]);
    let vol = std_dev(&returns);
    let volatility = if (0.1..=1.0).contains(&vol) {
        25.0
    } else if vol < 0.1 {
        10.0
    } else {
        5.0
    };

    let fast = sma(prices, 5);
    let slow = sma(prices, 20);
    let trend = if (fast - slow).abs() < 1e-12 {
        10.0
    } else if fast > slow {
        20.0
    } else {
        0.0
    };

    let window = &prices[prices.len().saturating_sub(RANGE_WINDOW)..];
    let support = window.iter().copied().fold(f64::MAX, f64::min);
    let resistance = window.iter().copied().fold(f64::MIN, f64::max);
    let range_position = if resistance > support {
        let position = (price - support) / (resistance - support);
        if position < 0.2 {
            20.0
        } else if position <= 0.8 {
            10.0
        } else {
            0.0
        }
    } else {
        10.0
    };

    let open = input.settings.market_hours.is_open(input.now);
    let time_of_day = if !open {
        0.0
    } else if PRIME_HOURS.contains(&input.now.hour()) {
        15.0
    } else {
        8.0
    };

    TimingBreakdown {
        volatility,
        trend,
        range_position,
        time_of_day,
        market_open: if open { 20.0 } else { -30.0 },
    }
}

pub fn analyze(input: &ToolInput<'_>) -> Option<ToolResult> {
    if input.prices.len() < MIN_BARS {
        return None;
    }
    let price = input.price()?;
    let parts = breakdown(input, price);
    let total = parts.total();

    let signal = if total >= BUY_THRESHOLD {
        Signal::Buy
    } else if total <= SELL_THRESHOLD {
        Signal::Sell
    } else {
        Signal::Hold
    };

    Some(ToolResult::new(
        AnalysisTool::TradeTiming,
        (total - 50.0) / 2.0,
        50.0 + (total - 50.0).abs(),
        signal,
        format!(
            "Timing {:.0}/100 (vol {:.0}, trend {:.0}, range {:.0}, time {:.0}, session {:+.0})",
            total,
            parts.volatility,
            parts.trend,
            parts.range_position,
            parts.time_of_day,
            parts.market_open
        ),
    ))
}
