//! Momentum Pulse: short-horizon rate of change and its acceleration.
//!
//! The live price is appended to the close history, then
//! `blended = 0.6·roc1 + 0.4·roc5 + 0.5·(roc1 - roc5/5)`.
//! Strength is `|blended|·10`; under the floor the tool holds.

use super::{AnalysisTool, Signal, ToolInput, ToolResult, is_valid_price};
use crate::domain::price_bar::pct_change;

const SHORT_LOOKBACK: usize = 5;

pub fn analyze(input: &ToolInput<'_>) -> Option<ToolResult> {
    let mut series = input.prices.clone();
    match input.current_price {
        Some(price) if is_valid_price(price) => series.push(price),
        Some(_) => return None,
        None => {}
    }
    let n = series.len();
    if n < 2 {
        return None;
    }

    let price = series[n - 1];
    let roc1 = pct_change(series[n - 2], price);
    let roc5 = pct_change(series[n - 1 - SHORT_LOOKBACK.min(n - 1)], price);
    let acceleration = roc1 - roc5 / SHORT_LOOKBACK as f64;
    let blended = 0.6 * roc1 + 0.4 * roc5 + 0.5 * acceleration;
    let strength = blended.abs() * 10.0;

    let detail = format!(
        "roc1 {:+.2}%, roc5 {:+.2}%, acceleration {:+.2}",
        roc1, roc5, acceleration
    );

    if strength < input.settings.momentum_strength_floor {
        return Some(ToolResult::new(
            AnalysisTool::MomentumPulse,
            0.0,
            30.0 + 5.0 * strength,
            Signal::Hold,
            format!("Weak momentum (strength {:.1}): {}", strength, detail),
        ));
    }

    let signal = if blended > 0.0 { Signal::Buy } else { Signal::Sell };
    Some(ToolResult::new(
        AnalysisTool::MomentumPulse,
        blended * 10.0,
        (50.0 + 2.0 * strength).min(95.0),
        signal,
        format!("Momentum strength {:.1}: {}", strength, detail),
    ))
}
