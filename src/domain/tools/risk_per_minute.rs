//! Risk-Per-Minute: recent volatility per minute against its baseline.
//!
//! Mean absolute bar return over the last 30 bars is compared with the 30
//! before. Elevated risk suppresses entries; unusually calm tape is treated
//! as a favourable entry window.

use super::{AnalysisTool, Signal, ToolInput, ToolResult, mean, pct_returns};
use crate::domain::price_bar::bar_interval_minutes;

const MIN_BARS: usize = 60;
const WINDOW: usize = 30;
const ELEVATED_RATIO: f64 = 1.5;
const DEPRESSED_RATIO: f64 = 0.5;

/// (recent, baseline) mean absolute percent move per minute.
pub fn risk_rates(prices: &[f64], interval_minutes: f64) -> (f64, f64) {
    let moves: Vec<f64> = pct_returns(prices).iter().map(|r| r.abs()).collect();
    let split = moves.len().saturating_sub(WINDOW);
    let recent = &moves[split..];
    let baseline = &moves[split.saturating_sub(WINDOW)..split];
    (
        mean(recent) / interval_minutes,
        mean(baseline) / interval_minutes,
    )
}

pub fn analyze(input: &ToolInput<'_>) -> Option<ToolResult> {
    if input.prices.len() < MIN_BARS {
        return None;
    }

    let (recent, baseline) = risk_rates(&input.prices, bar_interval_minutes(input.history));
    let ratio = if baseline > 0.0 {
        recent / baseline
    } else if recent > 0.0 {
        f64::INFINITY
    } else {
        1.0
    };
    let detail = format!(
        "risk {:.4}%/min vs baseline {:.4}%/min (x{:.2})",
        recent, baseline, ratio
    );

    let result = if ratio > ELEVATED_RATIO {
        let excess = (ratio - ELEVATED_RATIO) * 20.0;
        ToolResult::new(
            AnalysisTool::RiskPerMinute,
            -(excess + 10.0).min(25.0),
            (60.0 + excess).min(95.0),
            Signal::Hold,
            format!("Elevated {}", detail),
        )
    } else if ratio < DEPRESSED_RATIO {
        ToolResult::new(
            AnalysisTool::RiskPerMinute,
            10.0,
            65.0,
            Signal::Buy,
            format!("Calm {}", detail),
        )
    } else {
        ToolResult::new(
            AnalysisTool::RiskPerMinute,
            0.0,
            50.0,
            Signal::Hold,
            format!("Normal {}", detail),
        )
    };
    Some(result)
}
