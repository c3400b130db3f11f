//! Smart Exit Optimizer: which holding period has paid best historically.
//!
//! For each horizon bucket every bar is treated as a long entry held for the
//! bucket's length. Buckets are scored by
//! `0.5·win_rate + 10·avg_return - 2·|max_drawdown|` and the best one sets a
//! volatility-scaled target and stop. The tool is advisory only and always
//! holds.

use super::{AnalysisTool, Signal, ToolInput, ToolResult, mean, pct_returns};
use crate::domain::indicator::std_dev;
use crate::domain::price_bar::{bar_interval_minutes, pct_change};

const MIN_BARS: usize = 100;
const MIN_SAMPLES: usize = 10;
const TARGET_VOL_MULTIPLIER: f64 = 1.5;
const STOP_VOL_MULTIPLIER: f64 = 1.0;

pub const HOLD_BUCKETS: [(u32, &str); 5] = [
    (5, "5m"),
    (15, "15m"),
    (60, "1h"),
    (240, "4h"),
    (1440, "1d"),
];

#[derive(Debug, Clone, PartialEq)]
pub struct ExitPlan {
    pub label: &'static str,
    pub hold_minutes: u32,
    pub hold_bars: usize,
    pub samples: usize,
    pub win_rate: f64,
    pub avg_return: f64,
    /// Worst adverse excursion over all samples, as a non-positive percent.
    pub max_drawdown: f64,
    pub score: f64,
    pub target_percent: f64,
    pub stop_percent: f64,
}

fn evaluate_bucket(
    prices: &[f64],
    label: &'static str,
    hold_minutes: u32,
    hold_bars: usize,
    volatility: f64,
) -> Option<ExitPlan> {
    if prices.len() < hold_bars + MIN_SAMPLES {
        return None;
    }
    let samples = prices.len() - hold_bars;

    let mut wins = 0usize;
    let mut returns = Vec::with_capacity(samples);
    let mut max_drawdown = 0.0_f64;

    for entry in 0..samples {
        let base = prices[entry];
        let exit = pct_change(base, prices[entry + hold_bars]);
        if exit > 0.0 {
            wins += 1;
        }
        returns.push(exit);
        for &p in &prices[entry + 1..=entry + hold_bars] {
            max_drawdown = max_drawdown.min(pct_change(base, p));
        }
    }

    let win_rate = wins as f64 / samples as f64 * 100.0;
    let avg_return = mean(&returns);
    let score = 0.5 * win_rate + 10.0 * avg_return - 2.0 * max_drawdown.abs();
    let horizon_vol = volatility * (hold_bars as f64).sqrt();

    Some(ExitPlan {
        label,
        hold_minutes,
        hold_bars,
        samples,
        win_rate,
        avg_return,
        max_drawdown,
        score,
        target_percent: TARGET_VOL_MULTIPLIER * horizon_vol,
        stop_percent: STOP_VOL_MULTIPLIER * horizon_vol,
    })
}

/// Best-scoring holding bucket, or `None` when no bucket has enough samples.
pub fn optimize(prices: &[f64], interval_minutes: f64) -> Option<ExitPlan> {
    let volatility = std_dev(&pct_returns(prices));
    let mut best: Option<ExitPlan> = None;

    for (minutes, label) in HOLD_BUCKETS {
        let hold_bars = ((minutes as f64 / interval_minutes).round() as usize).max(1);
        let Some(plan) = evaluate_bucket(prices, label, minutes, hold_bars, volatility) else {
            continue;
        };
        match &best {
            Some(b) if plan.score <= b.score => {}
            _ => best = Some(plan),
        }
    }
    best
}

pub fn analyze(input: &ToolInput<'_>) -> Option<ToolResult> {
    if input.prices.len() < MIN_BARS {
        return None;
    }
    let plan = optimize(&input.prices, bar_interval_minutes(input.history))?;

    Some(ToolResult::new(
        AnalysisTool::SmartExit,
        0.0,
        plan.win_rate.clamp(20.0, 90.0),
        Signal::Hold,
        format!(
            "Best hold {} (win {:.0}%, avg {:+.2}%, worst {:.2}%): target +{:.2}%, stop -{:.2}%",
            plan.label,
            plan.win_rate,
            plan.avg_return,
            plan.max_drawdown,
            plan.target_percent,
            plan.stop_percent
        ),
    ))
}
