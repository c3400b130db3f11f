//! Frequency Analyzer: which sampling interval carries the cleanest trend.
//!
//! Each candidate interval resamples the close series (aligned to the latest
//! bar) and replays a momentum-continuation strategy: follow the sign of the
//! previous return for one step. Intervals are scored by
//! `0.5·win_rate + 10·avg_return + 20·(1 - noise)`, where noise is the share
//! of consecutive returns that flip sign.

use super::{AnalysisTool, Signal, ToolInput, ToolResult, mean, pct_returns};
use crate::domain::price_bar::bar_interval_minutes;

const MIN_BARS: usize = 50;
const MIN_SAMPLES: usize = 5;
const MIN_TRADES: usize = 2;
const BUY_SCORE: f64 = 60.0;

pub const SAMPLING_INTERVALS: [(u32, &str); 6] = [
    (1, "1m"),
    (5, "5m"),
    (15, "15m"),
    (60, "1h"),
    (240, "4h"),
    (1440, "1d"),
];

#[derive(Debug, Clone, PartialEq)]
pub struct IntervalScore {
    pub label: &'static str,
    pub step: usize,
    pub trades: usize,
    pub win_rate: f64,
    pub avg_return: f64,
    pub noise: f64,
    pub score: f64,
}

/// Every `step`-th close counting back from the latest, in time order.
fn resample(prices: &[f64], step: usize) -> Vec<f64> {
    let mut sampled: Vec<f64> = prices.iter().rev().step_by(step).copied().collect();
    sampled.reverse();
    sampled
}

pub fn score_interval(prices: &[f64], label: &'static str, step: usize) -> Option<IntervalScore> {
    let sampled = resample(prices, step);
    if sampled.len() < MIN_SAMPLES {
        return None;
    }
    let returns = pct_returns(&sampled);

    let mut outcomes = Vec::new();
    let mut flips = 0usize;
    let mut pairs = 0usize;
    for pair in returns.windows(2) {
        let (prev, next) = (pair[0], pair[1]);
        if prev == 0.0 {
            continue;
        }
        outcomes.push(if prev > 0.0 { next } else { -next });
        if next != 0.0 {
            pairs += 1;
            if prev.signum() != next.signum() {
                flips += 1;
            }
        }
    }
    if outcomes.len() < MIN_TRADES {
        return None;
    }

    let wins = outcomes.iter().filter(|r| **r > 0.0).count();
    let win_rate = wins as f64 / outcomes.len() as f64 * 100.0;
    let avg_return = mean(&outcomes);
    let noise = if pairs > 0 {
        flips as f64 / pairs as f64
    } else {
        1.0
    };

    Some(IntervalScore {
        label,
        step,
        trades: outcomes.len(),
        win_rate,
        avg_return,
        noise,
        score: 0.5 * win_rate + 10.0 * avg_return + 20.0 * (1.0 - noise),
    })
}

pub fn analyze(input: &ToolInput<'_>) -> Option<ToolResult> {
    if input.prices.len() < MIN_BARS {
        return None;
    }
    let interval = bar_interval_minutes(input.history);

    let mut best: Option<IntervalScore> = None;
    for (minutes, label) in SAMPLING_INTERVALS {
        let step = ((minutes as f64 / interval).round() as usize).max(1);
        let Some(candidate) = score_interval(&input.prices, label, step) else {
            continue;
        };
        match &best {
            Some(b) if candidate.score <= b.score => {}
            _ => best = Some(candidate),
        }
    }
    let best = best?;

    let reasoning = format!(
        "Best interval {} (win {:.0}%, avg {:+.2}%, noise {:.0}%, score {:.0})",
        best.label,
        best.win_rate,
        best.avg_return,
        best.noise * 100.0,
        best.score
    );
    let confidence = best.score.clamp(0.0, 100.0);

    if best.score >= BUY_SCORE {
        Some(ToolResult::new(
            AnalysisTool::FrequencyAnalyzer,
            ((best.score - 50.0) / 4.0).clamp(0.0, 15.0),
            confidence,
            Signal::Buy,
            reasoning,
        ))
    } else {
        Some(ToolResult::new(
            AnalysisTool::FrequencyAnalyzer,
            0.0,
            confidence,
            Signal::Hold,
            reasoning,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tools::ToolSettings;
    use crate::domain::tools::test_support::{make_bars, monday_at};

    fn run(prices: &[f64]) -> Option<ToolResult> {
        let bars = make_bars(prices);
        let settings = ToolSettings::default();
        analyze(&ToolInput::new(&bars, None, monday_at(15, 0), &settings))
    }

    #[test]
    fn resample_aligns_to_latest() {
        let prices: Vec<f64> = (0..12).map(|i| i as f64).collect();
        assert_eq!(resample(&prices, 5), vec![1.0, 6.0, 11.0]);
        assert_eq!(resample(&prices, 1), prices);
    }

    #[test]
    fn clean_trend_is_buy_on_best_interval() {
        let prices: Vec<f64> = (0..60).map(|i| 100.0 + 0.1 * i as f64).collect();
        let r = run(&prices).unwrap();
        assert_eq!(r.signal, Signal::Buy);
        assert!(r.score > 0.0);
        // 15m has only 4 samples, so 5m wins on larger steps
        assert!(r.reasoning.contains("5m"));
    }

    #[test]
    fn choppy_series_holds() {
        let prices: Vec<f64> = (0..60)
            .map(|i| if i % 2 == 0 { 100.0 } else { 101.0 })
            .collect();
        let r = run(&prices).unwrap();
        assert_eq!(r.signal, Signal::Hold);
        assert_eq!(r.score, 0.0);
    }

    #[test]
    fn noise_counts_sign_flips() {
        let prices = [100.0, 101.0, 100.0, 101.0, 100.0, 101.0];
        let s = score_interval(&prices, "1m", 1).unwrap();
        assert_eq!(s.noise, 1.0);
        assert_eq!(s.win_rate, 0.0);
    }

    #[test]
    fn flat_series_has_no_trades() {
        assert!(score_interval(&[100.0; 60], "1m", 1).is_none());
        assert!(run(&[100.0; 60]).is_none());
    }

    #[test]
    fn needs_50_bars() {
        let prices: Vec<f64> = (0..49).map(|i| 100.0 + i as f64).collect();
        assert!(run(&prices).is_none());
    }
}
