//! Micro-Pattern Scanner over the last 20 bars.
//!
//! Detects double bottoms and tops, breakouts and breakdowns, and a doji on
//! the latest bar. The highest-confidence pattern found wins; ties keep the
//! earlier pattern in that order.

use super::{AnalysisTool, Signal, ToolInput, ToolResult};
use crate::domain::price_bar::{PriceBar, pct_change};

const WINDOW: usize = 20;
const RECENT: usize = 5;
const MIN_EXTREME_GAP: usize = 3;
const SIMILAR_EXTREME_PERCENT: f64 = 0.5;
const BREAKOUT_PERCENT: f64 = 0.5;
const DOJI_BODY_RATIO: f64 = 0.1;

#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    pub name: &'static str,
    pub signal: Signal,
    pub confidence: f64,
}

/// Two extremes at least three bars apart. Returns their average level.
fn twin_extreme(values: &[f64], lowest: bool) -> Option<f64> {
    let better = |a: f64, b: f64| if lowest { a < b } else { a > b };

    let mut first = 0;
    for (i, &v) in values.iter().enumerate() {
        if better(v, values[first]) {
            first = i;
        }
    }

    let mut second: Option<usize> = None;
    for (i, &v) in values.iter().enumerate() {
        if i.abs_diff(first) < MIN_EXTREME_GAP {
            continue;
        }
        match second {
            Some(s) if !better(v, values[s]) => {}
            _ => second = Some(i),
        }
    }

    let a = values[first];
    let b = values[second?];
    if pct_change(a, b).abs() <= SIMILAR_EXTREME_PERCENT {
        Some((a + b) / 2.0)
    } else {
        None
    }
}

pub fn scan(window: &[PriceBar], price: f64) -> Vec<Pattern> {
    let mut found = Vec::new();
    if window.len() < WINDOW {
        return found;
    }
    let lows: Vec<f64> = window.iter().map(|b| b.low).collect();
    let highs: Vec<f64> = window.iter().map(|b| b.high).collect();

    if let Some(level) = twin_extreme(&lows, true) {
        let reclaim = pct_change(level, price);
        if (1.0..=2.0).contains(&reclaim) {
            found.push(Pattern {
                name: "Double bottom",
                signal: Signal::Buy,
                confidence: 65.0,
            });
        }
    }

    if let Some(level) = twin_extreme(&highs, false) {
        let loss = pct_change(level, price);
        if (-2.0..=-1.0).contains(&loss) {
            found.push(Pattern {
                name: "Double top",
                signal: Signal::Sell,
                confidence: 65.0,
            });
        }
    }

    let split = window.len() - RECENT;
    let recent_high = highs[split..].iter().copied().fold(f64::MIN, f64::max);
    let prior_high = highs[..split].iter().copied().fold(f64::MIN, f64::max);
    let breakout = pct_change(prior_high, recent_high);
    if breakout >= BREAKOUT_PERCENT {
        found.push(Pattern {
            name: "Breakout",
            signal: Signal::Buy,
            confidence: 60.0 + (breakout * 10.0).min(20.0),
        });
    }

    let recent_low = lows[split..].iter().copied().fold(f64::MAX, f64::min);
    let prior_low = lows[..split].iter().copied().fold(f64::MAX, f64::min);
    let breakdown = pct_change(prior_low, recent_low);
    if breakdown <= -BREAKOUT_PERCENT {
        found.push(Pattern {
            name: "Breakdown",
            signal: Signal::Sell,
            confidence: 60.0 + (breakdown.abs() * 10.0).min(20.0),
        });
    }

    if let Some(last) = window.last() {
        if last.range() > 0.0 && last.body_ratio() < DOJI_BODY_RATIO {
            found.push(Pattern {
                name: "Doji",
                signal: Signal::Hold,
                confidence: 50.0,
            });
        }
    }

    found
}

pub fn analyze(input: &ToolInput<'_>) -> Option<ToolResult> {
    if input.history.len() < WINDOW {
        return None;
    }
    let price = input.price()?;
    let window = &input.history[input.history.len() - WINDOW..];

    let mut best: Option<Pattern> = None;
    for pattern in scan(window, price) {
        match &best {
            Some(b) if pattern.confidence <= b.confidence => {}
            _ => best = Some(pattern),
        }
    }

    let Some(pattern) = best else {
        return Some(ToolResult::new(
            AnalysisTool::MicroPattern,
            0.0,
            30.0,
            Signal::Hold,
            "No pattern in the last 20 bars",
        ));
    };

    let score = match pattern.signal {
        Signal::Buy => pattern.confidence / 5.0,
        Signal::Sell => -pattern.confidence / 5.0,
        Signal::Hold => 0.0,
    };
    Some(ToolResult::new(
        AnalysisTool::MicroPattern,
        score,
        pattern.confidence,
        pattern.signal,
        format!("{} detected", pattern.name),
    ))
}
