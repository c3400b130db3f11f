//! Volatility Window: how the current hour of day has historically traded.
//!
//! Bar returns are bucketed by the hour of the bar that ends them. Hours with
//! no samples average 0. The current hour's rank is the number of hours with
//! a strictly higher average.

use chrono::Timelike;

use super::{AnalysisTool, Signal, ToolInput, ToolResult, mean};
use crate::domain::price_bar::pct_change;

const MIN_BARS: usize = 24;
const HOURS: usize = 24;
const TOP_THIRD: usize = HOURS / 3;
const BOTTOM_THIRD: usize = HOURS - HOURS / 3;

/// Average bar return per hour of day and the sample count behind it.
pub fn hourly_profile(input: &ToolInput<'_>) -> [(f64, usize); HOURS] {
    let mut buckets: Vec<Vec<f64>> = vec![Vec::new(); HOURS];
    for pair in input.history.windows(2) {
        let hour = pair[1].timestamp.hour() as usize;
        buckets[hour].push(pct_change(pair[0].close, pair[1].close));
    }
    let mut profile = [(0.0, 0usize); HOURS];
    for (hour, samples) in buckets.iter().enumerate() {
        profile[hour] = (mean(samples), samples.len());
    }
    profile
}

pub fn analyze(input: &ToolInput<'_>) -> Option<ToolResult> {
    if input.history.len() < MIN_BARS {
        return None;
    }

    let profile = hourly_profile(input);
    let hour = input.now.hour() as usize;
    let (average, samples) = profile[hour];

    if samples == 0 {
        return Some(ToolResult::new(
            AnalysisTool::VolatilityWindow,
            0.0,
            30.0,
            Signal::Hold,
            format!("No history for {:02}:00", hour),
        ));
    }

    let rank = profile.iter().filter(|(avg, _)| *avg > average).count();
    let confidence = (40.0 + 5.0 * samples as f64).min(85.0);
    let detail = format!(
        "{:02}:00 ranks #{} of 24 (avg {:+.3}% over {} bars)",
        hour,
        rank + 1,
        average,
        samples
    );

    let (score, signal) = if rank < TOP_THIRD {
        ((TOP_THIRD - rank) as f64 + 2.0, Signal::Buy)
    } else if rank >= BOTTOM_THIRD {
        (-5.0, Signal::Hold)
    } else {
        (0.0, Signal::Hold)
    };

    Some(ToolResult::new(
        AnalysisTool::VolatilityWindow,
        score,
        confidence,
        signal,
        detail,
    ))
}
