//! Reversal Meter: odds that the current move is about to turn.
//!
//! Evidence and its weight toward the reversal probability:
//! - RSI(14) beyond 80/20: 35, plus up to 20 more the further it goes
//! - Bollinger position beyond 0.95/0.05: 25
//! - Divergence (new 5-bar extreme on a slower 5-bar move): 20
//!
//! Each piece also votes for the direction of the turn.

use super::{AnalysisTool, Signal, ToolInput, ToolResult};
use crate::domain::indicator::{
    DEFAULT_BOLLINGER_PERIOD, DEFAULT_RSI_PERIOD, bollinger_position, rsi,
};

const MIN_BARS: usize = 21;
const MAX_PROBABILITY: f64 = 95.0;
const MIN_PROBABILITY: f64 = 25.0;
const DIVERGENCE_WINDOW: usize = 5;

#[derive(Debug, Default)]
struct Evidence {
    probability: f64,
    bullish: usize,
    bearish: usize,
    notes: Vec<String>,
}

fn divergence(prices: &[f64]) -> Option<Signal> {
    if prices.len() < 2 * DIVERGENCE_WINDOW {
        return None;
    }
    let recent = &prices[prices.len() - DIVERGENCE_WINDOW..];
    let prior = &prices[prices.len() - 2 * DIVERGENCE_WINDOW..prices.len() - DIVERGENCE_WINDOW];

    let high = |w: &[f64]| w.iter().copied().fold(f64::MIN, f64::max);
    let low = |w: &[f64]| w.iter().copied().fold(f64::MAX, f64::min);
    let change = |w: &[f64]| w[w.len() - 1] - w[0];

    if high(recent) > high(prior) && change(recent) < change(prior) {
        Some(Signal::Sell)
    } else if low(recent) < low(prior) && change(recent) > change(prior) {
        Some(Signal::Buy)
    } else {
        None
    }
}

/// Whether any close in the RSI window differs from the one before it.
fn rsi_window_moved(prices: &[f64]) -> bool {
    let window = &prices[prices.len().saturating_sub(DEFAULT_RSI_PERIOD + 1)..];
    window.windows(2).any(|pair| pair[1] != pair[0])
}

fn gather(prices: &[f64]) -> Evidence {
    let mut evidence = Evidence::default();

    // RSI reads 100 on a motionless window
    if rsi_window_moved(prices) {
        let rsi_value = rsi(prices, DEFAULT_RSI_PERIOD);
        if rsi_value > 80.0 {
            evidence.probability += 35.0 + (rsi_value - 80.0).min(20.0);
            evidence.bearish += 1;
            evidence.notes.push(format!("RSI overbought {:.0}", rsi_value));
        } else if rsi_value < 20.0 {
            evidence.probability += 35.0 + (20.0 - rsi_value).min(20.0);
            evidence.bullish += 1;
            evidence.notes.push(format!("RSI oversold {:.0}", rsi_value));
        }
    }

    let position = bollinger_position(prices, DEFAULT_BOLLINGER_PERIOD);
    if position > 0.95 {
        evidence.probability += 25.0;
        evidence.bearish += 1;
        evidence.notes.push("at upper band".to_string());
    } else if position < 0.05 {
        evidence.probability += 25.0;
        evidence.bullish += 1;
        evidence.notes.push("at lower band".to_string());
    }

    match divergence(prices) {
        Some(Signal::Sell) => {
            evidence.probability += 20.0;
            evidence.bearish += 1;
            evidence.notes.push("bearish divergence".to_string());
        }
        Some(Signal::Buy) => {
            evidence.probability += 20.0;
            evidence.bullish += 1;
            evidence.notes.push("bullish divergence".to_string());
        }
        _ => {}
    }

    evidence.probability = evidence.probability.min(MAX_PROBABILITY);
    evidence
}

pub fn analyze(input: &ToolInput<'_>) -> Option<ToolResult> {
    if input.prices.len() < MIN_BARS {
        return None;
    }

    let evidence = gather(&input.prices);
    let probability = evidence.probability;

    if probability < MIN_PROBABILITY {
        return Some(ToolResult::new(
            AnalysisTool::ReversalMeter,
            0.0,
            40.0,
            Signal::Hold,
            format!("Reversal probability {:.0}%: no setup", probability),
        ));
    }

    let reasoning = format!(
        "Reversal probability {:.0}%: {}",
        probability,
        evidence.notes.join(", ")
    );
    let (score, signal) = if evidence.bullish > evidence.bearish {
        (probability / 4.0, Signal::Buy)
    } else if evidence.bearish > evidence.bullish {
        (-probability / 4.0, Signal::Sell)
    } else {
        (0.0, Signal::Hold)
    };

    Some(ToolResult::new(
        AnalysisTool::ReversalMeter,
        score,
        probability,
        signal,
        reasoning,
    ))
}
