//! Rule evaluation engine.
//!
//! Evaluates conditions and rules against a close-price series at a bar index.
//!
//! # Evaluation Semantics
//!
//! - Every condition sees only the series truncated to `index` (no look-ahead)
//! - Crossing checks compare the indicator at `index` against the same
//!   indicator recomputed with the last element dropped
//! - `AND`: Short-circuits on first `false`
//! - `OR`: Short-circuits on first `true`
//! - A rule never fires before bar 26 or with an empty condition list

use crate::domain::indicator::{macd, rsi};
use crate::domain::price_bar::{PriceBar, closes, pct_change};
use crate::domain::rule::{
    Condition, LogicOperator, MacdSignal, PriceDirection, Rule, RsiOperator,
};

/// First index at which a rule may fire; MACD needs 26 closes.
pub const MIN_RULE_INDEX: usize = 26;

pub fn evaluate_condition(condition: &Condition, prices: &[f64], index: usize) -> bool {
    if index >= prices.len() {
        return false;
    }
    let window = &prices[..=index];

    match condition {
        Condition::PriceChange {
            direction,
            min_percent,
            lookback,
        } => {
            let back = index - (*lookback).min(index);
            let change = pct_change(prices[back], prices[index]);
            match direction {
                PriceDirection::Up => change >= *min_percent,
                PriceDirection::Down => change <= -*min_percent,
                PriceDirection::Any => change.abs() >= *min_percent,
            }
        }
        Condition::Rsi {
            period,
            operator,
            threshold,
        } => {
            let current = rsi(window, *period);
            match operator {
                RsiOperator::Below => current < *threshold,
                RsiOperator::Above => current > *threshold,
                RsiOperator::CrossesAbove => {
                    if index == 0 {
                        return false;
                    }
                    let prev = rsi(&window[..index], *period);
                    prev <= *threshold && current > *threshold
                }
                RsiOperator::CrossesBelow => {
                    if index == 0 {
                        return false;
                    }
                    let prev = rsi(&window[..index], *period);
                    prev >= *threshold && current < *threshold
                }
            }
        }
        Condition::Macd { signal } => {
            let current = macd(window);
            match signal {
                MacdSignal::HistogramPositive => current.histogram > 0.0,
                MacdSignal::HistogramNegative => current.histogram < 0.0,
                MacdSignal::BullishCross => {
                    if index == 0 {
                        return false;
                    }
                    let prev = macd(&window[..index]);
                    prev.macd <= prev.signal && current.macd > current.signal
                }
                MacdSignal::BearishCross => {
                    if index == 0 {
                        return false;
                    }
                    let prev = macd(&window[..index]);
                    prev.macd >= prev.signal && current.macd < current.signal
                }
            }
        }
        Condition::Volume { .. } | Condition::Time { .. } => false,
    }
}

pub fn evaluate_rule(rule: &Rule, bars: &[PriceBar], index: usize) -> bool {
    evaluate_rule_on_closes(rule, &closes(bars), index)
}

/// Same as [`evaluate_rule`] over a pre-extracted close series.
pub fn evaluate_rule_on_closes(rule: &Rule, prices: &[f64], index: usize) -> bool {
    if index < MIN_RULE_INDEX || index >= prices.len() || rule.conditions.is_empty() {
        return false;
    }

    match rule.logic_operator {
        LogicOperator::And => {
            for condition in &rule.conditions {
                if !evaluate_condition(condition, prices, index) {
                    return false;
                }
            }
            true
        }
        LogicOperator::Or => {
            for condition in &rule.conditions {
                if evaluate_condition(condition, prices, index) {
                    return true;
                }
            }
            false
        }
    }
}
