//! Combine tool results into one trading recommendation.
//!
//! `total_score` is the plain sum of tool scores and `confidence` their mean.
//! Action thresholds, first match wins:
//!
//! | total_score | action   |
//! |-------------|----------|
//! | < -10       | BUY_BEAR |
//! | > 10        | BUY_BULL |
//! | otherwise   | HOLD     |

use std::fmt;

use super::tools::ToolResult;

const ACTION_THRESHOLD: f64 = 10.0;
const STRONG_SCORE: f64 = 20.0;
const LONG_HOLD_SCORE: f64 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Action {
    BuyBull,
    SellBull,
    BuyBear,
    SellBear,
    Hold,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::BuyBull => write!(f, "BUY_BULL"),
            Action::SellBull => write!(f, "SELL_BULL"),
            Action::BuyBear => write!(f, "BUY_BEAR"),
            Action::SellBear => write!(f, "SELL_BEAR"),
            Action::Hold => write!(f, "HOLD"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TradeStrategy {
    pub entry: f64,
    pub target: f64,
    pub stop_loss: f64,
    pub suggested_hold_time: String,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CombinedRecommendation {
    pub action: Action,
    pub confidence: f64,
    pub total_score: f64,
    pub factors: Vec<ToolResult>,
    pub strategy: TradeStrategy,
}

fn action_for(total_score: f64) -> Action {
    if total_score < -ACTION_THRESHOLD {
        Action::BuyBear
    } else if total_score > ACTION_THRESHOLD {
        Action::BuyBull
    } else {
        Action::Hold
    }
}

fn strategy_for(total_score: f64, current_price: f64) -> TradeStrategy {
    let strong = total_score.abs() > STRONG_SCORE;
    let target_fraction = if strong { 0.015 } else { 0.01 };
    let stop_fraction = if strong { 0.01 } else { 0.02 };

    let (target, stop_loss) = if total_score >= 0.0 {
        (
            current_price * (1.0 + target_fraction),
            current_price * (1.0 - stop_fraction),
        )
    } else {
        (
            current_price * (1.0 - target_fraction),
            current_price * (1.0 + stop_fraction),
        )
    };

    let suggested_hold_time = if total_score.abs() > LONG_HOLD_SCORE {
        "15-60 min"
    } else {
        "5-15 min"
    };

    TradeStrategy {
        entry: current_price,
        target,
        stop_loss,
        suggested_hold_time: suggested_hold_time.to_string(),
    }
}

pub fn combine_recommendation(
    factors: Vec<ToolResult>,
    current_price: f64,
) -> CombinedRecommendation {
    let total_score: f64 = factors.iter().map(|f| f.score).sum();
    let confidence = if factors.is_empty() {
        0.0
    } else {
        factors.iter().map(|f| f.confidence).sum::<f64>() / factors.len() as f64
    };

    CombinedRecommendation {
        action: action_for(total_score),
        confidence,
        total_score,
        strategy: strategy_for(total_score, current_price),
        factors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tools::Signal;

    fn factor(score: f64, confidence: f64) -> ToolResult {
        ToolResult {
            name: "test".into(),
            score,
            confidence,
            signal: Signal::Hold,
            reasoning: String::new(),
        }
    }

    fn combine(scores: &[f64]) -> CombinedRecommendation {
        combine_recommendation(scores.iter().map(|&s| factor(s, 50.0)).collect(), 100.0)
    }

    #[test]
    fn score_eleven_buys_bull() {
        assert_eq!(combine(&[6.0, 5.0]).action, Action::BuyBull);
    }

    #[test]
    fn score_minus_eleven_buys_bear() {
        assert_eq!(combine(&[-6.0, -5.0]).action, Action::BuyBear);
    }

    #[test]
    fn score_five_holds() {
        assert_eq!(combine(&[2.0, 3.0]).action, Action::Hold);
    }

    #[test]
    fn thresholds_are_exclusive() {
        assert_eq!(combine(&[10.0]).action, Action::Hold);
        assert_eq!(combine(&[-10.0]).action, Action::Hold);
    }

    #[test]
    fn strong_score_maps_to_buy_bull() {
        assert_eq!(combine(&[26.0]).action, Action::BuyBull);
    }

    #[test]
    fn confidence_is_mean() {
        let rec = combine_recommendation(vec![factor(1.0, 40.0), factor(2.0, 80.0)], 100.0);
        assert!((rec.confidence - 60.0).abs() < f64::EPSILON);
        assert!((rec.total_score - 3.0).abs() < f64::EPSILON);
        assert_eq!(rec.factors.len(), 2);
    }

    #[test]
    fn no_factors_holds_with_zero_confidence() {
        let rec = combine_recommendation(vec![], 100.0);
        assert_eq!(rec.action, Action::Hold);
        assert_eq!(rec.confidence, 0.0);
        assert_eq!(rec.total_score, 0.0);
    }

    #[test]
    fn weak_bullish_strategy() {
        let s = combine(&[15.0]).strategy;
        assert!((s.entry - 100.0).abs() < f64::EPSILON);
        assert!((s.target - 101.0).abs() < 1e-9);
        assert!((s.stop_loss - 98.0).abs() < 1e-9);
        assert_eq!(s.suggested_hold_time, "5-15 min");
    }

    #[test]
    fn strong_bearish_strategy() {
        let s = combine(&[-20.0, -15.0]).strategy;
        assert!((s.target - 98.5).abs() < 1e-9);
        assert!((s.stop_loss - 101.0).abs() < 1e-9);
        assert_eq!(s.suggested_hold_time, "15-60 min");
    }

    #[test]
    fn strong_tier_between_20_and_30() {
        let s = combine(&[25.0]).strategy;
        assert!((s.target - 101.5).abs() < 1e-9);
        assert_eq!(s.suggested_hold_time, "5-15 min");
    }

    #[test]
    fn action_display() {
        assert_eq!(Action::BuyBear.to_string(), "BUY_BEAR");
        assert_eq!(Action::Hold.to_string(), "HOLD");
    }
}
