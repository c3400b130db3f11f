//! Correlation Radar: a low-confidence macro proxy.
//!
//! No external feeds are consulted. USD strength is proxied by the inverse of
//! the 20-bar oil trend, risk sentiment by 10-bar momentum, and the
//! geopolitical component is a configured baseline. Confidence is fixed.

use super::{AnalysisTool, Signal, ToolInput, ToolResult};
use crate::domain::price_bar::pct_change;

const MIN_BARS: usize = 20;
const USD_LOOKBACK: usize = 20;
const RISK_LOOKBACK: usize = 10;
const COMPONENT_LIMIT: f64 = 5.0;
const SCORE_LIMIT: f64 = 15.0;
const SIGNAL_THRESHOLD: f64 = 5.0;
const FIXED_CONFIDENCE: f64 = 60.0;

pub fn analyze(input: &ToolInput<'_>) -> Option<ToolResult> {
    let prices = &input.prices;
    if prices.len() < MIN_BARS {
        return None;
    }
    let price = input.price()?;
    let n = prices.len();

    // weak dollar reads as a rising oil trend
    let usd = (pct_change(prices[n - USD_LOOKBACK], price) * 2.0)
        .clamp(-COMPONENT_LIMIT, COMPONENT_LIMIT);
    let risk = (pct_change(prices[n - RISK_LOOKBACK], price) * 3.0)
        .clamp(-COMPONENT_LIMIT, COMPONENT_LIMIT);
    let geopolitical = input.settings.geopolitical_bias;

    let score = (usd + risk + geopolitical).clamp(-SCORE_LIMIT, SCORE_LIMIT);
    let signal = if score > SIGNAL_THRESHOLD {
        Signal::Buy
    } else if score < -SIGNAL_THRESHOLD {
        Signal::Sell
    } else {
        Signal::Hold
    };

    Some(ToolResult::new(
        AnalysisTool::CorrelationRadar,
        score,
        FIXED_CONFIDENCE,
        signal,
        format!(
            "USD proxy {:+.1}, risk sentiment {:+.1}, geopolitical {:+.1}",
            usd, risk, geopolitical
        ),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::tools::ToolSettings;
    use crate::domain::tools::test_support::{make_bars, monday_at};

    fn run(prices: &[f64], geopolitical_bias: f64) -> ToolResult {
        let bars = make_bars(prices);
        let settings = ToolSettings {
            geopolitical_bias,
            ..ToolSettings::default()
        };
        analyze(&ToolInput::new(&bars, None, monday_at(15, 0), &settings)).unwrap()
    }

    #[test]
    fn flat_market_reflects_baseline_only() {
        let r = run(&[100.0; 30], 2.0);
        assert_eq!(r.signal, Signal::Hold);
        assert!((r.score - 2.0).abs() < 1e-9);
        assert_eq!(r.confidence, 60.0);
    }

    #[test]
    fn rising_oil_is_buy() {
        let prices: Vec<f64> = (0..30).map(|i| 100.0 + 0.1 * i as f64).collect();
        let r = run(&prices, 2.0);
        assert_eq!(r.signal, Signal::Buy);
        assert_eq!(r.confidence, 60.0);
    }

    #[test]
    fn falling_oil_is_sell() {
        let prices: Vec<f64> = (0..30).map(|i| 100.0 - 0.1 * i as f64).collect();
        let r = run(&prices, 0.0);
        assert_eq!(r.signal, Signal::Sell);
        assert!(r.score < -5.0);
    }

    #[test]
    fn score_is_clamped_to_15() {
        let r = run(&[100.0; 30], 20.0);
        assert_eq!(r.score, 15.0);
    }

    #[test]
    fn needs_20_bars() {
        let bars = make_bars(&[100.0; 19]);
        let settings = ToolSettings::default();
        assert!(analyze(&ToolInput::new(&bars, None, monday_at(15, 0), &settings)).is_none());
    }
}
