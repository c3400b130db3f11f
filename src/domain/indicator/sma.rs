//! Simple Moving Average.
//!
//! Mean of the most recent `period` closes. A shorter window averages what
//! is available; an empty window is 0.

pub fn sma(prices: &[f64], period: usize) -> f64 {
    if prices.is_empty() {
        return 0.0;
    }
    let n = period.clamp(1, prices.len());
    prices[prices.len() - n..].iter().sum::<f64>() / n as f64
}
