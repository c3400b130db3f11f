//! Exponential Moving Average.
//!
//! k = 2/(n+1), seeded with the first price, then EMA[i] = P[i]*k + EMA[i-1]*(1-k).
//! Returned as a full series the same length as the input.

pub fn ema(prices: &[f64], period: usize) -> Vec<f64> {
    let Some(&first) = prices.first() else {
        return Vec::new();
    };

    let k = 2.0 / (period as f64 + 1.0);
    let mut values = Vec::with_capacity(prices.len());
    let mut current = first;
    values.push(current);

    for &price in &prices[1..] {
        current = price * k + current * (1.0 - k);
        values.push(current);
    }

    values
}
