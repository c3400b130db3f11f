//! RSI (Relative Strength Index).
//!
//! Uses a simple mean of gains and losses over the last `period` changes of
//! the supplied window. This is not Wilder's smoothing: the value depends
//! only on the trailing `period + 1` prices and is recomputed on every call.
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0: RSI = 100
//! Fewer than period + 1 prices: RSI = 50 (neutral)

pub const DEFAULT_RSI_PERIOD: usize = 14;

const NEUTRAL_RSI: f64 = 50.0;

pub fn rsi(prices: &[f64], period: usize) -> f64 {
    if period == 0 || prices.len() < period + 1 {
        return NEUTRAL_RSI;
    }

    let window = &prices[prices.len() - (period + 1)..];
    let mut gains = 0.0;
    let mut losses = 0.0;

    for pair in window.windows(2) {
        let change = pair[1] - pair[0];
        if change > 0.0 {
            gains += change;
        } else {
            losses -= change;
        }
    }

    let avg_gain = gains / period as f64;
    let avg_loss = losses / period as f64;

    if avg_loss == 0.0 {
        return 100.0;
    }

    let rs = avg_gain / avg_loss;
    100.0 - (100.0 / (1.0 + rs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn rsi_insufficient_data_is_neutral() {
        assert_eq!(rsi(&[], 14), 50.0);
        let prices: Vec<f64> = (0..14).map(|i| 100.0 + i as f64).collect();
        assert_eq!(rsi(&prices, 14), 50.0);
    }

    #[test]
    fn rsi_zero_period_is_neutral() {
        assert_eq!(rsi(&[100.0, 101.0], 0), 50.0);
    }

    #[test]
    fn rsi_all_gains_no_losses() {
        let prices: Vec<f64> = (0..15).map(|i| 100.0 + i as f64).collect();
        assert_eq!(rsi(&prices, 14), 100.0);
    }

    #[test]
    fn rsi_all_losses_no_gains() {
        let prices: Vec<f64> = (0..15).map(|i| 100.0 - i as f64).collect();
        assert!(rsi(&prices, 14).abs() < f64::EPSILON);
    }

    #[test]
    fn rsi_flat_series_is_100() {
        // no losses at all, so the avg_loss guard applies
        assert_eq!(rsi(&[100.0; 20], 14), 100.0);
    }

    #[test]
    fn rsi_uses_only_trailing_window() {
        // the crash in the first bars is outside the last 14 changes
        let mut prices = vec![200.0, 100.0];
        prices.extend((0..14).map(|i| 100.0 + i as f64 + 1.0));
        assert_eq!(rsi(&prices, 14), 100.0);
    }

    #[test]
    fn rsi_known_simple_average() {
        // 14 changes: 10 gains of 1.0, 4 losses of 1.0 -> RS = 2.5
        let mut prices = vec![100.0];
        let mut p = 100.0;
        for i in 0..14 {
            p += if i % 7 < 5 { 1.0 } else { -1.0 };
            prices.push(p);
        }
        let expected = 100.0 - 100.0 / (1.0 + 10.0 / 4.0);
        approx::assert_relative_eq!(rsi(&prices, 14), expected, epsilon = 1e-9);
    }

    #[test]
    fn rsi_decline_then_rebound_crosses_30() {
        let mut prices: Vec<f64> = (0..31).map(|i| 100.0 - i as f64).collect();
        assert!(rsi(&prices, 14) <= 30.0);

        let mut crossed = false;
        let mut prev = rsi(&prices, 14);
        for step in 1..=14 {
            prices.push(70.0 + step as f64);
            let current = rsi(&prices, 14);
            if prev <= 30.0 && current > 30.0 {
                crossed = true;
                break;
            }
            prev = current;
        }
        assert!(crossed);
    }

    proptest! {
        #[test]
        fn rsi_is_bounded(prices in prop::collection::vec(1.0f64..1000.0, 0..80)) {
            let value = rsi(&prices, 14);
            prop_assert!((0.0..=100.0).contains(&value));
        }
    }
}
