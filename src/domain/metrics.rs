//! Trade statistics for backtest results.

use super::position::SimulatedTrade;

#[derive(Debug, Clone, PartialEq)]
pub struct TradeStats {
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    /// Percent of trades with positive `profit_sek`, 0..=100.
    pub win_rate: f64,
    pub profit_factor: f64,
    pub avg_win: f64,
    /// Mean absolute loss in SEK.
    pub avg_loss: f64,
    pub total_profit_sek: f64,
}

impl TradeStats {
    pub fn compute(trades: &[SimulatedTrade]) -> Self {
        let mut winning_trades = 0usize;
        let mut losing_trades = 0usize;
        let mut gross_profit = 0.0_f64;
        let mut gross_loss = 0.0_f64;

        for trade in trades {
            let pnl = trade.profit_sek;
            if pnl > 0.0 {
                winning_trades += 1;
                gross_profit += pnl;
            } else if pnl < 0.0 {
                losing_trades += 1;
                gross_loss += pnl.abs();
            }
        }

        let total_trades = trades.len();
        let win_rate = if total_trades > 0 {
            winning_trades as f64 / total_trades as f64 * 100.0
        } else {
            0.0
        };

        let avg_win = if winning_trades > 0 {
            gross_profit / winning_trades as f64
        } else {
            0.0
        };

        let avg_loss = if losing_trades > 0 {
            gross_loss / losing_trades as f64
        } else {
            0.0
        };

        TradeStats {
            total_trades,
            winning_trades,
            losing_trades,
            win_rate,
            profit_factor: profit_factor(gross_profit, gross_loss),
            avg_win,
            avg_loss,
            total_profit_sek: gross_profit - gross_loss,
        }
    }
}

/// gross_profit / gross_loss; `+∞` with no losses but some profit, 0 with neither.
pub fn profit_factor(gross_profit: f64, gross_loss: f64) -> f64 {
    if gross_loss > 0.0 {
        gross_profit / gross_loss
    } else if gross_profit > 0.0 {
        f64::INFINITY
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::position::ExitReason;
    use crate::domain::rule::RuleType;
    use chrono::NaiveDate;

    fn make_trade(profit_sek: f64) -> SimulatedTrade {
        let entry_date = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        SimulatedTrade {
            entry_date,
            entry_price: 100.0,
            exit_date: entry_date + chrono::Duration::minutes(30),
            exit_price: 100.0 + profit_sek / 10.0,
            profit_percent: profit_sek / 10.0,
            profit_sek,
            amount: 1_000.0,
            trade_type: RuleType::Buy,
            exit_reason: ExitReason::EndOfData,
        }
    }

    fn stats(pnls: &[f64]) -> TradeStats {
        let trades: Vec<SimulatedTrade> = pnls.iter().map(|&p| make_trade(p)).collect();
        TradeStats::compute(&trades)
    }

    #[test]
    fn no_trades() {
        let s = stats(&[]);
        assert_eq!(s.total_trades, 0);
        assert_eq!(s.win_rate, 0.0);
        assert_eq!(s.profit_factor, 0.0);
        assert_eq!(s.avg_win, 0.0);
        assert_eq!(s.avg_loss, 0.0);
    }

    #[test]
    fn wins_losses_and_breakeven() {
        let s = stats(&[100.0, -50.0, 200.0, 0.0]);
        assert_eq!(s.total_trades, 4);
        assert_eq!(s.winning_trades, 2);
        assert_eq!(s.losing_trades, 1);
        assert!((s.win_rate - 50.0).abs() < f64::EPSILON);
        assert!((s.total_profit_sek - 250.0).abs() < 1e-9);
    }

    #[test]
    fn profit_factor_ratio() {
        let s = stats(&[100.0, -50.0, 200.0]);
        assert!((s.profit_factor - 6.0).abs() < 1e-9);
    }

    #[test]
    fn profit_factor_infinite_without_losses() {
        assert_eq!(stats(&[10.0, 20.0]).profit_factor, f64::INFINITY);
    }

    #[test]
    fn profit_factor_zero_when_flat() {
        assert_eq!(stats(&[0.0, 0.0]).profit_factor, 0.0);
        assert_eq!(profit_factor(0.0, 0.0), 0.0);
    }

    #[test]
    fn profit_factor_zero_with_only_losses() {
        assert_eq!(stats(&[-10.0]).profit_factor, 0.0);
    }

    #[test]
    fn avg_win_and_loss() {
        let s = stats(&[100.0, -60.0, 200.0, -40.0]);
        assert!((s.avg_win - 150.0).abs() < 1e-9);
        assert!((s.avg_loss - 50.0).abs() < 1e-9);
    }
}
