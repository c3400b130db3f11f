//! Open position and closed trade records for the backtest simulator.

use chrono::NaiveDateTime;

use super::rule::RuleType;

/// The single open position of a backtest run.
///
/// Stop and take levels are percentages from entry.
#[derive(Debug, Clone, PartialEq)]
pub struct Position {
    pub entry_index: usize,
    pub entry_date: NaiveDateTime,
    pub entry_price: f64,
    /// Position size in SEK.
    pub amount: f64,
    pub stop_loss_percent: f64,
    pub take_profit_percent: f64,
}

impl Position {
    pub fn profit_percent(&self, price: f64) -> f64 {
        if self.entry_price <= 0.0 {
            return 0.0;
        }
        (price - self.entry_price) / self.entry_price * 100.0
    }

    pub fn unrealized_pnl(&self, price: f64) -> f64 {
        self.profit_percent(price) / 100.0 * self.amount
    }

    pub fn should_stop_loss(&self, price: f64) -> bool {
        self.profit_percent(price) <= -self.stop_loss_percent
    }

    pub fn should_take_profit(&self, price: f64) -> bool {
        self.profit_percent(price) >= self.take_profit_percent
    }

    /// Exit reason at `price`, forcing `EndOfData` on the final bar.
    pub fn exit_reason(&self, price: f64, is_last_bar: bool) -> Option<ExitReason> {
        if self.should_stop_loss(price) {
            Some(ExitReason::StopLoss)
        } else if self.should_take_profit(price) {
            Some(ExitReason::TakeProfit)
        } else if is_last_bar {
            Some(ExitReason::EndOfData)
        } else {
            None
        }
    }

    pub fn close(
        self,
        exit_date: NaiveDateTime,
        exit_price: f64,
        exit_reason: ExitReason,
        trade_type: RuleType,
    ) -> SimulatedTrade {
        let profit_percent = self.profit_percent(exit_price);
        SimulatedTrade {
            entry_date: self.entry_date,
            entry_price: self.entry_price,
            exit_date,
            exit_price,
            profit_percent,
            profit_sek: profit_percent / 100.0 * self.amount,
            amount: self.amount,
            trade_type,
            exit_reason,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ExitReason {
    StopLoss,
    TakeProfit,
    EndOfData,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimulatedTrade {
    pub entry_date: NaiveDateTime,
    pub entry_price: f64,
    pub exit_date: NaiveDateTime,
    pub exit_price: f64,
    pub profit_percent: f64,
    pub profit_sek: f64,
    pub amount: f64,
    pub trade_type: RuleType,
    pub exit_reason: ExitReason,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn date(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    fn sample_position() -> Position {
        Position {
            entry_index: 30,
            entry_date: date(15),
            entry_price: 50.0,
            amount: 1_000.0,
            stop_loss_percent: 2.0,
            take_profit_percent: 3.0,
        }
    }

    #[test]
    fn profit_percent_and_unrealized() {
        let pos = sample_position();
        assert!((pos.profit_percent(55.0) - 10.0).abs() < 1e-9);
        assert!((pos.unrealized_pnl(55.0) - 100.0).abs() < 1e-9);
        assert!((pos.unrealized_pnl(45.0) - (-100.0)).abs() < 1e-9);
    }

    #[test]
    fn stop_loss_triggered() {
        let pos = sample_position();
        assert!(pos.should_stop_loss(48.0));
        assert!(pos.should_stop_loss(47.0));
        assert!(!pos.should_stop_loss(49.5));
    }

    #[test]
    fn take_profit_triggered() {
        let pos = sample_position();
        assert!(pos.should_take_profit(52.0));
        assert!(!pos.should_take_profit(51.0));
    }

    #[test]
    fn zero_stop_exits_on_first_loss() {
        let pos = Position {
            entry_price: 101.0,
            stop_loss_percent: 0.0,
            take_profit_percent: 50.0,
            ..sample_position()
        };
        assert!(pos.should_stop_loss(100.5));
        assert!(pos.should_stop_loss(101.0));
        assert!(!pos.should_stop_loss(101.5));
        assert_eq!(pos.exit_reason(100.5, false), Some(ExitReason::StopLoss));
    }

    #[test]
    fn zero_take_exits_on_first_non_loss() {
        let pos = Position {
            stop_loss_percent: 10.0,
            take_profit_percent: 0.0,
            ..sample_position()
        };
        assert!(pos.should_take_profit(50.0));
        assert!(pos.should_take_profit(50.1));
        assert!(!pos.should_take_profit(49.9));
        assert_eq!(pos.exit_reason(49.9, false), None);
    }

    #[test]
    fn exit_reason_priority() {
        let pos = sample_position();
        assert_eq!(pos.exit_reason(45.0, true), Some(ExitReason::StopLoss));
        assert_eq!(pos.exit_reason(60.0, true), Some(ExitReason::TakeProfit));
        assert_eq!(pos.exit_reason(50.5, true), Some(ExitReason::EndOfData));
        assert_eq!(pos.exit_reason(50.5, false), None);
    }

    #[test]
    fn close_builds_trade() {
        let trade = sample_position().close(date(20), 52.0, ExitReason::TakeProfit, RuleType::Buy);
        assert_eq!(trade.entry_date, date(15));
        assert_eq!(trade.exit_date, date(20));
        assert!((trade.profit_percent - 4.0).abs() < 1e-9);
        assert!((trade.profit_sek - 40.0).abs() < 1e-9);
        assert!((trade.amount - 1_000.0).abs() < f64::EPSILON);
        assert_eq!(trade.trade_type, RuleType::Buy);
        assert_eq!(trade.exit_reason, ExitReason::TakeProfit);
    }
}
