//! Account state and equity tracking for one backtest run.

use chrono::NaiveDateTime;

use super::position::{Position, SimulatedTrade};

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EquityCurvePoint {
    pub date: NaiveDateTime,
    pub equity: f64,
}

/// Realized equity, the open position (at most one) and running risk stats.
///
/// `equity` only changes when a position is closed.
#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    pub initial_capital: f64,
    pub equity: f64,
    pub position: Option<Position>,
    pub trades: Vec<SimulatedTrade>,
    pub equity_curve: Vec<EquityCurvePoint>,
    pub peak_equity: f64,
    pub max_drawdown_percent: f64,
    pub consecutive_losses: usize,
    pub max_consecutive_losses: usize,
}

impl Portfolio {
    pub fn new(initial_capital: f64) -> Self {
        Portfolio {
            initial_capital,
            equity: initial_capital,
            position: None,
            trades: Vec::new(),
            equity_curve: Vec::new(),
            peak_equity: initial_capital,
            max_drawdown_percent: 0.0,
            consecutive_losses: 0,
            max_consecutive_losses: 0,
        }
    }

    pub fn has_position(&self) -> bool {
        self.position.is_some()
    }

    pub fn open_position(&mut self, position: Position) {
        self.position = Some(position);
    }

    pub fn take_position(&mut self) -> Option<Position> {
        self.position.take()
    }

    /// Realize a closed trade into equity and the loss streak.
    pub fn record_trade(&mut self, trade: SimulatedTrade) {
        self.equity += trade.profit_sek;
        if trade.profit_sek >= 0.0 {
            self.consecutive_losses = 0;
        } else {
            self.consecutive_losses += 1;
            self.max_consecutive_losses = self.max_consecutive_losses.max(self.consecutive_losses);
        }
        self.trades.push(trade);
    }

    /// Realized equity plus unrealized P/L of the open position at `price`.
    pub fn mark_to_market(&self, price: f64) -> f64 {
        let unrealized = self
            .position
            .as_ref()
            .map(|pos| pos.unrealized_pnl(price))
            .unwrap_or(0.0);
        self.equity + unrealized
    }

    /// Append one curve sample and update peak and drawdown.
    pub fn record_equity(&mut self, date: NaiveDateTime, price: f64) {
        let equity = self.mark_to_market(price);
        if equity > self.peak_equity {
            self.peak_equity = equity;
        } else if self.peak_equity > 0.0 {
            let drawdown = (self.peak_equity - equity) / self.peak_equity * 100.0;
            if drawdown > self.max_drawdown_percent {
                self.max_drawdown_percent = drawdown;
            }
        }
        self.equity_curve.push(EquityCurvePoint { date, equity });
    }
}
