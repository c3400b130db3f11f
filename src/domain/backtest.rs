//! Backtest simulator.
//!
//! Walks a bar series for one rule, holding at most one position at a time.
//!
//! # Loop Semantics
//!
//! - Starts at bar 26 with `equity = initial_capital`
//! - Flat: enter at the close when the rule fires, except on the final bar.
//!   Size is `min(configured_amount, 10% of equity)`
//! - In position: exit on stop-loss, take-profit, or the final bar. The bar
//!   that closes a position never opens a new one
//! - Every bar appends one mark-to-market equity sample

use log::{debug, info};
use rayon::prelude::*;

use super::error::BacktestError;
use super::metrics::TradeStats;
use super::portfolio::{EquityCurvePoint, Portfolio};
use super::position::{Position, SimulatedTrade};
use super::price_bar::{PriceBar, closes};
use super::rule::Rule;
use super::rule_eval::{MIN_RULE_INDEX, evaluate_rule_on_closes};

/// A backtest refuses to run on fewer bars than this.
pub const MIN_BACKTEST_BARS: usize = 50;

/// Fixed cap on a single entry as a fraction of current equity.
pub const MAX_ENTRY_FRACTION: f64 = 0.1;

pub const DEFAULT_INITIAL_CAPITAL: f64 = 10_000.0;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BacktestResult {
    pub rule_name: String,
    pub trades: Vec<SimulatedTrade>,
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub win_rate: f64,
    pub profit_factor: f64,
    pub avg_win: f64,
    pub avg_loss: f64,
    pub max_drawdown_percent: f64,
    pub max_consecutive_losses: usize,
    pub equity_curve: Vec<EquityCurvePoint>,
    pub initial_capital: f64,
    pub final_equity: f64,
    pub total_profit_sek: f64,
    pub total_return_percent: f64,
}

fn validate(rule: &Rule, bars: &[PriceBar], initial_capital: f64) -> Result<(), BacktestError> {
    if bars.len() < MIN_BACKTEST_BARS {
        return Err(BacktestError::InsufficientData {
            bars: bars.len(),
            minimum: MIN_BACKTEST_BARS,
        });
    }
    if rule.conditions.is_empty() {
        return Err(BacktestError::InvalidRule {
            reason: format!("rule '{}' has no conditions", rule.name),
        });
    }
    if rule.stop_loss_percent < 0.0 || rule.take_profit_percent < 0.0 {
        return Err(BacktestError::InvalidRule {
            reason: format!(
                "rule '{}' has a negative stop_loss or take_profit",
                rule.name
            ),
        });
    }
    let amount = rule.action_config.amount;
    if !amount.is_finite() || amount <= 0.0 {
        return Err(BacktestError::InvalidRule {
            reason: format!("rule '{}' has a non-positive amount {}", rule.name, amount),
        });
    }
    if !initial_capital.is_finite() || initial_capital <= 0.0 {
        return Err(BacktestError::InvalidCapital {
            capital: initial_capital,
        });
    }
    Ok(())
}

pub fn run_backtest(
    rule: &Rule,
    bars: &[PriceBar],
    initial_capital: f64,
) -> Result<BacktestResult, BacktestError> {
    validate(rule, bars, initial_capital)?;

    let prices = closes(bars);
    let last = bars.len() - 1;
    let mut portfolio = Portfolio::new(initial_capital);

    for (i, bar) in bars.iter().enumerate().skip(MIN_RULE_INDEX) {
        let is_last_bar = i == last;

        if portfolio.has_position() {
            let exit = portfolio
                .position
                .as_ref()
                .and_then(|pos| pos.exit_reason(bar.close, is_last_bar));
            if let Some(reason) = exit {
                if let Some(position) = portfolio.take_position() {
                    let trade = position.close(bar.timestamp, bar.close, reason, rule.rule_type);
                    debug!(
                        "{}: exit {:?} at {} ({:+.2}%, {:+.2} SEK)",
                        rule.name, reason, bar.timestamp, trade.profit_percent, trade.profit_sek
                    );
                    portfolio.record_trade(trade);
                }
            }
        } else if !is_last_bar && evaluate_rule_on_closes(rule, &prices, i) {
            let amount = rule
                .action_config
                .configured_amount(portfolio.equity)
                .min(MAX_ENTRY_FRACTION * portfolio.equity);
            if amount > 0.0 {
                debug!(
                    "{}: enter at {} price {:.4} amount {:.2} SEK",
                    rule.name, bar.timestamp, bar.close, amount
                );
                portfolio.open_position(Position {
                    entry_index: i,
                    entry_date: bar.timestamp,
                    entry_price: bar.close,
                    amount,
                    stop_loss_percent: rule.stop_loss_percent,
                    take_profit_percent: rule.take_profit_percent,
                });
            }
        }

        portfolio.record_equity(bar.timestamp, bar.close);
    }

    let stats = TradeStats::compute(&portfolio.trades);
    let final_equity = portfolio.equity;
    let total_return_percent = (final_equity - initial_capital) / initial_capital * 100.0;

    info!(
        "{}: {} trades, win rate {:.1}%, return {:+.2}%, max drawdown {:.2}%",
        rule.name,
        stats.total_trades,
        stats.win_rate,
        total_return_percent,
        portfolio.max_drawdown_percent
    );

    Ok(BacktestResult {
        rule_name: rule.name.clone(),
        trades: portfolio.trades,
        total_trades: stats.total_trades,
        winning_trades: stats.winning_trades,
        losing_trades: stats.losing_trades,
        win_rate: stats.win_rate,
        profit_factor: stats.profit_factor,
        avg_win: stats.avg_win,
        avg_loss: stats.avg_loss,
        max_drawdown_percent: portfolio.max_drawdown_percent,
        max_consecutive_losses: portfolio.max_consecutive_losses,
        equity_curve: portfolio.equity_curve,
        initial_capital,
        final_equity,
        total_profit_sek: stats.total_profit_sek,
        total_return_percent,
    })
}

/// Run independent rules over the same bars in parallel, preserving order.
pub fn run_backtests(
    rules: &[Rule],
    bars: &[PriceBar],
    initial_capital: f64,
) -> Vec<Result<BacktestResult, BacktestError>> {
    rules
        .par_iter()
        .map(|rule| run_backtest(rule, bars, initial_capital))
        .collect()
}
