//! CLI definition and dispatch.

use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::backtest::{self as backtest_engine, BacktestResult, DEFAULT_INITIAL_CAPITAL};
use crate::domain::config_validation::{
    rule_condition_entries, validate_backtest_config, validate_market_config,
    validate_rule_config, validate_tool_config,
};
use crate::domain::error::BullBearError;
use crate::domain::indicator::compute_indicators;
use crate::domain::price_bar::{PriceBar, parse_timestamp};
use crate::domain::recommendation::{CombinedRecommendation, combine_recommendation};
use crate::domain::rule::{ActionConfig, AmountType, LogicOperator, Rule};
use crate::domain::rule_parser;
use crate::domain::tools::{MarketHours, ToolSettings, run_analysis_tools};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;

#[derive(Parser, Debug)]
#[command(name = "bullbear", about = "BULL/BEAR oil certificate signal engine")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Backtest one or more rules against price history
    Backtest {
        #[arg(short, long)]
        data_dir: PathBuf,
        /// Price file to use for every rule (default: each rule's instrument)
        #[arg(short, long)]
        instrument: Option<String>,
        #[arg(short, long, required = true, num_args = 1..)]
        rule: Vec<PathBuf>,
        #[arg(short, long, value_parser = parse_positive)]
        capital: Option<f64>,
        /// List every simulated trade
        #[arg(long)]
        trades: bool,
    },
    /// Run the analysis tools and print a combined recommendation
    Analyze {
        #[arg(short, long)]
        data_dir: PathBuf,
        #[arg(short, long)]
        instrument: String,
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Live price (default: last close)
        #[arg(short, long, value_parser = parse_positive)]
        price: Option<f64>,
        /// Evaluation time (default: last bar timestamp)
        #[arg(short, long, value_parser = parse_now)]
        now: Option<NaiveDateTime>,
    },
    /// Print the standard indicator set at the latest bar
    Indicators {
        #[arg(short, long)]
        data_dir: PathBuf,
        #[arg(short, long)]
        instrument: String,
    },
    /// Validate a rule file
    Validate {
        #[arg(short, long)]
        rule: PathBuf,
    },
}

fn parse_positive(value: &str) -> Result<f64, String> {
    match value.parse::<f64>() {
        Ok(v) if v.is_finite() && v > 0.0 => Ok(v),
        Ok(_) => Err("must be a positive number".to_string()),
        Err(e) => Err(e.to_string()),
    }
}

fn parse_now(value: &str) -> Result<NaiveDateTime, String> {
    parse_timestamp(value).ok_or_else(|| {
        "expected YYYY-MM-DD HH:MM:SS, YYYY-MM-DDTHH:MM:SS or YYYY-MM-DD".to_string()
    })
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            data_dir,
            instrument,
            rule,
            capital,
            trades,
        } => run_backtest(&data_dir, instrument.as_deref(), &rule, capital, trades),
        Command::Analyze {
            data_dir,
            instrument,
            config,
            price,
            now,
        } => run_analyze(&data_dir, &instrument, config.as_ref(), price, now),
        Command::Indicators {
            data_dir,
            instrument,
        } => run_indicators(&data_dir, &instrument),
        Command::Validate { rule } => run_validate(&rule),
    }
}

fn fail(err: BullBearError) -> ExitCode {
    eprintln!("error: {err}");
    ExitCode::from(&err)
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(fail)
}

fn load_bars(data_dir: &PathBuf, instrument: &str) -> Result<Vec<PriceBar>, BullBearError> {
    let bars = CsvAdapter::new(data_dir.clone()).fetch_bars(instrument)?;
    if bars.is_empty() {
        return Err(BullBearError::Data {
            reason: format!("no bars for {}", instrument),
        });
    }
    Ok(bars)
}

fn parse_keyword<T: FromStr<Err = String>>(
    adapter: &dyn ConfigPort,
    key: &str,
    default: Option<T>,
) -> Result<T, BullBearError> {
    match (adapter.get_string("rule", key), default) {
        (Some(value), _) => value.parse::<T>().map_err(|reason| BullBearError::ConfigInvalid {
            section: "rule".into(),
            key: key.into(),
            reason,
        }),
        (None, Some(default)) => Ok(default),
        (None, None) => Err(BullBearError::ConfigMissing {
            section: "rule".into(),
            key: key.into(),
        }),
    }
}

/// Build a [`Rule`] from the `[rule]` section. Run
/// [`validate_rule_config`] first for range checks.
pub fn build_rule(adapter: &dyn ConfigPort) -> Result<Rule, BullBearError> {
    let name = adapter
        .get_string("rule", "name")
        .ok_or_else(|| BullBearError::ConfigMissing {
            section: "rule".into(),
            key: "name".into(),
        })?;

    let conditions = rule_condition_entries(adapter)
        .iter()
        .map(|(_, expr)| rule_parser::parse_condition(expr))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Rule {
        name: name.trim().to_string(),
        rule_type: parse_keyword(adapter, "rule_type", None)?,
        conditions,
        logic_operator: parse_keyword(adapter, "logic", Some(LogicOperator::And))?,
        action_config: ActionConfig {
            instrument: parse_keyword(adapter, "instrument", None)?,
            amount_type: parse_keyword(adapter, "amount_type", Some(AmountType::Sek))?,
            amount: adapter.get_double("rule", "amount", 0.0),
        },
        stop_loss_percent: required_level(adapter, "stop_loss")?,
        take_profit_percent: required_level(adapter, "take_profit")?,
    })
}

fn required_level(adapter: &dyn ConfigPort, key: &str) -> Result<f64, BullBearError> {
    if adapter.get_string("rule", key).is_none() {
        return Err(BullBearError::ConfigMissing {
            section: "rule".into(),
            key: key.into(),
        });
    }
    Ok(adapter.get_double("rule", key, 0.0))
}

pub fn build_initial_capital(adapter: &dyn ConfigPort) -> Result<f64, BullBearError> {
    validate_backtest_config(adapter)?;
    Ok(adapter.get_double("backtest", "initial_capital", DEFAULT_INITIAL_CAPITAL))
}

pub fn build_tool_settings(adapter: &dyn ConfigPort) -> Result<ToolSettings, BullBearError> {
    validate_tool_config(adapter)?;
    validate_market_config(adapter)?;

    let defaults = ToolSettings::default();
    let flag = |key: &str, default: bool| adapter.get_bool("tools", key, default);
    let hours = MarketHours::default();

    Ok(ToolSettings {
        momentum_pulse: flag("momentum_pulse", defaults.momentum_pulse),
        volatility_window: flag("volatility_window", defaults.volatility_window),
        reversal_meter: flag("reversal_meter", defaults.reversal_meter),
        micro_pattern: flag("micro_pattern", defaults.micro_pattern),
        smart_exit: flag("smart_exit", defaults.smart_exit),
        trade_timing: flag("trade_timing", defaults.trade_timing),
        correlation_radar: flag("correlation_radar", defaults.correlation_radar),
        risk_per_minute: flag("risk_per_minute", defaults.risk_per_minute),
        frequency_analyzer: flag("frequency_analyzer", defaults.frequency_analyzer),
        momentum_strength_floor: adapter.get_double(
            "tools",
            "momentum_strength_floor",
            defaults.momentum_strength_floor,
        ),
        geopolitical_bias: adapter.get_double(
            "tools",
            "geopolitical_bias",
            defaults.geopolitical_bias,
        ),
        market_hours: MarketHours {
            open_hour: adapter.get_int("market", "open_hour", hours.open_hour as i64) as u32,
            close_hour: adapter.get_int("market", "close_hour", hours.close_hour as i64) as u32,
        },
    })
}

/// Load, validate and build the rule and its starting capital from one file.
pub fn load_rule(path: &PathBuf) -> Result<(Rule, f64), BullBearError> {
    let adapter = FileConfigAdapter::from_file(path)?;
    validate_rule_config(&adapter)?;
    let capital = build_initial_capital(&adapter)?;
    Ok((build_rule(&adapter)?, capital))
}

fn run_backtest(
    data_dir: &PathBuf,
    instrument_override: Option<&str>,
    rule_paths: &[PathBuf],
    capital_override: Option<f64>,
    list_trades: bool,
) -> ExitCode {
    let mut rules = Vec::with_capacity(rule_paths.len());
    let mut file_capital = None;
    for path in rule_paths {
        eprintln!("Loading rule from {}", path.display());
        match load_rule(path) {
            Ok((rule, capital)) => {
                file_capital.get_or_insert(capital);
                rules.push(rule);
            }
            Err(e) => return fail(e),
        }
    }
    let capital = capital_override
        .or(file_capital)
        .unwrap_or(DEFAULT_INITIAL_CAPITAL);

    // Rules sharing a price file are run together.
    let mut groups: Vec<(String, Vec<Rule>)> = Vec::new();
    for rule in rules {
        let instrument = instrument_override
            .map(str::to_string)
            .unwrap_or_else(|| rule.action_config.instrument.to_string());
        match groups.iter_mut().find(|(name, _)| *name == instrument) {
            Some((_, group)) => group.push(rule),
            None => groups.push((instrument, vec![rule])),
        }
    }

    let mut first_error: Option<BullBearError> = None;
    for (instrument, group) in &groups {
        let bars = match load_bars(data_dir, instrument) {
            Ok(b) => b,
            Err(e) => return fail(e),
        };
        eprintln!(
            "Backtesting {} rule(s) on {} ({} bars, capital {:.2} SEK)",
            group.len(),
            instrument,
            bars.len(),
            capital
        );

        let results = backtest_engine::run_backtests(group, &bars, capital);
        for (rule, result) in group.iter().zip(results) {
            match result {
                Ok(r) => print_backtest_summary(&r, instrument, list_trades),
                Err(e) => {
                    eprintln!("\nerror: {}: {}", rule.name, e);
                    first_error.get_or_insert(BullBearError::from(e));
                }
            }
        }
    }

    match first_error {
        Some(e) => ExitCode::from(&e),
        None => ExitCode::SUCCESS,
    }
}

fn print_backtest_summary(result: &BacktestResult, instrument: &str, list_trades: bool) {
    eprintln!("\n=== {} ({}) ===", result.rule_name, instrument);
    eprintln!(
        "Total Trades:     {} ({} won, {} lost)",
        result.total_trades, result.winning_trades, result.losing_trades
    );
    eprintln!("Win Rate:         {:.1}%", result.win_rate);
    eprintln!("Profit Factor:    {:.2}", result.profit_factor);
    eprintln!(
        "Avg Win / Loss:   {:.2} / {:.2} SEK",
        result.avg_win, result.avg_loss
    );
    eprintln!("Max Drawdown:     -{:.2}%", result.max_drawdown_percent);
    eprintln!("Max Loss Streak:  {}", result.max_consecutive_losses);
    eprintln!(
        "Final Equity:     {:.2} SEK ({:+.2} SEK)",
        result.final_equity, result.total_profit_sek
    );
    eprintln!("Total Return:     {:+.2}%", result.total_return_percent);

    if list_trades && !result.trades.is_empty() {
        eprintln!(
            "\n  {:<20} {:<20} {:>10} {:>10} {:>8}  exit",
            "entry", "exit", "entry_px", "exit_px", "pnl%"
        );
        for t in &result.trades {
            eprintln!(
                "  {:<20} {:<20} {:>10.4} {:>10.4} {:>+8.2}  {:?}",
                t.entry_date.format("%Y-%m-%d %H:%M").to_string(),
                t.exit_date.format("%Y-%m-%d %H:%M").to_string(),
                t.entry_price,
                t.exit_price,
                t.profit_percent,
                t.exit_reason
            );
        }
    }
}

/// Load bars and settings, run every enabled tool and combine the results.
pub fn analyze_instrument(
    data_dir: &PathBuf,
    instrument: &str,
    settings: &ToolSettings,
    price: Option<f64>,
    now: Option<NaiveDateTime>,
) -> Result<CombinedRecommendation, BullBearError> {
    let bars = load_bars(data_dir, instrument)?;
    let last = &bars[bars.len() - 1];
    let now = now.unwrap_or(last.timestamp);

    let factors = run_analysis_tools(&bars, price, settings, now);
    Ok(combine_recommendation(factors, price.unwrap_or(last.close)))
}

fn run_analyze(
    data_dir: &PathBuf,
    instrument: &str,
    config_path: Option<&PathBuf>,
    price: Option<f64>,
    now: Option<NaiveDateTime>,
) -> ExitCode {
    let settings = match config_path {
        Some(path) => {
            eprintln!("Loading tool settings from {}", path.display());
            let adapter = match load_config(path) {
                Ok(a) => a,
                Err(code) => return code,
            };
            match build_tool_settings(&adapter) {
                Ok(s) => s,
                Err(e) => return fail(e),
            }
        }
        None => ToolSettings::default(),
    };

    let rec = match analyze_instrument(data_dir, instrument, &settings, price, now) {
        Ok(r) => r,
        Err(e) => return fail(e),
    };

    eprintln!("\n=== Analysis: {} ===", instrument);
    for f in &rec.factors {
        eprintln!(
            "{:<20} {:<4} score {:>+6.1}  conf {:>3.0}  {}",
            f.name, f.signal, f.score, f.confidence, f.reasoning
        );
    }
    eprintln!("\nAction:           {}", rec.action);
    eprintln!("Total Score:      {:+.1}", rec.total_score);
    eprintln!("Confidence:       {:.0}%", rec.confidence);
    eprintln!("Entry:            {:.4}", rec.strategy.entry);
    eprintln!("Target:           {:.4}", rec.strategy.target);
    eprintln!("Stop Loss:        {:.4}", rec.strategy.stop_loss);
    eprintln!("Hold Time:        {}", rec.strategy.suggested_hold_time);
    ExitCode::SUCCESS
}

fn run_indicators(data_dir: &PathBuf, instrument: &str) -> ExitCode {
    let bars = match load_bars(data_dir, instrument) {
        Ok(b) => b,
        Err(e) => return fail(e),
    };
    let ind = compute_indicators(&bars);

    eprintln!("=== Indicators: {} ({} bars) ===", instrument, bars.len());
    eprintln!("Last Close:       {:.4}", ind.last_close);
    eprintln!("RSI(14):          {:.2}", ind.rsi_14);
    eprintln!("SMA(20):          {:.4}", ind.sma_20);
    eprintln!("SMA(50):          {:.4}", ind.sma_50);
    eprintln!("EMA(12):          {:.4}", ind.ema_12);
    eprintln!("EMA(26):          {:.4}", ind.ema_26);
    eprintln!(
        "MACD:             {:.4} (signal {:.4}, histogram {:+.4})",
        ind.macd.macd, ind.macd.signal, ind.macd.histogram
    );
    eprintln!("Bollinger Pos:    {:.1}", ind.bollinger_position);
    ExitCode::SUCCESS
}

fn run_validate(rule_path: &PathBuf) -> ExitCode {
    eprintln!("Validating rule: {}", rule_path.display());
    let adapter = match load_config(rule_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    if let Err(e) = validate_rule_config(&adapter) {
        return fail(e);
    }
    if let Err(e) = validate_backtest_config(&adapter) {
        return fail(e);
    }

    eprintln!("\nConditions:");
    for (key, expr) in rule_condition_entries(&adapter) {
        match rule_parser::parse_condition(&expr) {
            Ok(condition) => eprintln!("  {:<13} {}", key, condition),
            Err(e) => {
                eprintln!("  {} error:\n{}", key, e.display_with_context(&expr));
                return ExitCode::from(&BullBearError::from(e));
            }
        }
    }

    let rule = match build_rule(&adapter) {
        Ok(r) => r,
        Err(e) => return fail(e),
    };
    eprintln!(
        "\n{} rule '{}' on {}: {:?} of {} condition(s), amount {} {:?}, SL {}%, TP {}%",
        rule.rule_type,
        rule.name,
        rule.action_config.instrument,
        rule.logic_operator,
        rule.conditions.len(),
        rule.action_config.amount,
        rule.action_config.amount_type,
        rule.stop_loss_percent,
        rule.take_profit_percent
    );
    eprintln!("\nRule configuration is valid.");
    ExitCode::SUCCESS
}
