#![allow(dead_code)]

use bullbear::domain::error::BullBearError;
pub use bullbear::domain::price_bar::PriceBar;
use bullbear::domain::rule::{
    ActionConfig, AmountType, Condition, Instrument, LogicOperator, PriceDirection, Rule, RuleType,
};
use bullbear::ports::data_port::DataPort;
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

pub struct MockDataPort {
    pub data: HashMap<String, Vec<PriceBar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, instrument: &str, bars: Vec<PriceBar>) -> Self {
        self.data.insert(instrument.to_string(), bars);
        self
    }

    pub fn with_error(mut self, instrument: &str, reason: &str) -> Self {
        self.errors.insert(instrument.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_bars(&self, instrument: &str) -> Result<Vec<PriceBar>, BullBearError> {
        if let Some(reason) = self.errors.get(instrument) {
            return Err(BullBearError::Data {
                reason: reason.clone(),
            });
        }
        Ok(self.data.get(instrument).cloned().unwrap_or_default())
    }

    fn list_instruments(&self) -> Result<Vec<String>, BullBearError> {
        let mut names: Vec<String> = self.data.keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}

/// Monday 2024-01-08 at `hour:minute`.
pub fn monday_at(hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 8)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

/// One-minute bars starting Monday 09:00, flat OHLC at the close.
pub fn make_bars(prices: &[f64]) -> Vec<PriceBar> {
    let start = monday_at(9, 0);
    prices
        .iter()
        .enumerate()
        .map(|(i, &close)| PriceBar {
            timestamp: start + chrono::Duration::minutes(i as i64),
            open: close,
            high: close,
            low: close,
            close,
            volume: None,
        })
        .collect()
}

/// Geometric walk from 100 applying each percent step in turn.
pub fn random_walk(steps: &[f64]) -> Vec<f64> {
    let mut price = 100.0;
    let mut prices = vec![price];
    for step in steps {
        price *= 1.0 + step / 100.0;
        prices.push(price);
    }
    prices
}

pub fn pad_to(mut prices: Vec<f64>, len: usize) -> Vec<f64> {
    let last = prices.last().copied().unwrap_or(100.0);
    prices.resize(len, last);
    prices
}

/// Flat at 100, entry at bar 30 (101), +3.1% at bar 34, flat after.
pub fn take_profit_path() -> Vec<f64> {
    let mut prices = vec![100.0; 30];
    prices.extend([101.0, 101.5, 102.0, 103.0, 104.131]);
    pad_to(prices, 60)
}

/// Flat at 100, entry at bar 30 (101), -2.08% at bar 32, flat after.
pub fn stop_loss_path() -> Vec<f64> {
    let mut prices = vec![100.0; 30];
    prices.extend([101.0, 100.0, 98.9]);
    pad_to(prices, 60)
}

pub fn rising_rule(name: &str, amount_type: AmountType, amount: f64) -> Rule {
    Rule {
        name: name.into(),
        rule_type: RuleType::Buy,
        conditions: vec![Condition::PriceChange {
            direction: PriceDirection::Up,
            min_percent: 0.5,
            lookback: 5,
        }],
        logic_operator: LogicOperator::And,
        action_config: ActionConfig {
            instrument: Instrument::Bull,
            amount_type,
            amount,
        },
        stop_loss_percent: 2.0,
        take_profit_percent: 3.0,
    }
}

pub const RISING_RULE_INI: &str = "[rule]
name = rise
rule_type = BUY
instrument = BULL
amount = 1000
stop_loss = 2.0
take_profit = 3.0
condition_1 = PRICE_CHANGE(UP, 0.5, 5)

[backtest]
initial_capital = 10000
";

/// Write `<dir>/<instrument>.csv` with one-minute bars for `prices`.
pub fn write_csv(dir: &Path, instrument: &str, prices: &[f64]) -> PathBuf {
    let mut content = String::from("timestamp,open,high,low,close,volume\n");
    for bar in make_bars(prices) {
        content.push_str(&format!(
            "{},{},{},{},{},\n",
            bar.timestamp.format("%Y-%m-%d %H:%M:%S"),
            bar.open,
            bar.high,
            bar.low,
            bar.close
        ));
    }
    let path = dir.join(format!("{}.csv", instrument));
    fs::write(&path, content).unwrap();
    path
}

pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).unwrap();
    path
}

pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}
