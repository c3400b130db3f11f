//! Configuration validation.
//!
//! Checks value ranges before any rule is built or backtest run. Missing
//! optional keys fall back to defaults; missing required keys are
//! `ConfigMissing`, out-of-range values `ConfigInvalid`.

use std::str::FromStr;

use crate::domain::error::BullBearError;
use crate::domain::rule::{AmountType, Instrument, LogicOperator, RuleType};
use crate::ports::config_port::ConfigPort;

/// Prefix of the numbered condition keys in `[rule]`.
pub const CONDITION_KEY_PREFIX: &str = "condition_";

/// Largest accepted `geopolitical_bias`, matching the radar's score clamp.
pub const MAX_GEOPOLITICAL_BIAS: f64 = 15.0;

pub fn validate_rule_config(config: &dyn ConfigPort) -> Result<(), BullBearError> {
    validate_rule_name(config)?;
    validate_keyword::<RuleType>(config, "rule_type", true)?;
    validate_keyword::<LogicOperator>(config, "logic", false)?;
    validate_keyword::<Instrument>(config, "instrument", true)?;
    validate_keyword::<AmountType>(config, "amount_type", false)?;
    validate_amount(config)?;
    validate_exit_level(config, "stop_loss")?;
    validate_exit_level(config, "take_profit")?;
    validate_conditions_present(config)?;
    Ok(())
}

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), BullBearError> {
    if config.get_string("backtest", "initial_capital").is_none() {
        return Ok(());
    }
    let value = config.get_double("backtest", "initial_capital", 0.0);
    if !value.is_finite() || value <= 0.0 {
        return Err(BullBearError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "initial_capital".to_string(),
            reason: "initial_capital must be positive".to_string(),
        });
    }
    Ok(())
}

pub fn validate_tool_config(config: &dyn ConfigPort) -> Result<(), BullBearError> {
    validate_non_negative(config, "tools", "momentum_strength_floor")?;

    let bias = config.get_double("tools", "geopolitical_bias", 0.0);
    if !(-MAX_GEOPOLITICAL_BIAS..=MAX_GEOPOLITICAL_BIAS).contains(&bias) {
        return Err(BullBearError::ConfigInvalid {
            section: "tools".to_string(),
            key: "geopolitical_bias".to_string(),
            reason: format!(
                "geopolitical_bias must be between -{0} and {0}",
                MAX_GEOPOLITICAL_BIAS
            ),
        });
    }
    Ok(())
}

pub fn validate_market_config(config: &dyn ConfigPort) -> Result<(), BullBearError> {
    let open = config.get_int("market", "open_hour", 8);
    let close = config.get_int("market", "close_hour", 22);

    if !(0..24).contains(&open) {
        return Err(BullBearError::ConfigInvalid {
            section: "market".to_string(),
            key: "open_hour".to_string(),
            reason: "open_hour must be between 0 and 23".to_string(),
        });
    }
    if close <= open || close > 24 {
        return Err(BullBearError::ConfigInvalid {
            section: "market".to_string(),
            key: "close_hour".to_string(),
            reason: "close_hour must be after open_hour and at most 24".to_string(),
        });
    }
    Ok(())
}

/// `(key, expression)` for `condition_1`, `condition_2`, ... up to the first
/// missing number.
pub fn rule_condition_entries(config: &dyn ConfigPort) -> Vec<(String, String)> {
    let mut entries = Vec::new();
    for n in 1.. {
        let key = format!("{}{}", CONDITION_KEY_PREFIX, n);
        match config.get_string("rule", &key) {
            Some(expr) => entries.push((key, expr)),
            None => break,
        }
    }
    entries
}

fn validate_rule_name(config: &dyn ConfigPort) -> Result<(), BullBearError> {
    match config.get_string("rule", "name") {
        Some(s) if !s.trim().is_empty() => Ok(()),
        _ => Err(BullBearError::ConfigMissing {
            section: "rule".to_string(),
            key: "name".to_string(),
        }),
    }
}

fn validate_keyword<T: FromStr<Err = String>>(
    config: &dyn ConfigPort,
    key: &str,
    required: bool,
) -> Result<(), BullBearError> {
    match config.get_string("rule", key) {
        None if required => Err(BullBearError::ConfigMissing {
            section: "rule".to_string(),
            key: key.to_string(),
        }),
        None => Ok(()),
        Some(value) => value
            .parse::<T>()
            .map(|_| ())
            .map_err(|reason| BullBearError::ConfigInvalid {
                section: "rule".to_string(),
                key: key.to_string(),
                reason,
            }),
    }
}

fn validate_amount(config: &dyn ConfigPort) -> Result<(), BullBearError> {
    if config.get_string("rule", "amount").is_none() {
        return Err(BullBearError::ConfigMissing {
            section: "rule".to_string(),
            key: "amount".to_string(),
        });
    }
    let value = config.get_double("rule", "amount", 0.0);
    if !value.is_finite() || value <= 0.0 {
        return Err(BullBearError::ConfigInvalid {
            section: "rule".to_string(),
            key: "amount".to_string(),
            reason: "amount must be positive".to_string(),
        });
    }
    Ok(())
}

fn validate_exit_level(config: &dyn ConfigPort, key: &str) -> Result<(), BullBearError> {
    if config.get_string("rule", key).is_none() {
        return Err(BullBearError::ConfigMissing {
            section: "rule".to_string(),
            key: key.to_string(),
        });
    }
    validate_non_negative(config, "rule", key)
}

fn validate_non_negative(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
) -> Result<(), BullBearError> {
    let value = config.get_double(section, key, 0.0);
    if !value.is_finite() || value < 0.0 {
        return Err(BullBearError::ConfigInvalid {
            section: section.to_string(),
            key: key.to_string(),
            reason: format!("{} must be non-negative", key),
        });
    }
    Ok(())
}

fn validate_conditions_present(config: &dyn ConfigPort) -> Result<(), BullBearError> {
    let entries = rule_condition_entries(config);
    if entries.is_empty() {
        return Err(BullBearError::ConfigMissing {
            section: "rule".to_string(),
            key: format!("{}1", CONDITION_KEY_PREFIX),
        });
    }
    if let Some((key, _)) = entries.iter().find(|(_, expr)| expr.trim().is_empty()) {
        return Err(BullBearError::ConfigInvalid {
            section: "rule".to_string(),
            key: key.clone(),
            reason: "condition must not be empty".to_string(),
        });
    }
    Ok(())
}
