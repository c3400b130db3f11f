//! Core domain types and logic.

pub mod backtest;
pub mod config_validation;
pub mod error;
pub mod indicator;
pub mod metrics;
pub mod portfolio;
pub mod position;
pub mod price_bar;
pub mod recommendation;
pub mod rule;
pub mod rule_eval;
pub mod rule_parser;
pub mod tools;
