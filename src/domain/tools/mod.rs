//! Heuristic analysis tools.
//!
//! Each tool is a pure function of a [`ToolInput`] returning `None` when it is
//! disabled or the history is too short for it. The clock is part of the
//! input, so time-of-day tools are deterministic.

pub mod correlation_radar;
pub mod frequency_analyzer;
pub mod micro_pattern;
pub mod momentum_pulse;
pub mod reversal_meter;
pub mod risk_per_minute;
pub mod smart_exit;
pub mod trade_timing;
pub mod volatility_window;

use std::fmt;

use chrono::{Datelike, NaiveDateTime, Timelike, Weekday};
use log::debug;
use rayon::prelude::*;

use crate::domain::price_bar::{PriceBar, closes, pct_change};

pub const MAX_TOOL_SCORE: f64 = 25.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Buy => write!(f, "BUY"),
            Signal::Sell => write!(f, "SELL"),
            Signal::Hold => write!(f, "HOLD"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ToolResult {
    pub name: String,
    /// Roughly -25..=25; positive is bullish.
    pub score: f64,
    /// 0..=100
    pub confidence: f64,
    pub signal: Signal,
    pub reasoning: String,
}

impl ToolResult {
    pub fn new(
        tool: AnalysisTool,
        score: f64,
        confidence: f64,
        signal: Signal,
        reasoning: impl Into<String>,
    ) -> Self {
        ToolResult {
            name: tool.name().to_string(),
            score: score.clamp(-MAX_TOOL_SCORE, MAX_TOOL_SCORE),
            confidence: confidence.clamp(0.0, 100.0),
            signal,
            reasoning: reasoning.into(),
        }
    }
}

/// Trading session used by the time-aware tools, in market local hours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MarketHours {
    pub open_hour: u32,
    pub close_hour: u32,
}

impl Default for MarketHours {
    fn default() -> Self {
        MarketHours {
            open_hour: 8,
            close_hour: 22,
        }
    }
}

impl MarketHours {
    /// Weekday and `open_hour <= hour < close_hour`.
    pub fn is_open(&self, now: NaiveDateTime) -> bool {
        let weekend = matches!(now.weekday(), Weekday::Sat | Weekday::Sun);
        let hour = now.hour();
        !weekend && hour >= self.open_hour && hour < self.close_hour
    }
}

/// Per-tool enable flags and tuning knobs.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ToolSettings {
    pub momentum_pulse: bool,
    pub volatility_window: bool,
    pub reversal_meter: bool,
    pub micro_pattern: bool,
    pub smart_exit: bool,
    pub trade_timing: bool,
    pub correlation_radar: bool,
    pub risk_per_minute: bool,
    pub frequency_analyzer: bool,
    pub momentum_strength_floor: f64,
    pub geopolitical_bias: f64,
    pub market_hours: MarketHours,
}

impl Default for ToolSettings {
    fn default() -> Self {
        ToolSettings {
            momentum_pulse: true,
            volatility_window: true,
            reversal_meter: true,
            micro_pattern: true,
            smart_exit: true,
            trade_timing: true,
            correlation_radar: true,
            risk_per_minute: true,
            frequency_analyzer: true,
            momentum_strength_floor: 3.0,
            geopolitical_bias: 2.0,
            market_hours: MarketHours::default(),
        }
    }
}

/// Snapshot handed to every tool.
#[derive(Debug, Clone)]
pub struct ToolInput<'a> {
    pub history: &'a [PriceBar],
    pub prices: Vec<f64>,
    pub current_price: Option<f64>,
    pub now: NaiveDateTime,
    pub settings: &'a ToolSettings,
}

impl<'a> ToolInput<'a> {
    pub fn new(
        history: &'a [PriceBar],
        current_price: Option<f64>,
        now: NaiveDateTime,
        settings: &'a ToolSettings,
    ) -> Self {
        ToolInput {
            history,
            prices: closes(history),
            current_price,
            now,
            settings,
        }
    }

    /// `current_price` if it is usable, otherwise the last close.
    pub fn price(&self) -> Option<f64> {
        match self.current_price {
            Some(p) if is_valid_price(p) => Some(p),
            _ => self.prices.last().copied().filter(|p| is_valid_price(*p)),
        }
    }
}

pub fn is_valid_price(price: f64) -> bool {
    price.is_finite() && price > 0.0
}

/// Bar-to-bar percent returns.
pub fn pct_returns(prices: &[f64]) -> Vec<f64> {
    prices.windows(2).map(|w| pct_change(w[0], w[1])).collect()
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AnalysisTool {
    MomentumPulse,
    VolatilityWindow,
    ReversalMeter,
    MicroPattern,
    SmartExit,
    TradeTiming,
    CorrelationRadar,
    RiskPerMinute,
    FrequencyAnalyzer,
}

impl AnalysisTool {
    /// Fixed evaluation and reporting order.
    pub const ALL: [AnalysisTool; 9] = [
        AnalysisTool::MomentumPulse,
        AnalysisTool::VolatilityWindow,
        AnalysisTool::ReversalMeter,
        AnalysisTool::MicroPattern,
        AnalysisTool::SmartExit,
        AnalysisTool::TradeTiming,
        AnalysisTool::CorrelationRadar,
        AnalysisTool::RiskPerMinute,
        AnalysisTool::FrequencyAnalyzer,
    ];

    pub fn name(self) -> &'static str {
        match self {
            AnalysisTool::MomentumPulse => "Momentum Pulse",
            AnalysisTool::VolatilityWindow => "Volatility Window",
            AnalysisTool::ReversalMeter => "Reversal Meter",
            AnalysisTool::MicroPattern => "Micro-Pattern Scanner",
            AnalysisTool::SmartExit => "Smart Exit Optimizer",
            AnalysisTool::TradeTiming => "Trade Timing Score",
            AnalysisTool::CorrelationRadar => "Correlation Radar",
            AnalysisTool::RiskPerMinute => "Risk-Per-Minute",
            AnalysisTool::FrequencyAnalyzer => "Frequency Analyzer",
        }
    }

    pub fn is_enabled(self, settings: &ToolSettings) -> bool {
        match self {
            AnalysisTool::MomentumPulse => settings.momentum_pulse,
            AnalysisTool::VolatilityWindow => settings.volatility_window,
            AnalysisTool::ReversalMeter => settings.reversal_meter,
            AnalysisTool::MicroPattern => settings.micro_pattern,
            AnalysisTool::SmartExit => settings.smart_exit,
            AnalysisTool::TradeTiming => settings.trade_timing,
            AnalysisTool::CorrelationRadar => settings.correlation_radar,
            AnalysisTool::RiskPerMinute => settings.risk_per_minute,
            AnalysisTool::FrequencyAnalyzer => settings.frequency_analyzer,
        }
    }

    pub fn run(self, input: &ToolInput<'_>) -> Option<ToolResult> {
        if !self.is_enabled(input.settings) {
            return None;
        }
        let result = match self {
            AnalysisTool::MomentumPulse => momentum_pulse::analyze(input),
            AnalysisTool::VolatilityWindow => volatility_window::analyze(input),
            AnalysisTool::ReversalMeter => reversal_meter::analyze(input),
            AnalysisTool::MicroPattern => micro_pattern::analyze(input),
            AnalysisTool::SmartExit => smart_exit::analyze(input),
            AnalysisTool::TradeTiming => trade_timing::analyze(input),
            AnalysisTool::CorrelationRadar => correlation_radar::analyze(input),
            AnalysisTool::RiskPerMinute => risk_per_minute::analyze(input),
            AnalysisTool::FrequencyAnalyzer => frequency_analyzer::analyze(input),
        };
        match &result {
            Some(r) => debug!(
                "{}: {} score {:+.1} confidence {:.0} ({})",
                r.name, r.signal, r.score, r.confidence, r.reasoning
            ),
            None => debug!("{}: insufficient data", self.name()),
        }
        result
    }
}

/// Run every enabled tool and keep the ones that produced a result.
///
/// Tools run in parallel; the output follows [`AnalysisTool::ALL`] order.
pub fn run_analysis_tools(
    history: &[PriceBar],
    current_price: Option<f64>,
    settings: &ToolSettings,
    now: NaiveDateTime,
) -> Vec<ToolResult> {
    let input = ToolInput::new(history, current_price, now, settings);
    let results: Vec<Option<ToolResult>> = AnalysisTool::ALL
        .par_iter()
        .map(|tool| tool.run(&input))
        .collect();
    results.into_iter().flatten().collect()
}
