//! Trading rule data structures.
//!
//! - `Condition`: one test evaluated at a bar (price change, RSI, MACD)
//! - `Rule`: conditions combined with AND/OR, plus sizing and exit levels
//! - `ActionConfig`: which certificate to trade and how much

use std::fmt;
use std::str::FromStr;

pub const DEFAULT_PRICE_CHANGE_LOOKBACK: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RuleType {
    Buy,
    Sell,
    Both,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LogicOperator {
    And,
    Or,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Instrument {
    Bull,
    Bear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AmountType {
    /// Fixed amount in SEK.
    Sek,
    /// Percent of current equity.
    Percent,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActionConfig {
    pub instrument: Instrument,
    pub amount_type: AmountType,
    pub amount: f64,
}

impl ActionConfig {
    /// Requested position size in SEK before the simulator's equity cap.
    pub fn configured_amount(&self, equity: f64) -> f64 {
        match self.amount_type {
            AmountType::Sek => self.amount,
            AmountType::Percent => equity * self.amount / 100.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PriceDirection {
    Up,
    Down,
    Any,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RsiOperator {
    Below,
    Above,
    CrossesAbove,
    CrossesBelow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MacdSignal {
    BullishCross,
    BearishCross,
    HistogramPositive,
    HistogramNegative,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Condition {
    PriceChange {
        direction: PriceDirection,
        min_percent: f64,
        lookback: usize,
    },
    Rsi {
        period: usize,
        operator: RsiOperator,
        threshold: f64,
    },
    Macd {
        signal: MacdSignal,
    },
    /// Declared for rule storage compatibility; never fires.
    Volume {
        multiplier: f64,
    },
    /// Declared for rule storage compatibility; never fires.
    Time {
        start_hour: u32,
        end_hour: u32,
    },
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rule {
    pub name: String,
    pub rule_type: RuleType,
    pub conditions: Vec<Condition>,
    pub logic_operator: LogicOperator,
    pub action_config: ActionConfig,
    pub stop_loss_percent: f64,
    pub take_profit_percent: f64,
}

impl fmt::Display for RuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleType::Buy => write!(f, "BUY"),
            RuleType::Sell => write!(f, "SELL"),
            RuleType::Both => write!(f, "BOTH"),
        }
    }
}

impl FromStr for RuleType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BUY" => Ok(RuleType::Buy),
            "SELL" => Ok(RuleType::Sell),
            "BOTH" => Ok(RuleType::Both),
            other => Err(format!("expected BUY, SELL or BOTH, found '{}'", other)),
        }
    }
}

impl FromStr for LogicOperator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AND" => Ok(LogicOperator::And),
            "OR" => Ok(LogicOperator::Or),
            other => Err(format!("expected AND or OR, found '{}'", other)),
        }
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instrument::Bull => write!(f, "BULL"),
            Instrument::Bear => write!(f, "BEAR"),
        }
    }
}

impl FromStr for Instrument {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BULL" => Ok(Instrument::Bull),
            "BEAR" => Ok(Instrument::Bear),
            other => Err(format!("expected BULL or BEAR, found '{}'", other)),
        }
    }
}

impl FromStr for AmountType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SEK" => Ok(AmountType::Sek),
            "PERCENT" | "%" => Ok(AmountType::Percent),
            other => Err(format!("expected SEK or PERCENT, found '{}'", other)),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Condition::PriceChange {
                direction,
                min_percent,
                lookback,
            } => {
                let dir = match direction {
                    PriceDirection::Up => "UP",
                    PriceDirection::Down => "DOWN",
                    PriceDirection::Any => "ANY",
                };
                write!(f, "PRICE_CHANGE({}, {}, {})", dir, min_percent, lookback)
            }
            Condition::Rsi {
                period,
                operator,
                threshold,
            } => {
                let op = match operator {
                    RsiOperator::Below => "<",
                    RsiOperator::Above => ">",
                    RsiOperator::CrossesAbove => "CROSSES_ABOVE",
                    RsiOperator::CrossesBelow => "CROSSES_BELOW",
                };
                write!(f, "RSI({}) {} {}", period, op, threshold)
            }
            Condition::Macd { signal } => {
                let name = match signal {
                    MacdSignal::BullishCross => "BULLISH_CROSS",
                    MacdSignal::BearishCross => "BEARISH_CROSS",
                    MacdSignal::HistogramPositive => "HISTOGRAM_POSITIVE",
                    MacdSignal::HistogramNegative => "HISTOGRAM_NEGATIVE",
                };
                write!(f, "MACD({})", name)
            }
            Condition::Volume { multiplier } => write!(f, "VOLUME({})", multiplier),
            Condition::Time {
                start_hour,
                end_hour,
            } => write!(f, "TIME({}, {})", start_hour, end_hour),
        }
    }
}
