//! Condition DSL parser.
//!
//! Recursive descent parser for textual rule conditions. Converts text to
//! `Condition` values with error messages carrying the character offset.
//!
//! ```text
//! conditions := condition (';' condition)* [';']
//! condition  := PRICE_CHANGE '(' direction ',' number [',' integer] ')'
//!             | RSI '(' integer ')' rsi_op number
//!             | MACD '(' macd_signal ')'
//!             | VOLUME '(' number ')'
//!             | TIME '(' integer ',' integer ')'
//! direction  := UP | DOWN | ANY
//! rsi_op     := '<' | '>' | CROSSES_ABOVE | CROSSES_BELOW
//! macd_signal:= BULLISH_CROSS | BEARISH_CROSS | HISTOGRAM_POSITIVE | HISTOGRAM_NEGATIVE
//! ```

use crate::domain::error::ParseError;
use crate::domain::rule::{
    Condition, DEFAULT_PRICE_CHANGE_LOOKBACK, MacdSignal, PriceDirection, RsiOperator,
};

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    fn advance(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn error<T>(&self, message: String, position: usize) -> Result<T, ParseError> {
        Err(ParseError { message, position })
    }

    fn expect_char(&mut self, expected: char) -> Result<(), ParseError> {
        self.skip_whitespace();
        match self.peek() {
            Some(ch) if ch == expected => {
                self.advance();
                Ok(())
            }
            Some(ch) => self.error(format!("expected '{}', found '{}'", expected, ch), self.pos),
            None => self.error(
                format!("expected '{}', found end of input", expected),
                self.pos,
            ),
        }
    }

    fn peek_word(&self) -> String {
        let mut word = String::new();
        for ch in self.remaining().chars() {
            if ch.is_alphanumeric() || ch == '_' {
                word.push(ch);
            } else {
                break;
            }
        }
        if word.is_empty() {
            self.peek()
                .map(|c| c.to_string())
                .unwrap_or_else(|| "end of input".to_string())
        } else {
            word
        }
    }

    /// Consume the next identifier and return it upper-cased with its start offset.
    fn parse_word(&mut self) -> Result<(String, usize), ParseError> {
        self.skip_whitespace();
        let start = self.pos;
        let word = self.peek_word();
        if !word
            .chars()
            .next()
            .is_some_and(|c| c.is_alphabetic() || c == '_')
        {
            return self.error(format!("expected keyword, found '{}'", word), start);
        }
        self.pos += word.len();
        Ok((word.to_ascii_uppercase(), start))
    }

    fn parse_number(&mut self) -> Result<f64, ParseError> {
        self.skip_whitespace();
        let start = self.pos;
        let mut has_dot = false;
        let mut digits = 0;

        if self.peek() == Some('-') {
            self.advance();
        }

        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                digits += 1;
                self.advance();
            } else if ch == '.' && !has_dot {
                has_dot = true;
                self.advance();
            } else {
                break;
            }
        }

        if digits == 0 {
            return self.error("expected number".to_string(), start);
        }

        let num_str = &self.input[start..self.pos];
        num_str.parse::<f64>().map_err(|_| ParseError {
            message: format!("invalid number: {}", num_str),
            position: start,
        })
    }

    fn parse_integer(&mut self) -> Result<usize, ParseError> {
        self.skip_whitespace();
        let start = self.pos;
        let mut digits = 0;

        while let Some(ch) = self.peek() {
            if ch.is_ascii_digit() {
                digits += 1;
                self.advance();
            } else {
                break;
            }
        }

        if digits == 0 {
            return self.error("expected integer".to_string(), start);
        }

        let num_str = &self.input[start..self.pos];
        num_str.parse::<usize>().map_err(|_| ParseError {
            message: format!("invalid integer: {}", num_str),
            position: start,
        })
    }

    fn parse_price_change(&mut self) -> Result<Condition, ParseError> {
        self.expect_char('(')?;
        let (word, at) = self.parse_word()?;
        let direction = match word.as_str() {
            "UP" => PriceDirection::Up,
            "DOWN" => PriceDirection::Down,
            "ANY" => PriceDirection::Any,
            _ => {
                return self.error(
                    format!("expected direction (UP, DOWN, ANY), found '{}'", word),
                    at,
                );
            }
        };
        self.expect_char(',')?;
        self.skip_whitespace();
        let percent_at = self.pos;
        let min_percent = self.parse_number()?;
        if min_percent < 0.0 {
            return self.error("min_percent must be non-negative".to_string(), percent_at);
        }

        self.skip_whitespace();
        let lookback = if self.peek() == Some(',') {
            self.advance();
            self.skip_whitespace();
            let lookback_at = self.pos;
            let lookback = self.parse_integer()?;
            if lookback == 0 {
                return self.error("lookback must be at least 1".to_string(), lookback_at);
            }
            lookback
        } else {
            DEFAULT_PRICE_CHANGE_LOOKBACK
        };
        self.expect_char(')')?;

        Ok(Condition::PriceChange {
            direction,
            min_percent,
            lookback,
        })
    }

    fn parse_rsi(&mut self) -> Result<Condition, ParseError> {
        self.expect_char('(')?;
        self.skip_whitespace();
        let period_at = self.pos;
        let period = self.parse_integer()?;
        if period == 0 {
            return self.error("RSI period must be at least 1".to_string(), period_at);
        }
        self.expect_char(')')?;

        self.skip_whitespace();
        let operator = match self.peek() {
            Some('<') => {
                self.advance();
                RsiOperator::Below
            }
            Some('>') => {
                self.advance();
                RsiOperator::Above
            }
            _ => {
                let (word, at) = self.parse_word()?;
                match word.as_str() {
                    "CROSSES_ABOVE" => RsiOperator::CrossesAbove,
                    "CROSSES_BELOW" => RsiOperator::CrossesBelow,
                    _ => {
                        return self.error(
                            format!(
                                "expected RSI operator (<, >, CROSSES_ABOVE, CROSSES_BELOW), found '{}'",
                                word
                            ),
                            at,
                        );
                    }
                }
            }
        };

        self.skip_whitespace();
        let threshold_at = self.pos;
        let threshold = self.parse_number()?;
        if !(0.0..=100.0).contains(&threshold) {
            return self.error(
                format!("RSI threshold must be between 0 and 100, found {}", threshold),
                threshold_at,
            );
        }

        Ok(Condition::Rsi {
            period,
            operator,
            threshold,
        })
    }

    fn parse_macd(&mut self) -> Result<Condition, ParseError> {
        self.expect_char('(')?;
        let (word, at) = self.parse_word()?;
        let signal = match word.as_str() {
            "BULLISH_CROSS" => MacdSignal::BullishCross,
            "BEARISH_CROSS" => MacdSignal::BearishCross,
            "HISTOGRAM_POSITIVE" => MacdSignal::HistogramPositive,
            "HISTOGRAM_NEGATIVE" => MacdSignal::HistogramNegative,
            _ => {
                return self.error(format!("expected MACD signal, found '{}'", word), at);
            }
        };
        self.expect_char(')')?;
        Ok(Condition::Macd { signal })
    }

    fn parse_volume(&mut self) -> Result<Condition, ParseError> {
        self.expect_char('(')?;
        let multiplier = self.parse_number()?;
        self.expect_char(')')?;
        Ok(Condition::Volume { multiplier })
    }

    fn parse_time(&mut self) -> Result<Condition, ParseError> {
        self.expect_char('(')?;
        self.skip_whitespace();
        let start_at = self.pos;
        let start_hour = self.parse_integer()?;
        self.expect_char(',')?;
        self.skip_whitespace();
        let end_at = self.pos;
        let end_hour = self.parse_integer()?;
        self.expect_char(')')?;

        for (hour, at) in [(start_hour, start_at), (end_hour, end_at)] {
            if hour > 23 {
                return self.error(format!("hour must be 0-23, found {}", hour), at);
            }
        }

        Ok(Condition::Time {
            start_hour: start_hour as u32,
            end_hour: end_hour as u32,
        })
    }

    fn parse_condition(&mut self) -> Result<Condition, ParseError> {
        let (word, at) = self.parse_word()?;
        match word.as_str() {
            "PRICE_CHANGE" => self.parse_price_change(),
            "RSI" => self.parse_rsi(),
            "MACD" => self.parse_macd(),
            "VOLUME" => self.parse_volume(),
            "TIME" => self.parse_time(),
            _ => self.error(format!("expected condition, found '{}'", word), at),
        }
    }

    fn parse_list(&mut self) -> Result<Vec<Condition>, ParseError> {
        let mut conditions = Vec::new();
        loop {
            self.skip_whitespace();
            if self.pos >= self.input.len() {
                break;
            }
            conditions.push(self.parse_condition()?);
            self.skip_whitespace();
            match self.peek() {
                Some(';') => {
                    self.advance();
                }
                None => break,
                Some(_) => {
                    return self.error(
                        format!("expected ';' between conditions, found '{}'", self.peek_word()),
                        self.pos,
                    );
                }
            }
        }

        if conditions.is_empty() {
            return self.error("expected at least one condition".to_string(), self.pos);
        }
        Ok(conditions)
    }

    fn parse_single(&mut self) -> Result<Condition, ParseError> {
        let condition = self.parse_condition()?;
        self.skip_whitespace();
        if self.pos < self.input.len() {
            return self.error(
                format!("unexpected input after condition: '{}'", self.remaining()),
                self.pos,
            );
        }
        Ok(condition)
    }
}

/// Parse a single condition expression.
pub fn parse_condition(input: &str) -> Result<Condition, ParseError> {
    Parser::new(input).parse_single()
}

/// Parse a `;`-separated list of conditions.
pub fn parse_conditions(input: &str) -> Result<Vec<Condition>, ParseError> {
    Parser::new(input).parse_list()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_rsi_comparisons() {
        assert_eq!(
            parse_condition("RSI(14) < 30").unwrap(),
            Condition::Rsi {
                period: 14,
                operator: RsiOperator::Below,
                threshold: 30.0
            }
        );
        assert!(matches!(
            parse_condition("RSI(7) > 70.5").unwrap(),
            Condition::Rsi {
                period: 7,
                operator: RsiOperator::Above,
                ..
            }
        ));
    }

    #[test]
    fn parse_rsi_crosses() {
        assert!(matches!(
            parse_condition("RSI(14) CROSSES_ABOVE 30").unwrap(),
            Condition::Rsi {
                operator: RsiOperator::CrossesAbove,
                ..
            }
        ));
        assert!(matches!(
            parse_condition("rsi(14) crosses_below 70").unwrap(),
            Condition::Rsi {
                operator: RsiOperator::CrossesBelow,
                ..
            }
        ));
    }

    #[test]
    fn parse_price_change_default_lookback() {
        assert_eq!(
            parse_condition("PRICE_CHANGE(UP, 1.5)").unwrap(),
            Condition::PriceChange {
                direction: PriceDirection::Up,
                min_percent: 1.5,
                lookback: 5
            }
        );
    }

    #[test]
    fn parse_price_change_explicit_lookback() {
        assert_eq!(
            parse_condition("PRICE_CHANGE(ANY, 2, 10)").unwrap(),
            Condition::PriceChange {
                direction: PriceDirection::Any,
                min_percent: 2.0,
                lookback: 10
            }
        );
    }

    #[test]
    fn parse_macd_signals() {
        for (input, expected) in [
            ("MACD(BULLISH_CROSS)", MacdSignal::BullishCross),
            ("MACD(BEARISH_CROSS)", MacdSignal::BearishCross),
            ("MACD(HISTOGRAM_POSITIVE)", MacdSignal::HistogramPositive),
            ("MACD(HISTOGRAM_NEGATIVE)", MacdSignal::HistogramNegative),
        ] {
            assert_eq!(
                parse_condition(input).unwrap(),
                Condition::Macd { signal: expected }
            );
        }
    }

    #[test]
    fn parse_declared_only_conditions() {
        assert_eq!(
            parse_condition("VOLUME(1.5)").unwrap(),
            Condition::Volume { multiplier: 1.5 }
        );
        assert_eq!(
            parse_condition("TIME(9, 17)").unwrap(),
            Condition::Time {
                start_hour: 9,
                end_hour: 17
            }
        );
    }

    #[test]
    fn parse_condition_list() {
        let conditions =
            parse_conditions("RSI(14) CROSSES_ABOVE 30; MACD(BULLISH_CROSS);").unwrap();
        assert_eq!(conditions.len(), 2);
        assert!(matches!(conditions[1], Condition::Macd { .. }));
    }

    #[test]
    fn parse_whitespace_handling() {
        let condition = parse_condition("  RSI ( 14 )   <   30  ").unwrap();
        assert!(matches!(condition, Condition::Rsi { .. }));
    }

    #[test]
    fn parse_error_unknown_condition() {
        let err = parse_condition("STOCH(14) < 20").unwrap_err();
        assert_eq!(err.position, 0);
        assert!(err.message.contains("STOCH"));
    }

    #[test]
    fn parse_error_bad_direction() {
        let err = parse_condition("PRICE_CHANGE(SIDEWAYS, 1)").unwrap_err();
        assert_eq!(err.position, 13);
    }

    #[test]
    fn parse_error_threshold_out_of_range() {
        let err = parse_condition("RSI(14) > 130").unwrap_err();
        assert_eq!(err.position, 10);
        assert!(err.message.contains("between 0 and 100"));
    }

    #[test]
    fn parse_error_missing_paren() {
        let err = parse_condition("MACD(BULLISH_CROSS").unwrap_err();
        assert!(err.message.contains("expected ')'"));
    }

    #[test]
    fn parse_error_trailing_input() {
        let err = parse_condition("MACD(BULLISH_CROSS) extra").unwrap_err();
        assert!(err.message.contains("unexpected input"));
    }

    #[test]
    fn parse_error_missing_separator() {
        let err = parse_conditions("MACD(BULLISH_CROSS) RSI(14) < 30").unwrap_err();
        assert!(err.message.contains("expected ';'"));
        assert_eq!(err.position, 20);
    }

    #[test]
    fn parse_error_empty_list() {
        assert!(parse_conditions("   ").is_err());
        assert!(parse_conditions("").is_err());
    }

    #[test]
    fn parse_error_invalid_hour() {
        let err = parse_condition("TIME(9, 24)").unwrap_err();
        assert_eq!(err.position, 8);
    }

    #[test]
    fn parse_roundtrips_display() {
        let condition = parse_condition("RSI(14) CROSSES_ABOVE 30").unwrap();
        assert_eq!(parse_condition(&condition.to_string()).unwrap(), condition);
    }
}
