//! Price bar representation.

use chrono::{NaiveDate, NaiveDateTime};

const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];
const DATE_FORMAT: &str = "%Y-%m-%d";

/// One OHLC bar of the underlying or a certificate.
///
/// Series are ordered ascending by `timestamp` with no duplicates. Gaps are
/// normal and are never forward-filled.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PriceBar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: Option<f64>,
}

impl PriceBar {
    /// high - low
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    /// |close - open|
    pub fn body(&self) -> f64 {
        (self.close - self.open).abs()
    }

    /// Body as a fraction of range; 0 for a zero-range bar.
    pub fn body_ratio(&self) -> f64 {
        let range = self.range();
        if range > 0.0 { self.body() / range } else { 0.0 }
    }
}

/// Extract close prices in series order.
pub fn closes(bars: &[PriceBar]) -> Vec<f64> {
    bars.iter().map(|b| b.close).collect()
}

/// Percent change from `from` to `to`; 0 when `from` is not positive.
pub fn pct_change(from: f64, to: f64) -> f64 {
    if from > 0.0 {
        (to - from) / from * 100.0
    } else {
        0.0
    }
}

/// Parse `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS` or a bare date
/// (midnight).
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, DATE_FORMAT)
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Median spacing between consecutive bars in minutes, at least 1.
///
/// Used by the tools that reason about wall-clock horizons (5m, 1h, ...)
/// over series of arbitrary granularity.
pub fn bar_interval_minutes(bars: &[PriceBar]) -> f64 {
    if bars.len() < 2 {
        return 1.0;
    }
    let mut gaps: Vec<f64> = bars
        .windows(2)
        .map(|w| (w[1].timestamp - w[0].timestamp).num_seconds() as f64 / 60.0)
        .filter(|g| *g > 0.0)
        .collect();
    if gaps.is_empty() {
        return 1.0;
    }
    gaps.sort_by(|a, b| a.total_cmp(b));
    gaps[gaps.len() / 2].max(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 4)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn sample_bar() -> PriceBar {
        PriceBar {
            timestamp: at(9, 0),
            open: 100.0,
            high: 110.0,
            low: 90.0,
            close: 105.0,
            volume: Some(50_000.0),
        }
    }

    #[test]
    fn range_and_body() {
        let bar = sample_bar();
        assert!((bar.range() - 20.0).abs() < f64::EPSILON);
        assert!((bar.body() - 5.0).abs() < f64::EPSILON);
        assert!((bar.body_ratio() - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn body_ratio_zero_range() {
        let bar = PriceBar {
            high: 100.0,
            low: 100.0,
            open: 100.0,
            close: 100.0,
            ..sample_bar()
        };
        assert_eq!(bar.body_ratio(), 0.0);
    }

    #[test]
    fn pct_change_guards_zero_base() {
        assert!((pct_change(100.0, 103.0) - 3.0).abs() < 1e-12);
        assert_eq!(pct_change(0.0, 5.0), 0.0);
    }

    #[test]
    fn interval_is_median_gap() {
        let bars: Vec<PriceBar> = [0, 5, 10, 15, 75]
            .iter()
            .map(|&m| PriceBar {
                timestamp: at(9, 0) + chrono::Duration::minutes(m),
                ..sample_bar()
            })
            .collect();
        assert!((bar_interval_minutes(&bars) - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn parses_all_timestamp_formats() {
        assert_eq!(parse_timestamp("2024-03-04 09:00:00"), Some(at(9, 0)));
        assert_eq!(parse_timestamp("2024-03-04T09:00:00"), Some(at(9, 0)));
        assert_eq!(parse_timestamp(" 2024-03-04 "), Some(at(0, 0)));
        assert_eq!(parse_timestamp("04/03/2024"), None);
    }

    #[test]
    fn interval_defaults_to_one_minute() {
        assert_eq!(bar_interval_minutes(&[sample_bar()]), 1.0);
    }
}
