//! CSV price history adapter.
//!
//! One file per instrument, `<base>/<instrument>.csv`, with a header row and
//! columns `timestamp,open,high,low,close[,volume]`.

use crate::domain::error::BullBearError;
use crate::domain::price_bar::{PriceBar, parse_timestamp};
use crate::ports::data_port::DataPort;
use log::debug;
use std::fs;
use std::path::PathBuf;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, instrument: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", instrument))
    }
}

fn parse_price(
    record: &csv::StringRecord,
    index: usize,
    column: &str,
) -> Result<f64, BullBearError> {
    let raw = record.get(index).ok_or_else(|| BullBearError::Data {
        reason: format!("missing {} column", column),
    })?;
    raw.trim().parse::<f64>().map_err(|e| BullBearError::Data {
        reason: format!("invalid {} value '{}': {}", column, raw, e),
    })
}

fn parse_volume(record: &csv::StringRecord) -> Result<Option<f64>, BullBearError> {
    match record.get(5).map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => raw.parse::<f64>().map(Some).map_err(|e| BullBearError::Data {
            reason: format!("invalid volume value '{}': {}", raw, e),
        }),
    }
}

impl DataPort for CsvAdapter {
    fn fetch_bars(&self, instrument: &str) -> Result<Vec<PriceBar>, BullBearError> {
        let path = self.csv_path(instrument);
        let content = fs::read_to_string(&path).map_err(|e| BullBearError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for (row, result) in rdr.records().enumerate() {
            let record = result.map_err(|e| BullBearError::Data {
                reason: format!("CSV parse error: {}", e),
            })?;

            let raw_ts = record.get(0).ok_or_else(|| BullBearError::Data {
                reason: "missing timestamp column".into(),
            })?;
            let timestamp = parse_timestamp(raw_ts).ok_or_else(|| BullBearError::Data {
                reason: format!("invalid timestamp '{}' on row {}", raw_ts, row + 1),
            })?;

            bars.push(PriceBar {
                timestamp,
                open: parse_price(&record, 1, "open")?,
                high: parse_price(&record, 2, "high")?,
                low: parse_price(&record, 3, "low")?,
                close: parse_price(&record, 4, "close")?,
                volume: parse_volume(&record)?,
            });
        }

        bars.sort_by_key(|b| b.timestamp);
        debug!("loaded {} bars from {}", bars.len(), path.display());
        Ok(bars)
    }

    fn list_instruments(&self) -> Result<Vec<String>, BullBearError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| BullBearError::Data {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut instruments = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| BullBearError::Data {
                reason: format!("directory entry error: {}", e),
            })?;

            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if let Some(instrument) = name_str.strip_suffix(".csv") {
                instruments.push(instrument.to_string());
            }
        }

        instruments.sort();
        Ok(instruments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use tempfile::TempDir;

    fn setup_test_data() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();

        let csv_content = "timestamp,open,high,low,close,volume\n\
            2024-01-08 09:02:00,100.5,101.0,100.0,100.8,1200\n\
            2024-01-08 09:00:00,100.0,100.6,99.8,100.2,1500\n\
            2024-01-08T09:01:00,100.2,100.7,100.1,100.5,\n";

        fs::write(path.join("BULL.csv"), csv_content).unwrap();
        fs::write(
            path.join("BEAR.csv"),
            "timestamp,open,high,low,close\n2024-01-08,50.0,51.0,49.0,50.5\n",
        )
        .unwrap();
        fs::write(path.join("notes.txt"), "ignored").unwrap();

        (dir, path)
    }

    #[test]
    fn fetch_bars_sorts_by_timestamp() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let bars = adapter.fetch_bars("BULL").unwrap();
        assert_eq!(bars.len(), 3);
        assert_eq!(bars[0].timestamp.minute(), 0);
        assert_eq!(bars[1].timestamp.minute(), 1);
        assert_eq!(bars[2].timestamp.minute(), 2);
        assert_eq!(bars[0].open, 100.0);
        assert_eq!(bars[0].high, 100.6);
        assert_eq!(bars[0].low, 99.8);
        assert_eq!(bars[0].close, 100.2);
        assert_eq!(bars[0].volume, Some(1500.0));
    }

    #[test]
    fn empty_volume_is_none() {
        let (_dir, path) = setup_test_data();
        let bars = CsvAdapter::new(path).fetch_bars("BULL").unwrap();
        assert_eq!(bars[1].volume, None);
    }

    #[test]
    fn date_only_rows_are_midnight_without_volume() {
        let (_dir, path) = setup_test_data();
        let bars = CsvAdapter::new(path).fetch_bars("BEAR").unwrap();
        assert_eq!(bars.len(), 1);
        assert_eq!(bars[0].timestamp.hour(), 0);
        assert_eq!(bars[0].volume, None);
    }

    #[test]
    fn missing_file_is_data_error() {
        let (_dir, path) = setup_test_data();
        let result = CsvAdapter::new(path).fetch_bars("OIL");
        assert!(matches!(result, Err(BullBearError::Data { .. })));
    }

    #[test]
    fn bad_timestamp_is_data_error() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("BULL.csv"),
            "timestamp,open,high,low,close\n08/01/2024,1,1,1,1\n",
        )
        .unwrap();
        let err = CsvAdapter::new(dir.path().to_path_buf())
            .fetch_bars("BULL")
            .unwrap_err();
        assert!(err.to_string().contains("invalid timestamp"));
    }

    #[test]
    fn bad_price_is_data_error() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("BULL.csv"),
            "timestamp,open,high,low,close\n2024-01-08,1,abc,1,1\n",
        )
        .unwrap();
        let err = CsvAdapter::new(dir.path().to_path_buf())
            .fetch_bars("BULL")
            .unwrap_err();
        assert!(err.to_string().contains("invalid high value"));
    }

    #[test]
    fn list_instruments_returns_csv_stems() {
        let (_dir, path) = setup_test_data();
        let instruments = CsvAdapter::new(path).list_instruments().unwrap();
        assert_eq!(instruments, vec!["BEAR", "BULL"]);
    }
}
