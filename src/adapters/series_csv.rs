//! Canonical series CSV adapter
//!
//! Parses a logger export with `Date/Time` and `Value` columns. Other columns
//! are ignored.

use csv::{ReaderBuilder, StringRecord, Trim};
use tracing::debug;

use crate::error::AnalysisError;
use crate::normalizer::parse_instant;
use crate::types::{Reading, SampleSeries};

use super::SeriesAdapter;

/// CSV series adapter
pub struct CsvSeriesAdapter {
    time_column: String,
    value_column: String,
}

impl Default for CsvSeriesAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvSeriesAdapter {
    pub fn new() -> Self {
        Self {
            time_column: "Date/Time".to_string(),
            value_column: "Value".to_string(),
        }
    }

    /// Use different column names
    pub fn with_columns(time_column: &str, value_column: &str) -> Self {
        Self {
            time_column: time_column.to_string(),
            value_column: value_column.to_string(),
        }
    }

    fn column(&self, headers: &StringRecord, name: &str) -> Result<usize, AnalysisError> {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| AnalysisError::ParseError(format!("missing column '{name}'")))
    }
}

impl SeriesAdapter for CsvSeriesAdapter {
    fn parse(&self, raw: &str) -> Result<SampleSeries, AnalysisError> {
        let mut reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .from_reader(raw.as_bytes());

        let headers = reader.headers()?.clone();
        let time_idx = self.column(&headers, &self.time_column)?;
        let value_idx = self.column(&headers, &self.value_column)?;

        let mut readings: Vec<Reading> = Vec::new();
        for (row, record) in reader.records().enumerate() {
            let record = record?;
            let line = row + 2;
            let (Some(time), Some(value)) = (record.get(time_idx), record.get(value_idx)) else {
                return Err(AnalysisError::ParseError(format!("row {line}: missing field")));
            };
            if time.is_empty() && value.is_empty() {
                continue;
            }

            let timestamp = parse_instant(time)?;
            let temperature: f64 = value.parse().map_err(|_| {
                AnalysisError::ParseError(format!("row {line}: invalid value '{value}'"))
            })?;

            if let Some(previous) = readings.last() {
                if timestamp <= previous.timestamp {
                    return Err(AnalysisError::InvalidSeries(format!(
                        "row {line}: timestamp {timestamp} does not follow {}",
                        previous.timestamp
                    )));
                }
            }
            readings.push(Reading {
                timestamp,
                temperature,
            });
        }

        debug!(samples = readings.len(), "series parsed");
        Ok(SampleSeries::from_readings(readings))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    const EXPORT: &str = "\
Date/Time,Unit,Value
2023/12/01 00:00:00,C,36.5
2023/12/01 00:10:00,C,36.1
2023/12/01 00:20:00,C,35.8
";

    #[test]
    fn test_parse_export() {
        let series = CsvSeriesAdapter::new().parse(EXPORT).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.temperatures, vec![36.5, 36.1, 35.8]);
        assert_eq!(
            series.timestamps[1],
            NaiveDate::from_ymd_opt(2023, 12, 1)
                .unwrap()
                .and_hms_opt(0, 10, 0)
                .unwrap()
        );
    }

    #[test]
    fn test_missing_column() {
        let raw = "Time,Value\n2023-12-01 00:00,36.0\n";
        let err = CsvSeriesAdapter::new().parse(raw).unwrap_err();
        assert!(matches!(err, AnalysisError::ParseError(_)));
    }

    #[test]
    fn test_custom_columns() {
        let raw = "t,tb\n2023-12-01 00:00,36.0\n2023-12-01 00:05,35.0\n";
        let series = CsvSeriesAdapter::with_columns("t", "tb").parse(raw).unwrap();
        assert_eq!(series.temperatures, vec![36.0, 35.0]);
    }

    #[test]
    fn test_invalid_value() {
        let raw = "Date/Time,Value\n2023-12-01 00:00,36.0\n2023-12-01 00:10,warm\n";
        let err = CsvSeriesAdapter::new().parse(raw).unwrap_err();
        match err {
            AnalysisError::ParseError(msg) => assert!(msg.contains("row 3")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_out_of_order_timestamps() {
        let raw = "Date/Time,Value\n2023-12-01 00:10,36.0\n2023-12-01 00:00,35.0\n";
        let err = CsvSeriesAdapter::new().parse(raw).unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidSeries(_)));
    }
}
