//! Parameter normalization
//!
//! This module turns a raw per-subject parameter record into typed values.
//! - Time markers parsed to instants (absent end times become `None`)
//! - Partially specified exclusion windows are dropped entirely
//! - Discrimination windows rescaled from minutes to sample counts

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;
use crate::interval::SamplingInterval;

/// Parameter record as it appears in a parameter sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawSubjectParams {
    /// Series file this row applies to
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(default)]
    pub group: Option<String>,
    pub prehib_start_time: String,
    #[serde(default)]
    pub hib_end_time: Option<String>,
    #[serde(default)]
    pub exclusion_start_time: Option<String>,
    #[serde(default)]
    pub exclusion_end_time: Option<String>,
    pub hib_start_tmp: f64,
    pub upper_threshold: f64,
    pub lower_threshold: f64,
    #[serde(rename = "prehib_low_Tb_threshold")]
    pub prehib_low_tb_threshold: f64,
    /// Discrimination windows (minutes)
    pub hib_start_discrimination: f64,
    pub hib_end_discrimination: f64,
    pub dead_discrimination: f64,
    pub pa_discrimination: f64,
}

/// Temperature thresholds, in the unit of the series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Thresholds {
    pub hib_start_tmp: f64,
    pub upper: f64,
    pub lower: f64,
    pub prehib_low_tb: f64,
}

impl Thresholds {
    /// `lower <= temperature < upper`
    pub fn is_normothermic(&self, temperature: f64) -> bool {
        self.lower <= temperature && temperature < self.upper
    }
}

/// Discrimination window lengths (minutes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscriminationMinutes {
    pub hib_start: i64,
    pub hib_end: i64,
    pub dead: i64,
    pub pa: i64,
}

/// Discrimination window lengths converted to sample counts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscriminationWindows {
    pub hib_start: usize,
    pub hib_end: usize,
    pub dead: usize,
    pub pa: usize,
}

/// Time range during which sensor data is disregarded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusionWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl ExclusionWindow {
    /// `start <= timestamp < end`
    pub fn contains(&self, timestamp: NaiveDateTime) -> bool {
        self.start <= timestamp && timestamp < self.end
    }
}

/// Typed per-subject parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubjectParams {
    pub id: String,
    pub group: String,
    pub prehib_start_time: NaiveDateTime,
    pub hib_end_time: Option<NaiveDateTime>,
    pub exclusion: Option<ExclusionWindow>,
    pub thresholds: Thresholds,
    pub discrimination: DiscriminationMinutes,
}

impl SubjectParams {
    /// Convert the discrimination windows to sample counts for `interval`
    pub fn windows(
        &self,
        interval: &SamplingInterval,
    ) -> Result<DiscriminationWindows, AnalysisError> {
        if interval.minutes <= 0 {
            return Err(AnalysisError::Configuration(format!(
                "sampling interval of {}s is below one minute",
                interval.seconds
            )));
        }

        let to_samples = |name: &str, minutes: i64| -> Result<usize, AnalysisError> {
            let samples = minutes / interval.minutes;
            if samples <= 0 {
                return Err(AnalysisError::Configuration(format!(
                    "{} of {} min is shorter than one {} min sample",
                    name, minutes, interval.minutes
                )));
            }
            Ok(samples as usize)
        };

        Ok(DiscriminationWindows {
            hib_start: to_samples("hib_start_discrimination", self.discrimination.hib_start)?,
            hib_end: to_samples("hib_end_discrimination", self.discrimination.hib_end)?,
            dead: to_samples("dead_discrimination", self.discrimination.dead)?,
            pa: to_samples("pa_discrimination", self.discrimination.pa)?,
        })
    }
}

/// Normalizer for converting raw parameter records to typed parameters
pub struct ParameterNormalizer;

impl ParameterNormalizer {
    /// Normalize a raw parameter record
    pub fn normalize(raw: &RawSubjectParams) -> Result<SubjectParams, AnalysisError> {
        let prehib_start_time = parse_instant(&raw.prehib_start_time)?;
        let hib_end_time = optional_instant(raw.hib_end_time.as_deref())?;

        // Both markers or neither
        let exclusion = match (
            optional_instant(raw.exclusion_start_time.as_deref())?,
            optional_instant(raw.exclusion_end_time.as_deref())?,
        ) {
            (Some(start), Some(end)) => Some(ExclusionWindow { start, end }),
            _ => None,
        };

        if raw.upper_threshold < raw.lower_threshold {
            return Err(AnalysisError::Configuration(format!(
                "upper_threshold {} is below lower_threshold {}",
                raw.upper_threshold, raw.lower_threshold
            )));
        }

        Ok(SubjectParams {
            id: raw.id.trim().to_string(),
            group: raw.group.as_deref().unwrap_or("").trim().to_string(),
            prehib_start_time,
            hib_end_time,
            exclusion,
            thresholds: Thresholds {
                hib_start_tmp: raw.hib_start_tmp,
                upper: raw.upper_threshold,
                lower: raw.lower_threshold,
                prehib_low_tb: raw.prehib_low_tb_threshold,
            },
            discrimination: DiscriminationMinutes {
                hib_start: raw.hib_start_discrimination as i64,
                hib_end: raw.hib_end_discrimination as i64,
                dead: raw.dead_discrimination as i64,
                pa: raw.pa_discrimination as i64,
            },
        })
    }
}

fn optional_instant(value: Option<&str>) -> Result<Option<NaiveDateTime>, AnalysisError> {
    match value.map(str::trim) {
        None => Ok(None),
        Some(v) if v.is_empty() || v.eq_ignore_ascii_case("nan") => Ok(None),
        Some(v) => parse_instant(v).map(Some),
    }
}

/// Instant layouts with a four-digit year, after `/` and `T` are normalized
const INSTANT_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y%m%d %H:%M:%S",
    "%Y%m%d %H:%M",
];

/// Parse a parameter-sheet instant.
///
/// Accepts `YYYY-MM-DD HH:MM[:SS]` with `-` or `/` separators, `YYYYMMDD HH:MM`,
/// two-digit years and single-digit fields. A missing time means midnight.
pub fn parse_instant(value: &str) -> Result<NaiveDateTime, AnalysisError> {
    let err = || AnalysisError::DateParseError(value.to_string());

    let cleaned = value.trim().replace('/', "-").replace('T', " ");
    let mut parts = cleaned.split_whitespace();
    let date = parts.next().ok_or_else(err)?;
    let time = parts.next().unwrap_or("00:00");
    if parts.next().is_some() {
        return Err(err());
    }
    // Fractional seconds are dropped
    let time = time.split('.').next().unwrap_or(time);

    let year_digits = date.split('-').next().map_or(0, str::len);
    if year_digits == 4 || year_digits == 8 {
        let joined = format!("{date} {time}");
        return INSTANT_FORMATS
            .iter()
            .find_map(|f| NaiveDateTime::parse_from_str(&joined, f).ok())
            .ok_or_else(err);
    }

    // Two-digit years pivot at 50
    let fields: Vec<&str> = date.split('-').collect();
    let [year, month, day] = fields.as_slice() else {
        return Err(err());
    };
    let mut year: i32 = year.parse().map_err(|_| err())?;
    if year < 100 {
        year += if year < 50 { 2000 } else { 1900 };
    }
    let month: u32 = month.parse().map_err(|_| err())?;
    let day: u32 = day.parse().map_err(|_| err())?;

    let clock: Vec<u32> = time
        .split(':')
        .map(|f| f.parse().map_err(|_| err()))
        .collect::<Result<_, _>>()?;
    let (hour, minute, second) = match clock.as_slice() {
        [h, m] => (*h, *m, 0),
        [h, m, s] => (*h, *m, *s),
        _ => return Err(err()),
    };

    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(hour, minute, second))
        .ok_or_else(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn make_raw_params() -> RawSubjectParams {
        RawSubjectParams {
            file_name: Some("hamster_01.csv".to_string()),
            id: "H01".to_string(),
            group: Some("control".to_string()),
            prehib_start_time: "2023-10-01 00:00".to_string(),
            hib_end_time: None,
            exclusion_start_time: None,
            exclusion_end_time: None,
            hib_start_tmp: 25.0,
            upper_threshold: 30.0,
            lower_threshold: 20.0,
            prehib_low_tb_threshold: 32.0,
            hib_start_discrimination: 30.0,
            hib_end_discrimination: 60.0,
            dead_discrimination: 60.0,
            pa_discrimination: 40.0,
        }
    }

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .unwrap()
            .and_hms_opt(h, mi, 0)
            .unwrap()
    }

    #[test]
    fn test_parse_instant_formats() {
        let expected = at(2023, 1, 5, 7, 3);
        for input in [
            "2023-01-05 07:03",
            "2023/01/05 07:03",
            "2023/1/5 7:3",
            "20230105 07:03",
            "23/1/5 07:03",
            "2023-01-05T07:03:00",
            "2023-01-05  07:03",
        ] {
            assert_eq!(parse_instant(input).unwrap(), expected, "input {input}");
        }
        assert_eq!(parse_instant("98-12-31 23:59").unwrap(), at(1998, 12, 31, 23, 59));
        assert_eq!(parse_instant("2023-01-05").unwrap(), at(2023, 1, 5, 0, 0));
        assert_eq!(
            parse_instant("2023-01-05 07:03:00.250").unwrap(),
            expected
        );
    }

    #[test]
    fn test_parse_instant_rejects_garbage() {
        assert!(matches!(
            parse_instant("yesterday at noon"),
            Err(AnalysisError::DateParseError(_))
        ));
        assert!(parse_instant("2023-13-01 00:00").is_err());
    }

    #[test]
    fn test_normalize_full_record() {
        let mut raw = make_raw_params();
        raw.hib_end_time = Some("2024-03-01 12:00".to_string());
        raw.exclusion_start_time = Some("2023-11-01 00:00".to_string());
        raw.exclusion_end_time = Some("2023-11-02 00:00".to_string());

        let params = ParameterNormalizer::normalize(&raw).unwrap();
        assert_eq!(params.id, "H01");
        assert_eq!(params.group, "control");
        assert_eq!(params.prehib_start_time, at(2023, 10, 1, 0, 0));
        assert_eq!(params.hib_end_time, Some(at(2024, 3, 1, 12, 0)));
        assert_eq!(
            params.exclusion,
            Some(ExclusionWindow {
                start: at(2023, 11, 1, 0, 0),
                end: at(2023, 11, 2, 0, 0),
            })
        );
    }

    #[test]
    fn test_partial_exclusion_is_dropped() {
        let mut raw = make_raw_params();
        raw.exclusion_start_time = Some("2023-11-01 00:00".to_string());
        raw.exclusion_end_time = Some("nan".to_string());
        let params = ParameterNormalizer::normalize(&raw).unwrap();
        assert_eq!(params.exclusion, None);
    }

    #[test]
    fn test_inverted_thresholds_rejected() {
        let mut raw = make_raw_params();
        raw.upper_threshold = 10.0;
        let err = ParameterNormalizer::normalize(&raw).unwrap_err();
        assert!(matches!(err, AnalysisError::Configuration(_)));
    }

    #[test]
    fn test_windows_in_samples() {
        let params = ParameterNormalizer::normalize(&make_raw_params()).unwrap();
        let windows = params.windows(&SamplingInterval::from_seconds(600)).unwrap();
        assert_eq!(
            windows,
            DiscriminationWindows {
                hib_start: 3,
                hib_end: 6,
                dead: 6,
                pa: 4,
            }
        );
    }

    #[test]
    fn test_zero_sample_window_rejected() {
        let mut raw = make_raw_params();
        raw.pa_discrimination = 5.0;
        let params = ParameterNormalizer::normalize(&raw).unwrap();
        let err = params
            .windows(&SamplingInterval::from_seconds(600))
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Configuration(msg) if msg.contains("pa_discrimination")));
    }

    #[test]
    fn test_sub_minute_interval_rejected() {
        let params = ParameterNormalizer::normalize(&make_raw_params()).unwrap();
        assert!(params.windows(&SamplingInterval::from_seconds(30)).is_err());
    }

    #[test]
    fn test_exclusion_is_half_open() {
        let window = ExclusionWindow {
            start: at(2023, 11, 1, 0, 0),
            end: at(2023, 11, 1, 1, 0),
        };
        assert!(window.contains(at(2023, 11, 1, 0, 0)));
        assert!(window.contains(at(2023, 11, 1, 0, 59)));
        assert!(!window.contains(at(2023, 11, 1, 1, 0)));
    }
}
