//! Sampling interval estimation
//!
//! The interval is taken from the first gap of the series and assumed to hold
//! for the whole recording. Every window-based predicate is calibrated with it,
//! so irregular gaps later in the series are not detected here.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// Sampling interval of a series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamplingInterval {
    /// Gap between consecutive samples (seconds)
    pub seconds: i64,
    /// Gap in whole minutes (truncated)
    pub minutes: i64,
}

impl SamplingInterval {
    pub fn from_seconds(seconds: i64) -> Self {
        Self {
            seconds,
            minutes: seconds / 60,
        }
    }

    /// Estimate the interval from the first two timestamps
    pub fn estimate(timestamps: &[NaiveDateTime]) -> Result<Self, AnalysisError> {
        let (first, second) = match timestamps {
            [first, second, ..] => (*first, *second),
            _ => {
                return Err(AnalysisError::InsufficientData(format!(
                    "at least 2 samples are required to estimate the sampling interval, got {}",
                    timestamps.len()
                )))
            }
        };

        let seconds = (second - first).num_seconds();
        if seconds <= 0 {
            return Err(AnalysisError::InvalidSeries(format!(
                "first sampling gap must be positive ({} -> {})",
                first, second
            )));
        }
        Ok(Self::from_seconds(seconds))
    }

    pub fn as_duration(&self) -> Duration {
        Duration::seconds(self.seconds)
    }
}
