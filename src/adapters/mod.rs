//! Input adapters
//!
//! This module provides adapters that parse raw logger exports and parameter
//! sheets into the canonical structures the analysis works on.

mod param_sheet;
mod series_csv;

pub use param_sheet::ParameterSheet;
pub use series_csv::CsvSeriesAdapter;

use crate::error::AnalysisError;
use crate::types::SampleSeries;

/// Trait for temperature series adapters
pub trait SeriesAdapter {
    /// Parse a raw export into a time-ordered series
    fn parse(&self, raw: &str) -> Result<SampleSeries, AnalysisError>;
}
