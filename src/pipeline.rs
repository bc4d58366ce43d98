//! Pipeline orchestration
//!
//! This module provides the public API for Hiber Flux.
//! It runs one subject from raw parameters and a decoded series to a repaired
//! result, and fans independent subjects out across threads.

use rayon::prelude::*;
use tracing::{info, warn};

use crate::error::AnalysisError;
use crate::interval::SamplingInterval;
use crate::normalizer::{ParameterNormalizer, RawSubjectParams, SubjectParams};
use crate::repair::repair;
use crate::report::{AnalysisReport, ReportEncoder};
use crate::segmentation::SegmentationEngine;
use crate::types::{HibernationResult, SampleSeries};

/// Analyze one subject from its raw parameter record.
///
/// Pipeline stages:
/// 1. ParameterNormalizer - Parse instants and thresholds
/// 2. SamplingInterval - Estimate the interval from the first gap
/// 3. SubjectParams::windows - Convert discrimination windows to samples
/// 4. SegmentationEngine - Forward scan
/// 5. repair - Merge short ST into PA, extract low-Tb events
///
/// # Example
/// ```ignore
/// let result = analyze(&raw_params, &series)?;
/// println!("{}", result.status_str());
/// ```
pub fn analyze(
    raw: &RawSubjectParams,
    series: &SampleSeries,
) -> Result<HibernationResult, AnalysisError> {
    let params = ParameterNormalizer::normalize(raw)?;
    analyze_series(&params, series)
}

/// Analyze one subject from already-normalized parameters
pub fn analyze_series(
    params: &SubjectParams,
    series: &SampleSeries,
) -> Result<HibernationResult, AnalysisError> {
    series.validate()?;
    let interval = SamplingInterval::estimate(&series.timestamps)?;
    let windows = params.windows(&interval)?;

    let mut result = SegmentationEngine::new(params, windows, interval).segment(series)?;
    // ST fragments merge below the PA window divided by the interval once more
    let max_st_len = windows.pa / interval.minutes as usize;
    repair(&mut result, max_st_len, params.thresholds.prehib_low_tb);

    info!(
        id = %result.id,
        status = result.status_str(),
        samples = series.len(),
        interval_s = interval.seconds,
        "subject analyzed"
    );
    Ok(result)
}

/// One subject of a batch
#[derive(Debug, Clone)]
pub struct SubjectInput {
    /// Label used to report the outcome (usually the series file name)
    pub label: String,
    pub params: RawSubjectParams,
    pub series: SampleSeries,
}

/// Per-subject result of a batch
#[derive(Debug)]
pub struct SubjectOutcome {
    pub label: String,
    pub result: Result<HibernationResult, AnalysisError>,
}

/// Analyze independent subjects in parallel.
///
/// A failing subject is reported in its own outcome and never stops the
/// others. Outcomes keep the input order.
pub fn analyze_batch(inputs: &[SubjectInput]) -> Vec<SubjectOutcome> {
    inputs
        .par_iter()
        .map(|input| {
            let result = analyze(&input.params, &input.series);
            if let Err(e) = &result {
                warn!(subject = %input.label, error = %e, "subject analysis failed");
            }
            SubjectOutcome {
                label: input.label.clone(),
                result,
            }
        })
        .collect()
}

/// Processor that analyzes subjects and encodes their reports with a shared
/// producer identity.
pub struct HibernationProcessor {
    encoder: ReportEncoder,
}

impl Default for HibernationProcessor {
    fn default() -> Self {
        Self::new()
    }
}

impl HibernationProcessor {
    /// Create a new processor with a fresh producer instance id
    pub fn new() -> Self {
        Self {
            encoder: ReportEncoder::new(),
        }
    }

    /// Create a processor with a specific producer instance id
    pub fn with_instance_id(instance_id: String) -> Self {
        Self {
            encoder: ReportEncoder::with_instance_id(instance_id),
        }
    }

    /// Analyze one subject and wrap the result in a report
    pub fn process(
        &self,
        raw: &RawSubjectParams,
        series: &SampleSeries,
    ) -> Result<AnalysisReport, AnalysisError> {
        let result = analyze(raw, series)?;
        Ok(self.encoder.encode(result))
    }

    /// Analyze one subject and return the report as JSON
    pub fn process_to_json(
        &self,
        raw: &RawSubjectParams,
        series: &SampleSeries,
    ) -> Result<String, AnalysisError> {
        let report = self.process(raw, series)?;
        self.encoder.report_to_json(&report)
    }
}
