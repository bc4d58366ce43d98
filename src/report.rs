//! Report encoding
//!
//! This module turns an analysis result into the artifacts consumed by
//! reporting tools: a per-event summary table, a per-sample dump, and a JSON
//! report carrying producer metadata.

use std::collections::BTreeMap;
use std::io::Write;

use chrono::{NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AnalysisError;
use crate::types::{EventCategory, EventInstance, HibernationResult};
use crate::{HIBER_VERSION, PRODUCER_NAME};

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Producer metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Complete JSON report for one subject
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub producer: ReportProducer,
    pub computed_at_utc: String,
    /// Status string, empty when the scan reached the end of data
    pub status: String,
    /// Event instances per category
    pub counts: BTreeMap<String, usize>,
    pub result: HibernationResult,
}

/// One row of the summary table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Event Name")]
    pub event_name: String,
    #[serde(rename = "Event Number")]
    pub event_number: usize,
    #[serde(rename = "First Point of Event")]
    pub first: String,
    #[serde(rename = "Last Point of Event")]
    pub last: String,
    #[serde(rename = "Delta Time")]
    pub delta: i64,
    #[serde(rename = "Unit")]
    pub unit: String,
    #[serde(rename = "Group")]
    pub group: String,
}

/// One row of the per-sample dump
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessRow {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "Event Name")]
    pub event_name: String,
    #[serde(rename = "Event Number")]
    pub event_number: usize,
    #[serde(rename = "Date Time")]
    pub date_time: String,
    #[serde(rename = "Value")]
    pub value: f64,
    #[serde(rename = "Group")]
    pub group: String,
}

const SUMMARY_HEADER: [&str; 8] = [
    "ID",
    "Event Name",
    "Event Number",
    "First Point of Event",
    "Last Point of Event",
    "Delta Time",
    "Unit",
    "Group",
];

const PROCESS_HEADER: [&str; 6] = ["ID", "Event Name", "Event Number", "Date Time", "Value", "Group"];

fn format_timestamp(timestamp: NaiveDateTime) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

fn summary_name(category: EventCategory) -> &'static str {
    match category {
        EventCategory::PreHibernation => "pre_hibernation",
        other => other.as_str(),
    }
}

/// Summary rows in report order.
///
/// Unhibernating subjects get no rows. A `hibernation` row spanning the two
/// markers follows the pre-hibernation rows when both markers exist.
pub fn summary_rows(result: &HibernationResult) -> Vec<SummaryRow> {
    let mut rows = Vec::new();
    if result.status == Some(crate::types::TerminalStatus::Unhibernating) {
        return rows;
    }

    for category in EventCategory::ALL {
        if category == EventCategory::PostHibernation {
            continue;
        }
        for (number, instance) in result.events.get(category).iter().enumerate() {
            if let Some(row) = event_row(result, summary_name(category), number + 1, instance) {
                rows.push(row);
            }
        }

        if category == EventCategory::PreHibernation {
            if let (Some(start), Some(end)) = (result.hib_start, result.hib_end) {
                rows.push(SummaryRow {
                    id: result.id.clone(),
                    event_name: "hibernation".to_string(),
                    event_number: 1,
                    first: format_timestamp(start.timestamp),
                    last: format_timestamp(end.timestamp),
                    delta: (end.timestamp - start.timestamp).num_seconds(),
                    unit: "seconds".to_string(),
                    group: result.group.clone(),
                });
            }
        }
    }
    rows
}

fn event_row(
    result: &HibernationResult,
    name: &str,
    number: usize,
    instance: &EventInstance,
) -> Option<SummaryRow> {
    let first = instance.first()?;
    let last = instance.last()?;
    // A single sample still covers one sampling interval
    let delta = if instance.len() == 1 {
        result.interval.seconds
    } else {
        instance.span()?.num_seconds()
    };
    Some(SummaryRow {
        id: result.id.clone(),
        event_name: name.to_string(),
        event_number: number,
        first: format_timestamp(first.timestamp),
        last: format_timestamp(last.timestamp),
        delta,
        unit: "seconds".to_string(),
        group: result.group.clone(),
    })
}

/// Per-sample rows for every category except pre- and post-hibernation
pub fn process_rows(result: &HibernationResult) -> Vec<ProcessRow> {
    let mut rows = Vec::new();
    for category in EventCategory::ALL {
        if matches!(
            category,
            EventCategory::PreHibernation | EventCategory::PostHibernation
        ) {
            continue;
        }
        for (number, instance) in result.events.get(category).iter().enumerate() {
            rows.extend(instance.readings().map(|r| ProcessRow {
                id: result.id.clone(),
                event_name: category.as_str().to_string(),
                event_number: number + 1,
                date_time: format_timestamp(r.timestamp),
                value: r.temperature,
                group: result.group.clone(),
            }));
        }
    }
    rows
}

fn report_writer<W: Write>(writer: W) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_writer(writer)
}

/// Write the summary table, preceded by a `Status` row
pub fn write_summary_csv<W: Write>(
    result: &HibernationResult,
    writer: W,
) -> Result<(), AnalysisError> {
    let mut w = report_writer(writer);
    w.write_record(["Status", result.status_str()])?;
    w.write_record(SUMMARY_HEADER)?;
    if result.status == Some(crate::types::TerminalStatus::Unhibernating) {
        w.write_record([""; 8])?;
    }
    for row in summary_rows(result) {
        w.serialize(row)?;
    }
    w.flush()?;
    Ok(())
}

/// Write the per-sample dump, preceded by a `Status` row
pub fn write_process_csv<W: Write>(
    result: &HibernationResult,
    writer: W,
) -> Result<(), AnalysisError> {
    let mut w = report_writer(writer);
    w.write_record(["Status", result.status_str()])?;
    w.write_record(PROCESS_HEADER)?;
    for row in process_rows(result) {
        w.serialize(row)?;
    }
    w.flush()?;
    Ok(())
}

/// Encoder for producing JSON reports
pub struct ReportEncoder {
    instance_id: String,
}

impl Default for ReportEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Wrap a result in a report
    pub fn encode(&self, result: HibernationResult) -> AnalysisReport {
        let counts = result
            .events
            .counts()
            .into_iter()
            .map(|(category, count)| (category.as_str().to_string(), count))
            .collect();

        AnalysisReport {
            producer: ReportProducer {
                name: PRODUCER_NAME.to_string(),
                version: HIBER_VERSION.to_string(),
                instance_id: self.instance_id.clone(),
            },
            computed_at_utc: Utc::now().to_rfc3339(),
            status: result.status_str().to_string(),
            counts,
            result,
        }
    }

    pub fn report_to_json(&self, report: &AnalysisReport) -> Result<String, AnalysisError> {
        serde_json::to_string_pretty(report).map_err(AnalysisError::JsonError)
    }

    /// Encode to JSON string
    pub fn encode_to_json(&self, result: HibernationResult) -> Result<String, AnalysisError> {
        self.report_to_json(&self.encode(result))
    }
}
