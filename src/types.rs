//! Core types for the Hiber Flux pipeline
//!
//! This module defines the data structures that flow through each stage of the
//! analysis: the decoded sample series, classified event instances, and the
//! per-subject result.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;
use crate::interval::SamplingInterval;

/// A single (timestamp, temperature) reading
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub timestamp: NaiveDateTime,
    pub temperature: f64,
}

/// A decoded single-channel body-temperature series.
///
/// Timestamps are ascending and both sequences have the same length.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleSeries {
    pub temperatures: Vec<f64>,
    pub timestamps: Vec<NaiveDateTime>,
}

impl SampleSeries {
    /// Build a series from parallel sequences
    pub fn new(
        temperatures: Vec<f64>,
        timestamps: Vec<NaiveDateTime>,
    ) -> Result<Self, AnalysisError> {
        let series = Self {
            temperatures,
            timestamps,
        };
        series.validate()?;
        Ok(series)
    }

    /// Check that both sequences have the same length
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.temperatures.len() != self.timestamps.len() {
            return Err(AnalysisError::InvalidSeries(format!(
                "{} temperatures but {} timestamps",
                self.temperatures.len(),
                self.timestamps.len()
            )));
        }
        Ok(())
    }

    /// Build a series from individual readings
    pub fn from_readings<I>(readings: I) -> Self
    where
        I: IntoIterator<Item = Reading>,
    {
        let (timestamps, temperatures) = readings
            .into_iter()
            .map(|r| (r.timestamp, r.temperature))
            .unzip();
        Self {
            temperatures,
            timestamps,
        }
    }

    pub fn len(&self) -> usize {
        self.temperatures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.temperatures.is_empty()
    }

    /// Reading at `index`, if in range
    pub fn reading(&self, index: usize) -> Option<Reading> {
        Some(Reading {
            timestamp: *self.timestamps.get(index)?,
            temperature: *self.temperatures.get(index)?,
        })
    }
}

/// A sample as seen by the segmentation scan.
///
/// Samples inside the exclusion window are carried as `Excluded` so that any
/// buffer spanning the window can be recognised and dropped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sample {
    Present(Reading),
    Excluded,
}

/// Event classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventCategory {
    #[serde(rename = "prehib")]
    PreHibernation,
    #[serde(rename = "PA")]
    PeriodicArousal,
    #[serde(rename = "ST")]
    ShallowTorpor,
    #[serde(rename = "DT")]
    DeepTorpor,
    #[serde(rename = "Arousal Pending")]
    ArousalPending,
    Cooling,
    Rewarming,
    #[serde(rename = "posthib")]
    PostHibernation,
    #[serde(rename = "low_Tb")]
    LowBodyTemperature,
}

impl EventCategory {
    /// Every category, in report order
    pub const ALL: [EventCategory; 9] = [
        EventCategory::PreHibernation,
        EventCategory::PeriodicArousal,
        EventCategory::ShallowTorpor,
        EventCategory::DeepTorpor,
        EventCategory::ArousalPending,
        EventCategory::Cooling,
        EventCategory::Rewarming,
        EventCategory::PostHibernation,
        EventCategory::LowBodyTemperature,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventCategory::PreHibernation => "prehib",
            EventCategory::PeriodicArousal => "PA",
            EventCategory::ShallowTorpor => "ST",
            EventCategory::DeepTorpor => "DT",
            EventCategory::ArousalPending => "Arousal Pending",
            EventCategory::Cooling => "Cooling",
            EventCategory::Rewarming => "Rewarming",
            EventCategory::PostHibernation => "posthib",
            EventCategory::LowBodyTemperature => "low_Tb",
        }
    }
}

/// One classified run of samples.
///
/// Owns copies of its readings; instances are never edited once recorded
/// except by the repair pass, which concatenates whole instances.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventInstance {
    pub temperatures: Vec<f64>,
    pub timestamps: Vec<NaiveDateTime>,
}

impl EventInstance {
    /// Collect readings into an instance; `None` if any sample was excluded
    pub fn from_samples(samples: &[Sample]) -> Option<Self> {
        let mut instance = EventInstance {
            temperatures: Vec::with_capacity(samples.len()),
            timestamps: Vec::with_capacity(samples.len()),
        };
        for sample in samples {
            match sample {
                Sample::Present(r) => {
                    instance.temperatures.push(r.temperature);
                    instance.timestamps.push(r.timestamp);
                }
                Sample::Excluded => return None,
            }
        }
        Some(instance)
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn first(&self) -> Option<Reading> {
        Some(Reading {
            timestamp: *self.timestamps.first()?,
            temperature: *self.temperatures.first()?,
        })
    }

    pub fn last(&self) -> Option<Reading> {
        Some(Reading {
            timestamp: *self.timestamps.last()?,
            temperature: *self.temperatures.last()?,
        })
    }

    /// Time between the first and last reading
    pub fn span(&self) -> Option<Duration> {
        Some(self.last()?.timestamp - self.first()?.timestamp)
    }

    /// Append another instance's readings after this one's
    pub fn extend(&mut self, other: EventInstance) {
        self.temperatures.extend(other.temperatures);
        self.timestamps.extend(other.timestamps);
    }

    pub fn readings(&self) -> impl Iterator<Item = Reading> + '_ {
        self.timestamps
            .iter()
            .zip(&self.temperatures)
            .map(|(&timestamp, &temperature)| Reading {
                timestamp,
                temperature,
            })
    }
}

/// Per-category ordered event instances.
///
/// Instance numbers are 1-based positions within a category's collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventTable {
    #[serde(rename = "prehib")]
    pub pre_hibernation: Vec<EventInstance>,
    #[serde(rename = "PA")]
    pub periodic_arousal: Vec<EventInstance>,
    #[serde(rename = "ST")]
    pub shallow_torpor: Vec<EventInstance>,
    #[serde(rename = "DT")]
    pub deep_torpor: Vec<EventInstance>,
    #[serde(rename = "Arousal Pending")]
    pub arousal_pending: Vec<EventInstance>,
    #[serde(rename = "Cooling")]
    pub cooling: Vec<EventInstance>,
    #[serde(rename = "Rewarming")]
    pub rewarming: Vec<EventInstance>,
    #[serde(rename = "posthib")]
    pub post_hibernation: Vec<EventInstance>,
    #[serde(rename = "low_Tb")]
    pub low_body_temperature: Vec<EventInstance>,
}

impl EventTable {
    pub fn get(&self, category: EventCategory) -> &[EventInstance] {
        match category {
            EventCategory::PreHibernation => &self.pre_hibernation,
            EventCategory::PeriodicArousal => &self.periodic_arousal,
            EventCategory::ShallowTorpor => &self.shallow_torpor,
            EventCategory::DeepTorpor => &self.deep_torpor,
            EventCategory::ArousalPending => &self.arousal_pending,
            EventCategory::Cooling => &self.cooling,
            EventCategory::Rewarming => &self.rewarming,
            EventCategory::PostHibernation => &self.post_hibernation,
            EventCategory::LowBodyTemperature => &self.low_body_temperature,
        }
    }

    pub fn get_mut(&mut self, category: EventCategory) -> &mut Vec<EventInstance> {
        match category {
            EventCategory::PreHibernation => &mut self.pre_hibernation,
            EventCategory::PeriodicArousal => &mut self.periodic_arousal,
            EventCategory::ShallowTorpor => &mut self.shallow_torpor,
            EventCategory::DeepTorpor => &mut self.deep_torpor,
            EventCategory::ArousalPending => &mut self.arousal_pending,
            EventCategory::Cooling => &mut self.cooling,
            EventCategory::Rewarming => &mut self.rewarming,
            EventCategory::PostHibernation => &mut self.post_hibernation,
            EventCategory::LowBodyTemperature => &mut self.low_body_temperature,
        }
    }

    /// Record a closed buffer as the next instance of `category`.
    ///
    /// Returns the instance number, or `None` when the buffer was empty or
    /// touched the exclusion window.
    pub fn record(&mut self, category: EventCategory, samples: &[Sample]) -> Option<usize> {
        if samples.is_empty() {
            return None;
        }
        let instance = EventInstance::from_samples(samples)?;
        let instances = self.get_mut(category);
        instances.push(instance);
        Some(instances.len())
    }

    /// Number of instances per category, in report order
    pub fn counts(&self) -> Vec<(EventCategory, usize)> {
        EventCategory::ALL
            .iter()
            .map(|&c| (c, self.get(c).len()))
            .collect()
    }
}

/// Terminal condition reached by the scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TerminalStatus {
    /// The whole series stayed above the hib-start temperature
    #[serde(rename = "unhiber")]
    Unhibernating,
    /// The data logger was removed from the animal
    Dissection,
    Dead,
    /// Hibernation ended through sustained normothermia
    Refractory,
}

impl TerminalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TerminalStatus::Unhibernating => "unhiber",
            TerminalStatus::Dissection => "dissection",
            TerminalStatus::Dead => "dead",
            TerminalStatus::Refractory => "refractory",
        }
    }
}

/// Analysis result for one subject
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HibernationResult {
    pub id: String,
    pub group: String,
    pub interval: SamplingInterval,
    /// `None` when the scan reached the end of data without a terminal condition
    pub status: Option<TerminalStatus>,
    pub hib_start: Option<Reading>,
    pub hib_end: Option<Reading>,
    pub events: EventTable,
}

impl HibernationResult {
    pub fn new(id: String, group: String, interval: SamplingInterval) -> Self {
        Self {
            id,
            group,
            interval,
            status: None,
            hib_start: None,
            hib_end: None,
            events: EventTable::default(),
        }
    }

    /// Status string as written to reports; empty when unset
    pub fn status_str(&self) -> &'static str {
        self.status.map(|s| s.as_str()).unwrap_or("")
    }
}
