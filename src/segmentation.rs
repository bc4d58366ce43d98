//! Segmentation engine
//!
//! A single forward scan over one subject's series that assigns every sample
//! to an event category. The scan carries three pieces of state between
//! samples: the open buffer, the reference temperature that decides how a
//! band change closes that buffer, and whether the exclusion window is still
//! live. All of it lives in [`ScanContext`].
//!
//! Band changes inside the torpor cycle close the open buffer as:
//! - Cooling: entering the torpid band after a warm reference
//! - Arousal Pending: entering the torpid band after a torpid reference
//! - DT: the sample before the temperature climbs back to the lower threshold
//! - Rewarming: reaching the upper threshold after a torpid reference
//! - ST: reaching the upper threshold after a warm reference
//! - PA: the sample before the temperature drops under the upper threshold

use chrono::NaiveDateTime;
use tracing::{debug, info, warn};

use crate::error::AnalysisError;
use crate::interval::SamplingInterval;
use crate::normalizer::{DiscriminationWindows, ExclusionWindow, SubjectParams, Thresholds};
use crate::predicates::{
    coldest_offset, is_dead, is_hib_end, is_hib_start, is_instrument_removed,
};
use crate::types::{
    EventCategory, HibernationResult, Reading, Sample, SampleSeries, TerminalStatus,
};

/// Days of data kept after a refractory hibernation end
const POST_HIBERNATION_DAYS: i64 = 7;

/// Scan phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for hibernation start to be confirmed
    PreHibernation,
    /// Between hibernation start and hibernation end
    TorporCycle,
    /// Hibernation ended by sustained normothermia
    PostHibernation,
}

/// Mutable state threaded through the scan
#[derive(Debug)]
pub struct ScanContext {
    pub phase: Phase,
    /// Samples of the event currently being built
    pub buffer: Vec<Sample>,
    /// Representative temperature of the last closed transition
    pub reference: Option<f64>,
    /// Exclusion window, cleared once the scan has passed its end
    pub exclusion: Option<ExclusionWindow>,
    pub result: HibernationResult,
}

impl ScanContext {
    pub fn new(result: HibernationResult, exclusion: Option<ExclusionWindow>) -> Self {
        Self {
            phase: Phase::PreHibernation,
            buffer: Vec::new(),
            reference: None,
            exclusion,
            result,
        }
    }

    fn push(&mut self, reading: Reading) {
        self.buffer.push(Sample::Present(reading));
    }

    /// Record the open buffer as `category` and start a new one
    fn flush(&mut self, category: EventCategory) {
        let buffer = std::mem::take(&mut self.buffer);
        match self.result.events.record(category, &buffer) {
            Some(number) => debug!(
                category = category.as_str(),
                number,
                samples = buffer.len(),
                "event closed"
            ),
            None if !buffer.is_empty() => warn!(
                category = category.as_str(),
                samples = buffer.len(),
                "event overlaps the exclusion window, discarded"
            ),
            None => {}
        }
    }

    /// Flush as `category` and move the reference temperature
    fn close(&mut self, category: EventCategory, reference: f64) {
        self.flush(category);
        self.reference = Some(reference);
    }

    fn terminate(&mut self, status: TerminalStatus, hib_end: Reading) {
        self.result.hib_end = Some(hib_end);
        self.result.status = Some(status);
    }
}

enum Step {
    Continue,
    Stop,
}

/// Forward-scan classifier for one subject
pub struct SegmentationEngine<'a> {
    params: &'a SubjectParams,
    windows: DiscriminationWindows,
    interval: SamplingInterval,
}

impl<'a> SegmentationEngine<'a> {
    pub fn new(
        params: &'a SubjectParams,
        windows: DiscriminationWindows,
        interval: SamplingInterval,
    ) -> Self {
        Self {
            params,
            windows,
            interval,
        }
    }

    /// Segment a series into event instances
    pub fn segment(&self, series: &SampleSeries) -> Result<HibernationResult, AnalysisError> {
        series.validate()?;
        let mut result = HibernationResult::new(
            self.params.id.clone(),
            self.params.group.clone(),
            self.interval,
        );
        let thresholds = self.params.thresholds;

        // Never cooled below the hib-start temperature
        if series
            .temperatures
            .iter()
            .all(|&t| t > thresholds.hib_start_tmp)
        {
            let whole: Vec<Sample> = (0..series.len())
                .filter_map(|i| series.reading(i).map(Sample::Present))
                .collect();
            result.events.record(EventCategory::PreHibernation, &whole);
            result.status = Some(TerminalStatus::Unhibernating);
            info!(id = %self.params.id, "series never crosses the hib-start temperature");
            return Ok(result);
        }

        let start = locate_start(&series.timestamps, self.params.prehib_start_time)?;
        let temps = &series.temperatures[start..];
        let times = &series.timestamps[start..];

        let hib_end_time = match self.params.hib_end_time {
            Some(instant) => Some(locate_end(times, instant)?),
            None => None,
        };

        let mut scan = Scan {
            temps,
            times,
            thresholds,
            windows: self.windows,
            run_length: self.interval.minutes.max(0) as usize,
            post_hibernation_len: (self.interval.minutes.max(0) * 24 * POST_HIBERNATION_DAYS)
                as usize,
            hib_end_time,
            ctx: ScanContext::new(result, self.params.exclusion),
        };

        for i in 0..temps.len() {
            if let Step::Stop = scan.step(i) {
                break;
            }
        }

        Ok(scan.ctx.result)
    }
}

/// Index of the latest sample at or before `instant`, or 0 if `instant`
/// precedes the data.
pub fn locate_start(
    timestamps: &[NaiveDateTime],
    instant: NaiveDateTime,
) -> Result<usize, AnalysisError> {
    timestamps
        .iter()
        .position(|&t| t > instant)
        .map(|i| i.saturating_sub(1))
        .ok_or_else(|| {
            AnalysisError::NotFound(format!("pre-hibernation start {} is after the data", instant))
        })
}

/// Latest timestamp at or before `instant`, scanning backward.
///
/// The first two samples are never candidates, so an instant before the third
/// sample is not found.
pub fn locate_end(
    timestamps: &[NaiveDateTime],
    instant: NaiveDateTime,
) -> Result<NaiveDateTime, AnalysisError> {
    (2..timestamps.len())
        .rev()
        .map(|i| timestamps[i])
        .find(|&t| t <= instant)
        .ok_or_else(|| {
            AnalysisError::NotFound(format!("hibernation end {} is before the data", instant))
        })
}

struct Scan<'s> {
    temps: &'s [f64],
    times: &'s [NaiveDateTime],
    thresholds: Thresholds,
    windows: DiscriminationWindows,
    /// Consecutive normothermic samples that reject a hibernation end
    run_length: usize,
    post_hibernation_len: usize,
    hib_end_time: Option<NaiveDateTime>,
    ctx: ScanContext,
}

impl Scan<'_> {
    fn reading(&self, i: usize) -> Reading {
        Reading {
            timestamp: self.times[i],
            temperature: self.temps[i],
        }
    }

    fn step(&mut self, i: usize) -> Step {
        let reading = self.reading(i);

        if let Some(window) = self.ctx.exclusion {
            if window.contains(reading.timestamp) {
                self.ctx.buffer.push(Sample::Excluded);
                return Step::Continue;
            }
            if reading.timestamp >= window.end {
                debug!(at = %reading.timestamp, "exclusion window passed");
                self.ctx.exclusion = None;
            }
        }

        if i == 0 {
            self.ctx.push(reading);
            return Step::Continue;
        }

        if self.hib_end_time == Some(reading.timestamp) {
            info!(at = %reading.timestamp, "configured hibernation end reached");
            self.ctx.result.hib_end = Some(reading);
            return Step::Stop;
        }

        match self.ctx.phase {
            Phase::PostHibernation => {
                self.post_hibernation(i);
                Step::Stop
            }
            Phase::PreHibernation => {
                self.pre_hibernation(i, reading);
                Step::Continue
            }
            // hib_end is only ever set when leaving this phase
            Phase::TorporCycle => {
                let t = reading.temperature;
                if t < self.thresholds.lower {
                    self.torpid(i, reading)
                } else if t >= self.thresholds.upper {
                    self.hyperthermic(i, reading)
                } else {
                    self.normothermic(i, reading)
                }
            }
        }
    }

    fn pre_hibernation(&mut self, i: usize, reading: Reading) {
        self.ctx.push(reading);
        if !is_hib_start(self.temps, i, &self.thresholds, self.windows.hib_start) {
            return;
        }

        let marker = self.reading(i + 1);
        debug!(at = %marker.timestamp, temperature = marker.temperature, "hibernation start confirmed");
        self.ctx.result.hib_start = Some(marker);
        self.ctx.reference = Some(self.start_reference(i));
        self.ctx.flush(EventCategory::PreHibernation);
        self.ctx.phase = Phase::TorporCycle;
    }

    /// Reference temperature at hibernation start.
    ///
    /// With a hib-start temperature below the upper threshold this is the most
    /// recent warm sample; otherwise (or if there is none) the confirming sample.
    fn start_reference(&self, i: usize) -> f64 {
        if self.thresholds.hib_start_tmp < self.thresholds.upper {
            if let Some(k) = self.temps[..=i]
                .iter()
                .rposition(|&t| t >= self.thresholds.upper)
            {
                return self.temps[k];
            }
        }
        self.temps[i]
    }

    fn post_hibernation(&mut self, i: usize) {
        let end = (i + self.post_hibernation_len).min(self.temps.len());
        self.ctx.buffer = (i..end).map(|k| Sample::Present(self.reading(k))).collect();
        self.ctx.flush(EventCategory::PostHibernation);
    }

    fn normothermic(&mut self, i: usize, reading: Reading) -> Step {
        let entering = !self.thresholds.is_normothermic(self.temps[i - 1]);
        if entering && is_instrument_removed(self.temps, i, &self.thresholds) {
            info!(at = %reading.timestamp, "data logger removed");
            let hib_end = self.reading(i - 1);
            self.ctx.terminate(TerminalStatus::Dissection, hib_end);
            return Step::Stop;
        }
        self.ctx.push(reading);
        Step::Continue
    }

    fn torpid(&mut self, i: usize, reading: Reading) -> Step {
        let th = self.thresholds;

        if is_dead(self.temps, i, &th, self.windows.dead) {
            let end = coldest_offset(self.temps, i, self.windows.dead);
            info!(at = %reading.timestamp, "death confirmed");
            for k in i..i + end {
                let r = self.reading(k);
                self.ctx.push(r);
            }
            let hib_end = self.reading(i - 1);
            self.ctx.flush(EventCategory::DeepTorpor);
            self.ctx.terminate(TerminalStatus::Dead, hib_end);
            return Step::Stop;
        }

        let previous = self.temps[i - 1];
        match self.ctx.reference {
            Some(r) if r >= th.upper => self.ctx.close(EventCategory::Cooling, previous),
            Some(r) if r < th.lower => self.ctx.close(EventCategory::ArousalPending, previous),
            _ => {}
        }

        self.ctx.push(reading);
        if self.temps.get(i + 1).is_some_and(|&next| next >= th.lower) {
            self.ctx.close(EventCategory::DeepTorpor, reading.temperature);
        }
        Step::Continue
    }

    fn hyperthermic(&mut self, i: usize, reading: Reading) -> Step {
        let th = self.thresholds;

        let previous = self.temps[i - 1];
        match self.ctx.reference {
            Some(r) if r >= th.upper => self.ctx.close(EventCategory::ShallowTorpor, previous),
            Some(r) if r < th.lower => self.ctx.close(EventCategory::Rewarming, previous),
            _ => {}
        }

        // Refractory end keeps scanning; the next sample opens post-hibernation
        if is_hib_end(self.temps, i, &th, self.windows.hib_end, self.run_length) {
            info!(at = %reading.timestamp, "hibernation ended, refractory");
            let hib_end = self.reading(i - 1);
            self.ctx.terminate(TerminalStatus::Refractory, hib_end);
            self.ctx.phase = Phase::PostHibernation;
            return Step::Continue;
        }

        self.ctx.push(reading);
        if self.temps.get(i + 1).is_some_and(|&next| next < th.upper) {
            self.ctx.close(EventCategory::PeriodicArousal, reading.temperature);
        }
        Step::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::DiscriminationMinutes;
    use chrono::{Duration, NaiveDate};
    use pretty_assertions::assert_eq;

    const INTERVAL_MIN: i64 = 2;

    fn ts(index: usize) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            + Duration::minutes(INTERVAL_MIN * index as i64)
    }

    fn series(temps: &[f64]) -> SampleSeries {
        SampleSeries::new(temps.to_vec(), (0..temps.len()).map(ts).collect()).unwrap()
    }

    fn params() -> SubjectParams {
        SubjectParams {
            id: "H01".to_string(),
            group: "control".to_string(),
            prehib_start_time: ts(0),
            hib_end_time: None,
            exclusion: None,
            thresholds: Thresholds {
                hib_start_tmp: 25.0,
                upper: 30.0,
                lower: 20.0,
                prehib_low_tb: 32.0,
            },
            discrimination: DiscriminationMinutes {
                hib_start: 6,
                hib_end: 40,
                dead: 12,
                pa: 8,
            },
        }
    }

    fn segment(params: &SubjectParams, temps: &[f64]) -> Result<HibernationResult, AnalysisError> {
        let interval = SamplingInterval::from_seconds(INTERVAL_MIN * 60);
        let windows = params.windows(&interval)?;
        SegmentationEngine::new(params, windows, interval).segment(&series(temps))
    }

    fn span(instance: &crate::types::EventInstance) -> (NaiveDateTime, NaiveDateTime) {
        (
            instance.first().unwrap().timestamp,
            instance.last().unwrap().timestamp,
        )
    }

    /// Cooling, one torpor bout, an arousal with a shallow-torpor plateau,
    /// a second arousal, then death.
    fn full_cycle() -> Vec<f64> {
        vec![
            36.0, 35.0, 24.0, 15.0, 10.0, 10.0, 12.0, 22.0, 36.0, 36.0, 25.0, 25.0, 36.0, 36.0,
            28.0, 28.0, 15.0, 12.0, 9.0, 8.0, 8.5, 9.0, 9.0, 9.0,
        ]
    }

    #[test]
    fn test_unhibernating_series() {
        let temps = [36.0, 35.5, 36.2, 37.0];
        let result = segment(&params(), &temps).unwrap();
        assert_eq!(result.status, Some(TerminalStatus::Unhibernating));
        assert_eq!(result.events.pre_hibernation.len(), 1);
        assert_eq!(result.events.pre_hibernation[0].temperatures, temps.to_vec());
        assert!(result.hib_start.is_none());
    }

    #[test]
    fn test_hib_start_marker_is_next_sample() {
        let mut p = params();
        p.discrimination = DiscriminationMinutes {
            hib_start: 30,
            hib_end: 600,
            dead: 60,
            pa: 40,
        };
        let interval = SamplingInterval::from_seconds(600);
        let windows = p.windows(&interval).unwrap();
        assert_eq!(windows.hib_start, 3);

        let temps = [26.0, 24.0, 23.0, 22.0, 21.0, 20.0, 19.0, 19.0];
        let timestamps = (0..temps.len())
            .map(|i| ts(0) + Duration::minutes(10 * i as i64))
            .collect();
        let s = SampleSeries::new(temps.to_vec(), timestamps).unwrap();
        let result = SegmentationEngine::new(&p, windows, interval).segment(&s).unwrap();

        let marker = result.hib_start.unwrap();
        assert_eq!(marker.temperature, 23.0);
        assert_eq!(marker.timestamp, ts(0) + Duration::minutes(20));
        assert_eq!(result.events.pre_hibernation[0].temperatures, vec![26.0, 24.0]);
    }

    #[test]
    fn test_full_cycle_events() {
        let result = segment(&params(), &full_cycle()).unwrap();
        let ev = &result.events;

        assert_eq!(result.hib_start.unwrap().timestamp, ts(2));
        assert_eq!(ev.pre_hibernation[0].temperatures, vec![36.0, 35.0]);
        assert_eq!(ev.cooling.len(), 1);
        assert_eq!(span(&ev.cooling[0]), (ts(2), ts(2)));
        assert_eq!(ev.rewarming.len(), 1);
        assert_eq!(span(&ev.rewarming[0]), (ts(7), ts(7)));
        assert_eq!(ev.periodic_arousal.len(), 2);
        assert_eq!(span(&ev.periodic_arousal[0]), (ts(8), ts(9)));
        assert_eq!(span(&ev.periodic_arousal[1]), (ts(12), ts(13)));
        assert_eq!(ev.shallow_torpor.len(), 1);
        assert_eq!(span(&ev.shallow_torpor[0]), (ts(10), ts(11)));
        assert!(ev.arousal_pending.is_empty());
        assert!(ev.post_hibernation.is_empty());

        assert_eq!(ev.deep_torpor.len(), 2);
        assert_eq!(ev.deep_torpor[0].temperatures, vec![15.0, 10.0, 10.0, 12.0]);
    }

    #[test]
    fn test_death_ends_before_coldest_sample() {
        let result = segment(&params(), &full_cycle()).unwrap();
        assert_eq!(result.status, Some(TerminalStatus::Dead));

        let hib_end = result.hib_end.unwrap();
        assert_eq!(hib_end.timestamp, ts(15));
        assert_eq!(hib_end.temperature, 28.0);

        // coldest sample of the death window is index 19 (8.0)
        let dt = &result.events.deep_torpor[1];
        assert_eq!(dt.temperatures, vec![28.0, 28.0, 15.0, 12.0, 9.0]);
        assert_eq!(dt.last().unwrap().timestamp, ts(18));
    }

    #[test]
    fn test_instrument_removal() {
        let temps = [36.0, 35.0, 24.0, 15.0, 10.0, 22.0, 23.0, 22.0, 24.0];
        let result = segment(&params(), &temps).unwrap();
        assert_eq!(result.status, Some(TerminalStatus::Dissection));
        let hib_end = result.hib_end.unwrap();
        assert_eq!(hib_end.timestamp, ts(4));
        assert_eq!(hib_end.temperature, 10.0);
        assert_eq!(result.events.deep_torpor[0].temperatures, vec![15.0, 10.0]);
    }

    #[test]
    fn test_arousal_pending_between_bouts() {
        let temps = [
            36.0, 35.0, 24.0, 15.0, 10.0, 21.0, 22.0, 12.0, 11.0, 25.0, 31.0, 36.0, 25.0, 36.0,
            25.0, 25.0, 36.0,
        ];
        let result = segment(&params(), &temps).unwrap();
        let ev = &result.events;
        assert_eq!(ev.arousal_pending.len(), 1);
        assert_eq!(ev.arousal_pending[0].temperatures, vec![21.0, 22.0]);
        assert_eq!(ev.deep_torpor.len(), 2);
        assert_eq!(ev.deep_torpor[1].temperatures, vec![12.0, 11.0]);
        assert_eq!(ev.rewarming.len(), 1);
        assert_eq!(ev.rewarming[0].temperatures, vec![25.0]);
    }

    #[test]
    fn test_refractory_then_post_hibernation() {
        let mut temps = vec![36.0, 35.0, 24.0, 15.0, 10.0, 10.0, 12.0, 22.0, 36.0];
        temps.extend(std::iter::repeat(37.0).take(10));
        let result = segment(&params(), &temps).unwrap();

        assert_eq!(result.status, Some(TerminalStatus::Refractory));
        assert_eq!(result.hib_end.unwrap().timestamp, ts(7));
        assert!(result.events.periodic_arousal.is_empty());
        assert_eq!(result.events.post_hibernation.len(), 1);
        assert_eq!(span(&result.events.post_hibernation[0]), (ts(9), ts(18)));
    }

    #[test]
    fn test_exclusion_window_discards_spanning_events() {
        let mut p = params();
        p.exclusion = Some(ExclusionWindow {
            start: ts(5),
            end: ts(8),
        });
        let result = segment(&p, &full_cycle()).unwrap();
        let ev = &result.events;

        for category in EventCategory::ALL {
            for instance in ev.get(category) {
                for excluded in 5..8 {
                    assert!(!instance.timestamps.contains(&ts(excluded)));
                }
            }
        }
        // the first bout and arousal touched the window
        assert!(ev.rewarming.is_empty());
        assert_eq!(ev.deep_torpor.len(), 1);
        assert_eq!(ev.periodic_arousal.len(), 1);
        assert_eq!(span(&ev.periodic_arousal[0]), (ts(12), ts(13)));
        assert_eq!(span(&ev.shallow_torpor[0]), (ts(10), ts(11)));
        assert_eq!(result.status, Some(TerminalStatus::Dead));
    }

    #[test]
    fn test_configured_hib_end_stops_scan() {
        let mut p = params();
        p.hib_end_time = Some(ts(9) + Duration::seconds(30));
        let result = segment(&p, &full_cycle()).unwrap();
        assert_eq!(result.status, None);
        assert_eq!(result.hib_end.unwrap().timestamp, ts(9));
        // the arousal in progress is never closed
        assert!(result.events.periodic_arousal.is_empty());
        assert_eq!(result.events.rewarming.len(), 1);
    }

    #[test]
    fn test_start_truncation() {
        let mut p = params();
        p.prehib_start_time = ts(1) + Duration::seconds(30);
        let result = segment(&p, &full_cycle()).unwrap();
        assert_eq!(
            result.events.pre_hibernation[0].first().unwrap().timestamp,
            ts(1)
        );
    }

    #[test]
    fn test_start_after_data_not_found() {
        let mut p = params();
        p.prehib_start_time = ts(100);
        let err = segment(&p, &full_cycle()).unwrap_err();
        assert!(matches!(err, AnalysisError::NotFound(_)));
    }

    #[test]
    fn test_end_before_data_not_found() {
        let mut p = params();
        p.hib_end_time = Some(ts(0) - Duration::days(1));
        let err = segment(&p, &full_cycle()).unwrap_err();
        assert!(matches!(err, AnalysisError::NotFound(_)));
    }

    #[test]
    fn test_locate_end_skips_first_two_samples() {
        let times: Vec<_> = (0..4).map(ts).collect();
        assert_eq!(locate_end(&times, ts(2)).unwrap(), ts(2));
        assert_eq!(locate_end(&times, ts(9)).unwrap(), ts(3));
        assert!(matches!(
            locate_end(&times, ts(1) + Duration::seconds(30)),
            Err(AnalysisError::NotFound(_))
        ));
    }

    #[test]
    fn test_mismatched_series_rejected() {
        let p = params();
        let interval = SamplingInterval::from_seconds(INTERVAL_MIN * 60);
        let windows = p.windows(&interval).unwrap();
        let s = SampleSeries {
            temperatures: vec![36.0, 35.0, 24.0, 15.0],
            timestamps: (0..3).map(ts).collect(),
        };
        let err = SegmentationEngine::new(&p, windows, interval)
            .segment(&s)
            .unwrap_err();
        assert!(matches!(err, AnalysisError::InvalidSeries(_)));
    }

    #[test]
    fn test_high_hib_start_tmp_uses_confirming_sample() {
        let mut p = params();
        p.thresholds.hib_start_tmp = 32.0;
        let temps = [
            36.0, 29.5, 29.0, 28.0, 24.0, 15.0, 10.0, 12.0, 25.0, 36.0, 36.0, 25.0, 25.0, 36.0,
        ];
        let result = segment(&p, &temps).unwrap();
        let ev = &result.events;

        let marker = result.hib_start.unwrap();
        assert_eq!(marker.timestamp, ts(2));
        assert_eq!(marker.temperature, 29.0);
        assert_eq!(ev.pre_hibernation[0].temperatures, vec![36.0, 29.5]);

        // reference 29.5 is neither warm nor torpid, so the descent is not Cooling
        assert!(ev.cooling.is_empty());
        assert_eq!(
            ev.deep_torpor[0].temperatures,
            vec![29.0, 28.0, 24.0, 15.0, 10.0, 12.0]
        );
        assert_eq!(ev.rewarming[0].temperatures, vec![25.0]);
        assert_eq!(span(&ev.periodic_arousal[0]), (ts(9), ts(10)));
        assert_eq!(ev.shallow_torpor[0].temperatures, vec![25.0, 25.0]);
        assert_eq!(result.status, Some(TerminalStatus::Refractory));
        assert_eq!(result.hib_end.unwrap().timestamp, ts(12));
    }

    #[test]
    fn test_locate_start_before_data() {
        let times: Vec<_> = (0..4).map(ts).collect();
        assert_eq!(locate_start(&times, ts(0) - Duration::hours(1)).unwrap(), 0);
        assert_eq!(locate_start(&times, ts(2)).unwrap(), 2);
    }

    #[test]
    fn test_events_do_not_overlap() {
        let result = segment(&params(), &full_cycle()).unwrap();
        for category in EventCategory::ALL {
            let instances = result.events.get(category);
            for pair in instances.windows(2) {
                assert!(pair[0].last().unwrap().timestamp < pair[1].first().unwrap().timestamp);
            }
        }
    }
}
