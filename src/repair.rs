//! Event repair
//!
//! Post-processing applied to a finished segmentation:
//! - Short shallow-torpor fragments right after an arousal are folded back
//!   into that arousal, and arousals that then touch are joined
//! - Low body temperature episodes are extracted from the pre-hibernation event
//!
//! Both passes can be re-run on their own output without changing it.

use chrono::Duration;
use tracing::debug;

use crate::types::{EventCategory, EventInstance, HibernationResult, Sample};

/// Run both repair passes
pub fn repair(result: &mut HibernationResult, max_st_len: usize, low_tb_threshold: f64) {
    merge_short_torpor_into_arousal(result, max_st_len);
    extract_low_body_temperature_events(result, low_tb_threshold);
}

/// Fold short ST fragments into the preceding PA and join adjacent PAs.
///
/// An ST instance is absorbed by a PA when it has fewer than `max_st_len`
/// samples and starts exactly one sampling interval after the PA ends. Each PA
/// absorbs at most one ST. Instance numbers of both categories follow the new
/// order. Returns the number of ST instances absorbed.
pub fn merge_short_torpor_into_arousal(result: &mut HibernationResult, max_st_len: usize) -> usize {
    let step = result.interval.as_duration();
    let events = &mut result.events;

    let mut absorbed = 0;
    let mut arousals = std::mem::take(&mut events.periodic_arousal);
    for pa in arousals.iter_mut() {
        let Some(pa_end) = pa.last() else {
            continue;
        };
        let candidate = events.shallow_torpor.iter().position(|st| {
            st.len() < max_st_len
                && st
                    .first()
                    .is_some_and(|start| start.timestamp - pa_end.timestamp == step)
        });
        if let Some(index) = candidate {
            let st = events.shallow_torpor.remove(index);
            pa.extend(st);
            absorbed += 1;
        }
    }

    let before = arousals.len();
    let mut joined: Vec<EventInstance> = Vec::with_capacity(before);
    for pa in arousals {
        match joined.last_mut() {
            Some(previous) if is_adjacent(previous, &pa, step) => previous.extend(pa),
            _ => joined.push(pa),
        }
    }

    debug!(
        absorbed,
        joined = before - joined.len(),
        remaining = joined.len(),
        "periodic arousals repaired"
    );
    events.periodic_arousal = joined;
    absorbed
}

fn is_adjacent(previous: &EventInstance, next: &EventInstance, step: Duration) -> bool {
    match (previous.last(), next.first()) {
        (Some(end), Some(start)) => end.timestamp + step == start.timestamp,
        _ => false,
    }
}

/// Replace the low body temperature events with the runs found in the
/// pre-hibernation event.
///
/// A run of samples below `threshold` closes when the following sample is back
/// at or above it; this covers isolated single dips as well as longer runs. A
/// run still open at the last sample is not recorded.
pub fn extract_low_body_temperature_events(result: &mut HibernationResult, threshold: f64) {
    result.events.low_body_temperature.clear();
    let Some(prehib) = result.events.pre_hibernation.first() else {
        return;
    };

    let readings: Vec<_> = prehib.readings().collect();
    let mut runs: Vec<Vec<Sample>> = Vec::new();
    let mut run: Vec<Sample> = Vec::new();
    for pair in readings.windows(2) {
        let (current, next) = (pair[0], pair[1]);
        if current.temperature < threshold {
            run.push(Sample::Present(current));
            if next.temperature >= threshold {
                runs.push(std::mem::take(&mut run));
            }
        }
    }

    for run in &runs {
        result
            .events
            .record(EventCategory::LowBodyTemperature, run);
    }
    debug!(count = runs.len(), "low body temperature events extracted");
}
