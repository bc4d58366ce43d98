//! Phase predicates
//!
//! Look-ahead tests used by the segmentation scan to confirm a phase change.
//! Window lengths are sample counts, already converted from minutes by the
//! parameter normalizer.

use crate::normalizer::Thresholds;

/// Number of samples available from `index` within a window of `window` samples
fn clipped(len: usize, index: usize, window: usize) -> usize {
    if len > index + window {
        window
    } else {
        len.saturating_sub(index)
    }
}

/// Hibernation start confirmed at `index`.
///
/// Every sample in `index + 1 ..= index + window` must be below the upper
/// threshold (when the hib-start temperature is at or above it) or below the
/// hib-start temperature (when that is the lower of the two). A window that
/// runs past the end of the series does not confirm.
pub fn is_hib_start(temps: &[f64], index: usize, thresholds: &Thresholds, window: usize) -> bool {
    if index + window >= temps.len() {
        return false;
    }
    let hst = thresholds.hib_start_tmp;
    let upper = thresholds.upper;
    temps[index + 1..=index + window]
        .iter()
        .all(|&t| (t < upper && upper <= hst) || (upper > hst && t < hst))
}

/// Hibernation end confirmed at `index`.
///
/// Walks up to `window` samples from `index` counting consecutive
/// normothermic samples; reaching `run_length` in a row before the window is
/// exhausted rejects the end.
pub fn is_hib_end(
    temps: &[f64],
    index: usize,
    thresholds: &Thresholds,
    window: usize,
    run_length: usize,
) -> bool {
    let n = clipped(temps.len(), index, window);
    let mut run = 0;
    for &t in &temps[index..index + n] {
        if run == run_length {
            return false;
        }
        if thresholds.is_normothermic(t) {
            run += 1;
        } else {
            run = 0;
        }
    }
    true
}

/// Death confirmed at `index`: no sample in the (clipped) window reaches the
/// lower threshold.
pub fn is_dead(temps: &[f64], index: usize, thresholds: &Thresholds, window: usize) -> bool {
    let n = clipped(temps.len(), index, window);
    temps[index..index + n].iter().all(|&t| t < thresholds.lower)
}

/// Data logger removed at `index`: every later sample stays normothermic.
pub fn is_instrument_removed(temps: &[f64], index: usize, thresholds: &Thresholds) -> bool {
    temps
        .get(index + 1..)
        .unwrap_or_default()
        .iter()
        .all(|&t| thresholds.is_normothermic(t))
}

/// Offset of the coldest sample in the (clipped) window starting at `index`.
///
/// Temperatures are compared at one decimal so that sensor jitter after the
/// true minimum does not move the result later; ties keep the earliest.
pub fn coldest_offset(temps: &[f64], index: usize, window: usize) -> usize {
    let n = clipped(temps.len(), index, window);
    let mut coldest: Option<(usize, f64)> = None;
    for (offset, &t) in temps[index..index + n].iter().enumerate() {
        let rounded = (t * 10.0).round() / 10.0;
        match coldest {
            Some((_, min)) if min <= rounded => {}
            _ => coldest = Some((offset, rounded)),
        }
    }
    coldest.map(|(offset, _)| offset).unwrap_or(0)
}
