//! Grouping by gaps in capture time.

use ahash::AHashMap;
use tracing::debug;

use crate::sequence::naming::{NameRegistry, RawGroups, Setting, normalize_name};
use crate::shot::Shot;

/// Shots sorted by `(capture_ts, id)`.
pub fn sort_by_capture(shots: &[Shot]) -> Vec<Shot> {
    let mut sorted = shots.to_vec();
    sorted.sort_by(|a, b| {
        a.capture_ts
            .total_cmp(&b.capture_ts)
            .then_with(|| a.id.cmp(&b.id))
    });
    sorted
}

/// Most frequent normalized location label in `run`; ties go to the label
/// seen first.
fn dominant_location(run: &[Shot]) -> Option<String> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    let mut slots: AHashMap<String, usize> = AHashMap::new();
    for label in run
        .iter()
        .filter_map(Shot::location_label)
        .map(normalize_name)
        .filter(|label| !label.is_empty())
    {
        match slots.get(&label) {
            Some(&slot) => counts[slot].1 += 1,
            None => {
                slots.insert(label.clone(), counts.len());
                counts.push((label, 1));
            }
        }
    }

    let mut best: Option<(String, usize)> = None;
    for (label, count) in counts {
        if best.as_ref().is_none_or(|(_, top)| count > *top) {
            best = Some((label, count));
        }
    }
    best.map(|(label, _)| label)
}

/// Name for the `number`-th temporal run.
pub fn temporal_run_name(run: &[Shot], number: usize) -> String {
    if let Some(location) = dominant_location(run) {
        return format!("{location}_seq_{number}");
    }
    let context = run
        .iter()
        .map(Shot::context_text)
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    match Setting::detect(&context) {
        Some(setting) => format!("{}_seq_{number}", setting.as_str()),
        None => format!("temporal_seq_{number}"),
    }
}

/// Split the capture-ordered shots wherever the gap to the previous shot
/// is strictly greater than `window_secs`.
pub fn group_by_temporal(shots: &[Shot], window_secs: f64) -> RawGroups {
    let mut runs: Vec<Vec<Shot>> = Vec::new();
    for shot in sort_by_capture(shots) {
        match runs.last_mut() {
            Some(run) if !starts_new_run(run, &shot, window_secs) => run.push(shot),
            _ => runs.push(vec![shot]),
        }
    }

    let mut names = NameRegistry::new();
    let groups: RawGroups = runs
        .into_iter()
        .enumerate()
        .map(|(i, run)| (names.claim(&temporal_run_name(&run, i + 1)), run))
        .collect();

    debug!(groups = groups.len(), window_secs, "temporal grouping");
    groups
}

fn starts_new_run(run: &[Shot], shot: &Shot, window_secs: f64) -> bool {
    run.last()
        .is_some_and(|previous| shot.capture_ts - previous.capture_ts > window_secs)
}
