//! Size filtering applied to every grouping result.
//!
//! Undersized groups dissolve into [`MISCELLANEOUS`]. Oversized groups keep
//! their most relevant members and send the rest there too. The
//! miscellaneous group itself has no size bounds, so no shot is ever lost.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::sequence::config::SequenceConfig;
use crate::sequence::naming::{MISCELLANEOUS, NameRegistry, RawGroups};
use crate::shot::{Shot, ShotId};

/// Split `shots` into the `max` most relevant, in their original order, and
/// the overflow in descending relevance. Ties keep group order.
pub fn trim_group(
    shots: Vec<Shot>,
    max: usize,
    relevance: &HashMap<ShotId, f32>,
) -> (Vec<Shot>, Vec<Shot>) {
    let score = |shot: &Shot| relevance.get(&shot.id).copied().unwrap_or(0.0);

    let mut order: Vec<usize> = (0..shots.len()).collect();
    order.sort_by(|&a, &b| score(&shots[b]).total_cmp(&score(&shots[a])));

    let mut keep = vec![false; shots.len()];
    for &i in order.iter().take(max) {
        keep[i] = true;
    }
    let overflow_order: Vec<usize> = order.into_iter().skip(max).collect();

    let mut slots: Vec<Option<Shot>> = shots.into_iter().map(Some).collect();
    let overflow: Vec<Shot> = overflow_order
        .into_iter()
        .filter_map(|i| slots[i].take())
        .collect();
    let kept: Vec<Shot> = slots
        .into_iter()
        .zip(keep)
        .filter_map(|(slot, keep)| if keep { slot } else { None })
        .collect();

    (kept, overflow)
}

/// Apply the size bounds of `config` to `groups`.
///
/// The result holds the surviving groups in their original order followed
/// by [`MISCELLANEOUS`] when anything was dissolved or trimmed.
pub fn filter_groups(
    groups: RawGroups,
    config: &SequenceConfig,
    relevance: &HashMap<ShotId, f32>,
) -> RawGroups {
    let min = config.min_shots_per_sequence;
    let max = config.max_shots_per_sequence;

    let mut names = NameRegistry::new();
    let mut filtered: RawGroups = Vec::new();
    let mut miscellaneous: Vec<Shot> = Vec::new();

    for (name, shots) in groups {
        if shots.len() < min {
            debug!(sequence = %name, shots = shots.len(), "dissolving undersized sequence");
            miscellaneous.extend(shots);
        } else if shots.len() > max {
            warn!(sequence = %name, from = shots.len(), to = max, "trimming oversized sequence");
            let (kept, overflow) = trim_group(shots, max, relevance);
            filtered.push((names.claim(&name), kept));
            miscellaneous.extend(overflow);
        } else {
            filtered.push((names.claim(&name), shots));
        }
    }

    if !miscellaneous.is_empty() {
        debug!(shots = miscellaneous.len(), "collected miscellaneous sequence");
        filtered.push((MISCELLANEOUS.to_string(), miscellaneous));
    }
    filtered
}
