//! Grouping by location label.

use ahash::AHashMap;
use tracing::debug;

use crate::sequence::naming::{NameRegistry, RawGroups, Setting, normalize_name};
use crate::shot::Shot;

/// Bucket for unlabeled shots with no usable context.
pub const LOCATION_UNKNOWN: &str = "location_unknown";

/// Group key for one shot: its normalized label, or an
/// `indoor_unknown` / `outdoor_unknown` / `location_unknown` bucket.
pub fn location_key(shot: &Shot) -> String {
    if let Some(label) = shot.location_label() {
        let normalized = normalize_name(label);
        if !normalized.is_empty() {
            return normalized;
        }
    }
    match Setting::of_shot(shot) {
        Some(setting) => format!("{}_unknown", setting.as_str()),
        None => LOCATION_UNKNOWN.to_string(),
    }
}

/// One group per location key, in order of first appearance. Shots keep
/// their input order within a group.
pub fn group_by_location(shots: &[Shot]) -> RawGroups {
    let mut groups: RawGroups = Vec::new();
    let mut slots: AHashMap<String, usize> = AHashMap::new();

    for shot in shots {
        let key = location_key(shot);
        match slots.get(&key) {
            Some(&slot) => groups[slot].1.push(shot.clone()),
            None => {
                slots.insert(key.clone(), groups.len());
                groups.push((key, vec![shot.clone()]));
            }
        }
    }

    let mut names = NameRegistry::new();
    let groups: RawGroups = groups
        .into_iter()
        .map(|(key, shots)| (names.claim(&key), shots))
        .collect();

    debug!(groups = groups.len(), "location grouping");
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shot::VisualDescriptors;

    #[test]
    fn test_location_key_fallbacks() {
        let labeled = Shot::builder(1, "s").location("Interview Room").build();
        assert_eq!(location_key(&labeled), "interview_room");

        let indoor = Shot::builder(2, "s").context("Interior of a school gym").build();
        assert_eq!(location_key(&indoor), "indoor_unknown");

        let outdoor = Shot::builder(3, "s")
            .visual(VisualDescriptors {
                composition: Some("exterior wide".into()),
                ..Default::default()
            })
            .build();
        assert_eq!(location_key(&outdoor), "outdoor_unknown");

        let symbols = Shot::builder(4, "s").location("???").build();
        assert_eq!(location_key(&symbols), LOCATION_UNKNOWN);
    }

    #[test]
    fn test_groups_keep_first_appearance_order() {
        let shots = vec![
            Shot::builder(1, "s").location("Plaza").build(),
            Shot::builder(2, "s").location("Court").build(),
            Shot::builder(3, "s").location("plaza").build(),
            Shot::builder(4, "s").build(),
        ];
        let groups = group_by_location(&shots);
        let summary: Vec<(&str, Vec<u64>)> = groups
            .iter()
            .map(|(name, shots)| (name.as_str(), shots.iter().map(|s| s.id).collect()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("plaza", vec![1, 3]),
                ("court", vec![2]),
                ("location_unknown", vec![4]),
            ]
        );
    }

    #[test]
    fn test_miscellaneous_label_is_renamed() {
        let shots = vec![Shot::builder(1, "s").location("Miscellaneous").build()];
        let groups = group_by_location(&shots);
        assert_eq!(groups[0].0, "miscellaneous_2");
    }
}
