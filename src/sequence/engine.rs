//! The sequence engine: strategy dispatch, filtering and the result types.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::sequence::config::SequenceConfig;
use crate::sequence::filter::filter_groups;
use crate::sequence::location;
use crate::sequence::metadata::SequenceMetadata;
use crate::sequence::method::GroupingMethod;
use crate::sequence::naming::{MISCELLANEOUS, NameRegistry, RawGroups};
use crate::sequence::temporal;
use crate::sequence::visual;
use crate::shot::{Shot, ShotId};
use crate::working_set::WorkingSet;

/// A named group of shots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sequence {
    pub name: String,
    pub shots: Vec<Shot>,
}

impl Sequence {
    pub fn len(&self) -> usize {
        self.shots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shots.is_empty()
    }

    pub fn is_miscellaneous(&self) -> bool {
        self.name == MISCELLANEOUS
    }

    pub fn ids(&self) -> Vec<ShotId> {
        self.shots.iter().map(|shot| shot.id).collect()
    }

    pub fn metadata(&self) -> SequenceMetadata {
        SequenceMetadata::from_shots(&self.shots)
    }
}

/// Filtered grouping result keyed by sequence name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SequenceSet {
    sequences: BTreeMap<String, Sequence>,
}

impl SequenceSet {
    fn from_groups(groups: RawGroups) -> Self {
        let sequences = groups
            .into_iter()
            .map(|(name, shots)| (name.clone(), Sequence { name, shots }))
            .collect();
        Self { sequences }
    }

    pub fn get(&self, name: &str) -> Option<&Sequence> {
        self.sequences.get(name)
    }

    /// Sequence names in lexicographic order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sequences.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sequence> {
        self.sequences.values()
    }

    /// Number of sequences, `miscellaneous` included.
    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    /// Number of shots across every sequence.
    pub fn total_shots(&self) -> usize {
        self.sequences.values().map(Sequence::len).sum()
    }

    /// The overflow group, when present.
    pub fn miscellaneous(&self) -> Option<&Sequence> {
        self.sequences.get(MISCELLANEOUS)
    }

    pub fn into_map(self) -> BTreeMap<String, Vec<Shot>> {
        self.sequences
            .into_iter()
            .map(|(name, sequence)| (name, sequence.shots))
            .collect()
    }
}

/// Partitions shot collections into size-bounded sequences.
#[derive(Debug, Clone, Default)]
pub struct SequenceEngine {
    config: SequenceConfig,
}

impl SequenceEngine {
    pub fn new(config: SequenceConfig) -> Result<Self> {
        config.validate()?;
        info!(
            temporal_window_secs = config.temporal_window_secs,
            visual_similarity_threshold = config.visual_similarity_threshold,
            "sequence engine initialized"
        );
        Ok(Self { config })
    }

    pub fn config(&self) -> &SequenceConfig {
        &self.config
    }

    /// Group `shots` with `method`. Every shot has relevance 0, so oversized
    /// groups keep their first members.
    pub fn group_by_sequences(
        &self,
        shots: &[Shot],
        method: impl Into<GroupingMethod>,
    ) -> SequenceSet {
        self.group_with_relevance(shots, method, &HashMap::new())
    }

    /// Group a working set, trimming oversized groups by final score.
    pub fn group_working_set(
        &self,
        working_set: &WorkingSet,
        method: impl Into<GroupingMethod>,
    ) -> SequenceSet {
        self.group_with_relevance(&working_set.shots, method, &working_set.relevance_map())
    }

    /// Group `shots` with `method`, trimming oversized groups by `relevance`
    /// (missing ids count as 0).
    pub fn group_with_relevance(
        &self,
        shots: &[Shot],
        method: impl Into<GroupingMethod>,
        relevance: &HashMap<ShotId, f32>,
    ) -> SequenceSet {
        let method = method.into();
        if shots.is_empty() {
            warn!(method = %method, "no shots provided for grouping");
            return SequenceSet::default();
        }
        info!(shots = shots.len(), method = %method, "grouping shots into sequences");

        let groups = self.group_raw(shots, method);
        let set = SequenceSet::from_groups(filter_groups(groups, &self.config, relevance));

        info!(sequences = set.len(), shots = set.total_shots(), "sequences created");
        for sequence in set.iter() {
            debug!(sequence = %sequence.name, shots = sequence.len(), "sequence");
        }
        set
    }

    /// Unfiltered groups for `method`.
    pub fn group_raw(&self, shots: &[Shot], method: GroupingMethod) -> RawGroups {
        match method {
            GroupingMethod::Location => self.group_by_location(shots),
            GroupingMethod::Temporal => self.group_by_temporal(shots),
            GroupingMethod::Visual => self.group_by_visual(shots),
            GroupingMethod::Hybrid => self.group_hybrid(shots),
        }
    }

    pub fn group_by_location(&self, shots: &[Shot]) -> RawGroups {
        location::group_by_location(shots)
    }

    pub fn group_by_temporal(&self, shots: &[Shot]) -> RawGroups {
        temporal::group_by_temporal(shots, self.config.temporal_window_secs)
    }

    pub fn group_by_visual(&self, shots: &[Shot]) -> RawGroups {
        visual::group_by_visual(
            shots,
            self.config.visual_similarity_threshold,
            self.config.min_shots_per_sequence,
        )
    }

    /// Location partitions, split into temporal runs; runs larger than the
    /// maximum are split again visually. Names chain every partition step.
    pub fn group_hybrid(&self, shots: &[Shot]) -> RawGroups {
        let mut names = NameRegistry::new();
        let mut groups: RawGroups = Vec::new();

        for (location_name, location_shots) in self.group_by_location(shots) {
            for (run_name, run) in self.group_by_temporal(&location_shots) {
                if run.len() <= self.config.max_shots_per_sequence {
                    groups.push((names.claim(&format!("{location_name}_{run_name}")), run));
                    continue;
                }
                debug!(
                    location = %location_name,
                    run = %run_name,
                    shots = run.len(),
                    "temporal run too large, applying visual split"
                );
                for (visual_name, members) in self.group_by_visual(&run) {
                    let name = format!("{location_name}_{run_name}_{visual_name}");
                    groups.push((names.claim(&name), members));
                }
            }
        }

        debug!(groups = groups.len(), "hybrid grouping");
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shot(id: u64, ts: f64, location: &str) -> Shot {
        Shot::builder(id, "s")
            .capture_ts(ts)
            .location(location)
            .build()
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(SequenceEngine::new(SequenceConfig::default().with_size_bounds(3, 2)).is_err());
    }

    #[test]
    fn test_empty_input() {
        let engine = SequenceEngine::default();
        for method in GroupingMethod::ALL {
            assert!(engine.group_by_sequences(&[], method).is_empty());
        }
    }

    #[test]
    fn test_hybrid_names_chain_location_and_run() {
        let engine = SequenceEngine::default();
        let shots = vec![
            shot(1, 0.0, "Plaza"),
            shot(2, 30.0, "Plaza"),
            shot(3, 5_000.0, "Plaza"),
            shot(4, 5_030.0, "Plaza"),
        ];
        let set = engine.group_by_sequences(&shots, "hybrid");
        let names: Vec<&str> = set.names().collect();
        assert_eq!(names, vec!["plaza_plaza_seq_1", "plaza_plaza_seq_2"]);
        assert_eq!(set.total_shots(), 4);
        assert!(set.miscellaneous().is_none());
    }

    #[test]
    fn test_hybrid_splits_large_runs_visually() {
        let engine = SequenceEngine::new(SequenceConfig::default().with_size_bounds(2, 3)).unwrap();
        let shots: Vec<Shot> = (1..=6)
            .map(|id| {
                let embedding = if id % 2 == 0 { vec![1.0, 0.0] } else { vec![0.0, 1.0] };
                Shot::builder(id, "s")
                    .capture_ts(id as f64)
                    .location("Hall")
                    .visual_embedding(embedding)
                    .build()
            })
            .collect();

        let groups = engine.group_hybrid(&shots);
        let summary: Vec<(&str, Vec<u64>)> = groups
            .iter()
            .map(|(name, shots)| (name.as_str(), shots.iter().map(|s| s.id).collect()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("hall_hall_seq_1_visual_cluster_1", vec![1, 3, 5]),
                ("hall_hall_seq_1_visual_cluster_2", vec![2, 4, 6]),
            ]
        );
    }

    #[test]
    fn test_unknown_method_falls_back_to_hybrid() {
        let engine = SequenceEngine::default();
        let shots = vec![shot(1, 0.0, "Plaza"), shot(2, 10.0, "Plaza")];
        assert_eq!(
            engine.group_by_sequences(&shots, "nonsense"),
            engine.group_by_sequences(&shots, GroupingMethod::Hybrid)
        );
    }

    #[test]
    fn test_sequence_set_accessors() {
        let engine = SequenceEngine::default();
        let shots = vec![
            shot(1, 0.0, "Plaza"),
            shot(2, 10.0, "Plaza"),
            shot(3, 20.0, "Court"),
        ];
        let set = engine.group_by_sequences(&shots, GroupingMethod::Location);
        assert_eq!(set.get("plaza").map(Sequence::ids), Some(vec![1, 2]));
        assert_eq!(set.miscellaneous().map(Sequence::ids), Some(vec![3]));
        assert!(set.miscellaneous().is_some_and(Sequence::is_miscellaneous));

        let metadata = set.get("plaza").map(Sequence::metadata).unwrap();
        assert_eq!(metadata.shot_count, 2);

        let map = set.into_map();
        assert_eq!(map.len(), 2);
    }
}
