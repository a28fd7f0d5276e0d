//! Grouping by visual-embedding similarity.

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::sequence::dbscan::dbscan;
use crate::sequence::naming::RawGroups;
use crate::shot::Shot;
use crate::vector::similarity;

/// Group name for shots that belong to no visual cluster.
pub const VISUAL_OUTLIERS: &str = "visual_outliers";
/// Group name used when too few shots carry an embedding to cluster.
pub const VISUAL_SEQUENCE: &str = "visual_sequence_1";

/// Matrices with fewer rows are filled on the calling thread.
const PARALLEL_ROWS_THRESHOLD: usize = 64;

/// Pairwise cosine distance matrix, entries clamped to `[0, 2]`.
pub fn distance_matrix(embeddings: &[&[f32]]) -> Vec<Vec<f32>> {
    let units: Vec<Vec<f32>> = embeddings.iter().map(|e| similarity::normalized(e)).collect();
    let row = |a: &Vec<f32>| -> Vec<f32> {
        units
            .iter()
            .map(|b| (1.0 - similarity::unit_similarity(a, b)).clamp(0.0, 2.0))
            .collect()
    };

    if units.len() < PARALLEL_ROWS_THRESHOLD {
        units.iter().map(row).collect()
    } else {
        units.par_iter().map(row).collect()
    }
}

/// Cluster shots by visual embedding.
///
/// Only embeddings sharing the dimension of the first one take part; other
/// shots, and shots without an embedding, go to [`VISUAL_OUTLIERS`]. With
/// fewer than two usable embeddings the whole input becomes a single
/// [`VISUAL_SEQUENCE`] group.
pub fn group_by_visual(shots: &[Shot], similarity_threshold: f32, min_samples: usize) -> RawGroups {
    if shots.is_empty() {
        return Vec::new();
    }

    let dimension = shots
        .iter()
        .find_map(|shot| shot.visual_embedding.as_ref().map(Vec::len));
    let mut clustered: Vec<&Shot> = Vec::new();
    let mut outliers: Vec<Shot> = Vec::new();
    for shot in shots {
        match &shot.visual_embedding {
            Some(embedding) if Some(embedding.len()) == dimension => clustered.push(shot),
            _ => outliers.push(shot.clone()),
        }
    }

    if clustered.len() < 2 {
        warn!(
            shots = shots.len(),
            with_embeddings = clustered.len(),
            "not enough visual embeddings to cluster"
        );
        return vec![(VISUAL_SEQUENCE.to_string(), shots.to_vec())];
    }

    let embeddings: Vec<&[f32]> = clustered
        .iter()
        .filter_map(|shot| shot.visual_embedding.as_deref())
        .collect();
    let distances = distance_matrix(&embeddings);
    let labels = dbscan(&distances, 1.0 - similarity_threshold, min_samples);

    let cluster_count = labels.iter().flatten().max().map_or(0, |&max| max + 1);
    let mut clusters: Vec<Vec<Shot>> = vec![Vec::new(); cluster_count];
    let mut noise: Vec<Shot> = Vec::new();
    for (shot, label) in clustered.into_iter().zip(labels) {
        match label {
            Some(label) => clusters[label].push(shot.clone()),
            None => noise.push(shot.clone()),
        }
    }
    noise.extend(outliers);

    let mut groups: RawGroups = clusters
        .into_iter()
        .enumerate()
        .map(|(i, members)| (format!("visual_cluster_{}", i + 1), members))
        .collect();
    if !noise.is_empty() {
        groups.push((VISUAL_OUTLIERS.to_string(), noise));
    }

    debug!(clusters = cluster_count, groups = groups.len(), "visual grouping");
    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shot(id: u64, embedding: Option<Vec<f32>>) -> Shot {
        let builder = Shot::builder(id, "s");
        match embedding {
            Some(embedding) => builder.visual_embedding(embedding).build(),
            None => builder.build(),
        }
    }

    fn summary(groups: &RawGroups) -> Vec<(String, Vec<u64>)> {
        groups
            .iter()
            .map(|(name, shots)| (name.clone(), shots.iter().map(|s| s.id).collect()))
            .collect()
    }

    #[test]
    fn test_distance_matrix() {
        let a = vec![1.0, 0.0];
        let b = vec![0.0, 1.0];
        let c = vec![-1.0, 0.0];
        let matrix = distance_matrix(&[&a[..], &b[..], &c[..]]);
        assert!(matrix[0][0].abs() < 1e-6);
        assert!((matrix[0][1] - 1.0).abs() < 1e-6);
        assert!((matrix[0][2] - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_clusters_and_outliers() {
        let shots = vec![
            shot(1, Some(vec![1.0, 0.0, 0.0])),
            shot(2, Some(vec![0.0, 1.0, 0.0])),
            shot(3, Some(vec![0.99, 0.05, 0.0])),
            shot(4, Some(vec![0.02, 0.98, 0.0])),
            shot(5, Some(vec![0.0, 0.0, 1.0])),
            shot(6, None),
        ];
        let groups = group_by_visual(&shots, 0.7, 2);
        assert_eq!(
            summary(&groups),
            vec![
                ("visual_cluster_1".to_string(), vec![1, 3]),
                ("visual_cluster_2".to_string(), vec![2, 4]),
                ("visual_outliers".to_string(), vec![5, 6]),
            ]
        );
    }

    #[test]
    fn test_degenerate_case_keeps_everything() {
        let shots = vec![shot(1, Some(vec![1.0, 0.0])), shot(2, None), shot(3, None)];
        let groups = group_by_visual(&shots, 0.7, 2);
        assert_eq!(summary(&groups), vec![(VISUAL_SEQUENCE.to_string(), vec![1, 2, 3])]);
        assert!(group_by_visual(&[], 0.7, 2).is_empty());
    }

    #[test]
    fn test_mismatched_dimension_is_outlier() {
        let shots = vec![
            shot(1, Some(vec![1.0, 0.0])),
            shot(2, Some(vec![1.0, 0.0, 0.0])),
            shot(3, Some(vec![1.0, 0.01])),
        ];
        let groups = group_by_visual(&shots, 0.7, 2);
        assert_eq!(
            summary(&groups),
            vec![
                ("visual_cluster_1".to_string(), vec![1, 3]),
                ("visual_outliers".to_string(), vec![2]),
            ]
        );
    }
}
