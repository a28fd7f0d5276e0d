//! Density-based clustering over a precomputed distance matrix.
//!
//! Point `p`'s neighborhood is every point within `eps` of it, `p` included.
//! A point with at least `min_samples` neighbors is a core point. Clusters
//! grow breadth-first from the lowest-index unassigned core point; border
//! points join the first cluster that reaches them and everything else is
//! noise. The result depends only on point order, never on hashing.

use std::collections::VecDeque;

/// Slack added to `eps` so points sitting exactly on the radius are
/// neighbors despite float rounding.
pub const EPS_TOLERANCE: f32 = 1e-6;

/// Cluster label per point; `None` marks noise. Labels count from 0 in
/// order of discovery.
pub fn dbscan(distances: &[Vec<f32>], eps: f32, min_samples: usize) -> Vec<Option<usize>> {
    let n = distances.len();
    let radius = eps + EPS_TOLERANCE;

    let neighborhoods: Vec<Vec<usize>> = distances
        .iter()
        .map(|row| {
            row.iter()
                .enumerate()
                .filter(|&(_, &d)| d <= radius)
                .map(|(q, _)| q)
                .collect()
        })
        .collect();
    let is_core: Vec<bool> = neighborhoods
        .iter()
        .map(|neighbors| neighbors.len() >= min_samples)
        .collect();

    let mut labels = vec![None; n];
    let mut next_label = 0;
    let mut queue = VecDeque::new();

    for seed in 0..n {
        if labels[seed].is_some() || !is_core[seed] {
            continue;
        }
        let label = next_label;
        next_label += 1;

        labels[seed] = Some(label);
        queue.push_back(seed);
        while let Some(point) = queue.pop_front() {
            if !is_core[point] {
                continue;
            }
            for &neighbor in &neighborhoods[point] {
                if labels[neighbor].is_none() {
                    labels[neighbor] = Some(label);
                    queue.push_back(neighbor);
                }
            }
        }
    }

    labels
}
