//! HNSW (Hierarchical Navigable Small World) graph for approximate search.
//!
//! Nodes live in a multi-layer graph where each layer holds a random subset
//! of the layer below. A search descends greedily from the top layer to
//! layer 1 and then runs a beam search of width `ef` on layer 0.
//!
//! Distances inside the graph are cosine distances between unit-length
//! copies of the stored vectors. Level assignment uses a seeded RNG, so the
//! same insertion sequence always yields the same graph.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use ahash::{AHashMap, AHashSet};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::Result;
use crate::vector::index::config::{BackendKind, HnswConfig};
use crate::vector::index::{SearchHit, VectorBackend, VectorIndexEntry, rank_hits};
use crate::vector::similarity;

/// A node in the graph.
#[derive(Debug, Clone)]
struct HnswNode {
    entry: VectorIndexEntry,
    /// Unit-length copy of `entry.vector`.
    unit: Vec<f32>,
    /// `links[layer]` lists neighbor node positions on that layer.
    links: Vec<Vec<usize>>,
}

impl HnswNode {
    fn level(&self) -> usize {
        self.links.len() - 1
    }
}

/// Priority queue entry: a node and its distance to the query.
#[derive(Debug, Clone, Copy, PartialEq)]
struct SearchCandidate {
    distance: f32,
    node: usize,
}

impl Eq for SearchCandidate {}

impl PartialOrd for SearchCandidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SearchCandidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then_with(|| self.node.cmp(&other.node))
    }
}

/// Approximate cosine index over an HNSW graph.
#[derive(Debug)]
pub struct HnswIndex {
    dimension: usize,
    config: HnswConfig,
    nodes: Vec<HnswNode>,
    positions: AHashMap<u64, usize>,
    entry_point: Option<usize>,
    max_level: usize,
    /// `1 / ln(m)`.
    level_multiplier: f64,
    rng: StdRng,
}

impl HnswIndex {
    pub fn new(dimension: usize, config: HnswConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            dimension,
            level_multiplier: 1.0 / (config.m as f64).ln(),
            rng: StdRng::seed_from_u64(config.seed),
            config,
            nodes: Vec::new(),
            positions: AHashMap::new(),
            entry_point: None,
            max_level: 0,
        })
    }

    pub fn config(&self) -> &HnswConfig {
        &self.config
    }

    /// Maximum number of links a node keeps on `layer`.
    fn max_links(&self, layer: usize) -> usize {
        if layer == 0 {
            self.config.m * 2
        } else {
            self.config.m
        }
    }

    /// Draw a level from the exponentially decaying distribution.
    fn select_level(&mut self) -> usize {
        // `random` yields [0, 1); flip it so ln never sees 0.
        let uniform: f64 = 1.0 - self.rng.random::<f64>();
        (-uniform.ln() * self.level_multiplier).floor() as usize
    }

    fn distance_to(&self, query: &[f32], node: usize) -> f32 {
        1.0 - similarity::unit_similarity(query, &self.nodes[node].unit)
    }

    /// Beam search on one layer. Returns up to `ef` candidates, closest first.
    fn search_layer(
        &self,
        query: &[f32],
        entry_points: &[usize],
        ef: usize,
        layer: usize,
    ) -> Vec<SearchCandidate> {
        let mut visited = AHashSet::new();
        let mut candidates = BinaryHeap::new();
        let mut results: BinaryHeap<SearchCandidate> = BinaryHeap::new();

        for &node in entry_points {
            if visited.insert(node) {
                let candidate = SearchCandidate {
                    distance: self.distance_to(query, node),
                    node,
                };
                candidates.push(Reverse(candidate));
                results.push(candidate);
            }
        }
        while results.len() > ef {
            results.pop();
        }

        while let Some(Reverse(current)) = candidates.pop() {
            if let Some(farthest) = results.peek()
                && results.len() >= ef
                && current.distance > farthest.distance
            {
                break;
            }

            let Some(neighbors) = self.nodes[current.node].links.get(layer) else {
                continue;
            };
            for &neighbor in neighbors {
                if !visited.insert(neighbor) {
                    continue;
                }
                let candidate = SearchCandidate {
                    distance: self.distance_to(query, neighbor),
                    node: neighbor,
                };
                let closer = results
                    .peek()
                    .is_none_or(|farthest| candidate < *farthest);
                if results.len() < ef || closer {
                    candidates.push(Reverse(candidate));
                    results.push(candidate);
                    if results.len() > ef {
                        results.pop();
                    }
                }
            }
        }

        results.into_sorted_vec()
    }

    /// Keep the `max_links` closest neighbors of `node` on `layer`.
    fn prune_connections(&mut self, node: usize, layer: usize) {
        let max_links = self.max_links(layer);
        if self.nodes[node].links[layer].len() <= max_links {
            return;
        }

        let unit = &self.nodes[node].unit;
        let mut scored: Vec<SearchCandidate> = self.nodes[node].links[layer]
            .iter()
            .map(|&neighbor| SearchCandidate {
                distance: 1.0 - similarity::unit_similarity(unit, &self.nodes[neighbor].unit),
                node: neighbor,
            })
            .collect();
        scored.sort();
        scored.truncate(max_links);

        self.nodes[node].links[layer] = scored.into_iter().map(|c| c.node).collect();
    }

    fn insert(&mut self, entry: VectorIndexEntry) {
        let position = self.nodes.len();
        let level = self.select_level();
        let unit = similarity::normalized(&entry.vector);

        self.positions.insert(entry.id, position);
        self.nodes.push(HnswNode {
            entry,
            unit: unit.clone(),
            links: vec![Vec::new(); level + 1],
        });

        let Some(entry_point) = self.entry_point else {
            self.entry_point = Some(position);
            self.max_level = level;
            return;
        };

        // Greedy descent through the layers above the new node's level.
        let mut nearest = vec![entry_point];
        for layer in (level + 1..=self.max_level).rev() {
            if let Some(closest) = self.search_layer(&unit, &nearest, 1, layer).first() {
                nearest = vec![closest.node];
            }
        }

        for layer in (0..=level.min(self.max_level)).rev() {
            let candidates =
                self.search_layer(&unit, &nearest, self.config.ef_construction, layer);
            let neighbors: Vec<usize> = candidates
                .iter()
                .map(|c| c.node)
                .filter(|&node| node != position)
                .take(self.config.m)
                .collect();

            for &neighbor in &neighbors {
                self.nodes[position].links[layer].push(neighbor);
                self.nodes[neighbor].links[layer].push(position);
                self.prune_connections(neighbor, layer);
            }

            if !candidates.is_empty() {
                nearest = candidates.into_iter().map(|c| c.node).collect();
            }
        }

        if level > self.max_level {
            self.max_level = level;
            self.entry_point = Some(position);
        }
    }
}

impl VectorBackend for HnswIndex {
    fn kind(&self) -> BackendKind {
        BackendKind::Hnsw
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn len(&self) -> usize {
        self.nodes.len()
    }

    fn contains(&self, id: u64) -> bool {
        self.positions.contains_key(&id)
    }

    fn insert_batch(&mut self, entries: Vec<VectorIndexEntry>) -> Result<()> {
        self.nodes.reserve(entries.len());
        for entry in entries {
            self.insert(entry);
        }
        Ok(())
    }

    fn search(&self, query: &[f32], k: usize, ef: Option<usize>) -> Result<Vec<SearchHit>> {
        let Some(entry_point) = self.entry_point else {
            return Ok(Vec::new());
        };
        let query = similarity::normalized(query);
        let ef = ef.unwrap_or(self.config.ef_search).max(k);

        let mut nearest = vec![entry_point];
        for layer in (1..=self.max_level).rev() {
            if let Some(closest) = self.search_layer(&query, &nearest, 1, layer).first() {
                nearest = vec![closest.node];
            }
        }

        let mut hits: Vec<SearchHit> = self
            .search_layer(&query, &nearest, ef, 0)
            .into_iter()
            .map(|candidate| {
                let node = &self.nodes[candidate.node];
                SearchHit::new(
                    node.entry.id,
                    similarity::unit_similarity(&query, &node.unit),
                )
            })
            .collect();
        rank_hits(&mut hits, k);
        Ok(hits)
    }

    fn get(&self, id: u64) -> Option<&VectorIndexEntry> {
        self.positions.get(&id).map(|&pos| &self.nodes[pos].entry)
    }

    fn entries(&self) -> Box<dyn Iterator<Item = &VectorIndexEntry> + '_> {
        Box::new(self.nodes.iter().map(|node| &node.entry))
    }

    fn clear(&mut self) {
        self.nodes.clear();
        self.positions.clear();
        self.entry_point = None;
        self.max_level = 0;
        self.rng = StdRng::seed_from_u64(self.config.seed);
    }
}
