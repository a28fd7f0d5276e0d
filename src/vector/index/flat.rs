//! Exact brute-force index.
//!
//! Every query is scored against every stored vector. Unit-length copies are
//! kept beside the entries so a search is one dot product per vector.

use ahash::AHashMap;
use rayon::prelude::*;

use crate::error::Result;
use crate::vector::index::config::BackendKind;
use crate::vector::index::{SearchHit, VectorBackend, VectorIndexEntry, rank_hits};
use crate::vector::similarity;

/// Scans below this size stay on the calling thread.
const PARALLEL_SCAN_THRESHOLD: usize = 4096;

/// Exact cosine index, O(n) per query.
#[derive(Debug)]
pub struct FlatIndex {
    dimension: usize,
    entries: Vec<VectorIndexEntry>,
    units: Vec<Vec<f32>>,
    positions: AHashMap<u64, usize>,
}

impl FlatIndex {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            entries: Vec::new(),
            units: Vec::new(),
            positions: AHashMap::new(),
        }
    }

    fn score_all(&self, query: &[f32]) -> Vec<SearchHit> {
        let score = |(entry, unit): (&VectorIndexEntry, &Vec<f32>)| {
            SearchHit::new(entry.id, similarity::unit_similarity(query, unit))
        };

        if self.entries.len() < PARALLEL_SCAN_THRESHOLD {
            self.entries.iter().zip(&self.units).map(score).collect()
        } else {
            self.entries
                .par_iter()
                .zip(self.units.par_iter())
                .map(score)
                .collect()
        }
    }
}

impl VectorBackend for FlatIndex {
    fn kind(&self) -> BackendKind {
        BackendKind::Flat
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn contains(&self, id: u64) -> bool {
        self.positions.contains_key(&id)
    }

    fn insert_batch(&mut self, entries: Vec<VectorIndexEntry>) -> Result<()> {
        self.entries.reserve(entries.len());
        self.units.reserve(entries.len());
        for entry in entries {
            self.positions.insert(entry.id, self.entries.len());
            self.units.push(similarity::normalized(&entry.vector));
            self.entries.push(entry);
        }
        Ok(())
    }

    fn search(&self, query: &[f32], k: usize, _ef: Option<usize>) -> Result<Vec<SearchHit>> {
        let query = similarity::normalized(query);
        let mut hits = self.score_all(&query);
        rank_hits(&mut hits, k);
        Ok(hits)
    }

    fn get(&self, id: u64) -> Option<&VectorIndexEntry> {
        self.positions.get(&id).map(|&pos| &self.entries[pos])
    }

    fn entries(&self) -> Box<dyn Iterator<Item = &VectorIndexEntry> + '_> {
        Box::new(self.entries.iter())
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.units.clear();
        self.positions.clear();
    }
}
