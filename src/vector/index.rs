//! Single-modality vector indexes.
//!
//! [`VectorIndex`] is the handle callers hold. It owns one boxed
//! [`VectorBackend`] (exact [`flat::FlatIndex`] or approximate
//! [`hnsw::HnswIndex`]) and enforces the contract both backends share:
//!
//! - every vector in a batch is validated before any of them is inserted, so
//!   a failed `add` leaves the index untouched;
//! - searches return hits sorted by descending cosine similarity, ties broken
//!   by ascending id;
//! - searching an empty index yields no hits, while a query of the wrong
//!   dimension is an error.

pub mod config;
pub mod flat;
pub mod hnsw;

use std::collections::HashMap;
use std::fmt::Debug;

use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, ShotpickError};
use crate::vector::index::config::{BackendKind, HnswConfig, VectorIndexConfig};
use crate::vector::index::flat::FlatIndex;
use crate::vector::index::hnsw::HnswIndex;
use crate::vector::similarity;

/// A vector held by an index, copied in by value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorIndexEntry {
    pub id: u64,
    pub vector: Vec<f32>,
    pub metadata: HashMap<String, String>,
}

impl VectorIndexEntry {
    pub fn new(id: u64, vector: Vec<f32>) -> Self {
        Self {
            id,
            vector,
            metadata: HashMap::new(),
        }
    }

    pub fn with_metadata(id: u64, vector: Vec<f32>, metadata: HashMap<String, String>) -> Self {
        Self {
            id,
            vector,
            metadata,
        }
    }
}

/// One nearest-neighbor result.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: u64,
    /// Cosine similarity in `[-1, 1]`.
    pub similarity: f32,
}

impl SearchHit {
    pub fn new(id: u64, similarity: f32) -> Self {
        Self { id, similarity }
    }
}

/// Sort hits by descending similarity, then ascending id, and keep the first `k`.
pub(crate) fn rank_hits(hits: &mut Vec<SearchHit>, k: usize) {
    hits.sort_by(|a, b| {
        b.similarity
            .total_cmp(&a.similarity)
            .then_with(|| a.id.cmp(&b.id))
    });
    hits.truncate(k);
}

/// Statistics about a vector index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexStats {
    pub vector_count: usize,
    pub dimension: usize,
    pub backend: BackendKind,
    pub avg_norm: f32,
    pub min_norm: f32,
    pub max_norm: f32,
}

/// Storage and search strategy behind a [`VectorIndex`].
///
/// Implementations may assume their inputs were validated by the facade:
/// entries have the configured dimension, finite values, and ids that are
/// not yet stored.
pub trait VectorBackend: Send + Sync + Debug {
    /// Which strategy this is.
    fn kind(&self) -> BackendKind;

    /// Vector dimension.
    fn dimension(&self) -> usize;

    /// Number of stored vectors.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `id` is stored.
    fn contains(&self, id: u64) -> bool;

    /// Insert pre-validated entries.
    fn insert_batch(&mut self, entries: Vec<VectorIndexEntry>) -> Result<()>;

    /// Up to `k` hits for `query`. `ef` widens the approximate search beam;
    /// exact backends ignore it.
    fn search(&self, query: &[f32], k: usize, ef: Option<usize>) -> Result<Vec<SearchHit>>;

    /// Look up a stored entry.
    fn get(&self, id: u64) -> Option<&VectorIndexEntry>;

    /// All stored entries in insertion order.
    fn entries(&self) -> Box<dyn Iterator<Item = &VectorIndexEntry> + '_>;

    /// Remove everything.
    fn clear(&mut self);
}

/// A k-nearest-neighbor index over fixed-dimension vectors keyed by id.
#[derive(Debug)]
pub struct VectorIndex {
    backend: Box<dyn VectorBackend>,
}

impl VectorIndex {
    /// Create an index from its configuration.
    pub fn new(config: VectorIndexConfig) -> Result<Self> {
        config.validate()?;
        let backend: Box<dyn VectorBackend> = match config.backend {
            BackendKind::Flat => Box::new(FlatIndex::new(config.dimension)),
            BackendKind::Hnsw => Box::new(HnswIndex::new(config.dimension, config.hnsw)?),
        };
        Ok(Self { backend })
    }

    /// Exact index of the given dimension.
    pub fn flat(dimension: usize) -> Result<Self> {
        Self::new(VectorIndexConfig::flat(dimension))
    }

    /// Approximate index of the given dimension.
    pub fn hnsw(dimension: usize, config: HnswConfig) -> Result<Self> {
        Self::new(VectorIndexConfig::hnsw(dimension, config))
    }

    /// Wrap a custom backend.
    pub fn with_backend(backend: Box<dyn VectorBackend>) -> Self {
        Self { backend }
    }

    pub fn dimension(&self) -> usize {
        self.backend.dimension()
    }

    pub fn len(&self) -> usize {
        self.backend.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backend.is_empty()
    }

    pub fn backend_kind(&self) -> BackendKind {
        self.backend.kind()
    }

    pub fn contains(&self, id: u64) -> bool {
        self.backend.contains(id)
    }

    /// Insert a batch of vectors. Either all of them are inserted or none.
    ///
    /// # Errors
    ///
    /// - [`ShotpickError::DimensionMismatch`] if any vector has the wrong length
    /// - [`ShotpickError::InvalidVector`] if any vector holds NaN or infinity
    /// - [`ShotpickError::DuplicateId`] if an id repeats or is already stored
    /// - [`ShotpickError::InvalidArgument`] if `ids`, `vectors` and `metadata` differ in length
    pub fn add<V: AsRef<[f32]>>(
        &mut self,
        ids: &[u64],
        vectors: &[V],
        metadata: Option<&[HashMap<String, String>]>,
    ) -> Result<()> {
        let entries = self.prepare(ids, vectors, metadata)?;
        self.commit(entries)
    }

    /// Validate a batch and copy it into entries without touching the index.
    pub(crate) fn prepare<V: AsRef<[f32]>>(
        &self,
        ids: &[u64],
        vectors: &[V],
        metadata: Option<&[HashMap<String, String>]>,
    ) -> Result<Vec<VectorIndexEntry>> {
        if ids.len() != vectors.len() {
            return Err(ShotpickError::invalid_argument(format!(
                "{} ids for {} vectors",
                ids.len(),
                vectors.len()
            )));
        }
        if let Some(metadata) = metadata
            && metadata.len() != ids.len()
        {
            return Err(ShotpickError::invalid_argument(format!(
                "{} metadata entries for {} vectors",
                metadata.len(),
                ids.len()
            )));
        }

        let dimension = self.dimension();
        let mut seen = AHashSet::with_capacity(ids.len());
        for (&id, vector) in ids.iter().zip(vectors) {
            let vector: &[f32] = vector.as_ref();
            if vector.len() != dimension {
                return Err(ShotpickError::dimension_mismatch(dimension, vector.len()));
            }
            if !vector.iter().all(|x| x.is_finite()) {
                return Err(ShotpickError::InvalidVector(format!(
                    "vector for id {id} contains NaN or infinite values"
                )));
            }
            if !seen.insert(id) || self.backend.contains(id) {
                return Err(ShotpickError::DuplicateId(id));
            }
        }

        Ok(ids
            .iter()
            .zip(vectors)
            .enumerate()
            .map(|(i, (&id, vector))| {
                let values: &[f32] = vector.as_ref();
                let metadata = metadata.map(|m| m[i].clone()).unwrap_or_default();
                VectorIndexEntry::with_metadata(id, values.to_vec(), metadata)
            })
            .collect())
    }

    /// Insert entries produced by [`VectorIndex::prepare`].
    pub(crate) fn commit(&mut self, entries: Vec<VectorIndexEntry>) -> Result<()> {
        if entries.is_empty() {
            return Ok(());
        }
        let count = entries.len();
        self.backend.insert_batch(entries)?;
        debug!(
            backend = self.backend.kind().name(),
            inserted = count,
            total = self.len(),
            "vector batch inserted"
        );
        Ok(())
    }

    /// Up to `k` `(id, similarity)` hits sorted by descending similarity.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit>> {
        self.search_with_ef(query, k, None)
    }

    /// Like [`VectorIndex::search`] with an explicit approximate-search beam width.
    pub fn search_with_ef(
        &self,
        query: &[f32],
        k: usize,
        ef: Option<usize>,
    ) -> Result<Vec<SearchHit>> {
        let dimension = self.dimension();
        if query.len() != dimension {
            return Err(ShotpickError::dimension_mismatch(dimension, query.len()));
        }
        if !query.iter().all(|x| x.is_finite()) {
            return Err(ShotpickError::InvalidVector(
                "query contains NaN or infinite values".to_string(),
            ));
        }
        if k == 0 || self.is_empty() {
            return Ok(Vec::new());
        }
        self.backend.search(query, k, ef)
    }

    /// Metadata stored with `id`.
    pub fn metadata(&self, id: u64) -> Option<&HashMap<String, String>> {
        self.backend.get(id).map(|entry| &entry.metadata)
    }

    /// The stored copy of the vector for `id`.
    pub fn vector(&self, id: u64) -> Option<&[f32]> {
        self.backend.get(id).map(|entry| entry.vector.as_slice())
    }

    pub fn stats(&self) -> IndexStats {
        let mut count = 0usize;
        let mut sum = 0.0_f32;
        let mut min_norm = f32::INFINITY;
        let mut max_norm = 0.0_f32;
        for entry in self.backend.entries() {
            let n = similarity::norm(&entry.vector);
            count += 1;
            sum += n;
            min_norm = min_norm.min(n);
            max_norm = max_norm.max(n);
        }
        IndexStats {
            vector_count: count,
            dimension: self.dimension(),
            backend: self.backend_kind(),
            avg_norm: if count == 0 { 0.0 } else { sum / count as f32 },
            min_norm: if count == 0 { 0.0 } else { min_norm },
            max_norm,
        }
    }

    pub fn clear(&mut self) {
        self.backend.clear();
    }
}
