//! Configuration types for vector indexes.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ShotpickError};

/// Which backing strategy a [`crate::vector::index::VectorIndex`] uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Exact brute-force cosine scan.
    #[default]
    Flat,
    /// Approximate navigable small-world graph.
    Hnsw,
}

impl BackendKind {
    pub fn name(&self) -> &'static str {
        match self {
            BackendKind::Flat => "flat",
            BackendKind::Hnsw => "hnsw",
        }
    }
}

/// Configuration for HNSW index construction and search.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HnswConfig {
    /// Maximum number of connections per node above layer 0 (layer 0 allows `2 * m`).
    pub m: usize,
    /// Size of the candidate set during construction.
    pub ef_construction: usize,
    /// Size of the candidate set during search; can be overridden per query.
    pub ef_search: usize,
    /// Random seed for level assignment.
    pub seed: u64,
}

impl Default for HnswConfig {
    fn default() -> Self {
        Self {
            m: 32,
            ef_construction: 200,
            ef_search: 100,
            seed: 42,
        }
    }
}

impl HnswConfig {
    /// Set the M parameter (connections per node).
    pub fn with_m(mut self, m: usize) -> Self {
        self.m = m;
        self
    }

    /// Set the ef_construction parameter.
    pub fn with_ef_construction(mut self, ef_construction: usize) -> Self {
        self.ef_construction = ef_construction;
        self
    }

    /// Set the ef_search parameter.
    pub fn with_ef_search(mut self, ef_search: usize) -> Self {
        self.ef_search = ef_search;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Validate the configuration parameters.
    pub fn validate(&self) -> Result<()> {
        if self.m < 2 {
            return Err(ShotpickError::invalid_config("HNSW m must be >= 2"));
        }
        if self.ef_construction < self.m {
            return Err(ShotpickError::invalid_config(
                "HNSW ef_construction must be >= m",
            ));
        }
        if self.ef_search == 0 {
            return Err(ShotpickError::invalid_config("HNSW ef_search must be > 0"));
        }
        Ok(())
    }
}

/// Configuration for a single-modality vector index.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorIndexConfig {
    pub dimension: usize,
    pub backend: BackendKind,
    #[serde(default)]
    pub hnsw: HnswConfig,
}

impl VectorIndexConfig {
    /// Exact index of the given dimension.
    pub fn flat(dimension: usize) -> Self {
        Self {
            dimension,
            backend: BackendKind::Flat,
            hnsw: HnswConfig::default(),
        }
    }

    /// Approximate index of the given dimension.
    pub fn hnsw(dimension: usize, hnsw: HnswConfig) -> Self {
        Self {
            dimension,
            backend: BackendKind::Hnsw,
            hnsw,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.dimension == 0 {
            return Err(ShotpickError::invalid_config("Dimension must be > 0"));
        }
        if self.backend == BackendKind::Hnsw {
            self.hnsw.validate()?;
        }
        Ok(())
    }
}

/// Configuration for the text + visual index pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Dimension of text embeddings.
    pub text_dimension: usize,
    /// Dimension of visual embeddings.
    pub visual_dimension: usize,
    pub backend: BackendKind,
    pub hnsw: HnswConfig,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            text_dimension: 384,
            visual_dimension: 512,
            backend: BackendKind::Flat,
            hnsw: HnswConfig::default(),
        }
    }
}

impl IndexConfig {
    pub fn with_dimensions(mut self, text_dimension: usize, visual_dimension: usize) -> Self {
        self.text_dimension = text_dimension;
        self.visual_dimension = visual_dimension;
        self
    }

    pub fn with_backend(mut self, backend: BackendKind) -> Self {
        self.backend = backend;
        self
    }

    pub fn text_config(&self) -> VectorIndexConfig {
        VectorIndexConfig {
            dimension: self.text_dimension,
            backend: self.backend,
            hnsw: self.hnsw.clone(),
        }
    }

    pub fn visual_config(&self) -> VectorIndexConfig {
        VectorIndexConfig {
            dimension: self.visual_dimension,
            backend: self.backend,
            hnsw: self.hnsw.clone(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.text_config().validate()?;
        self.visual_config().validate()
    }
}
