//! Vector similarity search over shot embeddings.
//!
//! # Module Structure
//!
//! - `similarity`: cosine kernels and normalization
//! - `index`: the [`VectorIndex`] facade with exact and HNSW backends
//! - `multimodal`: paired text/visual indexes and weighted fusion

pub mod index;
pub mod multimodal;
pub mod similarity;

pub use self::index::config::{BackendKind, HnswConfig, IndexConfig, VectorIndexConfig};
pub use self::index::{IndexStats, SearchHit, VectorBackend, VectorIndex, VectorIndexEntry};
pub use self::multimodal::{MultimodalIndex, SharedIndex};
pub use self::similarity::{cosine_distance, cosine_similarity};
