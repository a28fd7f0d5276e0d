//! # Shotpick
//!
//! Candidate shot retrieval and sequence grouping for automated editorial
//! pipelines.
//!
//! ## Features
//!
//! - Exact and HNSW vector indexes over text and visual shot embeddings
//! - Hybrid semantic, keyword and heuristic scoring with a keyword-only fallback
//! - Bounded working sets with optional chronological neighbors
//! - Sequence grouping by location, capture time, visual similarity or all three
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//!
//! use shotpick::prelude::*;
//!
//! let store = Arc::new(MemoryShotStore::new());
//! store.insert(
//!     Shot::builder(1, "story")
//!         .capture_ts(0.0)
//!         .transcript("the minister arrives")
//!         .build(),
//! )?;
//!
//! let embedder = Arc::new(HashingEmbedder::new(8)?);
//! let index = MultimodalIndex::new(&IndexConfig::default().with_dimensions(8, 4))?.into_shared();
//! let builder = WorkingSetBuilder::new(store, embedder, index, WorkingSetConfig::default())?;
//!
//! let working_set = builder.build("story", "minister")?;
//! assert_eq!(working_set.ids(), vec![1]);
//!
//! let sequences = SequenceEngine::default().group_working_set(&working_set, "hybrid");
//! assert_eq!(sequences.total_shots(), 1);
//! # Ok::<(), shotpick::error::ShotpickError>(())
//! ```

pub mod config;
pub mod embedding;
pub mod error;
pub mod sequence;
pub mod shot;
pub mod storage;
pub mod vector;
pub mod working_set;

pub mod prelude {
    pub use crate::config::PipelineConfig;
    pub use crate::embedding::{HashingEmbedder, PrecomputedEmbedder, TextEmbedder};
    pub use crate::error::{Result, ShotpickError};
    pub use crate::sequence::{GroupingMethod, Sequence, SequenceConfig, SequenceEngine, SequenceSet};
    pub use crate::shot::{Shot, ShotId, ShotType, VisualDescriptors};
    pub use crate::storage::{MemoryShotStore, ShotStore};
    pub use crate::vector::{IndexConfig, MultimodalIndex, SearchHit, SharedIndex, VectorIndex};
    pub use crate::working_set::{WorkingSet, WorkingSetBuilder, WorkingSetConfig};
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
