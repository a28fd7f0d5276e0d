//! Embedder for pre-computed vectors.
//!
//! [`PrecomputedEmbedder`] performs no embedding. Use it when shot vectors
//! are computed outside this crate and no query-time embedder is available.
//! Every call to [`TextEmbedder::embed_text`] fails with
//! [`ShotpickError::Embedding`], which sends the working-set builder down its
//! keyword-only scoring path.

use crate::embedding::text_embedder::TextEmbedder;
use crate::error::{Result, ShotpickError};

/// An embedder that refuses every request.
#[derive(Debug, Clone, Default)]
pub struct PrecomputedEmbedder {
    dimension: usize,
}

impl PrecomputedEmbedder {
    /// Creates a new `PrecomputedEmbedder` reporting `dimension`.
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

impl TextEmbedder for PrecomputedEmbedder {
    fn embed_text(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        Err(ShotpickError::embedding(format!(
            "precomputed embedder cannot embed {} text(s)",
            texts.len()
        )))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        "precomputed"
    }
}
