//! Text embedding trait consumed by the working-set builder.

use crate::error::{Result, ShotpickError};

/// Trait for converting text to vector embeddings.
///
/// Implementations wrap whatever produces the vectors (a local model, a
/// remote service, a hash projection). Calls are blocking; callers that
/// talk to a network service own timeouts at that boundary.
///
/// # Examples
///
/// ```
/// use shotpick::embedding::TextEmbedder;
/// use shotpick::error::Result;
///
/// struct ConstantEmbedder {
///     dimension: usize,
/// }
///
/// impl TextEmbedder for ConstantEmbedder {
///     fn embed_text(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
///         Ok(texts.iter().map(|_| vec![1.0; self.dimension]).collect())
///     }
///
///     fn dimension(&self) -> usize {
///         self.dimension
///     }
/// }
///
/// let embedder = ConstantEmbedder { dimension: 4 };
/// assert_eq!(embedder.embed_one("hello").unwrap().len(), 4);
/// ```
pub trait TextEmbedder: Send + Sync {
    /// Embed each text, returning one vector per input in the same order.
    fn embed_text(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>>;

    /// Dimension of the produced vectors.
    fn dimension(&self) -> usize;

    /// Identifier used in logs.
    fn name(&self) -> &str {
        "unknown"
    }

    /// Embed a single text.
    fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_text(&[text])?
            .into_iter()
            .next()
            .ok_or_else(|| ShotpickError::embedding(format!("{} returned no vector", self.name())))
    }
}
