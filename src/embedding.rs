//! Text embedding support for semantic shot retrieval.
//!
//! The core only depends on the [`TextEmbedder`] trait. Two implementations
//! ship with the crate:
//!
//! - [`HashingEmbedder`]: deterministic feature hashing, no model required
//! - [`PrecomputedEmbedder`]: refuses to embed, for pools whose vectors were
//!   computed elsewhere

pub mod hashing;
pub mod precomputed;
pub mod text_embedder;

pub use self::hashing::HashingEmbedder;
pub use self::precomputed::PrecomputedEmbedder;
pub use self::text_embedder::TextEmbedder;
