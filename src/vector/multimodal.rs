//! Paired text and visual indexes over a story's shots.

use std::collections::HashMap;
use std::sync::Arc;

use ahash::AHashMap;
use parking_lot::RwLock;
use tracing::debug;

use crate::error::Result;
use crate::shot::Shot;
use crate::vector::index::VectorIndex;
use crate::vector::index::config::IndexConfig;

/// Handle to a [`MultimodalIndex`] shared between one writer and many readers.
pub type SharedIndex = Arc<RwLock<MultimodalIndex>>;

/// One index per embedding modality, keyed by shot id.
#[derive(Debug)]
pub struct MultimodalIndex {
    text: VectorIndex,
    visual: VectorIndex,
}

impl MultimodalIndex {
    pub fn new(config: &IndexConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            text: VectorIndex::new(config.text_config())?,
            visual: VectorIndex::new(config.visual_config())?,
        })
    }

    pub fn from_parts(text: VectorIndex, visual: VectorIndex) -> Self {
        Self { text, visual }
    }

    /// Wrap this index in a [`SharedIndex`] handle.
    pub fn into_shared(self) -> SharedIndex {
        Arc::new(RwLock::new(self))
    }

    pub fn text(&self) -> &VectorIndex {
        &self.text
    }

    pub fn visual(&self) -> &VectorIndex {
        &self.visual
    }

    pub fn text_mut(&mut self) -> &mut VectorIndex {
        &mut self.text
    }

    pub fn visual_mut(&mut self) -> &mut VectorIndex {
        &mut self.visual
    }

    /// Index the embeddings carried by `shots`.
    ///
    /// Shots without an embedding for a modality are skipped for that
    /// modality. Both batches are validated before either is inserted, so a
    /// bad vector in one modality leaves both indexes unchanged. Returns the
    /// number of vectors inserted across both modalities.
    pub fn add_shots(&mut self, shots: &[Shot]) -> Result<usize> {
        let mut text_ids = Vec::new();
        let mut text_vectors: Vec<&[f32]> = Vec::new();
        let mut text_metadata = Vec::new();
        let mut visual_ids = Vec::new();
        let mut visual_vectors: Vec<&[f32]> = Vec::new();
        let mut visual_metadata = Vec::new();

        for shot in shots {
            if let Some(embedding) = &shot.text_embedding {
                text_ids.push(shot.id);
                text_vectors.push(embedding);
                text_metadata.push(shot_metadata(shot));
            }
            if let Some(embedding) = &shot.visual_embedding {
                visual_ids.push(shot.id);
                visual_vectors.push(embedding);
                visual_metadata.push(shot_metadata(shot));
            }
        }

        let text_entries = self
            .text
            .prepare(&text_ids, &text_vectors, Some(text_metadata.as_slice()))?;
        let visual_entries =
            self.visual
                .prepare(&visual_ids, &visual_vectors, Some(visual_metadata.as_slice()))?;

        let inserted = text_entries.len() + visual_entries.len();
        self.text.commit(text_entries)?;
        self.visual.commit(visual_entries)?;

        debug!(
            shots = shots.len(),
            text = text_ids.len(),
            visual = visual_ids.len(),
            "indexed shot embeddings"
        );
        Ok(inserted)
    }

    /// Weighted fusion of per-modality nearest neighbors.
    ///
    /// Each supplied query is searched for `2 * k` hits in its index. A shot's
    /// fused score is `Σ weight_m · similarity_m` over the modalities that
    /// returned it. Results are sorted by descending score, ties by ascending
    /// id, and truncated to `k`.
    pub fn multimodal_search(
        &self,
        text_query: Option<&[f32]>,
        visual_query: Option<&[f32]>,
        k: usize,
        text_weight: f32,
        visual_weight: f32,
    ) -> Result<Vec<(u64, f32)>> {
        let mut fused: AHashMap<u64, f32> = AHashMap::new();
        let fetch = k.saturating_mul(2);

        for (index, query, weight) in [
            (&self.text, text_query, text_weight),
            (&self.visual, visual_query, visual_weight),
        ] {
            let Some(query) = query else {
                continue;
            };
            for hit in index.search(query, fetch)? {
                *fused.entry(hit.id).or_insert(0.0) += weight * hit.similarity;
            }
        }

        let mut results: Vec<(u64, f32)> = fused.into_iter().collect();
        results.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        results.truncate(k);
        Ok(results)
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.visual.clear();
    }
}

fn shot_metadata(shot: &Shot) -> HashMap<String, String> {
    HashMap::from([
        ("story_id".to_string(), shot.story_id.clone()),
        ("shot_type".to_string(), shot.shot_type.as_str().to_string()),
    ])
}
