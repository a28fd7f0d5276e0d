//! Sequence grouping parameters.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ShotpickError};

/// Configuration for [`crate::sequence::SequenceEngine`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequenceConfig {
    /// A gap longer than this (seconds) between consecutive shots starts a
    /// new temporal group.
    pub temporal_window_secs: f64,
    /// Minimum cosine similarity for two visual embeddings to be neighbors.
    pub visual_similarity_threshold: f32,
    /// Smaller groups dissolve into `miscellaneous`. Also the density
    /// threshold for visual clustering.
    pub min_shots_per_sequence: usize,
    /// Larger groups are trimmed to this many shots.
    pub max_shots_per_sequence: usize,
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self {
            temporal_window_secs: 300.0,
            visual_similarity_threshold: 0.7,
            min_shots_per_sequence: 2,
            max_shots_per_sequence: 8,
        }
    }
}

impl SequenceConfig {
    pub fn with_temporal_window_secs(mut self, secs: f64) -> Self {
        self.temporal_window_secs = secs;
        self
    }

    pub fn with_visual_similarity_threshold(mut self, threshold: f32) -> Self {
        self.visual_similarity_threshold = threshold;
        self
    }

    pub fn with_size_bounds(mut self, min: usize, max: usize) -> Self {
        self.min_shots_per_sequence = min;
        self.max_shots_per_sequence = max;
        self
    }

    /// Neighborhood radius for visual clustering.
    pub fn visual_eps(&self) -> f32 {
        1.0 - self.visual_similarity_threshold
    }

    pub fn validate(&self) -> Result<()> {
        if !self.temporal_window_secs.is_finite() || self.temporal_window_secs < 0.0 {
            return Err(ShotpickError::invalid_config(
                "temporal_window_secs must be a non-negative number",
            ));
        }
        if !(0.0..=1.0).contains(&self.visual_similarity_threshold) {
            return Err(ShotpickError::invalid_config(
                "visual_similarity_threshold must be within [0, 1]",
            ));
        }
        if self.min_shots_per_sequence == 0 {
            return Err(ShotpickError::invalid_config(
                "min_shots_per_sequence must be > 0",
            ));
        }
        if self.min_shots_per_sequence > self.max_shots_per_sequence {
            return Err(ShotpickError::invalid_config(format!(
                "min_shots_per_sequence ({}) exceeds max_shots_per_sequence ({})",
                self.min_shots_per_sequence, self.max_shots_per_sequence
            )));
        }
        Ok(())
    }
}
