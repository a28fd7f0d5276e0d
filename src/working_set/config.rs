//! Configuration for working-set construction and hybrid scoring.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ShotpickError};

/// Weights, bonuses and limits used by the working-set builder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkingSetConfig {
    /// Working-set size used when a caller has no preference.
    pub default_max_shots: usize,
    /// Working-set size for beat queries.
    pub beat_max_shots: usize,
    /// Weight of the semantic (embedding) signal.
    pub semantic_weight: f32,
    /// Weight of the transcript keyword signal.
    pub keyword_weight: f32,
    /// Weight of the editorial heuristic bonus.
    pub heuristic_weight: f32,
    /// Semantic candidates fetched per requested shot.
    pub candidate_multiplier: usize,
    /// Bonus for on-camera statements.
    pub statement_bonus: f32,
    /// Bonus for shots with a visible face.
    pub face_bonus: f32,
    /// Bonus for shots whose duration falls in the preferred range.
    pub duration_bonus: f32,
    /// Lower bound of the preferred duration, inclusive.
    pub preferred_min_duration_ms: u64,
    /// Upper bound of the preferred duration, inclusive.
    pub preferred_max_duration_ms: u64,
}

impl Default for WorkingSetConfig {
    fn default() -> Self {
        Self {
            default_max_shots: 50,
            beat_max_shots: 20,
            semantic_weight: 0.7,
            keyword_weight: 0.2,
            heuristic_weight: 0.1,
            candidate_multiplier: 2,
            statement_bonus: 0.15,
            face_bonus: 0.10,
            duration_bonus: 0.05,
            preferred_min_duration_ms: 3_000,
            preferred_max_duration_ms: 10_000,
        }
    }
}

impl WorkingSetConfig {
    pub fn with_weights(mut self, semantic: f32, keyword: f32, heuristic: f32) -> Self {
        self.semantic_weight = semantic;
        self.keyword_weight = keyword;
        self.heuristic_weight = heuristic;
        self
    }

    pub fn with_beat_max_shots(mut self, beat_max_shots: usize) -> Self {
        self.beat_max_shots = beat_max_shots;
        self
    }

    pub fn with_candidate_multiplier(mut self, multiplier: usize) -> Self {
        self.candidate_multiplier = multiplier;
        self
    }

    /// Whether `duration_ms` falls in the preferred range.
    pub fn is_preferred_duration(&self, duration_ms: u64) -> bool {
        (self.preferred_min_duration_ms..=self.preferred_max_duration_ms).contains(&duration_ms)
    }

    pub fn validate(&self) -> Result<()> {
        let weights = [
            ("semantic_weight", self.semantic_weight),
            ("keyword_weight", self.keyword_weight),
            ("heuristic_weight", self.heuristic_weight),
            ("statement_bonus", self.statement_bonus),
            ("face_bonus", self.face_bonus),
            ("duration_bonus", self.duration_bonus),
        ];
        for (name, value) in weights {
            if !value.is_finite() || value < 0.0 {
                return Err(ShotpickError::invalid_config(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        if self.candidate_multiplier == 0 {
            return Err(ShotpickError::invalid_config(
                "candidate_multiplier must be > 0",
            ));
        }
        if self.preferred_min_duration_ms > self.preferred_max_duration_ms {
            return Err(ShotpickError::invalid_config(
                "preferred_min_duration_ms must be <= preferred_max_duration_ms",
            ));
        }
        Ok(())
    }
}
