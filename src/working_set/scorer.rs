//! Hybrid relevance scoring for candidate shots.
//!
//! Three signals are combined per shot:
//!
//! - **semantic**: cosine similarity between the query embedding and the
//!   shot's text embedding, clamped to `[0, 1]`
//! - **keyword**: Jaccard similarity between query and transcript tokens
//! - **heuristic**: editorial bonuses for statements, faces and duration
//!
//! When semantic search is unavailable the scorer switches to
//! [`ScoringMode::KeywordFallback`], an unnormalized scale that must not be
//! compared with [`ScoringMode::Hybrid`] scores.

use std::fmt;

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::shot::Shot;
use crate::working_set::config::WorkingSetConfig;

/// Multiplier applied to the Jaccard score in keyword-fallback mode.
pub const FALLBACK_KEYWORD_SCALE: f32 = 10.0;
/// Fallback bonus for on-camera statements.
pub const FALLBACK_STATEMENT_BONUS: f32 = 2.0;
/// Fallback bonus for shots with a visible face.
pub const FALLBACK_FACE_BONUS: f32 = 1.0;
/// Fallback bonus for shots in the preferred duration range.
pub const FALLBACK_DURATION_BONUS: f32 = 1.0;

/// How the scores of a working set were produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ScoringMode {
    /// Normalized semantic + keyword + heuristic combination.
    #[default]
    Hybrid,
    /// Keyword and heuristics only, on the unnormalized fallback scale.
    KeywordFallback,
}

impl fmt::Display for ScoringMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoringMode::Hybrid => f.write_str("hybrid"),
            ScoringMode::KeywordFallback => f.write_str("keyword_fallback"),
        }
    }
}

/// The per-shot signals and their combination.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ShotScore {
    pub semantic: f32,
    pub keyword: f32,
    pub heuristic: f32,
    pub final_score: f32,
}

/// Lower-case whitespace tokens as a set.
pub fn tokenize(text: &str) -> AHashSet<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Stateless scorer parameterized by a [`WorkingSetConfig`].
#[derive(Debug, Clone, Default)]
pub struct HybridScorer {
    config: WorkingSetConfig,
}

impl HybridScorer {
    pub fn new(config: WorkingSetConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &WorkingSetConfig {
        &self.config
    }

    /// Jaccard similarity of the query tokens and the transcript tokens;
    /// 0 when either side is empty.
    pub fn keyword_score(&self, query_tokens: &AHashSet<String>, transcript: &str) -> f32 {
        if query_tokens.is_empty() {
            return 0.0;
        }
        let transcript_tokens = tokenize(transcript);
        if transcript_tokens.is_empty() {
            return 0.0;
        }
        let intersection = query_tokens.intersection(&transcript_tokens).count();
        let union = query_tokens.len() + transcript_tokens.len() - intersection;
        intersection as f32 / union as f32
    }

    /// Sum of the configured editorial bonuses that apply to `shot`.
    pub fn heuristic_bonus(&self, shot: &Shot) -> f32 {
        let mut bonus = 0.0;
        if shot.is_statement() {
            bonus += self.config.statement_bonus;
        }
        if shot.has_face {
            bonus += self.config.face_bonus;
        }
        if self.config.is_preferred_duration(shot.duration_ms) {
            bonus += self.config.duration_bonus;
        }
        bonus
    }

    /// Weighted combination for a shot returned by semantic search.
    pub fn score_hybrid(
        &self,
        semantic: f32,
        query_tokens: &AHashSet<String>,
        shot: &Shot,
    ) -> ShotScore {
        let semantic = if semantic.is_finite() {
            semantic.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let keyword = self.keyword_score(query_tokens, &shot.transcript);
        let heuristic = self.heuristic_bonus(shot);
        ShotScore {
            semantic,
            keyword,
            heuristic,
            final_score: self.config.semantic_weight * semantic
                + self.config.keyword_weight * keyword
                + self.config.heuristic_weight * heuristic,
        }
    }

    /// Keyword-and-heuristics score used when semantic search is unavailable.
    pub fn score_fallback(&self, query_tokens: &AHashSet<String>, shot: &Shot) -> ShotScore {
        let keyword = self.keyword_score(query_tokens, &shot.transcript);
        let mut heuristic = 0.0;
        if shot.is_statement() {
            heuristic += FALLBACK_STATEMENT_BONUS;
        }
        if shot.has_face {
            heuristic += FALLBACK_FACE_BONUS;
        }
        if self.config.is_preferred_duration(shot.duration_ms) {
            heuristic += FALLBACK_DURATION_BONUS;
        }
        ShotScore {
            semantic: 0.0,
            keyword,
            heuristic,
            final_score: FALLBACK_KEYWORD_SCALE * keyword + heuristic,
        }
    }
}
