//! Working-set construction.
//!
//! A [`WorkingSetBuilder`] turns a story's shot pool and a text query into a
//! small, ranked, capture-ordered [`WorkingSet`]. Semantic candidates come
//! from the shared text index; when that path fails for any reason the whole
//! pool is ranked with the keyword fallback instead.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::embedding::TextEmbedder;
use crate::error::{Result, ShotpickError};
use crate::shot::{Shot, ShotId, ShotType, StoryId};
use crate::storage::ShotStore;
use crate::vector::multimodal::SharedIndex;
use crate::working_set::config::WorkingSetConfig;
use crate::working_set::scorer::{HybridScorer, ScoringMode, ShotScore, tokenize};

/// The beat a working set was built for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeatContext {
    pub description: String,
    pub requirements: Vec<String>,
}

/// Ranked candidate shots for one query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkingSet {
    pub story_id: StoryId,
    pub query: String,
    /// Selected shots ordered by capture time.
    pub shots: Vec<Shot>,
    /// Scores of the ranked selection. Neighbor shots have no entry.
    pub scores: HashMap<ShotId, ShotScore>,
    /// Shots added as chronological neighbors of the ranked selection.
    pub neighbor_ids: BTreeSet<ShotId>,
    pub total_duration_ms: u64,
    pub shot_type_counts: BTreeMap<ShotType, usize>,
    pub mode: ScoringMode,
    pub beat: Option<BeatContext>,
}

impl WorkingSet {
    fn empty(story_id: &str, query: &str) -> Self {
        Self {
            story_id: story_id.to_string(),
            query: query.to_string(),
            shots: Vec::new(),
            scores: HashMap::new(),
            neighbor_ids: BTreeSet::new(),
            total_duration_ms: 0,
            shot_type_counts: BTreeMap::new(),
            mode: ScoringMode::Hybrid,
            beat: None,
        }
    }

    pub fn len(&self) -> usize {
        self.shots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shots.is_empty()
    }

    pub fn total_duration_secs(&self) -> f64 {
        self.total_duration_ms as f64 / 1000.0
    }

    /// Final score of `id`, or 0 for neighbors and unknown shots.
    pub fn relevance(&self, id: ShotId) -> f32 {
        self.scores.get(&id).map_or(0.0, |score| score.final_score)
    }

    /// Final scores keyed by shot id, for relevance-aware grouping.
    pub fn relevance_map(&self) -> HashMap<ShotId, f32> {
        self.scores
            .iter()
            .map(|(&id, score)| (id, score.final_score))
            .collect()
    }

    /// Shot ids in capture order.
    pub fn ids(&self) -> Vec<ShotId> {
        self.shots.iter().map(|shot| shot.id).collect()
    }
}

/// Query string for a story beat.
pub fn beat_query(description: &str, requirements: &[String]) -> String {
    if requirements.is_empty() {
        description.to_string()
    } else {
        format!("{description}. Requirements: {}", requirements.join(", "))
    }
}

/// Builds working sets from injected storage, embedding and index handles.
pub struct WorkingSetBuilder {
    store: Arc<dyn ShotStore>,
    embedder: Arc<dyn TextEmbedder>,
    index: SharedIndex,
    scorer: HybridScorer,
}

impl WorkingSetBuilder {
    pub fn new(
        store: Arc<dyn ShotStore>,
        embedder: Arc<dyn TextEmbedder>,
        index: SharedIndex,
        config: WorkingSetConfig,
    ) -> Result<Self> {
        config.validate()?;
        info!(
            embedder = embedder.name(),
            semantic_weight = config.semantic_weight,
            candidate_multiplier = config.candidate_multiplier,
            "working set builder initialized"
        );
        Ok(Self {
            store,
            embedder,
            index,
            scorer: HybridScorer::new(config),
        })
    }

    pub fn config(&self) -> &WorkingSetConfig {
        self.scorer.config()
    }

    pub fn scorer(&self) -> &HybridScorer {
        &self.scorer
    }

    /// Working set with the configured default size and neighbor expansion.
    pub fn build(&self, story_id: &str, query: &str) -> Result<WorkingSet> {
        self.build_for_query(story_id, query, self.config().default_max_shots, None, true)
    }

    /// Rank the story's shots against `query` and return at most `max_shots`.
    ///
    /// # Errors
    ///
    /// Only a storage failure is returned. Embedding and index failures
    /// switch scoring to [`ScoringMode::KeywordFallback`].
    pub fn build_for_query(
        &self,
        story_id: &str,
        query: &str,
        max_shots: usize,
        shot_types: Option<&[ShotType]>,
        include_neighbors: bool,
    ) -> Result<WorkingSet> {
        info!(story_id, query, max_shots, include_neighbors, "building working set");

        let pool = self.store.get_shots_by_story(story_id, shot_types)?;
        if pool.is_empty() {
            warn!(story_id, "no shots found for story");
            return Ok(WorkingSet::empty(story_id, query));
        }
        if max_shots == 0 {
            return Ok(WorkingSet::empty(story_id, query));
        }
        debug!(story_id, pool = pool.len(), "fetched shot pool");

        let query_tokens = tokenize(query);
        let (mode, mut ranked) = match self.semantic_candidates(query, max_shots, &pool) {
            Ok(candidates) => {
                let ranked: Vec<(usize, ShotScore)> = candidates
                    .into_iter()
                    .map(|(pos, similarity)| {
                        (pos, self.scorer.score_hybrid(similarity, &query_tokens, &pool[pos]))
                    })
                    .collect();
                (ScoringMode::Hybrid, ranked)
            }
            Err(err) => {
                warn!(story_id, error = %err, "semantic search unavailable, using keyword scoring");
                let ranked: Vec<(usize, ShotScore)> = pool
                    .iter()
                    .enumerate()
                    .map(|(pos, shot)| (pos, self.scorer.score_fallback(&query_tokens, shot)))
                    .collect();
                (ScoringMode::KeywordFallback, ranked)
            }
        };

        ranked.sort_by(|(a_pos, a), (b_pos, b)| {
            b.final_score
                .total_cmp(&a.final_score)
                .then_with(|| pool[*a_pos].id.cmp(&pool[*b_pos].id))
        });
        ranked.truncate(max_shots);

        let selected: Vec<usize> = ranked.iter().map(|(pos, _)| *pos).collect();
        let neighbors = if include_neighbors && selected.len() < max_shots {
            temporal_neighbors(&pool, &selected, max_shots - selected.len())
        } else {
            Vec::new()
        };
        debug!(story_id, added = neighbors.len(), "added temporal neighbors");

        let mut shots: Vec<Shot> = selected
            .iter()
            .chain(&neighbors)
            .map(|&pos| pool[pos].clone())
            .collect();
        shots.sort_by(|a, b| {
            a.capture_ts
                .total_cmp(&b.capture_ts)
                .then_with(|| a.id.cmp(&b.id))
        });

        let mut shot_type_counts = BTreeMap::new();
        for shot in &shots {
            *shot_type_counts.entry(shot.shot_type).or_insert(0) += 1;
        }

        let working_set = WorkingSet {
            story_id: story_id.to_string(),
            query: query.to_string(),
            total_duration_ms: shots.iter().map(|shot| shot.duration_ms).sum(),
            scores: ranked
                .into_iter()
                .map(|(pos, score)| (pool[pos].id, score))
                .collect(),
            neighbor_ids: neighbors.iter().map(|&pos| pool[pos].id).collect(),
            shots,
            shot_type_counts,
            mode,
            beat: None,
        };

        info!(
            story_id,
            shots = working_set.len(),
            total_secs = working_set.total_duration_secs(),
            mode = %working_set.mode,
            "working set built"
        );
        Ok(working_set)
    }

    /// Working set for one story beat: no neighbor expansion, and
    /// `max_shots` defaults to the configured beat size.
    pub fn build_for_beat(
        &self,
        story_id: &str,
        description: &str,
        requirements: &[String],
        max_shots: Option<usize>,
    ) -> Result<WorkingSet> {
        let max_shots = max_shots.unwrap_or(self.config().beat_max_shots);
        let query = beat_query(description, requirements);
        info!(story_id, beat = description, "building working set for beat");

        let mut working_set = self.build_for_query(story_id, &query, max_shots, None, false)?;
        working_set.beat = Some(BeatContext {
            description: description.to_string(),
            requirements: requirements.to_vec(),
        });
        Ok(working_set)
    }

    /// Pool positions and similarities of the semantic top candidates.
    ///
    /// The text index is shared by every story, so the fetch doubles until
    /// enough hits belong to `pool` or the index is exhausted.
    fn semantic_candidates(
        &self,
        query: &str,
        max_shots: usize,
        pool: &[Shot],
    ) -> Result<Vec<(usize, f32)>> {
        let vector = self.embedder.embed_one(query)?;
        let wanted = max_shots.saturating_mul(self.config().candidate_multiplier);

        let positions: AHashMap<ShotId, usize> = pool
            .iter()
            .enumerate()
            .map(|(pos, shot)| (shot.id, pos))
            .collect();

        let index = self.index.read();
        let text = index.text();
        let available = text.len();
        let mut fetch = wanted.min(available);
        let (mut candidates, searched) = loop {
            let hits = text.search(&vector, fetch)?;
            let found: Vec<(usize, f32)> = hits
                .iter()
                .filter_map(|hit| positions.get(&hit.id).map(|&pos| (pos, hit.similarity)))
                .collect();
            if found.len() >= wanted || fetch >= available {
                break (found, hits.len());
            }
            fetch = fetch.saturating_mul(2).max(1).min(available);
            debug!(fetch, found = found.len(), wanted, "widening semantic fetch");
        };
        candidates.truncate(wanted);

        if candidates.is_empty() {
            return Err(ShotpickError::index(format!(
                "none of {searched} semantic hits belong to the shot pool"
            )));
        }
        Ok(candidates)
    }
}

/// Chronological predecessors and successors of `selected`, visited in
/// score order, until `budget` shots have been added.
fn temporal_neighbors(pool: &[Shot], selected: &[usize], budget: usize) -> Vec<usize> {
    let mut timeline: Vec<usize> = (0..pool.len()).collect();
    timeline.sort_by(|&a, &b| {
        pool[a]
            .capture_ts
            .total_cmp(&pool[b].capture_ts)
            .then_with(|| pool[a].id.cmp(&pool[b].id))
    });
    let mut slot = vec![0; pool.len()];
    for (rank, &pos) in timeline.iter().enumerate() {
        slot[pos] = rank;
    }

    let mut taken: AHashSet<usize> = selected.iter().copied().collect();
    let mut added = Vec::new();
    let mut budget = budget;

    for &pos in selected {
        if budget == 0 {
            break;
        }
        let rank = slot[pos];
        let before = rank.checked_sub(1).map(|r| timeline[r]);
        let after = timeline.get(rank + 1).copied();

        for neighbor in [before, after].into_iter().flatten() {
            if budget > 0 && taken.insert(neighbor) {
                added.push(neighbor);
                budget -= 1;
            }
        }
    }
    added
}
