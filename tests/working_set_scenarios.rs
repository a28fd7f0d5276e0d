use std::collections::HashSet;
use std::sync::Arc;

use shotpick::embedding::{HashingEmbedder, PrecomputedEmbedder, TextEmbedder};
use shotpick::error::{Result, ShotpickError};
use shotpick::shot::{Shot, ShotId, ShotType};
use shotpick::storage::{MemoryShotStore, ShotStore};
use shotpick::vector::{IndexConfig, MultimodalIndex, SharedIndex};
use shotpick::working_set::{ScoringMode, WorkingSet, WorkingSetBuilder, WorkingSetConfig};

const DIM: usize = 256;

struct Take {
    id: ShotId,
    ts: f64,
    transcript: &'static str,
    shot_type: ShotType,
    has_face: bool,
    duration_ms: u64,
}

const RALLY: [Take; 8] = [
    Take { id: 1, ts: 0.0, transcript: "crowd gathers outside parliament", shot_type: ShotType::GeneralView, has_face: false, duration_ms: 2_000 },
    Take { id: 2, ts: 60.0, transcript: "protest march through the city centre", shot_type: ShotType::GeneralView, has_face: false, duration_ms: 5_000 },
    Take { id: 3, ts: 120.0, transcript: "minister statement on the protest", shot_type: ShotType::OnCameraStatement, has_face: true, duration_ms: 6_000 },
    Take { id: 4, ts: 180.0, transcript: "police line at the square", shot_type: ShotType::Cutaway, has_face: false, duration_ms: 1_500 },
    Take { id: 5, ts: 240.0, transcript: "march reaches the square", shot_type: ShotType::GeneralView, has_face: false, duration_ms: 12_000 },
    Take { id: 6, ts: 300.0, transcript: "interview with organiser", shot_type: ShotType::OnCameraStatement, has_face: true, duration_ms: 6_000 },
    Take { id: 7, ts: 360.0, transcript: "empty street at dusk", shot_type: ShotType::GeneralView, has_face: false, duration_ms: 2_000 },
    Take { id: 8, ts: 420.0, transcript: "traffic resumes", shot_type: ShotType::GeneralView, has_face: false, duration_ms: 2_000 },
];

fn shot(take: &Take, story: &str, embedder: &HashingEmbedder, embed: bool) -> Result<Shot> {
    let mut builder = Shot::builder(take.id, story)
        .capture_ts(take.ts)
        .transcript(take.transcript)
        .shot_type(take.shot_type)
        .has_face(take.has_face)
        .duration_ms(take.duration_ms);
    if embed {
        builder = builder.text_embedding(embedder.embed_one(take.transcript)?);
    }
    Ok(builder.build())
}

/// A rally story plus one unrelated story whose shot sits in the same index.
/// Only shots whose id passes `embed` get a text embedding.
fn fixture(embed: impl Fn(ShotId) -> bool) -> Result<(Arc<MemoryShotStore>, SharedIndex)> {
    let embedder = HashingEmbedder::new(DIM)?;
    let mut shots = RALLY
        .iter()
        .map(|take| shot(take, "rally", &embedder, embed(take.id)))
        .collect::<Result<Vec<_>>>()?;
    shots.push(shot(
        &Take {
            id: 100,
            ts: 10.0,
            transcript: "protest march over the budget",
            shot_type: ShotType::GeneralView,
            has_face: false,
            duration_ms: 4_000,
        },
        "budget",
        &embedder,
        true,
    )?);

    let index = MultimodalIndex::new(&IndexConfig::default().with_dimensions(DIM, 8))?.into_shared();
    index.write().add_shots(&shots)?;

    let store = Arc::new(MemoryShotStore::new());
    store.insert_many(shots)?;
    Ok((store, index))
}

fn builder_with(
    store: Arc<dyn ShotStore>,
    embedder: Arc<dyn TextEmbedder>,
    index: SharedIndex,
) -> Result<WorkingSetBuilder> {
    WorkingSetBuilder::new(store, embedder, index, WorkingSetConfig::default())
}

fn hashing_builder(store: Arc<MemoryShotStore>, index: SharedIndex) -> Result<WorkingSetBuilder> {
    builder_with(store, Arc::new(HashingEmbedder::new(DIM)?), index)
}

fn assert_well_formed(ws: &WorkingSet, story: &str, max_shots: usize) {
    assert!(ws.len() <= max_shots);
    let unique: HashSet<ShotId> = ws.ids().into_iter().collect();
    assert_eq!(unique.len(), ws.len(), "duplicate shots in {:?}", ws.ids());
    assert!(ws.shots.iter().all(|shot| shot.story_id == story));
    assert!(ws.shots.windows(2).all(|pair| pair[0].capture_ts <= pair[1].capture_ts));
    assert_eq!(
        ws.total_duration_ms,
        ws.shots.iter().map(|shot| shot.duration_ms).sum::<u64>()
    );
    assert_eq!(ws.shot_type_counts.values().sum::<usize>(), ws.len());
}

fn best(ws: &WorkingSet) -> Option<ShotId> {
    ws.scores
        .iter()
        .max_by(|a, b| a.1.final_score.total_cmp(&b.1.final_score))
        .map(|(id, _)| *id)
}

#[test]
fn hybrid_scoring_ranks_semantic_matches_first() -> Result<()> {
    let (store, index) = fixture(|_| true)?;
    let builder = hashing_builder(store, index)?;

    let ws = builder.build_for_query("rally", "protest march", 3, None, false)?;
    assert_well_formed(&ws, "rally", 3);
    assert_eq!(ws.mode, ScoringMode::Hybrid);
    assert_eq!(ws.len(), 3);
    assert_eq!(best(&ws), Some(2));
    assert!(ws.neighbor_ids.is_empty());
    // The other story's shot is in the index but never in the working set.
    assert!(!ws.ids().contains(&100));

    for score in ws.scores.values() {
        assert!((0.0..=1.0).contains(&score.semantic));
        assert!(score.final_score <= 1.0 + 1e-6);
    }
    Ok(())
}

/// Ten exact matches from another story outrank every rally shot in the
/// shared index, so the first fetch holds no pool members.
#[test]
fn crowded_shared_index_still_scores_semantically() -> Result<()> {
    let embedder = HashingEmbedder::new(DIM)?;
    let rally = ["protest crowd gathers", "protest banners at noon", "protest disperses"];
    let mut shots = Vec::new();
    for (i, text) in rally.iter().enumerate() {
        shots.push(
            Shot::builder(i as u64 + 1, "rally")
                .capture_ts(i as f64 * 60.0)
                .transcript(*text)
                .text_embedding(embedder.embed_one(text)?)
                .build(),
        );
    }
    for id in 101..=110 {
        shots.push(
            Shot::builder(id, "other")
                .capture_ts(id as f64)
                .transcript("protest march")
                .text_embedding(embedder.embed_one("protest march")?)
                .build(),
        );
    }

    let index = MultimodalIndex::new(&IndexConfig::default().with_dimensions(DIM, 8))?.into_shared();
    index.write().add_shots(&shots)?;
    let store = Arc::new(MemoryShotStore::new());
    store.insert_many(shots)?;

    let builder = hashing_builder(store, index)?;
    let ws = builder.build_for_query("rally", "protest march", 2, None, false)?;
    assert_eq!(ws.mode, ScoringMode::Hybrid);
    assert_eq!(ws.len(), 2);
    assert_well_formed(&ws, "rally", 2);
    assert!(ws.scores.values().all(|score| score.semantic > 0.0));
    Ok(())
}

#[test]
fn embedder_failure_switches_to_keyword_fallback() -> Result<()> {
    let (store, index) = fixture(|_| true)?;
    let builder = builder_with(store, Arc::new(PrecomputedEmbedder::new(DIM)), index)?;

    let ws = builder.build_for_query("rally", "protest march", 2, None, true)?;
    assert_well_formed(&ws, "rally", 2);
    assert_eq!(ws.mode, ScoringMode::KeywordFallback);
    // 10 * 1/6 + 2 + 1 + 1 for the statement beats 10 * 2/6 + 1 for the march.
    assert_eq!(best(&ws), Some(3));
    assert_eq!(ws.ids(), vec![2, 3]);
    assert!((ws.relevance(2) - (10.0 / 3.0 + 1.0)).abs() < 1e-4);
    Ok(())
}

#[test]
fn dimension_mismatch_switches_to_keyword_fallback() -> Result<()> {
    let (store, index) = fixture(|_| true)?;
    let builder = builder_with(store, Arc::new(HashingEmbedder::new(32)?), index)?;

    let ws = builder.build_for_query("rally", "protest march", 5, None, false)?;
    assert_eq!(ws.mode, ScoringMode::KeywordFallback);
    assert_eq!(ws.len(), 5);
    Ok(())
}

#[test]
fn no_candidates_in_pool_switches_to_keyword_fallback() -> Result<()> {
    let (store, index) = fixture(|_| false)?;
    let builder = hashing_builder(store, index)?;

    // Only the budget story's shot is indexed.
    let ws = builder.build_for_query("rally", "protest march", 4, None, false)?;
    assert_eq!(ws.mode, ScoringMode::KeywordFallback);
    assert_well_formed(&ws, "rally", 4);
    Ok(())
}

#[test]
fn neighbors_fill_the_remaining_budget() -> Result<()> {
    let (store, index) = fixture(|id| id == 5)?;
    let builder = hashing_builder(store, index)?;

    let ws = builder.build_for_query("rally", "protest march", 3, None, true)?;
    assert_eq!(ws.mode, ScoringMode::Hybrid);
    assert_well_formed(&ws, "rally", 3);
    assert_eq!(ws.ids(), vec![4, 5, 6]);
    assert_eq!(ws.neighbor_ids.iter().copied().collect::<Vec<_>>(), vec![4, 6]);
    assert_eq!(ws.relevance(4), 0.0);
    assert!(ws.relevance(5) > 0.0);
    assert!(ws.neighbor_ids.iter().all(|id| !ws.scores.contains_key(id)));

    let without = builder.build_for_query("rally", "protest march", 3, None, false)?;
    assert_eq!(without.ids(), vec![5]);
    Ok(())
}

#[test]
fn shot_type_filter_restricts_the_pool() -> Result<()> {
    let (store, index) = fixture(|_| true)?;
    let builder = hashing_builder(store, index)?;

    let statements = [ShotType::OnCameraStatement];
    let ws = builder.build_for_query("rally", "protest", 10, Some(&statements), true)?;
    assert_eq!(ws.ids(), vec![3, 6]);
    assert_eq!(ws.shot_type_counts.get(&ShotType::OnCameraStatement), Some(&2));
    Ok(())
}

#[test]
fn beat_working_sets_carry_their_context() -> Result<()> {
    let (store, index) = fixture(|_| true)?;
    let builder = hashing_builder(store, index)?;

    let requirements = vec!["protest".to_string(), "crowd".to_string()];
    let ws = builder.build_for_beat("rally", "Marchers reach the square", &requirements, None)?;
    assert_well_formed(&ws, "rally", builder.config().beat_max_shots);
    assert_eq!(ws.query, "Marchers reach the square. Requirements: protest, crowd");
    assert!(ws.neighbor_ids.is_empty());

    let beat = ws.beat.as_ref().map(|beat| (beat.description.as_str(), beat.requirements.len()));
    assert_eq!(beat, Some(("Marchers reach the square", 2)));

    let small = builder.build_for_beat("rally", "Marchers", &[], Some(2))?;
    assert_eq!(small.query, "Marchers");
    assert!(small.len() <= 2);
    Ok(())
}

#[test]
fn empty_pools_and_zero_budgets() -> Result<()> {
    let (store, index) = fixture(|_| true)?;
    let builder = hashing_builder(store, index)?;

    let unknown = builder.build_for_query("no-such-story", "protest", 10, None, true)?;
    assert!(unknown.is_empty());
    assert_eq!(unknown.story_id, "no-such-story");

    let zero = builder.build_for_query("rally", "protest", 0, None, true)?;
    assert!(zero.is_empty());

    let default_size = builder.build("rally", "protest")?;
    assert_eq!(default_size.len(), RALLY.len());
    Ok(())
}

struct UnreachableStore;

impl ShotStore for UnreachableStore {
    fn get_shots_by_story(
        &self,
        _story_id: &str,
        _shot_types: Option<&[ShotType]>,
    ) -> Result<Vec<Shot>> {
        Err(anyhow::anyhow!("connection refused").into())
    }

    fn get_shots_by_ids(&self, _ids: &[ShotId]) -> Result<Vec<Shot>> {
        Err(ShotpickError::storage("connection refused"))
    }
}

#[test]
fn invalid_config_is_rejected() -> Result<()> {
    let (store, index) = fixture(|_| true)?;
    let config = WorkingSetConfig::default().with_candidate_multiplier(0);
    let result = WorkingSetBuilder::new(store, Arc::new(HashingEmbedder::new(DIM)?), index, config);
    assert!(matches!(result, Err(ShotpickError::InvalidConfig(_))));
    Ok(())
}

#[test]
fn storage_failures_propagate() -> Result<()> {
    let index = MultimodalIndex::new(&IndexConfig::default().with_dimensions(DIM, 8))?.into_shared();
    let builder = builder_with(
        Arc::new(UnreachableStore),
        Arc::new(HashingEmbedder::new(DIM)?),
        index,
    )?;

    let result = builder.build_for_query("rally", "protest", 5, None, true);
    assert!(matches!(result, Err(ShotpickError::Anyhow(_))));

    let beat = builder.build_for_beat("rally", "protest", &[], None);
    assert!(beat.is_err());
    assert!(UnreachableStore.get_shot(1).is_err());
    Ok(())
}
