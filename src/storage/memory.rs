//! In-memory shot store for testing and offline runs.

use std::collections::BTreeMap;

use parking_lot::RwLock;

use crate::error::{Result, ShotpickError};
use crate::shot::{Shot, ShotId, ShotType};
use crate::storage::traits::ShotStore;

/// A [`ShotStore`] holding every shot in a map keyed by id.
#[derive(Debug, Default)]
pub struct MemoryShotStore {
    shots: RwLock<BTreeMap<ShotId, Shot>>,
}

impl MemoryShotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a shot. Ids are unique across stories.
    pub fn insert(&self, shot: Shot) -> Result<()> {
        let mut shots = self.shots.write();
        if shots.contains_key(&shot.id) {
            return Err(ShotpickError::storage(format!(
                "Shot {} already exists",
                shot.id
            )));
        }
        shots.insert(shot.id, shot);
        Ok(())
    }

    /// Store many shots; stops at the first duplicate.
    pub fn insert_many<I>(&self, shots: I) -> Result<()>
    where
        I: IntoIterator<Item = Shot>,
    {
        for shot in shots {
            self.insert(shot)?;
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.shots.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.shots.read().is_empty()
    }

    pub fn clear(&self) {
        self.shots.write().clear();
    }
}

impl ShotStore for MemoryShotStore {
    fn get_shots_by_story(
        &self,
        story_id: &str,
        shot_types: Option<&[ShotType]>,
    ) -> Result<Vec<Shot>> {
        let shots = self.shots.read();
        let mut pool: Vec<Shot> = shots
            .values()
            .filter(|shot| shot.story_id == story_id)
            .filter(|shot| shot_types.is_none_or(|types| types.contains(&shot.shot_type)))
            .cloned()
            .collect();
        pool.sort_by(|a, b| {
            a.capture_ts
                .total_cmp(&b.capture_ts)
                .then_with(|| a.id.cmp(&b.id))
        });
        Ok(pool)
    }

    fn get_shots_by_ids(&self, ids: &[ShotId]) -> Result<Vec<Shot>> {
        let shots = self.shots.read();
        Ok(ids.iter().filter_map(|id| shots.get(id).cloned()).collect())
    }
}
