//! Storage collaborator contract.

use crate::error::Result;
use crate::shot::{Shot, ShotId, ShotType};

/// Source of shot records for a story.
///
/// A failed fetch must surface as an error: an empty `Ok` vector means the
/// story has no matching shots, which callers treat differently.
pub trait ShotStore: Send + Sync {
    /// All shots of a story, ordered by capture time, optionally restricted
    /// to the given shot types.
    fn get_shots_by_story(
        &self,
        story_id: &str,
        shot_types: Option<&[ShotType]>,
    ) -> Result<Vec<Shot>>;

    /// Shots with the given ids. Unknown ids are skipped.
    fn get_shots_by_ids(&self, ids: &[ShotId]) -> Result<Vec<Shot>>;

    /// A single shot, if present.
    fn get_shot(&self, id: ShotId) -> Result<Option<Shot>> {
        Ok(self.get_shots_by_ids(&[id])?.into_iter().next())
    }
}
