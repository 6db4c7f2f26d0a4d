use crate::generator::GenerateError;
use crate::data::Placement;
use log::info;
use std::collections::HashSet;

/// The persisted timetable: the placement set from the most recent
/// successful generation run.
///
/// Replacement is all-or-nothing. The candidate list is validated in full
/// before the stored list is touched, and the swap itself is a single
/// assignment, so a reader holding the store never observes a mix of old
/// and new placements or a transiently empty store.
#[derive(Debug, Default)]
pub struct PlacementStore {
    placements: Vec<Placement>,
}

impl PlacementStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The currently persisted solution.
    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    /// Discards the prior solution and persists `new` as a unit.
    ///
    /// A candidate list that books the same group twice in one slot is the
    /// mark of an upstream bug; it is rejected with
    /// [`GenerateError::Storage`] and the prior solution stays intact.
    pub fn replace(&mut self, new: Vec<Placement>) -> Result<(), GenerateError> {
        let mut seen = HashSet::with_capacity(new.len());
        for p in &new {
            if !seen.insert((p.slot, p.group_id)) {
                return Err(GenerateError::Storage(format!(
                    "duplicate placement for group {} at {}",
                    p.group_id, p.slot
                )));
            }
        }
        info!(
            "Replacing {} stored placements with {}.",
            self.placements.len(),
            new.len()
        );
        self.placements = new;
        Ok(())
    }
}
