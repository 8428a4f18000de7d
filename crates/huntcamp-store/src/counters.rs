use crate::records::{ActivityEntry, ActivityId, Hunter, HunterId, Stand, StandId};
use serde::{Deserialize, Serialize};

/// Monotonic id counters, persisted beside the collections.
///
/// Ids handed out here are never reused, even after the record holding them
/// is removed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Counters {
    pub next_stand_id: StandId,
    pub next_hunter_id: HunterId,
    pub next_activity_id: ActivityId,
}

impl Default for Counters {
    fn default() -> Self {
        Self {
            next_stand_id: 1,
            next_hunter_id: 1,
            next_activity_id: 1,
        }
    }
}

impl Counters {
    /// Derive counters from existing data, for directories written before
    /// counters were persisted: each counter starts one past the highest id.
    pub fn derive(stands: &[Stand], hunters: &[Hunter], activity: &[ActivityEntry]) -> Self {
        let next = |max: Option<u32>| max.map_or(1, |m| m.saturating_add(1));
        Self {
            next_stand_id: next(stands.iter().map(|s| s.id).max()),
            next_hunter_id: next(hunters.iter().map(|h| h.id).max()),
            next_activity_id: next(activity.iter().map(|a| a.id).max()),
        }
    }

    pub fn allocate_stand(&mut self) -> StandId {
        let id = self.next_stand_id;
        self.next_stand_id += 1;
        id
    }

    pub fn allocate_hunter(&mut self) -> HunterId {
        let id = self.next_hunter_id;
        self.next_hunter_id += 1;
        id
    }

    pub fn allocate_activity(&mut self) -> ActivityId {
        let id = self.next_activity_id;
        self.next_activity_id += 1;
        id
    }
}
