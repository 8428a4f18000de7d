use crate::activity::ActivityLog;
use crate::CoreError;
use huntcamp_store::{ActivityEntry, CampStore, Changeset, Counters, Hunter, Repository, Stand};

/// Every persisted collection of the camp, loaded together for one operation.
#[derive(Debug, Clone, Default)]
pub struct CampState {
    pub stands: Repository<Stand>,
    pub hunters: Repository<Hunter>,
    pub activity: ActivityLog,
    pub counters: Counters,
}

impl CampState {
    pub fn new(stands: Vec<Stand>, hunters: Vec<Hunter>, activity: Vec<ActivityEntry>) -> Self {
        let counters = Counters::derive(&stands, &hunters, &activity);
        Self {
            stands: Repository::new(stands),
            hunters: Repository::new(hunters),
            activity: ActivityLog::new(activity),
            counters,
        }
    }

    pub fn load(store: &CampStore) -> Result<Self, CoreError> {
        Ok(Self {
            stands: Repository::new(store.load::<Stand>()?),
            hunters: Repository::new(store.load::<Hunter>()?),
            activity: ActivityLog::new(store.load::<ActivityEntry>()?),
            counters: store.load_counters()?,
        })
    }

    /// Hand the whole state back as one changeset.
    pub fn into_changeset(self) -> Changeset {
        Changeset::new()
            .stands(self.stands.into_inner())
            .hunters(self.hunters.into_inner())
            .activity(self.activity.into_inner())
            .counters(self.counters)
    }
}
