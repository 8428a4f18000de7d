use crate::activity::{ActivityLog, Event};
use crate::admin::{self, NewHunter};
use crate::concurrency::CampLock;
use crate::occupancy::{self, CheckIn, CheckOut};
use crate::state::CampState;
use crate::CoreError;
use huntcamp_store::{
    now_timestamp, ActivityEntry, ActivityKind, CampStore, Hunter, HunterId, HunterProfile,
    Repository, Stand, StandId, StoreLayout,
};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// The camp dashboard backend over one data directory.
///
/// Each method is a self-contained cycle: acquire the camp lock, load the
/// collections it needs, apply the change, commit, release. Reads take the
/// lock too, so they never interleave with a commit in progress.
///
/// A commit that fails part-way leaves its journal behind. The next
/// operation completes it under the lock before loading anything.
pub struct Camp {
    store: CampStore,
}

impl Camp {
    /// Open (and if needed create) the data directory.
    ///
    /// An interrupted commit from a previous run is completed first.
    pub fn open(data_dir: impl Into<PathBuf>) -> Result<Self, CoreError> {
        let layout = StoreLayout::new(data_dir);
        let store = CampStore::new(layout);
        {
            let _lock = CampLock::acquire(&store.layout().lock_file())?;
            let recovered = store.initialize()?;
            if recovered > 0 {
                info!("completed interrupted commit ({recovered} files)");
            }
        }
        debug!("camp data directory: {}", store.layout().root().display());
        Ok(Self { store })
    }

    fn lock(&self) -> Result<CampLock, CoreError> {
        let lock = CampLock::acquire(&self.store.layout().lock_file())?;
        let recovered = self.store.recover()?;
        if recovered > 0 {
            warn!("completed interrupted commit ({recovered} files)");
        }
        Ok(lock)
    }

    /// Run `f` against the full state and commit it if `f` succeeds.
    fn mutate<T>(
        &self,
        f: impl FnOnce(&mut CampState) -> Result<T, CoreError>,
    ) -> Result<T, CoreError> {
        let _lock = self.lock()?;
        let mut state = CampState::load(&self.store)?;
        let out = f(&mut state)?;
        self.store.commit(state.into_changeset())?;
        Ok(out)
    }

    pub fn stands(&self) -> Result<Vec<Stand>, CoreError> {
        let _lock = self.lock()?;
        Ok(self.store.load::<Stand>()?)
    }

    /// All hunters, without pins.
    pub fn hunters(&self) -> Result<Vec<HunterProfile>, CoreError> {
        let _lock = self.lock()?;
        let hunters = self.store.load::<Hunter>()?;
        Ok(hunters.iter().map(Hunter::profile).collect())
    }

    pub fn login(&self, name: &str, pin: &str) -> Result<HunterProfile, CoreError> {
        let _lock = self.lock()?;
        let hunters = Repository::new(self.store.load::<Hunter>()?);
        admin::login(&hunters, name, pin)
    }

    pub fn check_in(&self, hunter_id: HunterId, stand_id: StandId) -> Result<CheckIn, CoreError> {
        self.mutate(|state| occupancy::check_in(state, hunter_id, stand_id, &now_timestamp()))
    }

    pub fn check_out(&self, hunter_id: HunterId) -> Result<CheckOut, CoreError> {
        self.mutate(|state| occupancy::check_out(state, hunter_id, &now_timestamp()))
    }

    /// Up to `n` most recent activity entries, newest first.
    pub fn recent_activity(&self, n: usize) -> Result<Vec<ActivityEntry>, CoreError> {
        let _lock = self.lock()?;
        let log = ActivityLog::new(self.store.load::<ActivityEntry>()?);
        Ok(log.recent(n).into_iter().cloned().collect())
    }

    /// Log a sighting or harvest for a hunter. `kind` defaults to sighting.
    pub fn log_event(
        &self,
        hunter_id: HunterId,
        kind: Option<&str>,
        description: Option<&str>,
    ) -> Result<ActivityEntry, CoreError> {
        let kind = match kind {
            None => ActivityKind::Sighting,
            Some(s) => match ActivityKind::parse(s) {
                Some(k @ (ActivityKind::Sighting | ActivityKind::Harvest)) => k,
                _ => {
                    return Err(CoreError::Validation(format!(
                        "activity type must be sighting or harvest, got '{s}'"
                    )))
                }
            },
        };
        self.mutate(|state| {
            let hunter = state
                .hunters
                .find_by_id(hunter_id)
                .ok_or(CoreError::HunterNotFound(hunter_id))?
                .name
                .clone();
            let entry = state
                .activity
                .record(
                    &mut state.counters,
                    Event {
                        kind,
                        hunter: &hunter,
                        stand: None,
                        description,
                    },
                    &now_timestamp(),
                )
                .clone();
            info!("{hunter} logged a {}", entry.kind);
            Ok(entry)
        })
    }

    pub fn add_hunter(&self, new: NewHunter) -> Result<HunterProfile, CoreError> {
        self.mutate(|state| admin::add_hunter(state, new))
    }

    /// Returns whether a hunter with that id existed.
    pub fn remove_hunter(&self, hunter_id: HunterId) -> Result<bool, CoreError> {
        self.mutate(|state| Ok(admin::remove_hunter(state, hunter_id).is_some()))
    }

    pub fn rename_stand(&self, stand_id: StandId, name: &str) -> Result<Stand, CoreError> {
        self.mutate(|state| admin::rename_stand(state, stand_id, name))
    }

    pub fn add_stand(&self, name: &str) -> Result<Stand, CoreError> {
        self.mutate(|state| admin::add_stand(state, name))
    }
}
