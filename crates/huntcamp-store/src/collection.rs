use crate::counters::Counters;
use crate::journal::{Journal, PendingWrite};
use crate::layout::StoreLayout;
use crate::records::{ActivityEntry, Hunter, Stand};
use crate::{write_atomic, StoreError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::fs;
use tracing::{debug, info};

pub(crate) const COUNTERS_FILE_NAME: &str = "counters.json";

/// The independently persisted entity sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Stands,
    Hunters,
    Activity,
}

impl Collection {
    /// All collections, in commit order.
    pub const ALL: [Collection; 3] = [Collection::Stands, Collection::Hunters, Collection::Activity];

    pub fn file_name(self) -> &'static str {
        match self {
            Collection::Stands => "stands.json",
            Collection::Hunters => "hunters.json",
            Collection::Activity => "activity.json",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Collection::Stands => write!(f, "stands"),
            Collection::Hunters => write!(f, "hunters"),
            Collection::Activity => write!(f, "activity"),
        }
    }
}

/// A record type stored as one JSON array per collection.
pub trait Record: Serialize + DeserializeOwned {
    const COLLECTION: Collection;
}

impl Record for Stand {
    const COLLECTION: Collection = Collection::Stands;
}

impl Record for Hunter {
    const COLLECTION: Collection = Collection::Hunters;
}

impl Record for ActivityEntry {
    const COLLECTION: Collection = Collection::Activity;
}

/// New contents for any subset of the persisted files, committed together.
#[derive(Debug, Default)]
pub struct Changeset {
    stands: Option<Vec<Stand>>,
    hunters: Option<Vec<Hunter>>,
    activity: Option<Vec<ActivityEntry>>,
    counters: Option<Counters>,
}

impl Changeset {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn stands(mut self, stands: Vec<Stand>) -> Self {
        self.stands = Some(stands);
        self
    }

    #[must_use]
    pub fn hunters(mut self, hunters: Vec<Hunter>) -> Self {
        self.hunters = Some(hunters);
        self
    }

    #[must_use]
    pub fn activity(mut self, activity: Vec<ActivityEntry>) -> Self {
        self.activity = Some(activity);
        self
    }

    #[must_use]
    pub fn counters(mut self, counters: Counters) -> Self {
        self.counters = Some(counters);
        self
    }

    /// Serialize into file writes ordered stands, hunters, activity, counters.
    fn into_writes(self) -> Result<Vec<PendingWrite>, StoreError> {
        let mut writes = Vec::with_capacity(4);
        if let Some(stands) = self.stands {
            writes.push(pending(Collection::Stands.file_name(), &stands)?);
        }
        if let Some(hunters) = self.hunters {
            writes.push(pending(Collection::Hunters.file_name(), &hunters)?);
        }
        if let Some(activity) = self.activity {
            writes.push(pending(Collection::Activity.file_name(), &activity)?);
        }
        if let Some(counters) = self.counters {
            writes.push(pending(COUNTERS_FILE_NAME, &counters)?);
        }
        Ok(writes)
    }
}

fn pending<T: Serialize + ?Sized>(file: &str, value: &T) -> Result<PendingWrite, StoreError> {
    Ok(PendingWrite {
        file: file.to_owned(),
        content: serde_json::to_string_pretty(value)?,
    })
}

/// Whole-collection persistence over a [`StoreLayout`].
///
/// Every load reads an entire file and every save replaces one atomically.
/// The store does no locking of its own; callers serialize access.
pub struct CampStore {
    layout: StoreLayout,
    journal: Journal,
}

impl CampStore {
    pub fn new(layout: StoreLayout) -> Self {
        let journal = Journal::new(&layout);
        Self { layout, journal }
    }

    pub fn layout(&self) -> &StoreLayout {
        &self.layout
    }

    /// Prepare the data directory for use: create missing collections,
    /// finish any interrupted commit and make sure counters exist.
    ///
    /// Returns the number of files rewritten by journal recovery.
    pub fn initialize(&self) -> Result<usize, StoreError> {
        self.layout.initialize()?;
        let recovered = self.journal.recover()?;

        if !self.layout.counters_file().exists() {
            let counters = Counters::derive(
                &self.load::<Stand>()?,
                &self.load::<Hunter>()?,
                &self.load::<ActivityEntry>()?,
            );
            info!("deriving id counters for existing data: {counters:?}");
            self.save_counters(&counters)?;
        }
        Ok(recovered)
    }

    /// Complete a commit left half-applied by an earlier failure.
    ///
    /// Returns the number of files rewritten.
    pub fn recover(&self) -> Result<usize, StoreError> {
        self.journal.recover()
    }

    pub fn load<T: Record>(&self) -> Result<Vec<T>, StoreError> {
        let path = self.layout.collection_path(T::COLLECTION);
        if !path.exists() {
            return Err(StoreError::Missing(path));
        }
        let content = fs::read_to_string(&path)?;
        serde_json::from_str(&content).map_err(|source| StoreError::Malformed { path, source })
    }

    /// Fully overwrite one collection.
    pub fn save<T: Record>(&self, records: &[T]) -> Result<(), StoreError> {
        let path = self.layout.collection_path(T::COLLECTION);
        let content = serde_json::to_string_pretty(records)?;
        write_atomic(&path, content.as_bytes())?;
        debug!("saved {} {} records", records.len(), T::COLLECTION);
        Ok(())
    }

    pub fn load_counters(&self) -> Result<Counters, StoreError> {
        let path = self.layout.counters_file();
        if !path.exists() {
            return Err(StoreError::Missing(path));
        }
        let content = fs::read_to_string(&path)?;
        serde_json::from_str(&content).map_err(|source| StoreError::Malformed { path, source })
    }

    pub fn save_counters(&self, counters: &Counters) -> Result<(), StoreError> {
        let content = serde_json::to_string_pretty(counters)?;
        write_atomic(&self.layout.counters_file(), content.as_bytes())
    }

    /// Persist every file in `changes` as one unit.
    ///
    /// A single-file change is written directly. Larger changes go through
    /// the journal so that a crash part-way leaves a commit that
    /// [`initialize`](Self::initialize) completes.
    pub fn commit(&self, changes: Changeset) -> Result<(), StoreError> {
        let writes = changes.into_writes()?;
        match writes.len() {
            0 => Ok(()),
            1 => self.journal.apply(&writes),
            n => {
                self.journal.begin(&writes)?;
                self.journal.apply(&writes)?;
                self.journal.clear()?;
                debug!("committed {n} files");
                Ok(())
            }
        }
    }
}
