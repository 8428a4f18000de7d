use crate::collection::{Collection, COUNTERS_FILE_NAME};
use crate::{write_atomic, StoreError};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

const JOURNAL_FILE: &str = "journal.json";
const LOCK_FILE: &str = ".lock";

/// Directory layout for the camp data directory.
///
/// Each collection is a single JSON file directly under the root. The
/// counters, journal and lock files live beside them.
#[derive(Debug, Clone)]
pub struct StoreLayout {
    root: PathBuf,
}

impl StoreLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[inline]
    pub fn root(&self) -> &Path {
        &self.root
    }

    #[inline]
    pub fn collection_path(&self, collection: Collection) -> PathBuf {
        self.root.join(collection.file_name())
    }

    #[inline]
    pub fn counters_file(&self) -> PathBuf {
        self.root.join(COUNTERS_FILE_NAME)
    }

    #[inline]
    pub fn journal_file(&self) -> PathBuf {
        self.root.join(JOURNAL_FILE)
    }

    #[inline]
    pub fn lock_file(&self) -> PathBuf {
        self.root.join(LOCK_FILE)
    }

    /// Create the data directory and an empty array for every missing
    /// collection. Existing files are left alone.
    pub fn initialize(&self) -> Result<(), StoreError> {
        fs::create_dir_all(&self.root)?;
        for collection in Collection::ALL {
            let path = self.collection_path(collection);
            if !path.exists() {
                debug!("creating empty collection {}", path.display());
                write_atomic(&path, b"[]")?;
            }
        }
        Ok(())
    }
}
