use crate::collection::Collection;
use crate::layout::StoreLayout;
use crate::{write_atomic, StoreError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// One file replacement within a multi-file commit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PendingWrite {
    /// File name relative to the data directory.
    pub file: String,
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct JournalEntry {
    created_at: String,
    writes: Vec<PendingWrite>,
    checksum: String,
}

fn checksum(writes: &[PendingWrite]) -> Result<String, StoreError> {
    let json = serde_json::to_vec(writes)?;
    Ok(blake3::hash(&json).to_hex().to_string())
}

/// Roll-forward journal for commits that touch several collection files.
///
/// The full new content of every file is recorded before any collection
/// is replaced. A commit interrupted after [`begin`](Self::begin) is
/// completed by [`recover`](Self::recover) on the next open, so the
/// collections never stay half-updated.
pub struct Journal {
    root: PathBuf,
    path: PathBuf,
}

impl Journal {
    pub fn new(layout: &StoreLayout) -> Self {
        Self {
            root: layout.root().to_path_buf(),
            path: layout.journal_file(),
        }
    }

    /// Record the pending writes durably.
    pub fn begin(&self, writes: &[PendingWrite]) -> Result<(), StoreError> {
        let entry = JournalEntry {
            created_at: crate::now_timestamp(),
            writes: writes.to_vec(),
            checksum: checksum(writes)?,
        };
        let content = serde_json::to_vec_pretty(&entry)?;
        write_atomic(&self.path, &content)?;
        debug!("journal begin: {} files", writes.len());
        Ok(())
    }

    /// Replace each target file in order.
    pub fn apply(&self, writes: &[PendingWrite]) -> Result<(), StoreError> {
        for write in writes {
            if !is_known_file(&write.file) {
                return Err(StoreError::Journal(format!(
                    "unknown target file '{}'",
                    write.file
                )));
            }
            write_atomic(&self.root.join(&write.file), write.content.as_bytes())?;
        }
        Ok(())
    }

    /// Remove the journal after a successful apply.
    pub fn clear(&self) -> Result<(), StoreError> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
            debug!("journal cleared");
        }
        Ok(())
    }

    /// Complete an interrupted commit. Returns the number of files rewritten.
    ///
    /// A journal that fails to parse or whose checksum does not match was
    /// never fully written; the collections were not touched yet, so it is
    /// discarded.
    pub fn recover(&self) -> Result<usize, StoreError> {
        if !self.path.exists() {
            return Ok(0);
        }
        let content = fs::read_to_string(&self.path)?;
        let entry: JournalEntry = match serde_json::from_str(&content) {
            Ok(e) => e,
            Err(e) => {
                warn!("discarding unreadable journal {}: {e}", self.path.display());
                self.clear()?;
                return Ok(0);
            }
        };
        if checksum(&entry.writes)? != entry.checksum {
            warn!(
                "discarding journal from {} with checksum mismatch",
                entry.created_at
            );
            self.clear()?;
            return Ok(0);
        }

        info!(
            "journal recovery: rolling forward {} files from {}",
            entry.writes.len(),
            entry.created_at
        );
        self.apply(&entry.writes)?;
        self.clear()?;
        Ok(entry.writes.len())
    }
}

fn is_known_file(name: &str) -> bool {
    name == crate::collection::COUNTERS_FILE_NAME
        || Collection::ALL.iter().any(|c| c.file_name() == name)
}
