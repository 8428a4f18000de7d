//! File-backed persistence for the hunting camp dashboard.
//!
//! This crate provides the storage layer: the record types (`Stand`, `Hunter`,
//! `ActivityEntry`), `StoreLayout` for the data directory, `CampStore` for
//! whole-collection load/save with atomic per-file writes, a `Journal` that
//! makes multi-collection commits crash-safe, persisted id `Counters`, and
//! `Repository` query helpers over loaded snapshots.

pub mod collection;
pub mod counters;
pub mod journal;
pub mod layout;
pub mod records;
pub mod repo;

pub use collection::{CampStore, Changeset, Collection, Record};
pub use counters::Counters;
pub use journal::{Journal, PendingWrite};
pub use layout::StoreLayout;
pub use records::{
    ActivityEntry, ActivityId, ActivityKind, Hunter, HunterId, HunterProfile, Stand, StandId,
    DEFAULT_PIN,
};
pub use repo::{Keyed, Repository};

use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

/// Fsync a directory to ensure that a preceding `rename()` is durable.
pub(crate) fn fsync_dir(dir: &Path) -> Result<(), std::io::Error> {
    let f = std::fs::File::open(dir)?;
    f.sync_all()
}

/// Replace `path` with `content` via a temp file in the same directory.
///
/// Readers see either the old or the new content, never a mix.
pub(crate) fn write_atomic(path: &Path, content: &[u8]) -> Result<(), StoreError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| StoreError::Io(e.error))?;
    fsync_dir(dir)?;
    Ok(())
}

/// Current UTC time as RFC 3339 with millisecond precision, e.g.
/// `2025-11-02T05:41:07.123Z`.
pub fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("collection file missing: {}", .0.display())]
    Missing(PathBuf),
    #[error("malformed collection file {}: {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("journal rejected: {0}")]
    Journal(String),
    #[error("lock acquisition failed: {0}")]
    LockFailed(String),
}
