use crate::CoreError;
use fs2::FileExt;
use huntcamp_store::StoreError;
use std::fs::{File, OpenOptions};
use std::path::Path;

/// Exclusive advisory lock on the camp data directory.
///
/// Held for the whole load-mutate-commit cycle of every [`Camp`](crate::Camp)
/// operation, so two check-ins can never both observe a free stand. Each
/// acquisition opens its own file handle, which makes the lock exclusive
/// between threads of one process as well as between processes.
pub struct CampLock {
    lock_file: File,
}

impl CampLock {
    pub fn acquire(lock_path: &Path) -> Result<Self, CoreError> {
        let file = open_lock_file(lock_path)?;
        file.lock_exclusive().map_err(|e| {
            StoreError::LockFailed(format!("{}: {e}", lock_path.display()))
        })?;
        Ok(Self { lock_file: file })
    }
}

fn open_lock_file(lock_path: &Path) -> Result<File, CoreError> {
    if let Some(parent) = lock_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    Ok(OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(false)
        .open(lock_path)?)
}

impl Drop for CampLock {
    fn drop(&mut self) {
        let _ = self.lock_file.unlock();
    }
}
