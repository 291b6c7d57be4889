//! Directory-scoped advisory locking for appends.
//!
//! All writers to a storage directory serialize on a single lock file,
//! regardless of which of the three logs they target. The coarse scope
//! keeps write ordering simple and rules out lock-ordering deadlocks.
//! Readers never take the lock.

use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use tracing::debug;

use crate::error::Result;

/// Name of the lock-coordination file inside the storage directory.
pub const LOCK_FILE_NAME: &str = "lock.splitlog";

/// Advisory lock bound to one storage directory.
///
/// Owned as a field of the storage engine instance; each `acquire` opens
/// its own descriptor, so exclusion holds across threads of one process
/// as well as across processes. The OS drops the flock if the holder
/// dies, so a crash never leaves the lock poisoned.
#[derive(Debug, Clone)]
pub struct DirLock {
    lock_path: PathBuf,
}

impl DirLock {
    /// Bind a lock to the given storage directory.
    #[must_use]
    pub fn new(directory: &Path) -> Self {
        Self {
            lock_path: directory.join(LOCK_FILE_NAME),
        }
    }

    /// Acquire the lock, blocking indefinitely until it is free.
    ///
    /// Creates the lock file if it does not exist. The returned guard
    /// releases the lock on drop, on every exit path.
    pub fn acquire(&self) -> Result<DirLockGuard> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.lock_path)?;

        file.lock_exclusive()?;
        debug!(lock = %self.lock_path.display(), "acquired append lock");

        Ok(DirLockGuard {
            file,
            lock_path: self.lock_path.clone(),
        })
    }

    /// Path of the lock file this lock coordinates on.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.lock_path
    }
}

/// An acquired append lock. Released automatically on drop.
pub struct DirLockGuard {
    file: std::fs::File,
    lock_path: PathBuf,
}

impl Drop for DirLockGuard {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
        debug!(lock = %self.lock_path.display(), "released append lock");
    }
}
