// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cross-process mutual exclusion for shared documents (recovery memory,
//! release evidence, the controller queue) via OS advisory file locks.
//!
//! This is a plain blocking-with-bounded-retry mutex, distinct from the
//! lease lock in `lease.rs`: it has no TTL and no payload, it just
//! serializes writers to one file path for the duration of a closure.

use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use crate::errors::StorageError;

/// Default bound on how long a caller waits for contended shared documents
/// (recovery memory, release evidence) before giving up.
const DEFAULT_MAX_WAIT: Duration = Duration::from_secs(5);
const RETRY_INTERVAL: Duration = Duration::from_millis(20);

/// A held exclusive lock on a `.lock` sidecar file. Released on drop.
pub struct FileLock {
    _file: File,
    path: PathBuf,
}

impl FileLock {
    /// Block (with bounded retry) until the lock at `path` is acquired.
    pub fn acquire(path: &Path) -> Result<Self, StorageError> {
        Self::acquire_with_timeout(path, DEFAULT_MAX_WAIT)
    }

    pub fn acquire_with_timeout(path: &Path, max_wait: Duration) -> Result<Self, StorageError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        let deadline = Instant::now() + max_wait;
        loop {
            match file.try_lock_exclusive() {
                Ok(()) => {
                    return Ok(Self {
                        _file: file,
                        path: path.to_owned(),
                    })
                }
                Err(_) if Instant::now() < deadline => {
                    thread::sleep(RETRY_INTERVAL);
                }
                Err(_) => {
                    return Err(StorageError::Locked {
                        path: path.to_owned(),
                    })
                }
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self._file);
    }
}

/// Run `f` while holding the exclusive lock at `lock_path`.
pub fn with_lock<T>(
    lock_path: &Path,
    f: impl FnOnce() -> Result<T, StorageError>,
) -> Result<T, StorageError> {
    let _guard = FileLock::acquire(lock_path)?;
    f()
}

#[cfg(test)]
#[path = "filelock_tests.rs"]
mod tests;
