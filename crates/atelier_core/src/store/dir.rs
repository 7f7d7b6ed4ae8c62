//! Data directory management.
//!
//! File system layout:
//!
//! ```text
//! <data_dir>/
//! ├─ LOCK          # Advisory lock for single-writer access
//! ├─ state.cbor    # CBOR snapshot of all tables
//! └─ state.cbor.tmp# Scratch file for atomic snapshot writes
//! ```
//!
//! The `LOCK` file ensures only one process writes to the store at a time.

use crate::error::{CoreError, CoreResult};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

const LOCK_FILE: &str = "LOCK";
const SNAPSHOT_FILE: &str = "state.cbor";
const SNAPSHOT_TEMP: &str = "state.cbor.tmp";

/// Holds the data directory and its exclusive lock.
///
/// The lock is released when the value is dropped.
#[derive(Debug)]
pub struct StoreDir {
    path: PathBuf,
    _lock_file: File,
}

impl StoreDir {
    /// Opens or creates a data directory and takes its exclusive lock.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::StoreLocked`] if another process holds the
    /// lock, or an I/O error if the directory cannot be created.
    pub fn open(path: &Path) -> CoreResult<Self> {
        if !path.exists() {
            fs::create_dir_all(path)?;
        }

        let lock_path = path.join(LOCK_FILE);
        let lock_file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)?;

        lock_file
            .try_lock_exclusive()
            .map_err(|_| CoreError::StoreLocked)?;

        Ok(Self {
            path: path.to_path_buf(),
            _lock_file: lock_file,
        })
    }

    /// Path of the data directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path of the snapshot file.
    pub fn snapshot_path(&self) -> PathBuf {
        self.path.join(SNAPSHOT_FILE)
    }

    /// Path of the temporary file used for atomic snapshot writes.
    pub fn snapshot_temp_path(&self) -> PathBuf {
        self.path.join(SNAPSHOT_TEMP)
    }
}
