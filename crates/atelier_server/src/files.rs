//! Local file storage for uploaded measurement photos.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Stores uploaded files under a single directory.
///
/// Stored names are `<client_id>_<uuid>_<sanitized original name>`, so they
/// are unique, traceable to a client, and free of path separators.
#[derive(Debug)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Opens the store, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Root directory of the store.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Saves bytes under a fresh unique name and returns the stored name.
    ///
    /// The file handle is flushed and closed on every exit path.
    pub fn save(&self, client_id: i64, original_name: &str, bytes: &[u8]) -> io::Result<String> {
        let name = format!(
            "{client_id}_{}_{}",
            Uuid::new_v4().simple(),
            sanitize(original_name)
        );
        let path = self.root.join(&name);

        let mut file = File::create(&path)?;
        file.write_all(bytes)?;
        file.sync_all()?;

        tracing::debug!(name = %name, size = bytes.len(), "stored upload");
        Ok(name)
    }

    /// Deletes a stored file by name. Missing files are not an error.
    pub fn delete(&self, name: &str) -> io::Result<()> {
        let path = self.root.join(sanitize(name));
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// Absolute path of a stored file.
    pub fn path_of(&self, name: &str) -> PathBuf {
        self.root.join(sanitize(name))
    }
}

/// Reduces a caller-supplied file name to a safe flat name.
///
/// Keeps ASCII alphanumerics, `.`, `-`, and `_`; everything else (path
/// separators included) becomes `_`.
fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
