//! CBOR snapshot encoding.

use crate::error::{CoreError, CoreResult};
use crate::store::dir::StoreDir;
use crate::store::tables::Tables;
use std::fs::File;
use std::io::{BufReader, BufWriter};

/// Writes the full table set to the snapshot file.
///
/// The snapshot is written to a scratch file first and renamed into place,
/// so a crash mid-write leaves the previous snapshot intact.
pub fn write(dir: &StoreDir, tables: &Tables) -> CoreResult<()> {
    let temp_path = dir.snapshot_temp_path();
    let file = File::create(&temp_path)?;
    let mut writer = BufWriter::new(file);

    ciborium::ser::into_writer(tables, &mut writer)
        .map_err(|e| CoreError::snapshot(e.to_string()))?;

    let file = writer
        .into_inner()
        .map_err(|e| CoreError::snapshot(e.to_string()))?;
    file.sync_all()?;

    std::fs::rename(&temp_path, dir.snapshot_path())?;
    Ok(())
}

/// Reads the table set back from the snapshot file.
///
/// Returns `None` when no snapshot exists yet (a fresh directory).
pub fn read(dir: &StoreDir) -> CoreResult<Option<Tables>> {
    let path = dir.snapshot_path();
    if !path.exists() {
        return Ok(None);
    }

    let file = File::open(&path)?;
    let reader = BufReader::new(file);
    let tables =
        ciborium::de::from_reader(reader).map_err(|e| CoreError::snapshot(e.to_string()))?;
    Ok(Some(tables))
}
