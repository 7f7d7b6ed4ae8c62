//! The embedded store.
//!
//! All tables live in memory behind one lock; durability comes from a CBOR
//! snapshot written on every committed transaction. This trades write
//! throughput for a store with no external moving parts, which is the right
//! trade for a single shop's records.

mod dir;
mod snapshot;
mod table;
mod tables;

pub use table::Table;
pub use tables::Tables;

use crate::error::{CoreError, CoreResult};
use dir::StoreDir;
use parking_lot::RwLock;
use std::path::Path;

/// The authoritative store for clients, measurements, and orders.
///
/// # Transactions
///
/// [`transaction`](Store::transaction) runs a closure against a working copy
/// of the tables. The copy replaces the live tables only after the snapshot
/// has reached disk; any error (from the closure or from persistence) leaves
/// the store exactly as it was. Two transactions never interleave: the write
/// lock is held for the whole commit.
///
/// # Example
///
/// ```rust,ignore
/// let store = Store::open(Path::new("data"))?;
/// store.transaction(|tables| {
///     let id = tables.clients.allocate_id();
///     tables.clients.insert(id, client);
///     Ok::<_, CoreError>(id)
/// })?;
/// ```
pub struct Store {
    tables: RwLock<Tables>,
    dir: Option<StoreDir>,
}

impl Store {
    /// Opens a store backed by the given data directory.
    ///
    /// Creates the directory if needed, takes its exclusive lock, and loads
    /// the existing snapshot if one is present.
    pub fn open(path: &Path) -> CoreResult<Self> {
        let dir = StoreDir::open(path)?;
        let tables = snapshot::read(&dir)?.unwrap_or_default();

        tracing::info!(
            path = %path.display(),
            clients = tables.clients.len(),
            measurements = tables.measurements.len(),
            orders = tables.orders.len(),
            "opened store"
        );

        Ok(Self {
            tables: RwLock::new(tables),
            dir: Some(dir),
        })
    }

    /// Opens an ephemeral in-memory store.
    ///
    /// Used by tests and by `serve` runs without a data directory.
    pub fn open_in_memory() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            dir: None,
        }
    }

    /// Runs a read-only closure against the tables.
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Tables) -> R,
    {
        f(&self.tables.read())
    }

    /// Runs a closure against a working copy of the tables and commits the
    /// copy if it returns `Ok`.
    ///
    /// On `Err` — from the closure or from persisting the snapshot — the
    /// live tables are untouched.
    pub fn transaction<F, R, E>(&self, f: F) -> Result<R, E>
    where
        F: FnOnce(&mut Tables) -> Result<R, E>,
        E: From<CoreError>,
    {
        let mut live = self.tables.write();
        let mut working = live.clone();

        let result = f(&mut working)?;

        if let Some(dir) = &self.dir {
            snapshot::write(dir, &working).map_err(E::from)?;
        }

        *live = working;
        tracing::debug!("transaction committed");
        Ok(result)
    }
}
