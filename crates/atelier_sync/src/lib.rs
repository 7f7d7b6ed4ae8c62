//! # Atelier Sync
//!
//! The offline-sync batch protocol and reconciler.
//!
//! Devices edit records while offline, assigning temporary string ids
//! (`temp_`-prefixed) to rows the server has never seen. When connectivity
//! returns, the device submits one [`SyncBatch`] with everything it touched.
//! The [`reconcile`] routine merges the batch into the authoritative tables:
//!
//! - temporary ids always create new rows and are reported back through
//!   [`IdMappings`] so the device can rewrite its local state,
//! - assigned ids update the existing row field-by-field, or create it
//!   verbatim when the device pre-assigned a server-compatible id,
//! - measurement and order rows may reference a client by the temporary id
//!   it carried in the same batch; those references are rewritten to the
//!   freshly assigned server id.
//!
//! The whole batch is one all-or-nothing unit: callers run [`reconcile`]
//! inside [`Store::transaction`](atelier_core::Store::transaction), so any
//! malformed record rolls the entire batch back.
//!
//! Conflict policy is last-write-wins. There are no version vectors and no
//! comparison against the stored row's own modification time.

#![deny(unsafe_code)]
#![warn(missing_docs)]
// Production code MUST NOT use panic!/unwrap()/expect().
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod batch;
mod error;
mod reconciler;

pub use batch::{ClientChange, IdMappings, MeasurementChange, OrderChange, SyncBatch};
pub use error::{SyncError, SyncResult};
pub use reconciler::{last_update, reconcile};
