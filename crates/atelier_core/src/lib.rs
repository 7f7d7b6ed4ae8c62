//! # Atelier Core
//!
//! Domain model and embedded store for the Atelier couture-shop backend.
//!
//! This crate provides:
//! - The three domain entities: [`Client`], [`Measurement`], [`Order`]
//! - Record identity ([`RecordId`]): server-assigned integers or
//!   client-generated temporary tokens
//! - An embedded, snapshot-persisted [`Store`] with transactional
//!   commit/rollback and cascade delete
//!
//! # Ownership model
//!
//! A client exclusively owns its measurements and orders. Deleting a client
//! deletes the owned rows in the same transaction.
//!
//! # Persistence
//!
//! The store keeps all tables in memory and persists them as a single CBOR
//! snapshot under the data directory. A `LOCK` file guards the directory
//! against concurrent writers. Snapshot writes go through a temporary file
//! and an atomic rename.

#![deny(unsafe_code)]
#![warn(missing_docs)]
// Production code MUST NOT use panic!/unwrap()/expect().
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

pub mod error;
pub mod id;
pub mod model;
pub mod store;

pub use error::{CoreError, CoreResult};
pub use id::{RecordId, TEMP_ID_PREFIX};
pub use model::{
    Client, ClientValues, Measurement, MeasurementValues, Order, OrderStatus, OrderValues,
    RecordKind,
};
pub use store::{Store, Table, Tables};
