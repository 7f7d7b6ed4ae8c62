//! Sync batch payload types.

use atelier_core::{ClientValues, MeasurementValues, OrderStatus, RecordId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One reconciliation batch: every record a device touched while offline.
///
/// All three lists are optional on the wire; a missing list is an empty
/// one. List order within an entity kind is preserved.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncBatch {
    /// Client records.
    #[serde(default)]
    pub clients: Vec<ClientChange>,
    /// Measurement records.
    #[serde(default)]
    pub measurements: Vec<MeasurementChange>,
    /// Order records.
    #[serde(default)]
    pub orders: Vec<OrderChange>,
}

impl SyncBatch {
    /// Returns true if the batch carries no records at all.
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty() && self.measurements.is_empty() && self.orders.is_empty()
    }

    /// Total number of records across the three lists.
    pub fn len(&self) -> usize {
        self.clients.len() + self.measurements.len() + self.orders.len()
    }
}

/// A client record in a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientChange {
    /// Server id or temporary token.
    pub id: RecordId,
    /// The fields the device is submitting; absent fields are untouched.
    #[serde(flatten)]
    pub values: ClientValues,
}

/// A measurement record in a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasurementChange {
    /// Server id or temporary token.
    pub id: RecordId,
    /// Owning client: a server id, or the temporary id of a client created
    /// in the same batch.
    #[serde(default)]
    pub client_id: Option<RecordId>,
    /// The measurement fields the device is submitting.
    #[serde(flatten)]
    pub values: MeasurementValues,
    /// Stored upload name of a reference photo.
    #[serde(default)]
    pub image_path: Option<String>,
}

/// An order record in a batch.
///
/// There is deliberately no `montant_restant` field: the balance is derived
/// server-side on every write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderChange {
    /// Server id or temporary token.
    pub id: RecordId,
    /// Owning client reference, subject to remapping.
    #[serde(default)]
    pub client_id: Option<RecordId>,
    /// Agreed price.
    #[serde(default)]
    pub montant_total: Option<f64>,
    /// Amount already paid.
    #[serde(default)]
    pub montant_avance: Option<f64>,
    /// Workflow status.
    #[serde(default)]
    pub status: Option<OrderStatus>,
}

/// Temporary-id to server-id mappings produced by one batch, keyed per
/// entity kind.
///
/// Devices derive temporary tokens from local clocks, so the same token can
/// legitimately appear for different kinds; one namespace per kind keeps
/// those from merging.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdMappings {
    /// Client token mappings.
    pub clients: BTreeMap<String, i64>,
    /// Measurement token mappings.
    pub measurements: BTreeMap<String, i64>,
    /// Order token mappings.
    pub orders: BTreeMap<String, i64>,
}

impl IdMappings {
    /// Returns true if no temporary ids were mapped.
    pub fn is_empty(&self) -> bool {
        self.clients.is_empty() && self.measurements.is_empty() && self.orders.is_empty()
    }
}
