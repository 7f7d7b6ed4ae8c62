//! The full table set and cross-table operations.

use crate::error::{CoreError, CoreResult};
use crate::model::{Client, Measurement, Order, OrderStatus, RecordKind};
use crate::store::table::Table;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The complete authoritative state: all three tables.
///
/// `Tables` is a plain value: the store clones it for transactional writes
/// and snapshots it to disk as one CBOR document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tables {
    /// Clients.
    pub clients: Table<Client>,
    /// Measurement sheets.
    pub measurements: Table<Measurement>,
    /// Orders.
    pub orders: Table<Order>,
}

impl Tables {
    /// Deletes a client and, in the same operation, every measurement and
    /// order it owns.
    ///
    /// # Errors
    ///
    /// Returns a not-found error if the client does not exist; the owned
    /// rows are untouched in that case.
    pub fn delete_client(&mut self, id: i64) -> CoreResult<()> {
        if self.clients.remove(id).is_none() {
            return Err(CoreError::not_found(RecordKind::Client, id));
        }
        self.measurements.retain(|m| m.client_id != id);
        self.orders.retain(|o| o.client_id != id);
        Ok(())
    }

    /// Deletes an order.
    pub fn delete_order(&mut self, id: i64) -> CoreResult<()> {
        self.orders
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| CoreError::not_found(RecordKind::Order, id))
    }

    /// All clients, newest first.
    pub fn clients_newest_first(&self) -> Vec<Client> {
        let mut clients: Vec<Client> = self.clients.iter().cloned().collect();
        clients.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        clients
    }

    /// All measurement sheets, newest first.
    pub fn measurements_newest_first(&self) -> Vec<Measurement> {
        let mut sheets: Vec<Measurement> = self.measurements.iter().cloned().collect();
        sheets.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        sheets
    }

    /// One client's measurement sheets, newest first.
    pub fn measurements_for_client(&self, client_id: i64) -> Vec<Measurement> {
        let mut sheets: Vec<Measurement> = self
            .measurements
            .iter()
            .filter(|m| m.client_id == client_id)
            .cloned()
            .collect();
        sheets.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        sheets
    }

    /// Orders, optionally filtered by status, newest first.
    pub fn orders_newest_first(&self, status: Option<OrderStatus>) -> Vec<Order> {
        let mut orders: Vec<Order> = self
            .orders
            .iter()
            .filter(|o| status.map_or(true, |s| o.status == s))
            .cloned()
            .collect();
        orders.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
        orders
    }

    /// The most recent modification timestamp across all three tables.
    ///
    /// Returns `None` when the store holds no records at all; the caller
    /// decides the fallback (the sync layer substitutes "now").
    pub fn latest_update(&self) -> Option<DateTime<Utc>> {
        let clients = self.clients.iter().map(|c| c.updated_at);
        let measurements = self.measurements.iter().map(|m| m.updated_at);
        let orders = self.orders.iter().map(|o| o.updated_at);
        clients.chain(measurements).chain(orders).max()
    }
}
