//! Orders and payment tracking.

use crate::error::{CoreError, CoreResult};
use crate::model::RecordKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Workflow status of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    /// Work in progress.
    #[serde(rename = "en_cours")]
    InProgress,
    /// Delivered and settled.
    #[serde(rename = "termine")]
    Completed,
}

/// An order for one client.
///
/// `montant_restant` is derived state: it always equals
/// `montant_total - montant_avance` and is recomputed on every write,
/// never taken from a payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Server-assigned id.
    pub id: i64,
    /// Owning client.
    pub client_id: i64,
    /// Agreed price.
    pub montant_total: f64,
    /// Amount already paid.
    pub montant_avance: f64,
    /// Outstanding balance.
    pub montant_restant: f64,
    /// Workflow status.
    pub status: OrderStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
    /// When the order entered `termine`, if it ever did.
    pub completed_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Re-derives the outstanding balance from total and advance.
    pub fn recompute_restant(&mut self) {
        self.montant_restant = self.montant_total - self.montant_avance;
    }

    /// Applies a status change.
    ///
    /// `completed_at` is stamped exactly when the status transitions into
    /// [`OrderStatus::Completed`]; it is left alone on every other change,
    /// including a move back to `en_cours`.
    pub fn set_status(&mut self, status: OrderStatus, now: DateTime<Utc>) {
        if status == OrderStatus::Completed && self.status != OrderStatus::Completed {
            self.completed_at = Some(now);
        }
        self.status = status;
    }
}

/// A partial set of order fields, as submitted by a caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderValues {
    /// Owning client.
    #[serde(default)]
    pub client_id: Option<i64>,
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

impl OrderValues {
    /// Builds a new order from these values.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `client_id` or `montant_total` is
    /// absent.
    pub fn build(&self, id: i64, now: DateTime<Utc>) -> CoreResult<Order> {
        let client_id = self
            .client_id
            .ok_or_else(|| CoreError::missing_field(RecordKind::Order, "client_id"))?;
        let montant_total = self
            .montant_total
            .ok_or_else(|| CoreError::missing_field(RecordKind::Order, "montant_total"))?;
        let montant_avance = self.montant_avance.unwrap_or(0.0);
        let status = self.status.unwrap_or(OrderStatus::InProgress);

        let mut order = Order {
            id,
            client_id,
            montant_total,
            montant_avance,
            montant_restant: 0.0,
            status: OrderStatus::InProgress,
            created_at: now,
            updated_at: now,
            completed_at: None,
        };
        order.recompute_restant();
        order.set_status(status, now);
        Ok(order)
    }

    /// Overwrites the fields present in `self` onto an existing order and
    /// re-derives the outstanding balance.
    pub fn merge_into(&self, order: &mut Order, now: DateTime<Utc>) {
        if let Some(client_id) = self.client_id {
            order.client_id = client_id;
        }
        if let Some(total) = self.montant_total {
            order.montant_total = total;
        }
        if let Some(avance) = self.montant_avance {
            order.montant_avance = avance;
        }
        order.recompute_restant();
        if let Some(status) = self.status {
            order.set_status(status, now);
        }
        order.updated_at = now;
    }
}
