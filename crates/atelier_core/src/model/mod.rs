//! Domain entities.

mod client;
mod measurement;
mod order;

pub use client::{Client, ClientValues};
pub use measurement::{Measurement, MeasurementValues};
pub use order::{Order, OrderStatus, OrderValues};

use std::fmt;

/// The kind of a domain record, for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    /// A client.
    Client,
    /// A measurement sheet.
    Measurement,
    /// An order.
    Order,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Client => write!(f, "client"),
            RecordKind::Measurement => write!(f, "measurement"),
            RecordKind::Order => write!(f, "order"),
        }
    }
}
