//! Dashboard statistics.

use crate::state::AppState;
use atelier_core::OrderStatus;
use axum::extract::State;
use axum::Json;
use serde::Serialize;

/// Counters shown on the dashboard.
#[derive(Debug, Default, Serialize)]
pub(crate) struct Stats {
    total_clients: usize,
    total_orders: usize,
    orders_en_cours: usize,
    orders_termine: usize,
    total_revenue: f64,
    total_avance: f64,
    total_restant: f64,
}

pub(crate) async fn fetch(State(state): State<AppState>) -> Json<Stats> {
    Json(state.store.read(|t| {
        let mut stats = Stats {
            total_clients: t.clients.len(),
            total_orders: t.orders.len(),
            ..Stats::default()
        };
        for order in t.orders.iter() {
            match order.status {
                OrderStatus::InProgress => stats.orders_en_cours += 1,
                OrderStatus::Completed => stats.orders_termine += 1,
            }
            stats.total_revenue += order.montant_total;
            stats.total_avance += order.montant_avance;
            stats.total_restant += order.montant_restant;
        }
        stats
    }))
}
