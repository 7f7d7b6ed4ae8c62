//! Offline-sync routes.

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use atelier_core::{Client, Measurement, Order};
use atelier_sync::{IdMappings, SyncBatch};
use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Response of a successful sync: the complete authoritative state plus the
/// temporary-id mappings this batch produced.
#[derive(Serialize)]
pub(crate) struct SyncResponse {
    clients: Vec<Client>,
    measurements: Vec<Measurement>,
    orders: Vec<Order>,
    id_mappings: IdMappings,
}

pub(crate) async fn reconcile_batch(
    State(state): State<AppState>,
    Json(batch): Json<SyncBatch>,
) -> ApiResult<Json<SyncResponse>> {
    // One timestamp for the whole batch: every record synced together
    // reports the same update time.
    let now = Utc::now();

    let response = state.store.transaction(|tables| {
        let id_mappings = atelier_sync::reconcile(tables, &batch, now)?;
        Ok::<_, ApiError>(SyncResponse {
            clients: tables.clients_newest_first(),
            measurements: tables.measurements_newest_first(),
            orders: tables.orders_newest_first(None),
            id_mappings,
        })
    })?;

    tracing::info!(records = batch.len(), "sync batch applied");
    Ok(Json(response))
}

/// Response of the last-update query.
#[derive(Serialize)]
pub(crate) struct LastUpdate {
    last_update: DateTime<Utc>,
}

pub(crate) async fn last_update(State(state): State<AppState>) -> Json<LastUpdate> {
    let now = Utc::now();
    Json(LastUpdate {
        last_update: state.store.read(|t| atelier_sync::last_update(t, now)),
    })
}
