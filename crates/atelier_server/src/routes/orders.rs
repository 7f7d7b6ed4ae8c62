//! Order routes.

use crate::error::{ApiError, ApiResult};
use crate::routes::Deleted;
use crate::state::AppState;
use atelier_core::{CoreError, Order, OrderStatus, OrderValues, RecordKind};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;

#[derive(Deserialize)]
pub(crate) struct ListQuery {
    #[serde(default)]
    status: Option<OrderStatus>,
}

pub(crate) async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Json<Vec<Order>> {
    Json(state.store.read(|t| t.orders_newest_first(query.status)))
}

pub(crate) async fn fetch(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Order>> {
    state
        .store
        .read(|t| t.orders.get(id).cloned())
        .map(Json)
        .ok_or_else(|| ApiError::not_found(RecordKind::Order, id))
}

pub(crate) async fn create(
    State(state): State<AppState>,
    Json(values): Json<OrderValues>,
) -> ApiResult<(StatusCode, Json<Order>)> {
    let order = state.store.transaction(|tables| {
        let client_id = values
            .client_id
            .ok_or_else(|| CoreError::missing_field(RecordKind::Order, "client_id"))?;
        if !tables.clients.contains(client_id) {
            return Err(ApiError::not_found(RecordKind::Client, client_id));
        }
        let id = tables.orders.allocate_id();
        let order = values.build(id, Utc::now())?;
        tables.orders.insert(id, order.clone());
        Ok::<_, ApiError>(order)
    })?;

    tracing::info!(id = order.id, client_id = order.client_id, "order created");
    Ok((StatusCode::CREATED, Json(order)))
}

pub(crate) async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(mut values): Json<OrderValues>,
) -> ApiResult<Json<Order>> {
    // Ownership never moves on a direct update.
    values.client_id = None;

    let order = state.store.transaction(|tables| {
        let order = tables
            .orders
            .get_mut(id)
            .ok_or_else(|| ApiError::not_found(RecordKind::Order, id))?;
        values.merge_into(order, Utc::now());
        Ok::<_, ApiError>(order.clone())
    })?;
    Ok(Json(order))
}

pub(crate) async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Deleted>> {
    state
        .store
        .transaction(|tables| tables.delete_order(id).map_err(ApiError::from))?;

    tracing::info!(id, "order deleted");
    Ok(Json(Deleted::new("Commande supprimée avec succès")))
}
