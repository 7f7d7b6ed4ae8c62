//! Client routes.

use crate::error::{ApiError, ApiResult};
use crate::routes::Deleted;
use crate::state::AppState;
use atelier_core::{Client, ClientValues, RecordKind};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;

pub(crate) async fn list(State(state): State<AppState>) -> Json<Vec<Client>> {
    Json(state.store.read(|t| t.clients_newest_first()))
}

pub(crate) async fn fetch(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Client>> {
    state
        .store
        .read(|t| t.clients.get(id).cloned())
        .map(Json)
        .ok_or_else(|| ApiError::not_found(RecordKind::Client, id))
}

pub(crate) async fn create(
    State(state): State<AppState>,
    Json(values): Json<ClientValues>,
) -> ApiResult<(StatusCode, Json<Client>)> {
    let client = state.store.transaction(|tables| {
        let id = tables.clients.allocate_id();
        let client = values.build(id, Utc::now())?;
        tables.clients.insert(id, client.clone());
        Ok::<_, ApiError>(client)
    })?;

    tracing::info!(id = client.id, "client created");
    Ok((StatusCode::CREATED, Json(client)))
}

pub(crate) async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(values): Json<ClientValues>,
) -> ApiResult<Json<Client>> {
    let client = state.store.transaction(|tables| {
        let client = tables
            .clients
            .get_mut(id)
            .ok_or_else(|| ApiError::not_found(RecordKind::Client, id))?;
        values.merge_into(client, Utc::now());
        Ok::<_, ApiError>(client.clone())
    })?;
    Ok(Json(client))
}

pub(crate) async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<Deleted>> {
    state
        .store
        .transaction(|tables| tables.delete_client(id).map_err(ApiError::from))?;

    tracing::info!(id, "client deleted");
    Ok(Json(Deleted::new("Client supprimé avec succès")))
}
