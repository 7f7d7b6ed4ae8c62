//! Route table and request handlers.

mod clients;
mod measurements;
mod orders;
mod stats;
mod sync;

use crate::auth;
use crate::state::AppState;
use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{get, post, put};
use axum::Router;
use serde::Serialize;
use tower_http::trace::TraceLayer;

/// Response body for successful deletions.
#[derive(Serialize)]
pub(crate) struct Deleted {
    message: &'static str,
}

impl Deleted {
    pub(crate) fn new(message: &'static str) -> Self {
        Self { message }
    }
}

/// Builds the API router over the given state.
///
/// `max_body_bytes` bounds every request body; in practice it bounds photo
/// uploads, everything else is small JSON.
pub fn router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/api/clients", get(clients::list).post(clients::create))
        .route(
            "/api/clients/:id",
            get(clients::fetch)
                .put(clients::update)
                .delete(clients::remove),
        )
        .route("/api/measurements", post(measurements::create))
        .route("/api/measurements/:id", put(measurements::update))
        .route(
            "/api/measurements/client/:client_id",
            get(measurements::list_for_client).put(measurements::upsert_for_client),
        )
        .route("/api/orders", get(orders::list).post(orders::create))
        .route(
            "/api/orders/:id",
            get(orders::fetch)
                .put(orders::update)
                .delete(orders::remove),
        )
        .route("/api/stats", get(stats::fetch))
        .route("/api/sync", post(sync::reconcile_batch))
        .route("/api/sync/last-update", get(sync::last_update))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_auth,
        ))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
