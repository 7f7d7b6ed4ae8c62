//! Server bootstrap.

use crate::config::ServerConfig;
use crate::error::ApiResult;
use crate::routes;
use crate::state::AppState;

/// Opens the store and serves the API until the process is stopped.
pub async fn serve(config: ServerConfig) -> ApiResult<()> {
    let state = AppState::from_config(&config)?;
    let app = routes::router(state, config.max_upload_bytes);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "atelier server listening");

    axum::serve(listener, app).await?;
    Ok(())
}
