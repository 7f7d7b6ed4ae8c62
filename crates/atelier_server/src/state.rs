//! Shared handler state.

use crate::auth::{AuthConfig, TokenValidator};
use crate::config::ServerConfig;
use crate::error::ApiResult;
use crate::files::FileStore;
use atelier_core::Store;
use std::sync::Arc;

/// State shared by every request handler.
#[derive(Clone)]
pub struct AppState {
    /// The authoritative store.
    pub store: Arc<Store>,
    /// Upload storage.
    pub files: Arc<FileStore>,
    /// Token validator, present when auth is enabled.
    pub auth: Option<TokenValidator>,
}

impl AppState {
    /// Builds the state from a server configuration: opens (or creates) the
    /// store and the uploads directory, and wires up auth if a secret is
    /// configured.
    pub fn from_config(config: &ServerConfig) -> ApiResult<Self> {
        let store = match &config.data_dir {
            Some(path) => Store::open(path)?,
            None => Store::open_in_memory(),
        };
        let files = FileStore::open(&config.uploads_dir)?;
        let auth = config
            .auth_secret
            .clone()
            .map(|secret| TokenValidator::new(AuthConfig::new(secret)));

        Ok(Self {
            store: Arc::new(store),
            files: Arc::new(files),
            auth,
        })
    }

    /// Builds an ephemeral state for tests: in-memory store, uploads in a
    /// caller-owned directory, no auth.
    pub fn ephemeral(uploads_dir: impl Into<std::path::PathBuf>) -> ApiResult<Self> {
        Ok(Self {
            store: Arc::new(Store::open_in_memory()),
            files: Arc::new(FileStore::open(uploads_dir.into())?),
            auth: None,
        })
    }
}
