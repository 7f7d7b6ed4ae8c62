//! Server configuration.

use std::net::SocketAddr;
use std::path::PathBuf;

/// Configuration for the API server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to.
    pub bind_addr: SocketAddr,
    /// Data directory for the store. `None` runs fully in memory.
    pub data_dir: Option<PathBuf>,
    /// Directory for uploaded measurement photos.
    pub uploads_dir: PathBuf,
    /// Maximum accepted request body size in bytes (bounds photo uploads).
    pub max_upload_bytes: usize,
    /// Secret for token authentication. `None` disables auth.
    pub auth_secret: Option<Vec<u8>>,
}

impl ServerConfig {
    /// Creates a configuration binding the given address.
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            data_dir: None,
            uploads_dir: PathBuf::from("uploads"),
            max_upload_bytes: 16 * 1024 * 1024,
            auth_secret: None,
        }
    }

    /// Sets the store data directory.
    pub fn with_data_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(path.into());
        self
    }

    /// Sets the uploads directory.
    pub fn with_uploads_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.uploads_dir = path.into();
        self
    }

    /// Sets the maximum request body size.
    pub fn with_max_upload_bytes(mut self, bytes: usize) -> Self {
        self.max_upload_bytes = bytes;
        self
    }

    /// Enables token authentication with the given secret.
    pub fn with_auth(mut self, secret: Vec<u8>) -> Self {
        self.auth_secret = Some(secret);
        self
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new(SocketAddr::from(([127, 0, 0, 1], 8080)))
    }
}
