//! # Atelier Server
//!
//! The HTTP REST layer of the Atelier backend.
//!
//! This crate provides:
//! - CRUD routes for clients, measurements, and orders
//! - The offline-sync endpoints (`POST /api/sync`,
//!   `GET /api/sync/last-update`)
//! - Dashboard statistics (`GET /api/stats`)
//! - Measurement photo upload through a local file store
//! - Optional HMAC-SHA256 token authentication
//!
//! # Error mapping
//!
//! Handlers return [`ApiError`]; validation and malformed batches map to
//! 400, missing records to 404, authentication failures to 401, everything
//! else to 500. Bodies are always `{ "error": <message> }`.
//!
//! # Authentication
//!
//! Off by default. When a secret is configured, every `/api` route requires
//! `Authorization: Bearer <token>`, where tokens are minted with
//! [`TokenValidator::create_token`] (the `atelier token` CLI command wraps
//! this).

#![deny(unsafe_code)]
#![warn(missing_docs)]
// Production code MUST NOT use panic!/unwrap()/expect().
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod auth;
mod config;
mod error;
mod files;
mod routes;
mod server;
mod state;

pub use auth::{AuthConfig, TokenValidator};
pub use config::ServerConfig;
pub use error::{ApiError, ApiResult};
pub use files::FileStore;
pub use routes::router;
pub use server::serve;
pub use state::AppState;
