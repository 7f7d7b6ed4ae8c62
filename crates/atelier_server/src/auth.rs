//! Token authentication.
//!
//! Devices authenticate with HMAC-SHA256 tokens minted from a shared
//! secret. Token layout before base64 encoding:
//!
//! - 16 bytes: device id
//! - 8 bytes: issue timestamp (Unix millis, big-endian)
//! - 32 bytes: HMAC-SHA256 signature over the first 24 bytes
//!
//! Total: 56 bytes. Tokens expire after a configurable duration.

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

type HmacSha256 = Hmac<Sha256>;

const TOKEN_LEN: usize = 56;

/// Authentication configuration.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Secret key for HMAC.
    pub secret: Vec<u8>,
    /// Token expiration duration.
    pub token_expiry: Duration,
}

impl AuthConfig {
    /// Creates a new auth configuration with a 30-day expiry.
    pub fn new(secret: Vec<u8>) -> Self {
        Self {
            secret,
            token_expiry: Duration::from_secs(30 * 24 * 60 * 60),
        }
    }

    /// Sets the token expiration duration.
    pub fn with_expiry(mut self, expiry: Duration) -> Self {
        self.token_expiry = expiry;
        self
    }
}

/// Mints and validates device tokens.
#[derive(Clone)]
pub struct TokenValidator {
    config: AuthConfig,
}

impl TokenValidator {
    /// Creates a new token validator.
    pub fn new(config: AuthConfig) -> Self {
        Self { config }
    }

    /// Creates an auth token for a device, base64-encoded for transport.
    pub fn create_token(&self, device_id: [u8; 16]) -> String {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;

        let mut data = Vec::with_capacity(TOKEN_LEN);
        data.extend_from_slice(&device_id);
        data.extend_from_slice(&timestamp.to_be_bytes());

        let signature = self.sign(&data);
        data.extend_from_slice(&signature);
        BASE64.encode(data)
    }

    /// Validates a base64-encoded token.
    pub fn validate(&self, token: &str) -> ApiResult<()> {
        let bytes = BASE64
            .decode(token)
            .map_err(|_| ApiError::unauthorized("token is not valid base64"))?;
        if bytes.len() != TOKEN_LEN {
            return Err(ApiError::unauthorized("invalid token length"));
        }

        let signature = &bytes[24..TOKEN_LEN];
        let expected = self.sign(&bytes[0..24]);
        if signature != expected.as_slice() {
            return Err(ApiError::unauthorized("invalid signature"));
        }

        let timestamp_bytes: [u8; 8] = bytes[16..24]
            .try_into()
            .map_err(|_| ApiError::unauthorized("invalid token"))?;
        let timestamp = u64::from_be_bytes(timestamp_bytes);
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;

        let expiry_millis = self.config.token_expiry.as_millis() as u64;
        if now > timestamp + expiry_millis {
            return Err(ApiError::unauthorized("token expired"));
        }

        Ok(())
    }

    /// Signs data with HMAC-SHA256.
    fn sign(&self, data: &[u8]) -> [u8; 32] {
        let mut mac =
            HmacSha256::new_from_slice(&self.config.secret).expect("HMAC can take key of any size");
        mac.update(data);
        let result = mac.finalize();
        result.into_bytes().into()
    }
}

/// Middleware enforcing token auth on `/api` routes.
///
/// A no-op when the server runs without a configured secret.
pub(crate) async fn require_auth(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if let Some(validator) = &state.auth {
        let token = request
            .headers()
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or_else(|| ApiError::unauthorized("missing bearer token"))?;
        validator.validate(token)?;
    }
    Ok(next.run(request).await)
}
