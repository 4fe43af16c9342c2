//! HTTP Basic auth for the administrative routes.
//!
//! When no [`AdminCredentials`] are configured the [`Admin`] extractor lets
//! every request through.

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, header, request::Parts},
};
use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use rally_core::store::EventStore;

use crate::{AppState, error::ApiError};

/// Credentials accepted for administrative routes.
#[derive(Clone)]
pub struct AdminCredentials {
  pub username:      String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
}

/// Present in a handler's arguments: the caller may perform admin actions.
pub struct Admin;

/// Verify Basic credentials in `headers` against `creds`.
pub fn verify_basic(headers: &HeaderMap, creds: &AdminCredentials) -> Result<(), ApiError> {
  let header_val = headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(ApiError::Unauthorized)?;

  let encoded = header_val
    .strip_prefix("Basic ")
    .ok_or(ApiError::Unauthorized)?;

  let decoded = B64.decode(encoded).map_err(|_| ApiError::Unauthorized)?;
  let pair    = std::str::from_utf8(&decoded).map_err(|_| ApiError::Unauthorized)?;

  let (username, password) = pair.split_once(':').ok_or(ApiError::Unauthorized)?;
  if username != creds.username {
    return Err(ApiError::Unauthorized);
  }

  let parsed_hash = PasswordHash::new(&creds.password_hash)
    .map_err(|_| ApiError::Unauthorized)?;

  Argon2::default()
    .verify_password(password.as_bytes(), &parsed_hash)
    .map_err(|_| ApiError::Unauthorized)
}

impl<S> FromRequestParts<AppState<S>> for Admin
where
  S: EventStore + Clone + Send + Sync + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    if let Some(creds) = &state.settings.admin {
      verify_basic(&parts.headers, creds).inspect_err(|_| {
        tracing::warn!(path = %parts.uri.path(), "rejected admin request");
      })?;
    }
    Ok(Admin)
  }
}
