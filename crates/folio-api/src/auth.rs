//! HTTP Basic-auth gate for the submission listing endpoints.

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::{
  extract::FromRequestParts,
  http::{HeaderMap, request::Parts},
};
use base64::{Engine as _, engine::general_purpose::STANDARD as B64};
use serde::Deserialize;

use crate::{AppState, error::ApiError};

/// Admin credentials, from the `admin_auth` config table.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
  pub username:      String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
}

/// Present in a handler's arguments means the request may read
/// submissions: either it carried valid admin credentials or no admin
/// credentials are configured.
pub struct RequireAdmin;

/// Verify Basic credentials in `headers` against `config`.
pub fn verify_auth(headers: &HeaderMap, config: &AuthConfig) -> Result<(), ApiError> {
  let header_val = headers
    .get(axum::http::header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(ApiError::Unauthorized)?;

  let encoded = header_val
    .strip_prefix("Basic ")
    .ok_or(ApiError::Unauthorized)?;

  let decoded = B64.decode(encoded).map_err(|_| ApiError::Unauthorized)?;
  let creds = std::str::from_utf8(&decoded).map_err(|_| ApiError::Unauthorized)?;

  let (username, password) = creds.split_once(':').ok_or(ApiError::Unauthorized)?;

  let parsed_hash = PasswordHash::new(&config.password_hash).map_err(|e| {
    tracing::error!(error = %e, "admin_auth.password_hash is not a valid PHC string");
    ApiError::Unauthorized
  })?;

  // Verify the hash even for an unknown username.
  let password_ok = Argon2::default()
    .verify_password(password.as_bytes(), &parsed_hash)
    .is_ok();
  let username_ok = username == config.username;

  if password_ok & username_ok {
    Ok(())
  } else {
    Err(ApiError::Unauthorized)
  }
}

impl<S, M> FromRequestParts<AppState<S, M>> for RequireAdmin
where
  S: Send + Sync,
  M: Send + Sync,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S, M>,
  ) -> Result<Self, Self::Rejection> {
    if let Some(auth) = &state.auth {
      verify_auth(&parts.headers, auth)?;
    }
    Ok(RequireAdmin)
  }
}
