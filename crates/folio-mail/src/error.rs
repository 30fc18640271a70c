//! Error type for `folio-mail`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("invalid address {address:?}: {source}")]
  Address {
    address: String,
    #[source]
    source:  lettre::address::AddressError,
  },

  #[error("message build error: {0}")]
  Message(#[from] lettre::error::Error),

  #[error("smtp error: {0}")]
  Smtp(#[from] lettre::transport::smtp::Error),

  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  /// The provider rejected the access token (HTTP 401).
  #[error("access token rejected by the mail provider")]
  Unauthorized,

  #[error("mail provider error ({status}): {body}")]
  Api { status: u16, body: String },

  #[error("token refresh failed ({status}): {body}")]
  TokenRefresh { status: u16, body: String },

  #[error("no refresh token available; set mail.refresh_token or run `gmail-authorize`")]
  MissingRefreshToken,

  #[error("token file error: {0}")]
  TokenFile(#[from] std::io::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  /// Returned by a [`crate::MemoryMailer`] built with
  /// [`crate::MemoryMailer::failing`].
  #[error("simulated delivery failure")]
  Simulated,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
