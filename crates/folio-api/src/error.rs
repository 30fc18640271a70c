//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::{StatusCode, header},
  response::{IntoResponse, Response},
};
use folio_core::ValidationErrors;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error(transparent)]
  Validation(#[from] ValidationErrors),

  /// The request body could not be read as a contact form.
  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("not found: {0}")]
  NotFound(&'static str),

  #[error("unauthorized")]
  Unauthorized,

  /// A storage failure. `message` is what the client sees; the source is
  /// only logged.
  #[error("{message}: {source}")]
  Store {
    message: &'static str,
    #[source]
    source:  Box<dyn std::error::Error + Send + Sync>,
  },
}

impl ApiError {
  /// Adapter for `map_err` on store results.
  pub fn store<E>(message: &'static str) -> impl FnOnce(E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    move |e| ApiError::Store {
      message,
      source: Box::new(e),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    match self {
      ApiError::Validation(errors) => (
        StatusCode::BAD_REQUEST,
        Json(json!({ "success": false, "errors": errors.0 })),
      )
        .into_response(),
      ApiError::BadRequest(msg) => (
        StatusCode::BAD_REQUEST,
        Json(json!({
          "success": false,
          "errors": [{ "msg": msg, "location": "body" }],
        })),
      )
        .into_response(),
      ApiError::NotFound(msg) => (
        StatusCode::NOT_FOUND,
        Json(json!({ "success": false, "error": msg })),
      )
        .into_response(),
      ApiError::Unauthorized => (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, r#"Basic realm="folio""#)],
        Json(json!({ "success": false, "error": "Authentication required" })),
      )
        .into_response(),
      ApiError::Store { message, source } => {
        tracing::error!(error = %source, "{message}");
        (
          StatusCode::INTERNAL_SERVER_ERROR,
          Json(json!({ "success": false, "error": message })),
        )
          .into_response()
      }
    }
  }
}
