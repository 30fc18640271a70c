//! `GET /` liveness payload and the JSON 404 fallback.

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use chrono::Utc;
use folio_core::{mail::Mailer, store::SubmissionStore};
use serde_json::json;

use crate::AppState;

/// `GET /`
///
/// Always 200. `database` reports whether the store answered a count query.
pub async fn handler<S, M>(State(state): State<AppState<S, M>>) -> impl IntoResponse
where
  S: SubmissionStore,
  M: Mailer,
{
  let database = match state.store.count_submissions().await {
    Ok(_) => "connected",
    Err(e) => {
      tracing::warn!(error = %e, "store liveness check failed");
      "unavailable"
    }
  };

  Json(json!({
    "success": true,
    "service": env!("CARGO_PKG_NAME"),
    "version": env!("CARGO_PKG_VERSION"),
    "status": "ok",
    "database": database,
    "mail": state.mailer.provider(),
    "timestamp": Utc::now(),
  }))
}

/// Any unmatched route.
pub async fn not_found() -> impl IntoResponse {
  (
    StatusCode::NOT_FOUND,
    Json(json!({ "success": false, "error": "Not found" })),
  )
}
