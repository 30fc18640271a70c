//! Handlers for the contact endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/api/contact` | Validate, record, notify. 201 or 400 |
//! | `GET`  | `/api/contacts` | Newest first; admin-gated when configured |
//! | `GET`  | `/api/contacts/{id}` | 404 if not found or not a UUID |

use axum::{
  Json,
  extract::{Path, State, rejection::JsonRejection},
  http::StatusCode,
  response::IntoResponse,
};
use folio_core::{
  mail::{Mailer, OutgoingEmail},
  store::SubmissionStore,
  submission::ContactSubmission,
  validate::ContactForm,
};
use folio_mail::templates;
use serde_json::json;
use uuid::Uuid;

use crate::{AppState, auth::RequireAdmin, error::ApiError};

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /api/contact`, body: `{"name", "email", "subject"?, "message"}`
pub async fn create<S, M>(
  State(state): State<AppState<S, M>>,
  payload: Result<Json<ContactForm>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SubmissionStore,
  M: Mailer,
{
  let Json(form) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
  let input = state.config.validation.validate(form)?;

  let submission = state
    .store
    .record_submission(input)
    .await
    .map_err(ApiError::store("Failed to send message. Please try again later."))?;
  tracing::info!(id = %submission.id, "recorded contact submission");

  notify(&state, &submission).await;

  Ok((
    StatusCode::CREATED,
    Json(json!({
      "success": true,
      "message": "Message sent successfully!",
      "data": submission,
    })),
  ))
}

/// Send the admin notification and the confirmation concurrently. Failures
/// are logged and never reach the client.
async fn notify<S, M>(state: &AppState<S, M>, submission: &ContactSubmission)
where
  M: Mailer,
{
  let admin = templates::admin_notification(&state.site, submission);
  let confirmation = templates::confirmation(&state.site, submission);

  let (admin_result, confirmation_result) = tokio::join!(
    deliver(state, &admin),
    deliver(state, &confirmation),
  );
  log_delivery(submission.id, "admin notification", admin_result);
  log_delivery(submission.id, "confirmation", confirmation_result);
}

async fn deliver<S, M>(state: &AppState<S, M>, email: &OutgoingEmail) -> Result<(), String>
where
  M: Mailer,
{
  match tokio::time::timeout(state.config.mail_timeout(), state.mailer.send(email)).await {
    Ok(Ok(())) => Ok(()),
    Ok(Err(e)) => Err(e.to_string()),
    Err(_) => Err(format!("timed out after {}s", state.config.mail_timeout_secs)),
  }
}

fn log_delivery(id: Uuid, kind: &str, result: Result<(), String>) {
  match result {
    Ok(()) => tracing::info!(%id, "{kind} email sent"),
    Err(error) => tracing::warn!(%id, %error, "{kind} email failed"),
  }
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /api/contacts`
pub async fn list<S, M>(
  _admin: RequireAdmin,
  State(state): State<AppState<S, M>>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SubmissionStore,
  M: Mailer,
{
  let submissions = state
    .store
    .list_submissions()
    .await
    .map_err(ApiError::store("Failed to fetch contacts"))?;
  Ok(Json(json!({
    "success": true,
    "count": submissions.len(),
    "data": submissions,
  })))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /api/contacts/{id}`
pub async fn get_one<S, M>(
  _admin: RequireAdmin,
  State(state): State<AppState<S, M>>,
  Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError>
where
  S: SubmissionStore,
  M: Mailer,
{
  // A malformed id cannot name a stored submission.
  let id = Uuid::parse_str(&id).map_err(|_| ApiError::NotFound("Contact not found"))?;
  let submission = state
    .store
    .get_submission(id)
    .await
    .map_err(ApiError::store("Failed to fetch contact"))?
    .ok_or(ApiError::NotFound("Contact not found"))?;
  Ok(Json(json!({ "success": true, "data": submission })))
}
