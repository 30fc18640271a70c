//! JSON REST API for Folio.
//!
//! Exposes an axum [`Router`] backed by any [`SubmissionStore`] and
//! [`Mailer`]. TLS and process concerns are the caller's responsibility.

pub mod auth;
pub mod config;
pub mod contacts;
pub mod error;
pub mod status;

use std::{any::Any, sync::Arc};

use axum::{
  Json, Router,
  http::{HeaderValue, Method, StatusCode, header},
  response::{IntoResponse, Response},
  routing::{get, post},
};
use folio_core::{mail::Mailer, store::SubmissionStore};
use folio_mail::templates::SiteInfo;
use serde_json::json;
use tower_http::{
  catch_panic::CatchPanicLayer,
  cors::{AllowOrigin, CorsLayer},
  trace::TraceLayer,
};

pub use auth::AuthConfig;
pub use config::{Environment, ServerConfig};
pub use error::ApiError;

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S, M> {
  pub store:  Arc<S>,
  pub mailer: Arc<M>,
  pub config: Arc<ServerConfig>,
  pub site:   Arc<SiteInfo>,
  /// `None` leaves the listing endpoints open.
  pub auth:   Option<Arc<AuthConfig>>,
}

impl<S, M> AppState<S, M> {
  /// Build state from `config`. Admin notifications go to
  /// `config.admin_email`, falling back to `sender_address`.
  pub fn new(store: S, mailer: M, config: ServerConfig, sender_address: Option<String>) -> Self {
    let site = SiteInfo {
      owner_name:  config.owner_name.clone(),
      admin_email: config
        .admin_email
        .clone()
        .or(sender_address)
        .unwrap_or_default(),
      site_url:    config.site_url.clone(),
    };
    Self {
      store:  Arc::new(store),
      mailer: Arc::new(mailer),
      auth:   config.admin_auth.clone().map(Arc::new),
      site:   Arc::new(site),
      config: Arc::new(config),
    }
  }
}

impl<S, M> Clone for AppState<S, M> {
  fn clone(&self) -> Self {
    Self {
      store:  self.store.clone(),
      mailer: self.mailer.clone(),
      config: self.config.clone(),
      site:   self.site.clone(),
      auth:   self.auth.clone(),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the API router.
pub fn router<S, M>(state: AppState<S, M>) -> Router
where
  S: SubmissionStore + 'static,
  M: Mailer + 'static,
{
  let cors = cors_layer(&state.config.cors_origins);
  let development = state.config.is_development();

  Router::new()
    .route("/",                   get(status::handler::<S, M>))
    .route("/api/contact",        post(contacts::create::<S, M>))
    .route("/api/contacts",       get(contacts::list::<S, M>))
    .route("/api/contacts/{id}",  get(contacts::get_one::<S, M>))
    .fallback(status::not_found)
    .with_state(state)
    .layer(CatchPanicLayer::custom(move |panic: Box<dyn Any + Send + 'static>| {
      panic_response(panic, development)
    }))
    .layer(cors)
    .layer(TraceLayer::new_for_http())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
  let origins: Vec<HeaderValue> = origins
    .iter()
    .filter_map(|origin| {
      let origin = origin.trim();
      // Credentialed CORS cannot use a wildcard origin.
      if origin == "*" {
        tracing::warn!("ignoring wildcard CORS origin; list origins explicitly");
        return None;
      }
      match HeaderValue::from_str(origin) {
        Ok(value) => Some(value),
        Err(_) => {
          tracing::warn!(%origin, "ignoring invalid CORS origin");
          None
        }
      }
    })
    .collect();

  CorsLayer::new()
    .allow_origin(AllowOrigin::list(origins))
    .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
    .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
    .allow_credentials(true)
}

/// Convert a handler panic into the generic 500 body. The panic message is
/// only included in development.
fn panic_response(panic: Box<dyn Any + Send + 'static>, development: bool) -> Response {
  let detail = panic
    .downcast_ref::<String>()
    .cloned()
    .or_else(|| panic.downcast_ref::<&str>().map(|s| s.to_string()))
    .unwrap_or_else(|| "unknown panic".to_owned());
  tracing::error!(panic = %detail, "handler panicked");

  let error = if development { json!(detail) } else { json!({}) };
  (
    StatusCode::INTERNAL_SERVER_ERROR,
    Json(json!({
      "success": false,
      "message": "Something went wrong!",
      "error": error,
    })),
  )
    .into_response()
}

// ─── Integration tests ────────────────────────────────────────────────────────
