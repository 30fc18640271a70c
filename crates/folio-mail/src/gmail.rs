//! Delivery through the Gmail REST API.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use folio_core::mail::{Mailer, OutgoingEmail};
use lettre::message::Mailbox;
use serde_json::json;

use crate::{Error, Result, RetryPolicy, message::build_message, oauth::TokenProvider};

/// Sends mail with `users.messages.send`, authenticating with tokens from
/// `P`.
///
/// When the API answers 401 the provider is asked for a fresh token and the
/// send is retried while the [`RetryPolicy`] allows.
pub struct GmailMailer<P> {
  http:     reqwest::Client,
  provider: P,
  from:     Mailbox,
  api_base: String,
  retry:    RetryPolicy,
}

impl<P: TokenProvider> GmailMailer<P> {
  pub fn new(
    http: reqwest::Client,
    provider: P,
    from: Mailbox,
    api_base: impl Into<String>,
    retry: RetryPolicy,
  ) -> Self {
    Self {
      http,
      provider,
      from,
      api_base: api_base.into().trim_end_matches('/').to_owned(),
      retry,
    }
  }

  pub fn from_address(&self) -> String { self.from.email.to_string() }

  /// Obtain an access token, refreshing it if needed.
  pub async fn verify(&self) -> Result<()> {
    self.provider.access_token().await.map(drop)
  }

  async fn post_raw(&self, token: &str, raw: &str) -> Result<()> {
    let url = format!("{}/gmail/v1/users/me/messages/send", self.api_base);
    let response = self
      .http
      .post(url)
      .bearer_auth(token)
      .json(&json!({ "raw": raw }))
      .send()
      .await?;

    let status = response.status();
    if status == reqwest::StatusCode::UNAUTHORIZED {
      return Err(Error::Unauthorized);
    }
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      return Err(Error::Api {
        status: status.as_u16(),
        body,
      });
    }
    Ok(())
  }
}

impl<P: TokenProvider> Mailer for GmailMailer<P> {
  type Error = Error;

  async fn send(&self, email: &OutgoingEmail) -> Result<()> {
    let message = build_message(&self.from, email, true)?;
    let raw = URL_SAFE_NO_PAD.encode(message.formatted());

    let mut token = self.provider.access_token().await?;
    let mut attempt = 1;
    loop {
      match self.post_raw(&token, &raw).await {
        Err(Error::Unauthorized) if self.retry.should_retry(attempt) => {
          tracing::debug!(attempt, "gmail rejected access token; refreshing");
          tokio::time::sleep(self.retry.delay_after(attempt)).await;
          token = self.provider.refresh().await?;
          attempt += 1;
        }
        result => return result,
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
  };

  use axum::{
    Json, Router,
    http::{HeaderMap, StatusCode},
    routing::post,
  };
  use serde_json::Value;
  use tokio::net::TcpListener;

  use super::*;
  use crate::message::parse_mailbox;

  /// Hands out `token-<n>`, counting refreshes.
  #[derive(Default)]
  struct CountingProvider {
    refreshes: AtomicUsize,
  }

  impl TokenProvider for CountingProvider {
    async fn access_token(&self) -> Result<String> {
      Ok(format!("token-{}", self.refreshes.load(Ordering::SeqCst)))
    }

    async fn refresh(&self) -> Result<String> {
      let n = self.refreshes.fetch_add(1, Ordering::SeqCst) + 1;
      Ok(format!("token-{n}"))
    }
  }

  #[derive(Clone, Default)]
  struct Seen {
    auth: Arc<Mutex<Vec<String>>>,
    raw:  Arc<Mutex<Vec<String>>>,
  }

  /// A Gmail stand-in that accepts only `accepted_token`.
  async fn gmail_server(accepted_token: &'static str) -> (String, Seen) {
    let seen = Seen::default();
    let state = seen.clone();
    let app = Router::new().route(
      "/gmail/v1/users/me/messages/send",
      post(move |headers: HeaderMap, Json(body): Json<Value>| {
        let state = state.clone();
        async move {
          let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_owned();
          state.auth.lock().unwrap().push(auth.clone());
          if auth != format!("Bearer {accepted_token}") {
            return (StatusCode::UNAUTHORIZED, Json(serde_json::json!({})));
          }
          let raw = body["raw"].as_str().unwrap_or_default().to_owned();
          state.raw.lock().unwrap().push(raw);
          (StatusCode::OK, Json(serde_json::json!({ "id": "abc" })))
        }
      }),
    );
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
    (format!("http://{addr}"), seen)
  }

  fn mailer(base: &str, retry: RetryPolicy) -> GmailMailer<CountingProvider> {
    GmailMailer::new(
      reqwest::Client::new(),
      CountingProvider::default(),
      parse_mailbox("me@gmail.com").unwrap(),
      base,
      retry,
    )
  }

  fn email() -> OutgoingEmail {
    OutgoingEmail::new("ada@example.com", "Hello", "<p>Hi</p>")
  }

  #[tokio::test]
  async fn sends_base64url_raw_message() {
    let (base, seen) = gmail_server("token-0").await;
    mailer(&base, RetryPolicy::default()).send(&email()).await.unwrap();

    let raw = seen.raw.lock().unwrap()[0].clone();
    assert!(!raw.contains('+') && !raw.contains('/') && !raw.ends_with('='));
    let decoded = String::from_utf8(URL_SAFE_NO_PAD.decode(raw).unwrap()).unwrap();
    assert!(decoded.contains("To: ada@example.com"), "{decoded}");
    assert!(decoded.contains("Subject: Hello"), "{decoded}");
  }

  #[tokio::test]
  async fn unauthorized_refreshes_once_and_retries() {
    let (base, seen) = gmail_server("token-1").await;
    let mailer = mailer(&base, RetryPolicy::default());
    mailer.send(&email()).await.unwrap();

    assert_eq!(mailer.provider.refreshes.load(Ordering::SeqCst), 1);
    assert_eq!(*seen.auth.lock().unwrap(), vec![
      "Bearer token-0".to_owned(),
      "Bearer token-1".to_owned(),
    ]);
  }

  #[tokio::test]
  async fn unauthorized_without_retry_fails() {
    let (base, seen) = gmail_server("token-1").await;
    let mailer = mailer(&base, RetryPolicy::never());
    let result = mailer.send(&email()).await;

    assert!(matches!(result, Err(Error::Unauthorized)));
    assert_eq!(mailer.provider.refreshes.load(Ordering::SeqCst), 0);
    assert_eq!(seen.auth.lock().unwrap().len(), 1);
  }

  #[tokio::test]
  async fn retries_stop_at_max_attempts() {
    let (base, seen) = gmail_server("never-issued").await;
    let mailer = mailer(&base, RetryPolicy::new(3, std::time::Duration::ZERO));
    let result = mailer.send(&email()).await;

    assert!(matches!(result, Err(Error::Unauthorized)));
    assert_eq!(mailer.provider.refreshes.load(Ordering::SeqCst), 2);
    assert_eq!(seen.auth.lock().unwrap().len(), 3);
  }

  #[tokio::test]
  async fn other_failures_are_not_retried() {
    let app = Router::new().route(
      "/gmail/v1/users/me/messages/send",
      post(|| async { (StatusCode::FORBIDDEN, "quota exceeded") }),
    );
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

    let mailer = mailer(&format!("http://{addr}/"), RetryPolicy::default());
    match mailer.send(&email()).await {
      Err(Error::Api { status, body }) => {
        assert_eq!(status, 403);
        assert_eq!(body, "quota exceeded");
      }
      other => panic!("unexpected result: {other:?}"),
    }
    assert_eq!(mailer.provider.refreshes.load(Ordering::SeqCst), 0);
  }
}
