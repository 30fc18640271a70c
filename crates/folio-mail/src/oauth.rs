//! OAuth2 access tokens for the Gmail API.
//!
//! [`TokenProvider`] is the seam between the mailer and token bookkeeping.
//! [`RefreshingTokenProvider`] is the production implementation: it caches
//! the current access token, refreshes it with the refresh-token grant when
//! it expires, and persists it to a JSON token file so restarts reuse it.

use std::{future::Future, path::{Path, PathBuf}};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::{Error, Result};

pub const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Scopes requested by `gmail-authorize`.
pub const GMAIL_SCOPES: &[&str] = &[
  "https://www.googleapis.com/auth/gmail.send",
  "https://www.googleapis.com/auth/gmail.compose",
  "https://www.googleapis.com/auth/gmail.modify",
];

/// Tokens are treated as expired this long before their actual expiry.
const EXPIRY_SKEW_MS: i64 = 60_000;

/// Lifetime assumed when the token endpoint omits `expires_in`.
const DEFAULT_EXPIRES_IN_SECS: i64 = 3500;

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Supplies bearer tokens to the Gmail mailer.
pub trait TokenProvider: Send + Sync {
  /// A token believed to be valid, refreshing first if the cached one has
  /// expired.
  fn access_token(&self) -> impl Future<Output = Result<String>> + Send + '_;

  /// Discard the cached token and obtain a new one. Called after the
  /// provider rejects a token.
  fn refresh(&self) -> impl Future<Output = Result<String>> + Send + '_;
}

// ─── Token file ──────────────────────────────────────────────────────────────

/// Contents of the token file. Field names follow Google's client libraries
/// so existing `token.json` files can be reused.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredToken {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub access_token:  Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub refresh_token: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub scope:         Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub token_type:    Option<String>,
  /// Expiry as milliseconds since the Unix epoch.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub expiry_date:   Option<i64>,
}

impl StoredToken {
  /// The access token, if present and not within the expiry skew of `now`.
  /// A token with no recorded expiry is treated as expired.
  pub fn fresh_access_token(&self, now: DateTime<Utc>) -> Option<&str> {
    let expiry = self.expiry_date?;
    (expiry - EXPIRY_SKEW_MS > now.timestamp_millis())
      .then_some(self.access_token.as_deref())
      .flatten()
  }

  fn apply(&mut self, response: TokenResponse, now: DateTime<Utc>) {
    let expires_in = response.expires_in.unwrap_or(DEFAULT_EXPIRES_IN_SECS);
    self.access_token = Some(response.access_token);
    self.token_type = Some(response.token_type.unwrap_or_else(|| "Bearer".to_owned()));
    self.expiry_date = Some(now.timestamp_millis() + expires_in * 1000);
    if let Some(scope) = response.scope {
      self.scope = Some(scope);
    } else if self.scope.is_none() {
      self.scope = Some(GMAIL_SCOPES.join(" "));
    }
    if let Some(refresh_token) = response.refresh_token {
      self.refresh_token = Some(refresh_token);
    }
  }
}

/// Read a token file. A missing file yields `None`.
pub async fn load_token(path: &Path) -> Result<Option<StoredToken>> {
  match tokio::fs::read(path).await {
    Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
    Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
    Err(e) => Err(e.into()),
  }
}

pub async fn save_token(path: &Path, token: &StoredToken) -> Result<()> {
  let json = serde_json::to_vec_pretty(token)?;
  tokio::fs::write(path, json).await?;
  Ok(())
}

// ─── OAuth client ────────────────────────────────────────────────────────────

/// The registered OAuth application.
#[derive(Debug, Clone)]
pub struct OAuthClient {
  pub client_id:     String,
  pub client_secret: String,
  pub redirect_uri:  String,
  pub token_url:     String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
  access_token:  String,
  #[serde(default)]
  expires_in:    Option<i64>,
  #[serde(default)]
  refresh_token: Option<String>,
  #[serde(default)]
  scope:         Option<String>,
  #[serde(default)]
  token_type:    Option<String>,
}

impl OAuthClient {
  /// The consent-screen URL for offline access to [`GMAIL_SCOPES`].
  pub fn authorize_url(&self, http: &reqwest::Client) -> Result<String> {
    let scope = GMAIL_SCOPES.join(" ");
    let request = http
      .get(GOOGLE_AUTH_URL)
      .query(&[
        ("client_id", self.client_id.as_str()),
        ("redirect_uri", self.redirect_uri.as_str()),
        ("response_type", "code"),
        ("scope", scope.as_str()),
        ("access_type", "offline"),
        ("prompt", "consent"),
        ("include_granted_scopes", "true"),
      ])
      .build()?;
    Ok(request.url().to_string())
  }

  /// Exchange an authorization code from the consent screen for tokens.
  pub async fn exchange_code(&self, http: &reqwest::Client, code: &str) -> Result<StoredToken> {
    let response = self
      .token_request(http, &[
        ("grant_type", "authorization_code"),
        ("code", code),
        ("redirect_uri", self.redirect_uri.as_str()),
      ])
      .await?;
    let mut token = StoredToken::default();
    token.apply(response, Utc::now());
    Ok(token)
  }

  async fn refresh(&self, http: &reqwest::Client, refresh_token: &str) -> Result<TokenResponse> {
    self
      .token_request(http, &[
        ("grant_type", "refresh_token"),
        ("refresh_token", refresh_token),
      ])
      .await
  }

  async fn token_request(
    &self,
    http: &reqwest::Client,
    params: &[(&str, &str)],
  ) -> Result<TokenResponse> {
    let mut form: Vec<(&str, &str)> = vec![
      ("client_id", self.client_id.as_str()),
      ("client_secret", self.client_secret.as_str()),
    ];
    form.extend_from_slice(params);

    let response = http.post(&self.token_url).form(&form).send().await?;
    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      return Err(Error::TokenRefresh {
        status: status.as_u16(),
        body,
      });
    }
    Ok(response.json().await?)
  }
}

// ─── Refreshing provider ─────────────────────────────────────────────────────

/// Caches an access token and refreshes it with the refresh-token grant.
///
/// The cache is loaded lazily from `token_path` on first use. A refresh token
/// given at construction takes precedence over one found in the file. All
/// access goes through one async mutex, so concurrent senders trigger at most
/// one refresh at a time.
pub struct RefreshingTokenProvider {
  http:          reqwest::Client,
  client:        OAuthClient,
  refresh_token: Option<String>,
  token_path:    Option<PathBuf>,
  cache:         Mutex<Option<StoredToken>>,
}

impl RefreshingTokenProvider {
  pub fn new(
    http: reqwest::Client,
    client: OAuthClient,
    refresh_token: Option<String>,
    token_path: Option<PathBuf>,
  ) -> Self {
    Self {
      http,
      client,
      refresh_token: refresh_token.filter(|t| !t.is_empty()),
      token_path,
      cache: Mutex::new(None),
    }
  }

  async fn load(&self) -> Result<StoredToken> {
    let Some(path) = &self.token_path else {
      return Ok(StoredToken::default());
    };
    match load_token(path).await {
      Ok(token) => Ok(token.unwrap_or_default()),
      Err(e) => {
        tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable token file");
        Ok(StoredToken::default())
      }
    }
  }

  async fn refresh_into(&self, token: &mut StoredToken) -> Result<String> {
    let refresh_token = self
      .refresh_token
      .clone()
      .or_else(|| token.refresh_token.clone())
      .ok_or(Error::MissingRefreshToken)?;

    tracing::debug!("refreshing gmail access token");
    let response = self.client.refresh(&self.http, &refresh_token).await?;
    token.refresh_token = Some(refresh_token);
    token.apply(response, Utc::now());

    if let Some(path) = &self.token_path {
      if let Err(e) = save_token(path, token).await {
        tracing::warn!(path = %path.display(), error = %e, "failed to persist access token");
      }
    }

    token.access_token.clone().ok_or(Error::MissingRefreshToken)
  }
}

impl TokenProvider for RefreshingTokenProvider {
  async fn access_token(&self) -> Result<String> {
    let mut cache = self.cache.lock().await;
    if cache.is_none() {
      *cache = Some(self.load().await?);
    }
    let token = cache.get_or_insert_with(StoredToken::default);
    if let Some(access) = token.fresh_access_token(Utc::now()) {
      return Ok(access.to_owned());
    }
    self.refresh_into(token).await
  }

  async fn refresh(&self) -> Result<String> {
    let mut cache = self.cache.lock().await;
    if cache.is_none() {
      *cache = Some(self.load().await?);
    }
    let token = cache.get_or_insert_with(StoredToken::default);
    self.refresh_into(token).await
  }
}
