//! Mail provider configuration, deserialised from the `mail` table of the
//! server config.

use std::path::PathBuf;

use serde::{Deserialize, Deserializer};

use crate::oauth::{GOOGLE_TOKEN_URL, OAuthClient};

/// Which provider delivers mail, selected by the `provider` key.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum MailConfig {
  /// Messages are logged and dropped.
  #[default]
  Disabled,
  Smtp(SmtpConfig),
  Gmail(GmailConfig),
}

/// Transport security for SMTP connections.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmtpSecurity {
  /// Plain connection upgraded with `STARTTLS` (usually port 587).
  #[default]
  Starttls,
  /// Implicit TLS (usually port 465).
  Tls,
  /// No encryption. Only for local relays and test servers.
  None,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SmtpConfig {
  #[serde(deserialize_with = "scalar_string")]
  pub host:         String,
  #[serde(default = "default_smtp_port")]
  pub port:         u16,
  #[serde(default, deserialize_with = "scalar_string")]
  pub username:     String,
  #[serde(default, deserialize_with = "scalar_string")]
  pub password:     String,
  /// Sender address; defaults to `username`.
  #[serde(default, deserialize_with = "optional_scalar_string")]
  pub from_address: Option<String>,
  #[serde(default)]
  pub security:     SmtpSecurity,
}

impl SmtpConfig {
  pub fn sender_address(&self) -> &str {
    self.from_address.as_deref().unwrap_or(&self.username)
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GmailConfig {
  #[serde(deserialize_with = "scalar_string")]
  pub client_id:     String,
  #[serde(deserialize_with = "scalar_string")]
  pub client_secret: String,
  /// Takes precedence over a refresh token stored in `token_path`.
  #[serde(default, deserialize_with = "optional_scalar_string")]
  pub refresh_token: Option<String>,
  /// The account messages are sent from.
  #[serde(deserialize_with = "scalar_string")]
  pub user_email:    String,
  #[serde(default = "default_redirect_uri", deserialize_with = "scalar_string")]
  pub redirect_uri:  String,
  /// Where the current access token is cached between restarts.
  #[serde(default = "default_token_path")]
  pub token_path:    PathBuf,
  #[serde(default = "default_token_url")]
  pub token_url:     String,
  #[serde(default = "default_api_base")]
  pub api_base:      String,
  /// Total send attempts when the provider answers 401.
  #[serde(default = "default_max_attempts")]
  pub max_attempts:  u32,
  #[serde(default)]
  pub backoff_ms:    u64,
}

impl GmailConfig {
  pub fn oauth_client(&self) -> OAuthClient {
    OAuthClient {
      client_id:     self.client_id.clone(),
      client_secret: self.client_secret.clone(),
      redirect_uri:  self.redirect_uri.clone(),
      token_url:     self.token_url.clone(),
    }
  }
}

// ─── String fields ───────────────────────────────────────────────────────────

// The environment overlay parses `123456` or `true` into numbers and bools,
// and the `provider`-tagged enum buffers values without coercing them back.
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
  Str(String),
  Int(i64),
  UInt(u64),
  Float(f64),
  Bool(bool),
}

impl From<Scalar> for String {
  fn from(value: Scalar) -> Self {
    match value {
      Scalar::Str(s) => s,
      Scalar::Int(n) => n.to_string(),
      Scalar::UInt(n) => n.to_string(),
      Scalar::Float(n) => n.to_string(),
      Scalar::Bool(b) => b.to_string(),
    }
  }
}

fn scalar_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
  Scalar::deserialize(deserializer).map(String::from)
}

fn optional_scalar_string<'de, D: Deserializer<'de>>(
  deserializer: D,
) -> Result<Option<String>, D::Error> {
  Ok(Option::<Scalar>::deserialize(deserializer)?.map(String::from))
}

fn default_smtp_port() -> u16 { 587 }

fn default_redirect_uri() -> String { "http://localhost:3000/oauth2callback".to_owned() }

fn default_token_path() -> PathBuf { PathBuf::from("token.json") }

fn default_token_url() -> String { GOOGLE_TOKEN_URL.to_owned() }

fn default_api_base() -> String { "https://gmail.googleapis.com".to_owned() }

fn default_max_attempts() -> u32 { 2 }
