//! Server configuration, deserialised from `folio.toml` and `FOLIO_*`
//! environment variables.

use std::{path::PathBuf, time::Duration};

use folio_core::ValidationRules;
use folio_mail::MailConfig;
use serde::Deserialize;

use crate::auth::AuthConfig;

/// Deployment environment. `development` exposes panic messages in 500
/// responses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
  #[serde(alias = "dev")]
  Development,
  #[default]
  #[serde(alias = "prod")]
  Production,
}

/// Runtime server configuration. Every key has a default.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
  pub host:              String,
  pub port:              u16,
  pub store_path:        PathBuf,
  pub environment:       Environment,
  /// Origins allowed to call the API from a browser.
  pub cors_origins:      Vec<String>,
  /// Display name used as the mail sender and in email copy.
  pub owner_name:        String,
  /// Recipient of admin notifications; defaults to the sender address.
  pub admin_email:       Option<String>,
  /// Linked from confirmation emails.
  pub site_url:          Option<String>,
  pub mail_timeout_secs: u64,
  pub validation:        ValidationRules,
  /// Credentials guarding the listing endpoints. Open when unset.
  pub admin_auth:        Option<AuthConfig>,
  pub mail:              MailConfig,
}

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:              "0.0.0.0".to_owned(),
      port:              5000,
      store_path:        PathBuf::from("folio.sqlite3"),
      environment:       Environment::default(),
      cors_origins:      vec![
        "http://localhost:3000".to_owned(),
        "http://127.0.0.1:3000".to_owned(),
      ],
      owner_name:        "Portfolio".to_owned(),
      admin_email:       None,
      site_url:          None,
      mail_timeout_secs: 15,
      validation:        ValidationRules::default(),
      admin_auth:        None,
      mail:              MailConfig::default(),
    }
  }
}

impl ServerConfig {
  pub fn is_development(&self) -> bool { self.environment == Environment::Development }

  pub fn mail_timeout(&self) -> Duration { Duration::from_secs(self.mail_timeout_secs) }
}
