//! Runtime selection of the mail provider.

use std::time::Duration;

use folio_core::mail::{Mailer, OutgoingEmail};

use crate::{
  GmailMailer, MailConfig, Result, RetryPolicy, SmtpMailer,
  message::named_mailbox,
  oauth::RefreshingTokenProvider,
};

/// The configured mailer. Implements [`Mailer`] by delegating to the
/// selected provider.
pub enum MailBackend {
  /// No provider configured; messages are logged and dropped.
  Disabled,
  Smtp(SmtpMailer),
  Gmail(GmailMailer<RefreshingTokenProvider>),
}

impl MailBackend {
  /// Build the backend described by `config`. Outgoing mail shows
  /// `from_name` as the sender's display name.
  pub fn from_config(config: &MailConfig, from_name: &str) -> Result<Self> {
    match config {
      MailConfig::Disabled => Ok(Self::Disabled),
      MailConfig::Smtp(smtp) => {
        let from = named_mailbox(from_name, smtp.sender_address())?;
        Ok(Self::Smtp(SmtpMailer::new(smtp, from)?))
      }
      MailConfig::Gmail(gmail) => {
        let http = reqwest::Client::new();
        let provider = RefreshingTokenProvider::new(
          http.clone(),
          gmail.oauth_client(),
          gmail.refresh_token.clone(),
          Some(gmail.token_path.clone()),
        );
        let from = named_mailbox(from_name, &gmail.user_email)?;
        let retry = RetryPolicy::new(gmail.max_attempts, Duration::from_millis(gmail.backoff_ms));
        Ok(Self::Gmail(GmailMailer::new(
          http,
          provider,
          from,
          gmail.api_base.clone(),
          retry,
        )))
      }
    }
  }

  /// Short provider name, reported by the status endpoint.
  pub fn kind(&self) -> &'static str {
    match self {
      Self::Disabled => "disabled",
      Self::Smtp(_) => "smtp",
      Self::Gmail(_) => "gmail",
    }
  }

  /// The address mail is sent from, if a provider is configured.
  pub fn sender_address(&self) -> Option<String> {
    match self {
      Self::Smtp(m) => Some(m.from_address()),
      Self::Gmail(m) => Some(m.from_address()),
      Self::Disabled => None,
    }
  }

  /// Check that the provider is usable: SMTP connects and authenticates,
  /// Gmail obtains an access token.
  pub async fn verify(&self) -> Result<()> {
    match self {
      Self::Smtp(m) => m.verify().await,
      Self::Gmail(m) => m.verify().await,
      Self::Disabled => Ok(()),
    }
  }
}

impl Mailer for MailBackend {
  type Error = crate::Error;

  async fn send(&self, email: &OutgoingEmail) -> Result<()> {
    match self {
      Self::Disabled => {
        tracing::info!(subject = %email.subject, "mail disabled; dropping message");
        Ok(())
      }
      Self::Smtp(m) => m.send(email).await,
      Self::Gmail(m) => m.send(email).await,
    }
  }

  fn provider(&self) -> &'static str { self.kind() }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{GmailConfig, SmtpConfig, SmtpSecurity};

  #[tokio::test]
  async fn disabled_accepts_and_drops() {
    let backend = MailBackend::from_config(&MailConfig::Disabled, "Portfolio").unwrap();
    assert_eq!(backend.kind(), "disabled");
    assert!(backend.sender_address().is_none());
    backend.verify().await.unwrap();
    backend
      .send(&OutgoingEmail::new("a@example.com", "Hi", "<p>x</p>"))
      .await
      .unwrap();
  }

  #[test]
  fn smtp_sender_defaults_to_username() {
    let config = MailConfig::Smtp(SmtpConfig {
      host:         "smtp.example.com".into(),
      port:         587,
      username:     "me@example.com".into(),
      password:     "pw".into(),
      from_address: None,
      security:     SmtpSecurity::Starttls,
    });
    let backend = MailBackend::from_config(&config, "Portfolio").unwrap();
    assert_eq!(backend.kind(), "smtp");
    assert_eq!(backend.sender_address().as_deref(), Some("me@example.com"));
  }

  #[test]
  fn gmail_uses_user_email() {
    let config: GmailConfig = serde_json::from_value(serde_json::json!({
      "client_id": "id",
      "client_secret": "secret",
      "user_email": "me@gmail.com",
    }))
    .unwrap();
    let backend = MailBackend::from_config(&MailConfig::Gmail(config), "Portfolio").unwrap();
    assert_eq!(backend.kind(), "gmail");
    assert_eq!(backend.sender_address().as_deref(), Some("me@gmail.com"));
  }

  #[test]
  fn invalid_sender_is_rejected() {
    let config = MailConfig::Smtp(SmtpConfig {
      host:         "smtp.example.com".into(),
      port:         587,
      username:     "not an address".into(),
      password:     String::new(),
      from_address: None,
      security:     SmtpSecurity::None,
    });
    assert!(matches!(
      MailBackend::from_config(&config, "Portfolio"),
      Err(crate::Error::Address { .. })
    ));
  }
}
