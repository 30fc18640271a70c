//! The `Mailer` trait and the message type it delivers.
//!
//! Implementations live in `folio-mail`; the HTTP layer only sees this trait.

use std::future::Future;

/// A single outbound email.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutgoingEmail {
  /// Recipient address, or a comma-separated list of addresses.
  pub to:       String,
  pub subject:  String,
  pub html:     String,
  /// Plain-text alternative. When `None` the message is HTML-only.
  pub text:     Option<String>,
  pub cc:       Vec<String>,
  pub bcc:      Vec<String>,
  pub reply_to: Option<String>,
}

impl OutgoingEmail {
  pub fn new(
    to: impl Into<String>,
    subject: impl Into<String>,
    html: impl Into<String>,
  ) -> Self {
    Self {
      to: to.into(),
      subject: subject.into(),
      html: html.into(),
      ..Default::default()
    }
  }

  pub fn with_text(mut self, text: impl Into<String>) -> Self {
    self.text = Some(text.into());
    self
  }

  pub fn with_reply_to(mut self, reply_to: impl Into<String>) -> Self {
    self.reply_to = Some(reply_to.into());
    self
  }

  /// Recipient addresses split out of `to`.
  pub fn recipients(&self) -> impl Iterator<Item = &str> {
    self.to.split(',').map(str::trim).filter(|s| !s.is_empty())
  }
}

/// A transactional-email capability.
pub trait Mailer: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Attempt delivery of `email`. Resolves once the provider has accepted or
  /// rejected it.
  fn send(&self, email: &OutgoingEmail) -> impl Future<Output = Result<(), Self::Error>> + Send;

  /// Short name of the delivery provider, for status reporting.
  fn provider(&self) -> &'static str { "custom" }
}
