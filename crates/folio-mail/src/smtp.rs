//! Delivery over SMTP.

use std::time::Duration;

use folio_core::mail::{Mailer, OutgoingEmail};
use lettre::{
  AsyncSmtpTransport, AsyncTransport, Tokio1Executor,
  message::Mailbox,
  transport::smtp::authentication::Credentials,
};

use crate::{Error, Result, SmtpConfig, SmtpSecurity, message::build_message};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

pub struct SmtpMailer {
  transport: AsyncSmtpTransport<Tokio1Executor>,
  from:      Mailbox,
}

impl SmtpMailer {
  pub fn new(config: &SmtpConfig, from: Mailbox) -> Result<Self> {
    let builder = match config.security {
      SmtpSecurity::Starttls => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)?,
      SmtpSecurity::Tls => AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host)?,
      SmtpSecurity::None => AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host),
    };
    let mut builder = builder.port(config.port).timeout(Some(CONNECT_TIMEOUT));
    if !config.username.is_empty() {
      builder = builder.credentials(Credentials::new(
        config.username.clone(),
        config.password.clone(),
      ));
    }
    Ok(Self {
      transport: builder.build(),
      from,
    })
  }

  pub fn from_address(&self) -> String { self.from.email.to_string() }

  /// Open a connection to the relay and authenticate.
  pub async fn verify(&self) -> Result<()> {
    self.transport.test_connection().await?;
    Ok(())
  }
}

impl Mailer for SmtpMailer {
  type Error = Error;

  async fn send(&self, email: &OutgoingEmail) -> Result<()> {
    let message = build_message(&self.from, email, false)?;
    let response = self.transport.send(message).await?;
    tracing::debug!(code = %response.code(), "smtp relay accepted message");
    Ok(())
  }
}
