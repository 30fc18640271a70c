//! Outbound mail delivery for Folio.
//!
//! Provides [`folio_core::mail::Mailer`] implementations for SMTP
//! ([`SmtpMailer`]) and the Gmail REST API ([`GmailMailer`]), plus the
//! [`MailBackend`] enum that selects one of them from configuration.
//!
//! Gmail access tokens are obtained through an injected
//! [`oauth::TokenProvider`]; authorization failures are retried according to
//! a [`RetryPolicy`].

mod backend;
mod config;
mod gmail;
mod memory;
mod message;
mod retry;
mod smtp;

pub mod error;
pub mod oauth;
pub mod templates;

pub use backend::MailBackend;
pub use config::{GmailConfig, MailConfig, SmtpConfig, SmtpSecurity};
pub use error::{Error, Result};
pub use gmail::GmailMailer;
pub use memory::MemoryMailer;
pub use retry::RetryPolicy;
pub use smtp::SmtpMailer;
