//! In-memory mailer: records messages instead of sending them.

use std::sync::{Arc, Mutex, PoisonError};

use folio_core::mail::{Mailer, OutgoingEmail};

use crate::{Error, Result};

/// Records every message passed to [`Mailer::send`].
///
/// Built with [`MemoryMailer::failing`], every send fails with
/// [`Error::Simulated`] after being recorded. Cloning shares the record.
#[derive(Clone, Default)]
pub struct MemoryMailer {
  sent: Arc<Mutex<Vec<OutgoingEmail>>>,
  fail: bool,
}

impl MemoryMailer {
  pub fn new() -> Self { Self::default() }

  pub fn failing() -> Self {
    Self {
      fail: true,
      ..Self::default()
    }
  }

  /// Every message sent so far, in order.
  pub fn sent(&self) -> Vec<OutgoingEmail> {
    self.sent.lock().unwrap_or_else(PoisonError::into_inner).clone()
  }
}

impl Mailer for MemoryMailer {
  type Error = Error;

  async fn send(&self, email: &OutgoingEmail) -> Result<()> {
    self
      .sent
      .lock()
      .unwrap_or_else(PoisonError::into_inner)
      .push(email.clone());
    if self.fail {
      return Err(Error::Simulated);
    }
    Ok(())
  }

  fn provider(&self) -> &'static str { "memory" }
}
