//! Contact submissions, the only persisted entity.
//!
//! A submission is an immutable record of one contact-form entry. It is
//! written once by the store and never updated or deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A persisted contact-form entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactSubmission {
  pub id:         Uuid,
  pub name:       String,
  pub email:      String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub subject:    Option<String>,
  pub message:    String,
  /// Server-assigned timestamp; never changes after creation.
  pub created_at: DateTime<Utc>,
}

impl ContactSubmission {
  /// The first whitespace-separated word of the submitter's name, used to
  /// address them in email copy.
  pub fn first_name(&self) -> &str {
    self.name.split_whitespace().next().unwrap_or(&self.name)
  }
}

/// Input to [`crate::store::SubmissionStore::record_submission`].
///
/// Normally produced by [`crate::validate::ValidationRules::validate`]; the
/// fields hold trimmed values. `id` and `created_at` are always set by the
/// store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubmission {
  pub name:    String,
  pub email:   String,
  pub subject: Option<String>,
  pub message: String,
}
