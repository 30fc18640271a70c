//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings with a fixed microsecond width,
//! so lexicographic order in SQL matches chronological order. UUIDs are stored
//! as hyphenated lowercase strings.

use chrono::{DateTime, SecondsFormat, Utc};
use folio_core::submission::ContactSubmission;
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list shared by every `SELECT` that produces a [`RawSubmission`].
pub const SUBMISSION_COLUMNS: &str = "id, name, email, subject, message, created_at";

/// Raw strings read directly from a `submissions` row.
pub struct RawSubmission {
  pub id:         String,
  pub name:       String,
  pub email:      String,
  pub subject:    Option<String>,
  pub message:    String,
  pub created_at: String,
}

impl RawSubmission {
  /// Read a row selected with [`SUBMISSION_COLUMNS`].
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:         row.get(0)?,
      name:       row.get(1)?,
      email:      row.get(2)?,
      subject:    row.get(3)?,
      message:    row.get(4)?,
      created_at: row.get(5)?,
    })
  }

  pub fn into_submission(self) -> Result<ContactSubmission> {
    Ok(ContactSubmission {
      id:         decode_uuid(&self.id)?,
      name:       self.name,
      email:      self.email,
      subject:    self.subject,
      message:    self.message,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}
