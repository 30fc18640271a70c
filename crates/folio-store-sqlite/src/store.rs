//! [`SqliteStore`], the SQLite implementation of [`SubmissionStore`].

use std::path::Path;

use chrono::{SubsecRound as _, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use folio_core::{
  store::SubmissionStore,
  submission::{ContactSubmission, NewSubmission},
};

use crate::{
  encode::{encode_dt, encode_uuid, RawSubmission, SUBMISSION_COLUMNS},
  schema::SCHEMA,
  Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Folio submission store backed by a single SQLite file.
///
/// Clones share one connection.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── SubmissionStore impl ────────────────────────────────────────────────────

impl SubmissionStore for SqliteStore {
  type Error = crate::Error;

  async fn record_submission(&self, input: NewSubmission) -> Result<ContactSubmission> {
    // Truncated to the stored precision so the returned record equals what a
    // later read produces.
    let submission = ContactSubmission {
      id:         Uuid::new_v4(),
      name:       input.name,
      email:      input.email,
      subject:    input.subject,
      message:    input.message,
      created_at: Utc::now().trunc_subsecs(6),
    };

    let id_str  = encode_uuid(submission.id);
    let at_str  = encode_dt(submission.created_at);
    let name    = submission.name.clone();
    let email   = submission.email.clone();
    let subject = submission.subject.clone();
    let message = submission.message.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO submissions (id, name, email, subject, message, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![id_str, name, email, subject, message, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(submission)
  }

  async fn list_submissions(&self) -> Result<Vec<ContactSubmission>> {
    let raws: Vec<RawSubmission> = self
      .conn
      .call(|conn| {
        // rowid breaks ties between submissions recorded in the same
        // microsecond.
        let mut stmt = conn.prepare(&format!(
          "SELECT {SUBMISSION_COLUMNS} FROM submissions
           ORDER BY created_at DESC, rowid DESC"
        ))?;
        let rows = stmt
          .query_map([], RawSubmission::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSubmission::into_submission).collect()
  }

  async fn get_submission(&self, id: Uuid) -> Result<Option<ContactSubmission>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawSubmission> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {SUBMISSION_COLUMNS} FROM submissions WHERE id = ?1"),
            rusqlite::params![id_str],
            RawSubmission::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawSubmission::into_submission).transpose()
  }

  async fn count_submissions(&self) -> Result<u64> {
    let count: i64 = self
      .conn
      .call(|conn| {
        Ok(conn.query_row("SELECT COUNT(*) FROM submissions", [], |r| r.get(0))?)
      })
      .await?;
    Ok(count.max(0) as u64)
  }
}
