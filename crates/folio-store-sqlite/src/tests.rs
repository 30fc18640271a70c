//! Integration tests for `SqliteStore` against an in-memory database.

use std::collections::HashSet;

use folio_core::{store::SubmissionStore, submission::NewSubmission};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn submission(name: &str) -> NewSubmission {
  NewSubmission {
    name:    name.into(),
    email:   format!("{}@example.com", name.to_lowercase()),
    subject: Some("Hello".into()),
    message: "Loved your portfolio!".into(),
  }
}

// ─── Recording ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn record_and_get_submission() {
  let s = store().await;

  let recorded = s.record_submission(submission("Ada")).await.unwrap();
  assert_eq!(recorded.name, "Ada");
  assert_eq!(recorded.email, "ada@example.com");

  let fetched = s.get_submission(recorded.id).await.unwrap();
  assert_eq!(fetched, Some(recorded));
}

#[tokio::test]
async fn subject_is_optional() {
  let s = store().await;
  let mut input = submission("Grace");
  input.subject = None;

  let recorded = s.record_submission(input).await.unwrap();
  let fetched = s.get_submission(recorded.id).await.unwrap().unwrap();
  assert_eq!(fetched.subject, None);
}

#[tokio::test]
async fn ids_are_unique() {
  let s = store().await;
  let mut ids = HashSet::new();
  for i in 0..20 {
    let recorded = s
      .record_submission(submission(&format!("user{i}")))
      .await
      .unwrap();
    assert!(ids.insert(recorded.id));
  }
  assert_eq!(s.count_submissions().await.unwrap(), 20);
}

#[tokio::test]
async fn get_submission_missing_returns_none() {
  let s = store().await;
  let result = s.get_submission(Uuid::new_v4()).await.unwrap();
  assert!(result.is_none());
}

// ─── Listing ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn list_is_empty_for_new_store() {
  let s = store().await;
  assert!(s.list_submissions().await.unwrap().is_empty());
  assert_eq!(s.count_submissions().await.unwrap(), 0);
}

#[tokio::test]
async fn list_is_newest_first() {
  let s = store().await;
  let first = s.record_submission(submission("First")).await.unwrap();
  let second = s.record_submission(submission("Second")).await.unwrap();
  let third = s.record_submission(submission("Third")).await.unwrap();

  let listed = s.list_submissions().await.unwrap();
  let ids: Vec<_> = listed.iter().map(|c| c.id).collect();
  assert_eq!(ids, vec![third.id, second.id, first.id]);
  assert!(listed.windows(2).all(|w| w[0].created_at >= w[1].created_at));
}

#[tokio::test]
async fn records_are_unchanged_by_later_writes() {
  let s = store().await;
  let original = s.record_submission(submission("Ada")).await.unwrap();
  s.record_submission(submission("Grace")).await.unwrap();

  let fetched = s.get_submission(original.id).await.unwrap().unwrap();
  assert_eq!(fetched.created_at, original.created_at);
  assert_eq!(fetched, original);
}

// ─── Persistence ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn file_store_survives_reopen() {
  let dir = tempfile::tempdir().unwrap();
  let path = dir.path().join("folio.sqlite3");

  let recorded = {
    let s = SqliteStore::open(&path).await.unwrap();
    s.record_submission(submission("Ada")).await.unwrap()
  };

  let reopened = SqliteStore::open(&path).await.unwrap();
  let fetched = reopened.get_submission(recorded.id).await.unwrap();
  assert_eq!(fetched, Some(recorded));
}
