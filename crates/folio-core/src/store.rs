//! The `SubmissionStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `folio-store-sqlite`).
//! The HTTP layer depends on this abstraction, not on any concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::submission::{ContactSubmission, NewSubmission};

/// Abstraction over a Folio submission store backend.
///
/// The store is an append-only log: there is no update or delete operation.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait SubmissionStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Persist a new submission and return it. The store assigns `id` and
  /// `created_at`.
  fn record_submission(
    &self,
    input: NewSubmission,
  ) -> impl Future<Output = Result<ContactSubmission, Self::Error>> + Send + '_;

  /// All submissions, newest first.
  fn list_submissions(
    &self,
  ) -> impl Future<Output = Result<Vec<ContactSubmission>, Self::Error>> + Send + '_;

  /// Retrieve a submission by id. Returns `None` if not found.
  fn get_submission(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<ContactSubmission>, Self::Error>> + Send + '_;

  /// Number of stored submissions. Also serves as the liveness probe for
  /// `GET /`.
  fn count_submissions(
    &self,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;
}
