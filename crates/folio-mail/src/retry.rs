//! Retry policy for authorization failures.

use std::time::Duration;

/// How many times a send is attempted when the provider rejects the access
/// token, and how long to wait between attempts.
///
/// Attempts are numbered from 1. The wait before attempt `n + 1` is
/// `backoff * n`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
  /// Total attempts, including the first. Values below 1 behave as 1.
  pub max_attempts: u32,
  pub backoff:      Duration,
}

impl Default for RetryPolicy {
  /// One retry, immediately.
  fn default() -> Self {
    Self {
      max_attempts: 2,
      backoff:      Duration::ZERO,
    }
  }
}

impl RetryPolicy {
  /// A single attempt with no retry.
  pub fn never() -> Self {
    Self {
      max_attempts: 1,
      backoff:      Duration::ZERO,
    }
  }

  pub fn new(max_attempts: u32, backoff: Duration) -> Self { Self { max_attempts, backoff } }

  /// Whether another attempt may follow attempt number `attempt`.
  pub fn should_retry(&self, attempt: u32) -> bool { attempt < self.max_attempts.max(1) }

  /// How long to wait after attempt number `attempt` fails.
  pub fn delay_after(&self, attempt: u32) -> Duration { self.backoff.saturating_mul(attempt) }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn default_allows_exactly_one_retry() {
    let policy = RetryPolicy::default();
    assert!(policy.should_retry(1));
    assert!(!policy.should_retry(2));
  }

  #[test]
  fn zero_attempts_behaves_as_one() {
    let policy = RetryPolicy::new(0, Duration::ZERO);
    assert!(!policy.should_retry(1));
    assert!(!RetryPolicy::never().should_retry(1));
  }

  #[test]
  fn backoff_is_linear() {
    let policy = RetryPolicy::new(4, Duration::from_millis(100));
    assert_eq!(policy.delay_after(1), Duration::from_millis(100));
    assert_eq!(policy.delay_after(3), Duration::from_millis(300));
  }
}
