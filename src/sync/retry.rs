//! Bounded retry with linear backoff for network calls.
//!
//! Retry is an explicit loop with a visible attempt counter rather than
//! recursion, so the termination condition and the backoff formula are
//! testable. The inter-attempt wait is a tokio sleep: other work on the
//! runtime keeps running while an attempt is suspended.

use std::future::Future;
use std::time::Duration;
use tracing::warn;

use crate::error::FetchError;

/// Attempt budget and backoff base for a single logical fetch.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
  /// Total attempts, including the first one.
  pub max_attempts: u32,
  /// Delay before retry N is `base_delay * N` (linear, not exponential).
  pub base_delay: Duration,
}

impl Default for RetryPolicy {
  fn default() -> Self {
    Self {
      max_attempts: 3,
      base_delay: Duration::from_secs(1),
    }
  }
}

/// Run `op` until it succeeds or the attempt budget is spent.
///
/// Retryable errors (transport, HTTP status, malformed body) consume an
/// attempt each; after the last one the error is wrapped in
/// [`FetchError::ExhaustedRetries`] so callers see both the budget and the
/// original failure. Non-retryable errors surface immediately. The attempt
/// counter is local to this call: every invocation starts with a full budget.
pub async fn with_retry<T, F, Fut>(policy: RetryPolicy, mut op: F) -> Result<T, FetchError>
where
  F: FnMut() -> Fut,
  Fut: Future<Output = Result<T, FetchError>>,
{
  let mut attempt = 1u32;
  loop {
    match op().await {
      Ok(value) => return Ok(value),
      Err(err) if !err.is_retryable() => return Err(err),
      Err(err) if attempt < policy.max_attempts => {
        let delay = policy.base_delay * attempt;
        warn!(
          error = %err,
          attempt,
          remaining = policy.max_attempts - attempt,
          "request failed, retrying in {:?}",
          delay
        );
        tokio::time::sleep(delay).await;
        attempt += 1;
      }
      Err(err) => {
        return Err(FetchError::ExhaustedRetries {
          attempts: policy.max_attempts,
          last: Box::new(err),
        })
      }
    }
  }
}
