//! Error taxonomy for API fetches.

use reqwest::StatusCode;
use thiserror::Error;

/// Everything that can go wrong between sending a request and handing a
/// typed value to the refresh cycle.
///
/// `Transport`, `Http` and `Parse` are retried by the fetcher; `InvalidShape`
/// means the server answered with well-formed JSON we don't understand, which
/// a retry won't fix. `ExhaustedRetries` wraps the last retryable error once
/// the attempt budget is spent.
#[derive(Debug, Error)]
pub enum FetchError {
  #[error("network error: {0}")]
  Transport(#[from] reqwest::Error),

  #[error("HTTP {status}: {body}")]
  Http { status: StatusCode, body: String },

  #[error("malformed response body: {0}")]
  Parse(#[from] serde_json::Error),

  #[error("unexpected response shape from {endpoint}: {detail}")]
  InvalidShape { endpoint: String, detail: String },

  #[error("failed after {attempts} attempts: {last}")]
  ExhaustedRetries { attempts: u32, last: Box<FetchError> },
}

impl FetchError {
  /// Whether another attempt could plausibly succeed.
  pub fn is_retryable(&self) -> bool {
    matches!(
      self,
      FetchError::Transport(_) | FetchError::Http { .. } | FetchError::Parse(_)
    )
  }

  /// Build an `InvalidShape` error from a typed-conversion failure.
  pub fn invalid_shape(endpoint: &str, err: serde_json::Error) -> Self {
    FetchError::InvalidShape {
      endpoint: endpoint.to_string(),
      detail: err.to_string(),
    }
  }
}
