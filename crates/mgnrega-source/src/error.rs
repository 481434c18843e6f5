//! Error type for `mgnrega-source`. Every variant means the source is
//! unavailable for this page.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("failed to build HTTP client: {0}")]
  Client(#[source] reqwest::Error),

  #[error("request failed: {0}")]
  Request(#[from] reqwest::Error),

  #[error("data.gov.in API error: {status} {body}")]
  Status {
    status: reqwest::StatusCode,
    body:   String,
  },

  #[error("malformed payload: {0}")]
  Payload(#[from] serde_json::Error),

  /// The API answered with an explicit error envelope.
  #[error("data.gov.in reported an error: {0}")]
  Upstream(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
