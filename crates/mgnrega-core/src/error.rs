//! Error types for `mgnrega-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("data.gov.in API key is required")]
  MissingCredential,

  #[error("district name {0:?} is not unique (case-insensitive)")]
  DuplicateDistrictName(String),

  #[error("district name must not be empty")]
  EmptyDistrictName,

  #[error("invalid month: {0:?}")]
  InvalidMonth(String),

  #[error("unknown source status: {0:?}")]
  UnknownSourceStatus(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
